//! FILENAME: core/attrview/src/attribute_view.rs
//! Attribute View - schema, rows and views of one embedded table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::{Key, KeyType};
use crate::value::{format_number, Value, ValueData};
use crate::view::View;

/// Current document spec version.
pub const AV_SPEC: u32 = 1;

/// One column: its key and the cells of every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValues {
    pub key: Key,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl KeyValues {
    pub fn new(key: Key) -> Self {
        KeyValues {
            key,
            values: Vec::new(),
        }
    }

    pub fn value(&self, block_id: &str) -> Option<&Value> {
        self.values.iter().find(|v| v.block_id == block_id)
    }
}

/// The persisted attribute view document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeView {
    #[serde(default)]
    pub spec: u32,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key_values: Vec<KeyValues>,
    /// Last used view.
    #[serde(default)]
    pub view_id: String,
    #[serde(default)]
    pub views: Vec<View>,
}

impl AttributeView {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        AttributeView {
            spec: AV_SPEC,
            id: id.into(),
            name: name.into(),
            key_values: Vec::new(),
            view_id: String::new(),
            views: Vec::new(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.key_values.iter().map(|kv| &kv.key)
    }

    pub fn key(&self, key_id: &str) -> Option<&Key> {
        self.keys().find(|k| k.id == key_id)
    }

    pub fn key_values(&self, key_id: &str) -> Option<&KeyValues> {
        self.key_values.iter().find(|kv| kv.key.id == key_id)
    }

    /// The block (primary) key.
    pub fn primary_key(&self) -> Option<&Key> {
        self.keys().find(|k| k.key_type == KeyType::Block)
    }

    pub fn add_key(&mut self, key: Key) {
        self.key_values.push(KeyValues::new(key));
    }

    /// Inserts or replaces the cell of `block_id` under `key_id`.
    /// Returns `false` when the key does not exist.
    pub fn set_value(&mut self, key_id: &str, block_id: &str, data: ValueData) -> bool {
        let Some(kv) = self.key_values.iter_mut().find(|kv| kv.key.id == key_id) else {
            return false;
        };
        match kv.values.iter_mut().find(|v| v.block_id == block_id) {
            Some(existing) => existing.data = data,
            None => kv.values.push(Value::new(Uuid::new_v4().to_string(), key_id, block_id, data)),
        }
        true
    }

    pub fn view(&self, view_id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == view_id)
    }

    pub fn view_mut(&mut self, view_id: &str) -> Option<&mut View> {
        self.views.iter_mut().find(|v| v.id == view_id)
    }

    /// Row identities in store order: the primary key's rows first, then any
    /// row that only appears under other keys.
    pub fn row_ids(&self) -> Vec<&str> {
        let mut rows: Vec<&str> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        let primary_first = self
            .key_values
            .iter()
            .filter(|kv| kv.key.key_type == KeyType::Block)
            .chain(self.key_values.iter().filter(|kv| kv.key.key_type != KeyType::Block));
        for kv in primary_first {
            for value in &kv.values {
                if seen.insert(value.block_id.as_str()) {
                    rows.push(value.block_id.as_str());
                }
            }
        }
        rows
    }

    // ========================================================================
    // COMPATIBILITY PASS
    // ========================================================================

    /// Makes every value's payload type match its key type, converting when a
    /// lossless conversion exists and clearing the cell otherwise. Also fills
    /// missing value IDs and stale key IDs. Returns whether anything changed.
    pub fn repair_value_types(&mut self) -> bool {
        let mut changed = false;
        for kv in &mut self.key_values {
            let key_type = kv.key.key_type;
            for value in &mut kv.values {
                if value.id.is_empty() {
                    value.id = Uuid::new_v4().to_string();
                    changed = true;
                }
                if value.key_id != kv.key.id {
                    value.key_id = kv.key.id.clone();
                    changed = true;
                }
                if value.data.key_type() != key_type {
                    value.data = convert_payload(&value.data, key_type);
                    changed = true;
                }
            }
        }
        changed
    }
}

fn convert_payload(data: &ValueData, target: KeyType) -> ValueData {
    let converted = match data {
        ValueData::Number { content, is_not_empty: true } if target.is_text_like() => {
            ValueData::text_of(target, format_number(*content))
        }
        ValueData::Select { items } | ValueData::MSelect { items } if target == KeyType::MSelect => {
            Some(ValueData::MSelect { items: items.clone() })
        }
        ValueData::Select { items } | ValueData::MSelect { items } if target == KeyType::Select => {
            Some(ValueData::Select { items: items.iter().take(1).cloned().collect() })
        }
        other if target.is_text_like() => other
            .text_content()
            .and_then(|text| ValueData::text_of(target, text.to_string())),
        _ => None,
    };
    converted.unwrap_or_else(|| ValueData::empty(target))
}
