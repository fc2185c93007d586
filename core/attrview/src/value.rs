//! FILENAME: core/attrview/src/value.rs
//! Values - one row's cell for one key.
//!
//! The payload is a type-tagged enum whose variant must match the key type.
//! `AttributeView::repair_value_types` enforces that before rendering.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::key::KeyType;

/// An asset attached to an `mAsset` cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// "image" or "file".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    /// Asset path or URL.
    pub content: String,
}

// ============================================================================
// VALUE PAYLOAD
// ============================================================================

/// Type-specific cell payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValueData {
    Block {
        content: String,
    },
    Text {
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    Number {
        content: f64,
        is_not_empty: bool,
    },
    #[serde(rename_all = "camelCase")]
    Date {
        /// Epoch milliseconds.
        content: i64,
        is_not_empty: bool,
        #[serde(default)]
        has_end_date: bool,
        #[serde(default)]
        content2: i64,
    },
    Select {
        items: Vec<String>,
    },
    MSelect {
        items: Vec<String>,
    },
    Url {
        content: String,
    },
    Email {
        content: String,
    },
    Phone {
        content: String,
    },
    MAsset {
        assets: Vec<Asset>,
    },
    /// Evaluated template output.
    Template {
        content: String,
    },
    Created {
        content: i64,
    },
    Updated {
        content: i64,
    },
    Checkbox {
        checked: bool,
    },
    #[serde(rename_all = "camelCase")]
    Relation {
        block_ids: Vec<String>,
        /// Display contents of the related rows, parallel to `block_ids`.
        #[serde(default)]
        contents: Vec<String>,
    },
    Rollup {
        contents: Vec<String>,
    },
    LineNumber {
        content: i64,
    },
}

impl ValueData {
    /// The key type this payload belongs to.
    pub fn key_type(&self) -> KeyType {
        match self {
            ValueData::Block { .. } => KeyType::Block,
            ValueData::Text { .. } => KeyType::Text,
            ValueData::Number { .. } => KeyType::Number,
            ValueData::Date { .. } => KeyType::Date,
            ValueData::Select { .. } => KeyType::Select,
            ValueData::MSelect { .. } => KeyType::MSelect,
            ValueData::Url { .. } => KeyType::Url,
            ValueData::Email { .. } => KeyType::Email,
            ValueData::Phone { .. } => KeyType::Phone,
            ValueData::MAsset { .. } => KeyType::MAsset,
            ValueData::Template { .. } => KeyType::Template,
            ValueData::Created { .. } => KeyType::Created,
            ValueData::Updated { .. } => KeyType::Updated,
            ValueData::Checkbox { .. } => KeyType::Checkbox,
            ValueData::Relation { .. } => KeyType::Relation,
            ValueData::Rollup { .. } => KeyType::Rollup,
            ValueData::LineNumber { .. } => KeyType::LineNumber,
        }
    }

    /// An empty payload for the given key type.
    pub fn empty(key_type: KeyType) -> Self {
        match key_type {
            KeyType::Block => ValueData::Block { content: String::new() },
            KeyType::Text => ValueData::Text { content: String::new() },
            KeyType::Number => ValueData::Number { content: 0.0, is_not_empty: false },
            KeyType::Date => ValueData::Date {
                content: 0,
                is_not_empty: false,
                has_end_date: false,
                content2: 0,
            },
            KeyType::Select => ValueData::Select { items: Vec::new() },
            KeyType::MSelect => ValueData::MSelect { items: Vec::new() },
            KeyType::Url => ValueData::Url { content: String::new() },
            KeyType::Email => ValueData::Email { content: String::new() },
            KeyType::Phone => ValueData::Phone { content: String::new() },
            KeyType::MAsset => ValueData::MAsset { assets: Vec::new() },
            KeyType::Template => ValueData::Template { content: String::new() },
            KeyType::Created => ValueData::Created { content: 0 },
            KeyType::Updated => ValueData::Updated { content: 0 },
            KeyType::Checkbox => ValueData::Checkbox { checked: false },
            KeyType::Relation => ValueData::Relation { block_ids: Vec::new(), contents: Vec::new() },
            KeyType::Rollup => ValueData::Rollup { contents: Vec::new() },
            KeyType::LineNumber => ValueData::LineNumber { content: 0 },
        }
    }

    /// Plain text payload for text-like variants.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            ValueData::Block { content }
            | ValueData::Text { content }
            | ValueData::Url { content }
            | ValueData::Email { content }
            | ValueData::Phone { content }
            | ValueData::Template { content } => Some(content),
            _ => None,
        }
    }

    /// Builds a text-like payload of the requested type.
    pub fn text_of(key_type: KeyType, content: String) -> Option<Self> {
        let data = match key_type {
            KeyType::Block => ValueData::Block { content },
            KeyType::Text => ValueData::Text { content },
            KeyType::Url => ValueData::Url { content },
            KeyType::Email => ValueData::Email { content },
            KeyType::Phone => ValueData::Phone { content },
            KeyType::Template => ValueData::Template { content },
            _ => return None,
        };
        Some(data)
    }

    /// Whether the cell counts as empty for grouping, filtering and calcs.
    /// An unchecked checkbox is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ValueData::Number { is_not_empty, .. } | ValueData::Date { is_not_empty, .. } => !is_not_empty,
            ValueData::Select { items } | ValueData::MSelect { items } => {
                items.iter().all(|i| i.trim().is_empty())
            }
            ValueData::MAsset { assets } => assets.is_empty(),
            ValueData::Created { content } | ValueData::Updated { content } => *content == 0,
            ValueData::Checkbox { checked } => !checked,
            ValueData::Relation { block_ids, .. } => block_ids.is_empty(),
            ValueData::Rollup { contents } => contents.iter().all(|c| c.trim().is_empty()),
            ValueData::LineNumber { .. } => false,
            other => other.text_content().map_or(true, |c| c.trim().is_empty()),
        }
    }

    /// Numeric view of the payload, when it has one.
    pub fn number(&self) -> Option<f64> {
        match self {
            ValueData::Number { content, is_not_empty: true } => Some(*content),
            ValueData::LineNumber { content } => Some(*content as f64),
            _ => None,
        }
    }

    /// Epoch milliseconds for date-like payloads.
    pub fn date_millis(&self) -> Option<i64> {
        match self {
            ValueData::Date { content, is_not_empty: true, .. } => Some(*content),
            ValueData::Created { content } | ValueData::Updated { content } if *content != 0 => {
                Some(*content)
            }
            _ => None,
        }
    }

    /// Selected option names for choice payloads.
    pub fn select_items(&self) -> &[String] {
        match self {
            ValueData::Select { items } | ValueData::MSelect { items } => items,
            _ => &[],
        }
    }

    /// Human readable form used for free-text queries, text comparisons and
    /// group names of real values. Dates render in UTC here; calendar
    /// bucketing applies the render offset itself.
    pub fn display_text(&self) -> String {
        match self {
            ValueData::Number { content, is_not_empty } => {
                if *is_not_empty {
                    format_number(*content)
                } else {
                    String::new()
                }
            }
            ValueData::Date { .. } | ValueData::Created { .. } | ValueData::Updated { .. } => self
                .date_millis()
                .and_then(DateTime::from_timestamp_millis)
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            ValueData::Select { items } | ValueData::MSelect { items } => items.join(", "),
            ValueData::MAsset { assets } => assets
                .iter()
                .map(|a| a.content.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            ValueData::Checkbox { checked } => checked.to_string(),
            ValueData::Relation { contents, .. } | ValueData::Rollup { contents } => contents.join(", "),
            ValueData::LineNumber { content } => content.to_string(),
            other => other.text_content().unwrap_or_default().to_string(),
        }
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// One row's cell for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    pub id: String,
    pub key_id: String,
    /// Row identity (the bound block).
    pub block_id: String,
    #[serde(flatten)]
    pub data: ValueData,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Value {
    pub fn new(
        id: impl Into<String>,
        key_id: impl Into<String>,
        block_id: impl Into<String>,
        data: ValueData,
    ) -> Self {
        Value {
            id: id.into(),
            key_id: key_id.into(),
            block_id: block_id.into(),
            data,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// An empty cell of the given type, used when a row has no stored value.
    pub fn empty(key_id: &str, block_id: &str, key_type: KeyType) -> Self {
        Value::new(String::new(), key_id, block_id, ValueData::empty(key_type))
    }

    pub fn key_type(&self) -> KeyType {
        self.data.key_type()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
