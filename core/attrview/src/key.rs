//! FILENAME: core/attrview/src/key.rs
//! Key definitions - the columns of an attribute view.

use serde::{Deserialize, Serialize};

// ============================================================================
// KEY TYPE
// ============================================================================

/// The type tag of a key. The wire form is the camel-case tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyType {
    /// Primary key: one per attribute view, binds a row to a block.
    Block,
    Text,
    Number,
    Date,
    Select,
    MSelect,
    Url,
    Email,
    Phone,
    MAsset,
    Template,
    Created,
    Updated,
    Checkbox,
    Relation,
    Rollup,
    LineNumber,
}

impl KeyType {
    /// Single or multiple choice keys carry an ordered option list.
    pub fn is_choice(self) -> bool {
        matches!(self, KeyType::Select | KeyType::MSelect)
    }

    /// Keys whose payload is an epoch-millisecond timestamp.
    pub fn is_date_like(self) -> bool {
        matches!(self, KeyType::Date | KeyType::Created | KeyType::Updated)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, KeyType::Number)
    }

    /// Plain text payloads that can be converted into each other without loss.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            KeyType::Block
                | KeyType::Text
                | KeyType::Url
                | KeyType::Email
                | KeyType::Phone
                | KeyType::Template
        )
    }
}

// ============================================================================
// SELECT OPTIONS
// ============================================================================

/// One option of a select / multi-select key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        SelectOption {
            name: name.into(),
            color: String::new(),
            desc: String::new(),
        }
    }
}

// ============================================================================
// KEY
// ============================================================================

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,

    /// Ordered option list for choice keys. Option order is the canonical
    /// order used by select-option grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,

    /// Template source for template keys. Rendering the template happens
    /// outside the engine; rows carry the evaluated output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
}

impl Key {
    pub fn new(id: impl Into<String>, name: impl Into<String>, key_type: KeyType) -> Self {
        Key {
            id: id.into(),
            name: name.into(),
            key_type,
            icon: String::new(),
            desc: String::new(),
            options: Vec::new(),
            template: String::new(),
        }
    }

    /// Builder helper for choice keys.
    pub fn with_options<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = names.into_iter().map(SelectOption::new).collect();
        self
    }

    /// Position of an option in the declared option order.
    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }
}
