//! FILENAME: core/view-engine/src/index.rs
//! Row Index - per-render lookup over the schema/row store.
//!
//! Rows are addressed by their position (`RowPos`) in store order, so the
//! rest of the engine passes around small integer vectors instead of
//! cloning row IDs. Cells are looked up through one hash map per key.

use attrview::{AttributeView, Key, KeyType, Value};
use rustc_hash::FxHashMap;

/// Position of a row in store order.
pub type RowPos = usize;

/// Read-only view over an attribute view's rows, built once per render.
pub struct RowIndex<'a> {
    av: &'a AttributeView,
    rows: Vec<&'a str>,
    /// key ID -> (row ID -> value)
    cells: FxHashMap<&'a str, FxHashMap<&'a str, &'a Value>>,
}

impl<'a> RowIndex<'a> {
    pub fn new(av: &'a AttributeView) -> Self {
        let rows = av.row_ids();
        let mut cells: FxHashMap<&'a str, FxHashMap<&'a str, &'a Value>> = FxHashMap::default();
        for kv in &av.key_values {
            let column = cells.entry(kv.key.id.as_str()).or_default();
            for value in &kv.values {
                column.insert(value.block_id.as_str(), value);
            }
        }
        RowIndex { av, rows, cells }
    }

    pub fn attribute_view(&self) -> &'a AttributeView {
        self.av
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Every row position in store order.
    pub fn all_rows(&self) -> Vec<RowPos> {
        (0..self.rows.len()).collect()
    }

    pub fn row_id(&self, pos: RowPos) -> &'a str {
        self.rows[pos]
    }

    pub fn key(&self, key_id: &str) -> Option<&'a Key> {
        self.av.key(key_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a Key> {
        self.av.keys()
    }

    /// The stored cell, if the row has one for this key.
    pub fn value(&self, key_id: &str, pos: RowPos) -> Option<&'a Value> {
        let row_id = self.rows.get(pos)?;
        self.cells.get(key_id)?.get(row_id).copied()
    }

    /// The stored cell or an empty cell of the key's type.
    pub fn value_or_empty(&self, key: &Key, pos: RowPos) -> Value {
        match self.value(&key.id, pos) {
            Some(value) => value.clone(),
            None => Value::empty(&key.id, self.rows[pos], key.key_type),
        }
    }

    /// Display text of the row's primary key cell, if any.
    pub fn row_title(&self, pos: RowPos) -> String {
        self.keys()
            .find(|k| k.key_type == KeyType::Block)
            .and_then(|k| self.value(&k.id, pos))
            .map(|v| v.data.display_text())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrview::ValueData;

    #[test]
    fn test_lookup_by_key_and_position() {
        let mut av = AttributeView::new("av", "Tasks");
        av.add_key(Key::new("name", "Name", KeyType::Block));
        av.add_key(Key::new("n", "Points", KeyType::Number));
        av.set_value("name", "r1", ValueData::Block { content: "First".into() });
        av.set_value("name", "r2", ValueData::Block { content: "Second".into() });
        av.set_value("n", "r2", ValueData::Number { content: 5.0, is_not_empty: true });

        let index = RowIndex::new(&av);
        assert_eq!(index.row_count(), 2);
        assert_eq!(index.row_id(1), "r2");
        assert!(index.value("n", 0).is_none());
        assert_eq!(index.value("n", 1).and_then(|v| v.data.number()), Some(5.0));
        assert_eq!(index.row_title(0), "First");

        let key = index.key("n").unwrap();
        assert!(index.value_or_empty(key, 0).is_empty());
    }
}
