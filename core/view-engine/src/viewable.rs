//! FILENAME: core/view-engine/src/viewable.rs
//! Viewable - Renderable output for the frontend.
//!
//! A viewable is created fresh on every render and never persisted. All
//! three layouts share a header (identity, page size, group metadata, child
//! group viewables) and differ only in their item container:
//! - Table: columns + rows
//! - Gallery: fields + cards (with optional cover)
//! - Kanban: fields + cards

use std::ops::Range;

use attrview::{
    CalcOperator, CoverFrom, GroupHidden, GroupValue, Key, LayoutType, Value, ViewGroup,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// CALC RESULTS
// ============================================================================

/// Result of one field aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CalcValue {
    Empty,
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcResult {
    pub key_id: String,
    pub operator: CalcOperator,
    pub value: CalcValue,
}

// ============================================================================
// SHARED HEADER
// ============================================================================

/// Identity, paging and grouping metadata common to every layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewableHeader {
    /// View ID for the root, group ID for a group.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// Effective page size after the pagination stage.
    pub page_size: usize,

    /// Grouping spec; set on a grouped root only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ViewGroup>,
    /// Canonical group value; set on group children only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_value: Option<GroupValue>,
    #[serde(default)]
    pub group_sort: i64,
    #[serde(default)]
    pub group_hidden: GroupHidden,
    #[serde(default)]
    pub group_folded: bool,
    /// One child per group, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Viewable>,
}

// ============================================================================
// ITEMS
// ============================================================================

/// One cell of a table row or a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCell {
    pub key_id: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<ViewCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub key: Key,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calc: Option<CalcOperator>,
}

/// A field shown on gallery and kanban cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardField {
    pub key: Key,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub values: Vec<ViewCell>,
}

// ============================================================================
// LAYOUT VARIANTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableViewable {
    #[serde(flatten)]
    pub header: ViewableHeader,
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
    /// Total rows before paging.
    pub row_count: usize,
    #[serde(default)]
    pub calcs: Vec<CalcResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryViewable {
    #[serde(flatten)]
    pub header: ViewableHeader,
    #[serde(default)]
    pub fields: Vec<CardField>,
    pub cards: Vec<Card>,
    /// Total cards before paging.
    pub card_count: usize,
    #[serde(default)]
    pub cover_from: CoverFrom,
    #[serde(default)]
    pub calcs: Vec<CalcResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanbanViewable {
    #[serde(flatten)]
    pub header: ViewableHeader,
    #[serde(default)]
    pub fields: Vec<CardField>,
    pub cards: Vec<Card>,
    /// Total cards before paging.
    pub card_count: usize,
    #[serde(default)]
    pub calcs: Vec<CalcResult>,
}

/// The rendered materialization of a view or of one of its groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum Viewable {
    Table(TableViewable),
    Gallery(GalleryViewable),
    Kanban(KanbanViewable),
}

impl Viewable {
    pub fn layout(&self) -> LayoutType {
        match self {
            Viewable::Table(_) => LayoutType::Table,
            Viewable::Gallery(_) => LayoutType::Gallery,
            Viewable::Kanban(_) => LayoutType::Kanban,
        }
    }

    pub fn header(&self) -> &ViewableHeader {
        match self {
            Viewable::Table(t) => &t.header,
            Viewable::Gallery(g) => &g.header,
            Viewable::Kanban(k) => &k.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ViewableHeader {
        match self {
            Viewable::Table(t) => &mut t.header,
            Viewable::Gallery(g) => &mut g.header,
            Viewable::Kanban(k) => &mut k.header,
        }
    }

    pub fn groups(&self) -> &[Viewable] {
        &self.header().groups
    }

    pub fn calcs(&self) -> &[CalcResult] {
        match self {
            Viewable::Table(t) => &t.calcs,
            Viewable::Gallery(g) => &g.calcs,
            Viewable::Kanban(k) => &k.calcs,
        }
    }

    /// Total item count before paging (`row_count` / `card_count`).
    pub fn item_count(&self) -> usize {
        match self {
            Viewable::Table(t) => t.row_count,
            Viewable::Gallery(g) => g.card_count,
            Viewable::Kanban(k) => k.card_count,
        }
    }

    /// Number of items currently held (after paging).
    pub fn items_len(&self) -> usize {
        match self {
            Viewable::Table(t) => t.rows.len(),
            Viewable::Gallery(g) => g.cards.len(),
            Viewable::Kanban(k) => k.cards.len(),
        }
    }

    /// IDs of the held items, in order.
    pub fn item_ids(&self) -> Vec<&str> {
        match self {
            Viewable::Table(t) => t.rows.iter().map(|r| r.id.as_str()).collect(),
            Viewable::Gallery(g) => g.cards.iter().map(|c| c.id.as_str()).collect(),
            Viewable::Kanban(k) => k.cards.iter().map(|c| c.id.as_str()).collect(),
        }
    }

    /// Keeps only the items in `range`; the caller clamps it.
    pub fn retain_range(&mut self, range: Range<usize>) {
        fn keep<T>(items: &mut Vec<T>, range: Range<usize>) {
            items.truncate(range.end);
            items.drain(..range.start.min(items.len()));
        }
        match self {
            Viewable::Table(t) => keep(&mut t.rows, range),
            Viewable::Gallery(g) => keep(&mut g.cards, range),
            Viewable::Kanban(k) => keep(&mut k.cards, range),
        }
    }

    /// Drops the column / field definitions. Group children repeat the
    /// parent's, so the output carries them once.
    pub fn strip_fields(&mut self) {
        match self {
            Viewable::Table(t) => t.columns.clear(),
            Viewable::Gallery(g) => g.fields.clear(),
            Viewable::Kanban(k) => k.fields.clear(),
        }
    }

    /// Restores column / field definitions from the parent viewable, the
    /// inverse of `strip_fields`. Layout mismatches are ignored.
    pub fn attach_fields_from(&mut self, parent: &Viewable) {
        match (self, parent) {
            (Viewable::Table(t), Viewable::Table(p)) => t.columns = p.columns.clone(),
            (Viewable::Gallery(g), Viewable::Gallery(p)) => g.fields = p.fields.clone(),
            (Viewable::Kanban(k), Viewable::Kanban(p)) => k.fields = p.fields.clone(),
            _ => {}
        }
    }

    /// Re-attaches the parent's definitions to every group child.
    pub fn attach_group_fields(&mut self) {
        let template = self.clone();
        for group in &mut self.header_mut().groups {
            group.attach_fields_from(&template);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrview::KeyType;

    fn table_with_rows(n: usize) -> Viewable {
        let rows = (0..n)
            .map(|i| TableRow { id: format!("r{}", i), cells: Vec::new() })
            .collect();
        Viewable::Table(TableViewable {
            header: ViewableHeader::default(),
            columns: vec![TableColumn {
                key: Key::new("k", "Name", KeyType::Block),
                hidden: false,
                width: None,
                wrap: false,
                calc: None,
            }],
            rows,
            row_count: n,
            calcs: Vec::new(),
        })
    }

    #[test]
    fn test_retain_range_keeps_slice() {
        let mut viewable = table_with_rows(5);
        viewable.retain_range(1..3);
        assert_eq!(viewable.item_ids(), vec!["r1", "r2"]);
        assert_eq!(viewable.item_count(), 5);
    }

    #[test]
    fn test_retain_empty_range() {
        let mut viewable = table_with_rows(3);
        viewable.retain_range(3..3);
        assert_eq!(viewable.items_len(), 0);
    }

    #[test]
    fn test_strip_then_attach_restores_columns() {
        let parent = table_with_rows(1);
        let mut child = parent.clone();
        child.strip_fields();
        assert_ne!(child, parent);
        child.attach_fields_from(&parent);
        assert_eq!(child, parent);
    }

    #[test]
    fn test_layout_tag_in_json() {
        let json = serde_json::to_value(table_with_rows(0)).unwrap();
        assert_eq!(json["layout"], "table");
        assert_eq!(json["rowCount"], 0);
    }
}
