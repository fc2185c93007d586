//! FILENAME: core/attrview/src/view.rs
//! View Definition - the serializable configuration of one view.
//!
//! This module contains all the types needed to DESCRIBE a view:
//! - Layout (table, gallery, kanban)
//! - Filters, sorts and per-field settings
//! - The optional grouping spec and the persisted group records
//!
//! Group records are persisted to keep manual order and sticky hidden state.
//! Rendered rows are never persisted.

use serde::{Deserialize, Serialize};

use crate::group_value::GroupValue;
use crate::key::Key;

/// Engine default when a view does not configure a page size.
pub const DEFAULT_PAGE_SIZE: usize = 50;

// ============================================================================
// LAYOUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum LayoutType {
    #[default]
    Table,
    Gallery,
    Kanban,
}

// ============================================================================
// FILTERS
// ============================================================================

/// Filter operators understood by the query stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    IsEqual,
    IsNotEqual,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsGreater,
    IsGreaterOrEqual,
    IsLess,
    IsLessOrEqual,
    IsEmpty,
    IsNotEmpty,
    IsTrue,
    IsFalse,
}

impl FilterOperator {
    /// Operators that do not look at the operand.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty | FilterOperator::IsTrue | FilterOperator::IsFalse
        )
    }
}

/// The right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum FilterOperand {
    Text(String),
    Number(f64),
    /// Epoch milliseconds.
    Date(i64),
    Bool(bool),
}

/// A predicate on one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilter {
    pub key_id: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub operand: Option<FilterOperand>,
}

impl ViewFilter {
    pub fn new(key_id: impl Into<String>, operator: FilterOperator, operand: Option<FilterOperand>) -> Self {
        ViewFilter {
            key_id: key_id.into(),
            operator,
            operand,
        }
    }
}

// ============================================================================
// SORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSort {
    pub key_id: String,
    #[serde(default)]
    pub order: SortDirection,
}

impl ViewSort {
    pub fn new(key_id: impl Into<String>, order: SortDirection) -> Self {
        ViewSort {
            key_id: key_id.into(),
            order,
        }
    }
}

// ============================================================================
// FIELDS AND CALCS
// ============================================================================

/// Aggregations the query stage can compute per field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalcOperator {
    CountAll,
    CountValues,
    CountUniqueValues,
    CountEmpty,
    CountNotEmpty,
    PercentEmpty,
    PercentNotEmpty,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Range,
    Checked,
    Unchecked,
    PercentChecked,
}

/// Per-view settings of one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewField {
    pub key_id: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calc: Option<CalcOperator>,
}

impl ViewField {
    pub fn new(key_id: impl Into<String>) -> Self {
        ViewField {
            key_id: key_id.into(),
            hidden: false,
            width: None,
            wrap: false,
            calc: None,
        }
    }
}

// ============================================================================
// CARD SETTINGS (gallery / kanban)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CoverFrom {
    #[default]
    None,
    /// First asset of `cover_key_id`.
    AssetField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardSettings {
    #[serde(default)]
    pub cover_from: CoverFrom,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_key_id: Option<String>,
    #[serde(default)]
    pub show_icon: bool,
    #[serde(default)]
    pub wrap_field: bool,
}

// ============================================================================
// GROUPING SPEC
// ============================================================================

/// How rows are assigned to groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GroupMethod {
    /// Direct equality on the value.
    #[default]
    Value,
    /// Fixed-width numeric buckets from `ViewGroup::range`.
    RangeNum,
    DateDay,
    DateWeek,
    DateMonth,
    DateYear,
    /// today / tomorrow / last 7 days ... with month buckets outside 30 days.
    DateRelative,
    /// Evaluated template output.
    Template,
}

impl GroupMethod {
    /// Methods whose buckets shift when the calendar day changes.
    pub fn is_date_bucket(self) -> bool {
        matches!(
            self,
            GroupMethod::DateDay
                | GroupMethod::DateWeek
                | GroupMethod::DateMonth
                | GroupMethod::DateYear
                | GroupMethod::DateRelative
        )
    }
}

/// How groups are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GroupOrder {
    /// By the persisted `GroupRecord::sort`.
    #[default]
    Manual,
    Ascending,
    Descending,
    /// By position in the grouping key's option list.
    SelectOption,
}

/// Bucket range for `GroupMethod::RangeNum`: `[start, end)` in steps of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl Default for GroupRange {
    fn default() -> Self {
        GroupRange {
            start: 0.0,
            end: 1000.0,
            step: 100.0,
        }
    }
}

/// The single grouping spec of a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewGroup {
    /// ID of the grouping key.
    pub field: String,
    #[serde(default)]
    pub method: GroupMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<GroupRange>,
    #[serde(default)]
    pub order: GroupOrder,
    #[serde(default)]
    pub hide_empty: bool,
}

impl ViewGroup {
    pub fn new(field: impl Into<String>, method: GroupMethod, order: GroupOrder) -> Self {
        ViewGroup {
            field: field.into(),
            method,
            range: None,
            order,
            hide_empty: false,
        }
    }
}

// ============================================================================
// GROUP RECORDS
// ============================================================================

/// Tri-state hidden flag of a group. Persisted as 0 / 1 / 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "u8", try_from = "u8")]
pub enum GroupHidden {
    #[default]
    Visible,
    /// Hidden because it was empty while `hide_empty` was on.
    AutoHidden,
    /// Hidden by the user; never cleared automatically.
    ForceHidden,
}

impl From<GroupHidden> for u8 {
    fn from(hidden: GroupHidden) -> Self {
        match hidden {
            GroupHidden::Visible => 0,
            GroupHidden::AutoHidden => 1,
            GroupHidden::ForceHidden => 2,
        }
    }
}

impl TryFrom<u8> for GroupHidden {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GroupHidden::Visible),
            1 => Ok(GroupHidden::AutoHidden),
            2 => Ok(GroupHidden::ForceHidden),
            other => Err(format!("invalid group hidden state: {}", other)),
        }
    }
}

/// Persisted state of one group. The display name is resolved at render
/// time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub value: GroupValue,
    /// Manual order.
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub hidden: GroupHidden,
    #[serde(default)]
    pub folded: bool,
}

impl GroupRecord {
    pub fn new(id: impl Into<String>, value: GroupValue, sort: i64) -> Self {
        GroupRecord {
            id: id.into(),
            value,
            sort,
            hidden: GroupHidden::Visible,
            folded: false,
        }
    }
}

// ============================================================================
// VIEW
// ============================================================================

/// One display configuration of an attribute view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(rename = "layoutType", default)]
    pub layout: LayoutType,
    #[serde(default)]
    pub filters: Vec<ViewFilter>,
    #[serde(default)]
    pub sorts: Vec<ViewSort>,
    #[serde(default)]
    pub fields: Vec<ViewField>,
    /// 0 means "use the engine default".
    #[serde(default)]
    pub page_size: usize,
    #[serde(default)]
    pub cards: CardSettings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<ViewGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRecord>,
    /// Epoch millis of the last group generation.
    #[serde(default)]
    pub group_created: i64,
    /// Key the current `groups` were generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key_id: Option<String>,
}

impl View {
    pub fn new(id: impl Into<String>, name: impl Into<String>, layout: LayoutType) -> Self {
        View {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            layout,
            filters: Vec::new(),
            sorts: Vec::new(),
            fields: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            cards: CardSettings::default(),
            group: None,
            groups: Vec::new(),
            group_created: 0,
            group_key_id: None,
        }
    }

    /// A view showing every key in schema order.
    pub fn with_all_fields<'a>(mut self, keys: impl IntoIterator<Item = &'a Key>) -> Self {
        self.fields = keys.into_iter().map(|k| ViewField::new(k.id.clone())).collect();
        self
    }

    pub fn field(&self, key_id: &str) -> Option<&ViewField> {
        self.fields.iter().find(|f| f.key_id == key_id)
    }

    pub fn group_record(&self, group_id: &str) -> Option<&GroupRecord> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn group_record_mut(&mut self, group_id: &str) -> Option<&mut GroupRecord> {
        self.groups.iter_mut().find(|g| g.id == group_id)
    }

    /// Forgets the generated groups so the next render regenerates them.
    pub fn clear_groups(&mut self) {
        self.groups.clear();
        self.group_created = 0;
        self.group_key_id = None;
    }
}
