//! FILENAME: core/attrview/src/lib.rs
//! Attribute view definitions.
//!
//! This crate describes what an attribute view IS: its keys (columns), its
//! values (cells keyed by row), its views and their grouping state. It has no
//! rendering logic; see `view-engine` for that.
//!
//! Modules:
//! - `key`: column definitions and select options
//! - `value`: type-tagged cell payloads
//! - `group_value`: group identities and reserved sentinels
//! - `view`: view definitions, grouping spec and persisted group records
//! - `attribute_view`: the document plus the value-type compatibility pass

pub mod attribute_view;
pub mod group_value;
pub mod key;
pub mod value;
pub mod view;

pub use attribute_view::{AttributeView, KeyValues, AV_SPEC};
pub use group_value::{GroupValue, Sentinel};
pub use key::{Key, KeyType, SelectOption};
pub use value::{format_number, Asset, Value, ValueData};
pub use view::{
    CalcOperator, CardSettings, CoverFrom, FilterOperand, FilterOperator, GroupHidden,
    GroupMethod, GroupOrder, GroupRange, GroupRecord, LayoutType, SortDirection, View,
    ViewField, ViewFilter, ViewGroup, ViewSort, DEFAULT_PAGE_SIZE,
};
