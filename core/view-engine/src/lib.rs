//! FILENAME: core/view-engine/src/lib.rs
//! Attribute view rendering engine.
//!
//! Takes an `attrview::AttributeView` and one of its views and produces a
//! paginated, grouped, localized `Viewable` in table, gallery or kanban
//! layout. Depends on `attrview` for the document types.
//!
//! Layers:
//! - `index`: per-render row lookup (WHAT rows exist)
//! - `stage`: filter / sort / calc primitives (WHICH rows, in WHAT order)
//! - `grouping`: group resolution, regeneration and ordering
//! - `materialize` + `viewable`: renderable output for the frontend
//! - `paging` + `visibility`: per-group slicing and empty-group state
//! - `render`: the entry point tying the stages together
//! - `ops`: explicit group-state operations

pub mod compare;
pub mod config;
pub mod error;
pub mod grouping;
pub mod index;
pub mod locale;
pub mod materialize;
pub mod ops;
pub mod paging;
pub mod render;
pub mod stage;
pub mod viewable;
pub mod visibility;

pub use config::{EngineConfig, RenderContext};
pub use error::{GroupingUnavailable, OpError, RenderError, StageError};
pub use grouping::{render_groups, GroupingOutcome};
pub use index::{RowIndex, RowPos};
pub use locale::{sentinel_name, EnglishLocalizer, Localizer, TableLocalizer};
pub use materialize::materialize;
pub use paging::{effective_page_size, page_bounds, paginate, PageRequest};
pub use render::{render_attribute_view, RenderOutput, RenderRequest};
pub use stage::{MemoryQueryStage, QueryStage};
pub use viewable::*;
pub use visibility::next_hidden_state;
