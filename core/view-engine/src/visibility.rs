//! FILENAME: core/view-engine/src/visibility.rs
//! Empty-group visibility state machine.
//!
//! Visible (0) / AutoHidden (1) / ForceHidden (2). This engine only ever
//! moves groups towards Visible; entering a hidden state is an explicit
//! operation (see `ops`).

use attrview::GroupHidden;

/// Next hidden state of a group after a render.
///
/// - `hide_empty == false`: everything except ForceHidden becomes Visible.
/// - `hide_empty == true`: AutoHidden becomes Visible once it has items;
///   anything else is left alone.
pub fn next_hidden_state(current: GroupHidden, hide_empty: bool, item_count: usize) -> GroupHidden {
    match (hide_empty, current) {
        (_, GroupHidden::ForceHidden) => GroupHidden::ForceHidden,
        (false, _) => GroupHidden::Visible,
        (true, GroupHidden::AutoHidden) if item_count > 0 => GroupHidden::Visible,
        (true, state) => state,
    }
}
