//! FILENAME: core/view-engine/src/ops.rs
//! Group-state operations: explicit user actions on a view's grouping.
//!
//! Each operation mutates the view in place; the caller persists the
//! attribute view afterwards. ForceHidden is only ever entered here.

use attrview::{GroupHidden, GroupOrder, View, ViewGroup};
use log::debug;

use crate::error::OpError;
use crate::viewable::Viewable;
use crate::visibility::next_hidden_state;

/// Installs or replaces the grouping spec. Groups regenerate on the next
/// render.
pub fn set_group(view: &mut View, spec: ViewGroup) {
    debug!("[AV] set group view={} key={} method={:?}", view.id, spec.field, spec.method);
    view.group = Some(spec);
    view.clear_groups();
}

pub fn remove_group(view: &mut View) {
    view.group = None;
    view.clear_groups();
}

/// Moves `group_id` right after `previous_id` (to the front when `None`),
/// renumbers `sort` and switches the view to manual order.
pub fn move_group(view: &mut View, group_id: &str, previous_id: Option<&str>) -> Result<(), OpError> {
    if view.group.is_none() {
        return Err(OpError::NotGrouped(view.id.clone()));
    }
    if view.group_record(group_id).is_none() {
        return Err(OpError::GroupNotFound(group_id.to_string()));
    }
    if let Some(previous) = previous_id.filter(|p| view.group_record(p).is_none()) {
        return Err(OpError::GroupNotFound(previous.to_string()));
    }

    view.groups.sort_by_key(|g| g.sort);
    let from = view.groups.iter().position(|g| g.id == group_id).unwrap_or_default();
    let record = view.groups.remove(from);
    let to = previous_id
        .and_then(|previous| view.groups.iter().position(|g| g.id == previous))
        .map_or(0, |pos| pos + 1);
    view.groups.insert(to, record);

    for (position, group) in view.groups.iter_mut().enumerate() {
        group.sort = position as i64;
    }
    if let Some(spec) = view.group.as_mut() {
        spec.order = GroupOrder::Manual;
    }
    Ok(())
}

/// Sets a group's hidden state explicitly.
pub fn set_group_hidden(view: &mut View, group_id: &str, hidden: GroupHidden) -> Result<(), OpError> {
    grouped_record(view, group_id)?.hidden = hidden;
    Ok(())
}

pub fn fold_group(view: &mut View, group_id: &str, folded: bool) -> Result<(), OpError> {
    grouped_record(view, group_id)?.folded = folded;
    Ok(())
}

/// Toggles `hide_empty`. Turning it on auto-hides every visible group that
/// rendered no items in `rendered`; turning it off restores every group that
/// was not hidden by hand.
pub fn hide_empty_groups(view: &mut View, rendered: &Viewable, hide: bool) -> Result<(), OpError> {
    let spec = view.group.as_mut().ok_or_else(|| OpError::NotGrouped(view.id.clone()))?;
    spec.hide_empty = hide;

    if hide {
        for child in rendered.groups() {
            if child.item_count() > 0 {
                continue;
            }
            if let Some(record) = view.group_record_mut(&child.header().id) {
                if record.hidden == GroupHidden::Visible {
                    record.hidden = GroupHidden::AutoHidden;
                }
            }
        }
    } else {
        for record in &mut view.groups {
            record.hidden = next_hidden_state(record.hidden, false, 0);
        }
    }
    Ok(())
}

fn grouped_record<'v>(view: &'v mut View, group_id: &str) -> Result<&'v mut attrview::GroupRecord, OpError> {
    if view.group.is_none() {
        return Err(OpError::NotGrouped(view.id.clone()));
    }
    view.group_record_mut(group_id)
        .ok_or_else(|| OpError::GroupNotFound(group_id.to_string()))
}
