//! FILENAME: core/view-engine/src/render.rs
//! Render entry point.
//!
//! Orchestrates: view resolution -> filter -> sort -> calc -> grouping ->
//! materialization -> pagination -> empty-group visibility. The caller owns
//! the attribute view and persists it when `needs_save` is set.

use std::collections::HashMap;

use attrview::{AttributeView, LayoutType, View};
use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RenderContext;
use crate::error::RenderError;
use crate::grouping::render_groups;
use crate::index::{RowIndex, RowPos};
use crate::locale::{Localizer, TEXT_VIEW_TABLE};
use crate::materialize::materialize;
use crate::paging::{paginate, PageRequest};
use crate::stage::QueryStage;
use crate::viewable::Viewable;
use crate::visibility::next_hidden_state;

/// Parameters of one render call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// View to render; falls back to the last used view, then the first.
    #[serde(default)]
    pub view_id: Option<String>,
    /// Free-text query applied before the view's filters.
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub page: PageRequest,
    /// Per-group page overrides keyed by group ID.
    #[serde(default)]
    pub group_pages: HashMap<String, PageRequest>,
}

impl RenderRequest {
    pub fn for_view(view_id: impl Into<String>) -> Self {
        RenderRequest {
            view_id: Some(view_id.into()),
            ..RenderRequest::default()
        }
    }
}

/// Result of a render call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutput {
    pub viewable: Viewable,
    pub view_id: String,
    /// The attribute view changed (view definition, last used view or group
    /// state) and should be persisted.
    pub needs_save: bool,
}

/// Renders one view of `av`.
pub fn render_attribute_view(
    av: &mut AttributeView,
    request: &RenderRequest,
    stage: &dyn QueryStage,
    localizer: &dyn Localizer,
    ctx: &RenderContext,
) -> Result<RenderOutput, RenderError> {
    let mut needs_save = false;
    let view_id = resolve_view(av, request.view_id.as_deref(), localizer, &mut needs_save)?;

    let original = av
        .view(&view_id)
        .cloned()
        .ok_or_else(|| RenderError::ViewNotFound(av.id.clone()))?;
    let mut view = original.clone();

    let viewable = {
        let index = RowIndex::new(av);
        render_view(&mut view, &index, request, stage, localizer, ctx)?
    };

    if view != original {
        if let Some(slot) = av.view_mut(&view_id) {
            *slot = view;
        }
        needs_save = true;
    }

    debug!(
        "[AV] rendered av={} view={} items={} groups={} needs_save={}",
        av.id,
        view_id,
        viewable.item_count(),
        viewable.groups().len(),
        needs_save
    );

    Ok(RenderOutput {
        viewable,
        view_id,
        needs_save,
    })
}

/// Picks the view to render: the requested one, the last used one, the
/// first one, or a freshly constructed table over all keys.
fn resolve_view(
    av: &mut AttributeView,
    requested: Option<&str>,
    localizer: &dyn Localizer,
    needs_save: &mut bool,
) -> Result<String, RenderError> {
    let found = requested
        .filter(|id| av.view(id).is_some())
        .or_else(|| Some(av.view_id.as_str()).filter(|id| av.view(id).is_some()))
        .map(str::to_string)
        .or_else(|| av.views.first().map(|v| v.id.clone()));

    let view_id = match found {
        Some(id) => id,
        None => {
            if av.primary_key().is_none() {
                return Err(RenderError::ViewNotFound(av.id.clone()));
            }
            let view = View::new(
                Uuid::new_v4().to_string(),
                localizer.text(TEXT_VIEW_TABLE, &[]),
                LayoutType::Table,
            )
            .with_all_fields(av.keys());
            info!("[AV] created default view av={} view={}", av.id, view.id);
            let id = view.id.clone();
            av.views.push(view);
            *needs_save = true;
            id
        }
    };

    if av.view_id != view_id {
        av.view_id = view_id.clone();
        *needs_save = true;
    }
    Ok(view_id)
}

fn render_view(
    view: &mut View,
    index: &RowIndex<'_>,
    request: &RenderRequest,
    stage: &dyn QueryStage,
    localizer: &dyn Localizer,
    ctx: &RenderContext,
) -> Result<Viewable, RenderError> {
    let default_page_size = ctx.config.default_page_size;

    let mut rows = stage.filter(index, view, &request.query, index.all_rows())?;
    stage.sort(index, view, &mut rows)?;
    let calcs = stage.calc(index, view, &rows)?;
    let mut root = materialize(view.layout, view, index, &rows, calcs);

    if let Some(outcome) = render_groups(view, index, localizer, ctx) {
        view.group = Some(outcome.spec.clone());
        view.groups = outcome.groups;
        view.group_created = outcome.group_created;
        view.group_key_id = Some(outcome.group_key_id);

        // Group members in the filtered, sorted order.
        let rank: FxHashMap<RowPos, usize> = rows.iter().enumerate().map(|(i, &pos)| (pos, i)).collect();
        let mut children = Vec::with_capacity(view.groups.len());
        for (i, members) in outcome.members.into_iter().enumerate() {
            let mut visible: Vec<RowPos> = members.into_iter().filter(|pos| rank.contains_key(pos)).collect();
            visible.sort_by_key(|pos| rank[pos]);

            let calcs = stage.calc(index, view, &visible)?;
            let mut child = materialize(view.layout, view, index, &visible, calcs);
            let record = &view.groups[i];
            let group_request = request.group_pages.get(&record.id).unwrap_or(&request.page);
            paginate(&mut child, group_request, view.page_size, default_page_size);

            let item_count = child.item_count();
            let header = child.header_mut();
            header.id = record.id.clone();
            header.name = outcome.names[i].clone();
            header.icon = String::new();
            header.group_value = Some(record.value.clone());
            header.group_sort = record.sort;
            header.group_folded = record.folded;
            header.group_hidden = next_hidden_state(record.hidden, outcome.spec.hide_empty, item_count);

            if ctx.config.strip_group_fields {
                child.strip_fields();
            }
            children.push(child);
        }

        for (record, child) in view.groups.iter_mut().zip(&children) {
            record.hidden = child.header().group_hidden;
        }
        let header = root.header_mut();
        header.group = Some(outcome.spec);
        header.groups = children;
    }

    paginate(&mut root, &request.page, view.page_size, default_page_size);
    Ok(root)
}
