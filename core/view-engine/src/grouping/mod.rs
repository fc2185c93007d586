//! FILENAME: core/view-engine/src/grouping/mod.rs
//! Grouping engine.
//!
//! Resolves the grouping key, decides whether the persisted group records are
//! stale, regenerates them by merging, resolves display names and orders
//! them. The result is a fresh record list with per-group member rows; the
//! caller writes it back into the view.

pub mod bucket;
pub mod order;

use attrview::{GroupMethod, GroupOrder, GroupRecord, GroupValue, Key, View, ViewGroup};
use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;

use crate::compare::natural_cmp;
use crate::config::RenderContext;
use crate::error::GroupingUnavailable;
use crate::index::{RowIndex, RowPos};
use crate::locale::{sentinel_name, Localizer};

pub use bucket::{bucket_values, effective_method, RowBuckets};
pub use order::order_groups;

/// Result of grouping one view.
#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    /// Spec in effect; differs from the view's when a kanban fallback key
    /// was installed.
    pub spec: ViewGroup,
    /// Records in display order.
    pub groups: Vec<GroupRecord>,
    /// Member rows per group (store order), parallel to `groups`.
    pub members: Vec<Vec<RowPos>>,
    /// Display names, parallel to `groups`.
    pub names: Vec<String>,
    pub group_created: i64,
    pub group_key_id: String,
    /// Whether the view's grouping state differs from what it persisted.
    pub changed: bool,
}

/// Groups the view's rows. `None` means the view renders ungrouped.
pub fn render_groups(
    view: &View,
    index: &RowIndex<'_>,
    localizer: &dyn Localizer,
    ctx: &RenderContext,
) -> Option<GroupingOutcome> {
    let (spec, key, installed) = match resolve_group_key(view, index) {
        Ok(Some(resolved)) => resolved,
        Ok(None) => return None,
        Err(reason) => {
            warn!("[AV] grouping unavailable view={} reason={}", view.id, reason);
            return None;
        }
    };
    let method = effective_method(&spec, key);

    // Bucket every row once.
    let mut members: FxHashMap<GroupValue, Vec<RowPos>> = FxHashMap::default();
    for pos in 0..index.row_count() {
        let data = index.value(&key.id, pos).map(|v| &v.data);
        for value in bucket_values(method, spec.range, data, ctx) {
            members.entry(value).or_default().push(pos);
        }
    }

    let key_changed = matches!(&view.group_key_id, Some(id) if *id != key.id);
    let mut groups = if key_changed { Vec::new() } else { view.groups.clone() };
    let mut group_created = view.group_created;
    let mut changed = installed;

    if needs_regeneration(view, &groups, &members, method, key, ctx) {
        debug!(
            "[AV] regenerating groups view={} key={} previous={}",
            view.id,
            key.id,
            groups.len()
        );
        groups = merge_records(groups, &members, key);
        group_created = ctx.now_millis();
        changed = true;
    }

    if order_groups(&mut groups, method, spec.order, key, ctx.today()) {
        for (position, record) in groups.iter_mut().enumerate() {
            let position = position as i64;
            if record.sort != position {
                record.sort = position;
                changed = true;
            }
        }
    }

    let names = groups.iter().map(|r| display_name(&r.value, key, localizer)).collect();
    let members = groups
        .iter()
        .map(|r| members.get(&r.value).cloned().unwrap_or_default())
        .collect();

    Some(GroupingOutcome {
        spec,
        groups,
        members,
        names,
        group_created,
        group_key_id: key.id.clone(),
        changed,
    })
}

/// Spec and key to group by, and whether the spec was newly installed.
fn resolve_group_key<'a>(
    view: &View,
    index: &RowIndex<'a>,
) -> Result<Option<(ViewGroup, &'a Key, bool)>, GroupingUnavailable> {
    let kanban = view.layout == attrview::LayoutType::Kanban;
    match &view.group {
        Some(spec) => {
            if let Some(key) = index.key(&spec.field) {
                return Ok(Some((spec.clone(), key, false)));
            }
            if !kanban {
                return Err(GroupingUnavailable::MissingKey(spec.field.clone()));
            }
        }
        None if !kanban => return Ok(None),
        None => {}
    }

    // Kanban always groups: fall back to the first choice key.
    let key = index
        .keys()
        .find(|k| k.key_type.is_choice())
        .ok_or(GroupingUnavailable::NoPreferredKey)?;
    let mut spec = ViewGroup::new(key.id.clone(), GroupMethod::Value, GroupOrder::SelectOption);
    if let Some(previous) = &view.group {
        spec.hide_empty = previous.hide_empty;
    }
    debug!("[AV] installed kanban group key view={} key={}", view.id, key.id);
    Ok(Some((spec, key, true)))
}

fn needs_regeneration(
    view: &View,
    groups: &[GroupRecord],
    members: &FxHashMap<GroupValue, Vec<RowPos>>,
    method: GroupMethod,
    key: &Key,
    ctx: &RenderContext,
) -> bool {
    if groups.is_empty() || view.group_key_id.as_deref() != Some(key.id.as_str()) {
        return true;
    }
    if method.is_date_bucket() && ctx.date_of(view.group_created) != Some(ctx.today()) {
        return true;
    }
    if method == GroupMethod::Template {
        return true;
    }

    let recorded: FxHashSet<&GroupValue> = groups.iter().map(|r| &r.value).collect();
    let stale = recorded.len() != members.len() || members.keys().any(|v| !recorded.contains(v));
    if stale {
        debug!("[AV] stale group values view={}", view.id);
    }
    stale
}

/// Keeps records whose value still has rows, appends new values after the
/// current maximum `sort` and drops the rest.
fn merge_records(
    previous: Vec<GroupRecord>,
    members: &FxHashMap<GroupValue, Vec<RowPos>>,
    key: &Key,
) -> Vec<GroupRecord> {
    let mut seen: FxHashSet<GroupValue> = FxHashSet::default();
    let mut records: Vec<GroupRecord> = previous
        .into_iter()
        .filter(|r| members.contains_key(&r.value) && seen.insert(r.value.clone()))
        .collect();

    let mut fresh: Vec<&GroupValue> = members.keys().filter(|v| !seen.contains(*v)).collect();
    fresh.sort_by(|a, b| {
        a.is_default()
            .cmp(&b.is_default())
            .then_with(|| option_rank(key, a).cmp(&option_rank(key, b)))
            .then_with(|| natural_cmp(a.as_wire(), b.as_wire()))
    });

    let mut next_sort = records.iter().map(|r| r.sort).max().map_or(0, |max| max + 1);
    for value in fresh {
        records.push(GroupRecord::new(Uuid::new_v4().to_string(), value.clone(), next_sort));
        next_sort += 1;
    }
    records
}

fn option_rank(key: &Key, value: &GroupValue) -> usize {
    match value {
        GroupValue::Data(name) => key.option_index(name).unwrap_or(usize::MAX),
        GroupValue::Sentinel(_) => usize::MAX,
    }
}

fn display_name(value: &GroupValue, key: &Key, localizer: &dyn Localizer) -> String {
    match value {
        GroupValue::Sentinel(sentinel) => sentinel_name(*sentinel, &key.name, localizer),
        GroupValue::Data(data) => data.clone(),
    }
}
