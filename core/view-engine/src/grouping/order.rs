//! FILENAME: core/view-engine/src/grouping/order.rs
//! Group ordering policies.
//!
//! - Manual: persisted `sort`.
//! - Select-option: position in the key's option list.
//! - Ascending / Descending: natural order of the group value.
//! - Date-relative: months around a fixed block of relative buckets.
//!
//! The `default` group always closes a non-manual ordering.

use std::cmp::Ordering;

use attrview::{GroupMethod, GroupOrder, GroupRecord, GroupValue, Key, Sentinel};
use chrono::NaiveDate;

use crate::compare::natural_cmp;

/// Puts `records` into display order. Returns whether the ordering was
/// computed (anything but manual), in which case the caller writes the
/// positions back into `sort`.
pub fn order_groups(
    records: &mut Vec<GroupRecord>,
    method: GroupMethod,
    order: GroupOrder,
    key: &Key,
    today: NaiveDate,
) -> bool {
    // Baseline: persisted manual order.
    records.sort_by_key(|r| r.sort);

    if method == GroupMethod::DateRelative {
        order_relative(records, order, today);
        return true;
    }

    match order {
        GroupOrder::Manual => false,
        GroupOrder::SelectOption => {
            if !key.key_type.is_choice() {
                return false;
            }
            with_sentinels_last(records, |list| {
                // Unknown options keep their relative order after known ones.
                list.sort_by_key(|r| match &r.value {
                    GroupValue::Data(name) => key.option_index(name).unwrap_or(usize::MAX),
                    GroupValue::Sentinel(_) => usize::MAX,
                });
            });
            true
        }
        GroupOrder::Ascending | GroupOrder::Descending => {
            with_sentinels_last(records, |list| {
                list.sort_by(|a, b| natural_cmp(a.value.as_wire(), b.value.as_wire()));
                if order == GroupOrder::Descending {
                    list.reverse();
                }
            });
            true
        }
    }
}

/// Removes `not-in-range` and `default`, orders the rest, then appends
/// `not-in-range` followed by `default`.
fn with_sentinels_last(records: &mut Vec<GroupRecord>, order: impl FnOnce(&mut Vec<GroupRecord>)) {
    let (mut tail, mut body): (Vec<GroupRecord>, Vec<GroupRecord>) = std::mem::take(records)
        .into_iter()
        .partition(|r| matches!(r.value.sentinel(), Some(Sentinel::Default | Sentinel::NotInRange)));
    order(&mut body);
    tail.sort_by_key(|r| r.value.is_default());
    body.append(&mut tail);
    *records = body;
}

fn order_relative(records: &mut Vec<GroupRecord>, order: GroupOrder, today: NaiveDate) {
    let mut months = Vec::new();
    let mut relative = Vec::new();
    let mut tail = Vec::new();
    for record in std::mem::take(records) {
        match record.value.sentinel() {
            Some(s) if s.is_relative() => relative.push(record),
            Some(_) => tail.push(record),
            None => months.push(record),
        }
    }

    months.sort_by(|a, b| a.value.as_wire().cmp(b.value.as_wire()));
    relative.sort_by_key(|r| {
        Sentinel::RELATIVE_ORDER
            .iter()
            .position(|s| Some(*s) == r.value.sentinel())
            .unwrap_or(usize::MAX)
    });

    // The relative block sits after the last month before the current one.
    let current = today.format("%Y-%m").to_string();
    let insert_at = months
        .iter()
        .filter(|m| m.value.as_wire().cmp(current.as_str()) == Ordering::Less)
        .count();

    let mut sequence: Vec<GroupRecord> = months.drain(..insert_at).collect();
    sequence.extend(relative);
    sequence.extend(months);
    if order == GroupOrder::Descending {
        sequence.reverse();
    }

    tail.sort_by_key(|r| r.value.is_default());
    sequence.extend(tail);
    *records = sequence;
}
