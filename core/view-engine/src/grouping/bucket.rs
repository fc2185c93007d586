//! FILENAME: core/view-engine/src/grouping/bucket.rs
//! Bucket assignment: which group values a single cell belongs to.

use attrview::{
    format_number, GroupMethod, GroupRange, GroupValue, Key, KeyType, Sentinel, ValueData, ViewGroup,
};
use chrono::{Datelike, Duration, NaiveDate};
use smallvec::{smallvec, SmallVec};

use crate::config::RenderContext;

/// Group values of one row. Almost always a single entry; choice and
/// relation cells may produce several.
pub type RowBuckets = SmallVec<[GroupValue; 2]>;

pub const CHECKED: &str = "checked";
pub const UNCHECKED: &str = "unchecked";

/// The method actually applied to `key`. Date methods on non-date keys and
/// ranges on non-number keys fall back to direct values; template keys
/// always group by their output.
pub fn effective_method(spec: &ViewGroup, key: &Key) -> GroupMethod {
    match spec.method {
        _ if key.key_type == KeyType::Template => GroupMethod::Template,
        GroupMethod::RangeNum if !key.key_type.is_numeric() => GroupMethod::Value,
        method if method.is_date_bucket() && !key.key_type.is_date_like() => GroupMethod::Value,
        GroupMethod::Template => GroupMethod::Value,
        method => method,
    }
}

/// Computes the buckets of one cell. A missing cell counts as empty.
pub fn bucket_values(
    method: GroupMethod,
    range: Option<GroupRange>,
    data: Option<&ValueData>,
    ctx: &RenderContext,
) -> RowBuckets {
    let Some(data) = data else {
        return smallvec![GroupValue::Sentinel(Sentinel::Default)];
    };
    if let ValueData::Checkbox { checked } = data {
        let label = if *checked { CHECKED } else { UNCHECKED };
        return smallvec![GroupValue::data(label)];
    }
    if data.is_empty() {
        return smallvec![GroupValue::Sentinel(Sentinel::Default)];
    }

    let buckets: RowBuckets = match method {
        GroupMethod::RangeNum => match data.number() {
            Some(n) => smallvec![range_bucket(n, range.unwrap_or_default())],
            None => RowBuckets::new(),
        },
        GroupMethod::DateDay
        | GroupMethod::DateWeek
        | GroupMethod::DateMonth
        | GroupMethod::DateYear
        | GroupMethod::DateRelative => match data.date_millis().and_then(|ms| ctx.date_of(ms)) {
            Some(date) => smallvec![date_bucket(method, date, ctx.today())],
            None => RowBuckets::new(),
        },
        GroupMethod::Value | GroupMethod::Template => value_buckets(data, ctx),
    };

    if buckets.is_empty() {
        smallvec![GroupValue::Sentinel(Sentinel::Default)]
    } else {
        buckets
    }
}

fn value_buckets(data: &ValueData, ctx: &RenderContext) -> RowBuckets {
    let mut buckets = RowBuckets::new();
    let mut push = |label: &str| {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let value = GroupValue::data(label);
        if !buckets.contains(&value) {
            buckets.push(value);
        }
    };

    match data {
        ValueData::Select { items } | ValueData::MSelect { items } => {
            for item in items {
                push(item);
            }
        }
        ValueData::Relation { block_ids, contents } => {
            for (i, id) in block_ids.iter().enumerate() {
                match contents.get(i).filter(|c| !c.trim().is_empty()) {
                    Some(content) => push(content),
                    None => push(id),
                }
            }
        }
        other => match other.date_millis().and_then(|ms| ctx.date_of(ms)) {
            // Dates grouped by value group by calendar day.
            Some(date) => push(&date.format("%Y-%m-%d").to_string()),
            None => push(&other.display_text()),
        },
    }
    buckets
}

/// `[start + k*step, start + (k+1)*step)` labelled `"lo - hi"`.
fn range_bucket(n: f64, range: GroupRange) -> GroupValue {
    if range.step <= 0.0 || n < range.start || n >= range.end {
        return Sentinel::NotInRange.into();
    }
    let k = ((n - range.start) / range.step).floor();
    let lo = range.start + k * range.step;
    let hi = lo + range.step;
    GroupValue::data(format!("{} - {}", format_number(lo), format_number(hi)))
}

fn date_bucket(method: GroupMethod, date: NaiveDate, today: NaiveDate) -> GroupValue {
    match method {
        GroupMethod::DateWeek => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            GroupValue::data(monday.format("%Y-%m-%d").to_string())
        }
        GroupMethod::DateMonth => GroupValue::data(date.format("%Y-%m").to_string()),
        GroupMethod::DateYear => GroupValue::data(date.format("%Y").to_string()),
        GroupMethod::DateRelative => relative_bucket(date, today),
        _ => GroupValue::data(date.format("%Y-%m-%d").to_string()),
    }
}

fn relative_bucket(date: NaiveDate, today: NaiveDate) -> GroupValue {
    let days = (date - today).num_days();
    let sentinel = match days {
        0 => Sentinel::Today,
        -1 => Sentinel::Yesterday,
        1 => Sentinel::Tomorrow,
        -7..=-2 => Sentinel::Last7Days,
        2..=7 => Sentinel::Next7Days,
        -30..=-8 => Sentinel::Last30Days,
        8..=30 => Sentinel::Next30Days,
        _ => return GroupValue::data(date.format("%Y-%m").to_string()),
    };
    sentinel.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use attrview::GroupOrder;
    use chrono::DateTime;

    fn ctx() -> RenderContext {
        let now = DateTime::parse_from_rfc3339("2024-06-15T12:00:00+00:00").unwrap();
        RenderContext::new(now, EngineConfig::default())
    }

    fn date(ymd: &str) -> ValueData {
        let ms = DateTime::parse_from_rfc3339(&format!("{}T09:00:00+00:00", ymd))
            .unwrap()
            .timestamp_millis();
        ValueData::Date { content: ms, is_not_empty: true, has_end_date: false, content2: 0 }
    }

    #[test]
    fn test_empty_and_missing_go_to_default() {
        let ctx = ctx();
        let default = GroupValue::Sentinel(Sentinel::Default);
        assert_eq!(bucket_values(GroupMethod::Value, None, None, &ctx).as_slice(), &[default.clone()]);
        let empty = ValueData::Select { items: vec![] };
        assert_eq!(bucket_values(GroupMethod::Value, None, Some(&empty), &ctx).as_slice(), &[default]);
    }

    #[test]
    fn test_multi_select_places_row_in_each_option() {
        let data = ValueData::MSelect { items: vec!["a".into(), "b".into(), "a".into()] };
        let buckets = bucket_values(GroupMethod::Value, None, Some(&data), &ctx());
        assert_eq!(buckets.as_slice(), &[GroupValue::data("a"), GroupValue::data("b")]);
    }

    #[test]
    fn test_checkbox_never_defaults() {
        let data = ValueData::Checkbox { checked: false };
        let buckets = bucket_values(GroupMethod::Value, None, Some(&data), &ctx());
        assert_eq!(buckets.as_slice(), &[GroupValue::data(UNCHECKED)]);
    }

    #[test]
    fn test_number_ranges() {
        let range = Some(GroupRange { start: 0.0, end: 100.0, step: 25.0 });
        let n = |x: f64| ValueData::Number { content: x, is_not_empty: true };
        let ctx = ctx();
        assert_eq!(bucket_values(GroupMethod::RangeNum, range, Some(&n(30.0)), &ctx)[0], GroupValue::data("25 - 50"));
        assert_eq!(bucket_values(GroupMethod::RangeNum, range, Some(&n(0.0)), &ctx)[0], GroupValue::data("0 - 25"));
        assert_eq!(
            bucket_values(GroupMethod::RangeNum, range, Some(&n(100.0)), &ctx)[0],
            GroupValue::Sentinel(Sentinel::NotInRange)
        );
    }

    #[test]
    fn test_calendar_buckets() {
        let ctx = ctx();
        // 2024-06-13 is a Thursday.
        let d = date("2024-06-13");
        assert_eq!(bucket_values(GroupMethod::DateDay, None, Some(&d), &ctx)[0], GroupValue::data("2024-06-13"));
        assert_eq!(bucket_values(GroupMethod::DateWeek, None, Some(&d), &ctx)[0], GroupValue::data("2024-06-10"));
        assert_eq!(bucket_values(GroupMethod::DateMonth, None, Some(&d), &ctx)[0], GroupValue::data("2024-06"));
        assert_eq!(bucket_values(GroupMethod::DateYear, None, Some(&d), &ctx)[0], GroupValue::data("2024"));
    }

    #[test]
    fn test_relative_thresholds() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let at = |offset: i64| relative_bucket(today + Duration::days(offset), today);
        assert_eq!(at(0), GroupValue::from(Sentinel::Today));
        assert_eq!(at(-1), GroupValue::from(Sentinel::Yesterday));
        assert_eq!(at(1), GroupValue::from(Sentinel::Tomorrow));
        assert_eq!(at(-7), GroupValue::from(Sentinel::Last7Days));
        assert_eq!(at(7), GroupValue::from(Sentinel::Next7Days));
        assert_eq!(at(-8), GroupValue::from(Sentinel::Last30Days));
        assert_eq!(at(30), GroupValue::from(Sentinel::Next30Days));
        assert_eq!(at(31), GroupValue::data("2024-07"));
        assert_eq!(at(-40), GroupValue::data("2024-05"));
    }

    #[test]
    fn test_method_degrades_for_incompatible_keys() {
        let text = Key::new("t", "Title", KeyType::Text);
        let spec = ViewGroup::new("t", GroupMethod::DateMonth, GroupOrder::Ascending);
        assert_eq!(effective_method(&spec, &text), GroupMethod::Value);

        let spec = ViewGroup::new("t", GroupMethod::RangeNum, GroupOrder::Ascending);
        assert_eq!(effective_method(&spec, &text), GroupMethod::Value);

        let template = Key::new("tpl", "Computed", KeyType::Template);
        let spec = ViewGroup::new("tpl", GroupMethod::Value, GroupOrder::Manual);
        assert_eq!(effective_method(&spec, &template), GroupMethod::Template);
    }
}
