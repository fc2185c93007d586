//! FILENAME: core/view-engine/src/stage.rs
//! Filter / Sort / Calc stage.
//!
//! The engine orchestrates the stage in a fixed order (filter -> sort ->
//! calc) but does not implement the primitives itself; the host plugs in
//! its index through `QueryStage`. `MemoryQueryStage` evaluates everything
//! directly over the `RowIndex` and is what the engine uses when no index
//! is available.

use std::cmp::Ordering;

use attrview::{
    CalcOperator, FilterOperand, FilterOperator, Key, SortDirection, ValueData, View, ViewFilter,
};
use rustc_hash::FxHashSet;

use crate::compare::{compare_values, natural_cmp};
use crate::error::StageError;
use crate::index::{RowIndex, RowPos};
use crate::viewable::{CalcResult, CalcValue};

const DAY_MILLIS: i64 = 86_400_000;

/// The filter/sort/calc primitives the engine orchestrates.
pub trait QueryStage: Send + Sync {
    /// Keeps the rows matching the view's filters and the free-text query.
    fn filter(
        &self,
        index: &RowIndex<'_>,
        view: &View,
        query: &str,
        rows: Vec<RowPos>,
    ) -> Result<Vec<RowPos>, StageError>;

    /// Orders rows by the view's sorts. Must be stable.
    fn sort(&self, index: &RowIndex<'_>, view: &View, rows: &mut [RowPos]) -> Result<(), StageError>;

    /// Computes the configured field aggregations over `rows`.
    fn calc(&self, index: &RowIndex<'_>, view: &View, rows: &[RowPos]) -> Result<Vec<CalcResult>, StageError>;
}

/// In-memory reference implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryQueryStage;

impl QueryStage for MemoryQueryStage {
    fn filter(
        &self,
        index: &RowIndex<'_>,
        view: &View,
        query: &str,
        rows: Vec<RowPos>,
    ) -> Result<Vec<RowPos>, StageError> {
        let query = query.trim().to_lowercase();
        let filters: Vec<(&ViewFilter, &Key)> = view
            .filters
            .iter()
            .filter_map(|f| index.key(&f.key_id).map(|k| (f, k)))
            .collect();

        Ok(rows
            .into_iter()
            .filter(|&pos| query.is_empty() || row_matches_query(index, pos, &query))
            .filter(|&pos| {
                filters.iter().all(|(filter, key)| {
                    let data = index
                        .value(&key.id, pos)
                        .map(|v| v.data.clone())
                        .unwrap_or_else(|| ValueData::empty(key.key_type));
                    filter_matches(filter, &data)
                })
            })
            .collect())
    }

    fn sort(&self, index: &RowIndex<'_>, view: &View, rows: &mut [RowPos]) -> Result<(), StageError> {
        let sorts: Vec<(&Key, SortDirection)> = view
            .sorts
            .iter()
            .filter_map(|s| index.key(&s.key_id).map(|k| (k, s.order)))
            .collect();
        if sorts.is_empty() {
            return Ok(());
        }

        rows.sort_by(|&a, &b| {
            for (key, direction) in &sorts {
                let va = index.value(&key.id, a).map(|v| &v.data).filter(|d| !d.is_empty());
                let vb = index.value(&key.id, b).map(|v| &v.data).filter(|d| !d.is_empty());
                // Empty cells go last in both directions.
                let ord = match (va, vb) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(x), Some(y)) => match direction {
                        SortDirection::Asc => compare_values(x, y),
                        SortDirection::Desc => compare_values(y, x),
                    },
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        Ok(())
    }

    fn calc(&self, index: &RowIndex<'_>, view: &View, rows: &[RowPos]) -> Result<Vec<CalcResult>, StageError> {
        let mut results = Vec::new();
        for field in &view.fields {
            let (Some(operator), Some(key)) = (field.calc, index.key(&field.key_id)) else {
                continue;
            };
            let cells: Vec<ValueData> = rows
                .iter()
                .map(|&pos| {
                    index
                        .value(&key.id, pos)
                        .map(|v| v.data.clone())
                        .unwrap_or_else(|| ValueData::empty(key.key_type))
                })
                .collect();
            results.push(CalcResult {
                key_id: key.id.clone(),
                operator,
                value: calculate(operator, &cells),
            });
        }
        Ok(results)
    }
}

// ============================================================================
// FILTERING
// ============================================================================

fn row_matches_query(index: &RowIndex<'_>, pos: RowPos, query: &str) -> bool {
    index.keys().any(|key| {
        index
            .value(&key.id, pos)
            .map(|v| v.data.display_text().to_lowercase().contains(query))
            .unwrap_or(false)
    })
}

/// Texts a filter compares against: each option of a choice cell, or the
/// display text.
fn comparable_texts(data: &ValueData) -> Vec<String> {
    match data {
        ValueData::Select { items } | ValueData::MSelect { items } => {
            items.iter().map(|i| i.to_lowercase()).collect()
        }
        other => vec![other.display_text().to_lowercase()],
    }
}

fn filter_matches(filter: &ViewFilter, data: &ValueData) -> bool {
    match filter.operator {
        FilterOperator::IsEmpty => return data.is_empty(),
        FilterOperator::IsNotEmpty => return !data.is_empty(),
        FilterOperator::IsTrue => return matches!(data, ValueData::Checkbox { checked: true }),
        FilterOperator::IsFalse => return !matches!(data, ValueData::Checkbox { checked: true }),
        _ => {}
    }
    let Some(operand) = &filter.operand else {
        // Incomplete filters do not restrict anything.
        return true;
    };

    match filter.operator {
        FilterOperator::IsEqual => is_equal(data, operand),
        FilterOperator::IsNotEqual => !is_equal(data, operand),
        FilterOperator::Contains => text_test(data, operand, |t, o| t.contains(o)),
        FilterOperator::DoesNotContain => !text_test(data, operand, |t, o| t.contains(o)),
        FilterOperator::StartsWith => text_test(data, operand, |t, o| t.starts_with(o)),
        FilterOperator::EndsWith => text_test(data, operand, |t, o| t.ends_with(o)),
        FilterOperator::IsGreater => compare_to(data, operand).map_or(false, |o| o == Ordering::Greater),
        FilterOperator::IsGreaterOrEqual => compare_to(data, operand).map_or(false, |o| o != Ordering::Less),
        FilterOperator::IsLess => compare_to(data, operand).map_or(false, |o| o == Ordering::Less),
        FilterOperator::IsLessOrEqual => compare_to(data, operand).map_or(false, |o| o != Ordering::Greater),
        FilterOperator::IsEmpty | FilterOperator::IsNotEmpty | FilterOperator::IsTrue | FilterOperator::IsFalse => true,
    }
}

fn operand_text(operand: &FilterOperand) -> String {
    match operand {
        FilterOperand::Text(t) => t.to_lowercase(),
        FilterOperand::Number(n) => attrview::format_number(*n),
        FilterOperand::Date(ms) => ms.to_string(),
        FilterOperand::Bool(b) => b.to_string(),
    }
}

fn is_equal(data: &ValueData, operand: &FilterOperand) -> bool {
    match operand {
        FilterOperand::Number(n) => data.number() == Some(*n),
        FilterOperand::Date(ms) => data
            .date_millis()
            .map_or(false, |d| d.div_euclid(DAY_MILLIS) == ms.div_euclid(DAY_MILLIS)),
        FilterOperand::Bool(b) => matches!(data, ValueData::Checkbox { checked } if checked == b),
        FilterOperand::Text(_) => {
            let wanted = operand_text(operand);
            comparable_texts(data).iter().any(|t| *t == wanted)
        }
    }
}

fn text_test(data: &ValueData, operand: &FilterOperand, test: impl Fn(&str, &str) -> bool) -> bool {
    let wanted = operand_text(operand);
    comparable_texts(data).iter().any(|t| test(t, &wanted))
}

fn compare_to(data: &ValueData, operand: &FilterOperand) -> Option<Ordering> {
    if data.is_empty() {
        return None;
    }
    match operand {
        FilterOperand::Number(n) => data.number().and_then(|x| x.partial_cmp(n)),
        FilterOperand::Date(ms) => data.date_millis().map(|d| d.cmp(ms)),
        FilterOperand::Text(t) => Some(natural_cmp(&data.display_text(), t)),
        FilterOperand::Bool(_) => None,
    }
}

// ============================================================================
// CALCS
// ============================================================================

fn calculate(operator: CalcOperator, cells: &[ValueData]) -> CalcValue {
    let total = cells.len();
    let empty = cells.iter().filter(|c| c.is_empty()).count();
    let numbers = || -> Vec<f64> {
        cells
            .iter()
            .filter_map(|c| c.number().or_else(|| c.date_millis().map(|d| d as f64)))
            .collect()
    };
    let ratio = |part: usize| {
        if total == 0 {
            CalcValue::Empty
        } else {
            CalcValue::Number(part as f64 / total as f64)
        }
    };

    match operator {
        CalcOperator::CountAll => CalcValue::Number(total as f64),
        CalcOperator::CountValues => CalcValue::Number(
            cells
                .iter()
                .filter(|c| !c.is_empty())
                .map(|c| match c {
                    ValueData::Select { items } | ValueData::MSelect { items } => items.len(),
                    _ => 1,
                })
                .sum::<usize>() as f64,
        ),
        CalcOperator::CountUniqueValues => {
            let mut unique: FxHashSet<String> = FxHashSet::default();
            for cell in cells.iter().filter(|c| !c.is_empty()) {
                match cell {
                    ValueData::Select { items } | ValueData::MSelect { items } => {
                        unique.extend(items.iter().cloned());
                    }
                    other => {
                        unique.insert(other.display_text());
                    }
                }
            }
            CalcValue::Number(unique.len() as f64)
        }
        CalcOperator::CountEmpty => CalcValue::Number(empty as f64),
        CalcOperator::CountNotEmpty => CalcValue::Number((total - empty) as f64),
        CalcOperator::PercentEmpty => ratio(empty),
        CalcOperator::PercentNotEmpty => ratio(total - empty),
        CalcOperator::Checked | CalcOperator::Unchecked | CalcOperator::PercentChecked => {
            let checked = cells
                .iter()
                .filter(|c| matches!(c, ValueData::Checkbox { checked: true }))
                .count();
            match operator {
                CalcOperator::Checked => CalcValue::Number(checked as f64),
                CalcOperator::Unchecked => CalcValue::Number((total - checked) as f64),
                _ => ratio(checked),
            }
        }
        CalcOperator::Sum => CalcValue::Number(numbers().iter().sum()),
        CalcOperator::Average => {
            let values = numbers();
            if values.is_empty() {
                CalcValue::Empty
            } else {
                CalcValue::Number(values.iter().sum::<f64>() / values.len() as f64)
            }
        }
        CalcOperator::Median => {
            let mut values = numbers();
            if values.is_empty() {
                return CalcValue::Empty;
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                CalcValue::Number((values[mid - 1] + values[mid]) / 2.0)
            } else {
                CalcValue::Number(values[mid])
            }
        }
        CalcOperator::Min | CalcOperator::Max | CalcOperator::Range => {
            let values = numbers();
            let min = values.iter().copied().reduce(f64::min);
            let max = values.iter().copied().reduce(f64::max);
            match (operator, min, max) {
                (CalcOperator::Min, Some(min), _) => CalcValue::Number(min),
                (CalcOperator::Max, _, Some(max)) => CalcValue::Number(max),
                (CalcOperator::Range, Some(min), Some(max)) => CalcValue::Number(max - min),
                _ => CalcValue::Empty,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrview::{AttributeView, KeyType, ViewField, ViewSort};

    fn fixture() -> AttributeView {
        let mut av = AttributeView::new("av", "Tasks");
        av.add_key(Key::new("name", "Name", KeyType::Block));
        av.add_key(Key::new("pts", "Points", KeyType::Number));
        av.add_key(Key::new("tags", "Tags", KeyType::MSelect).with_options(["a", "b"]));
        let rows = [("r1", "Alpha", Some(3.0), vec!["a"]), ("r2", "beta", None, vec!["a", "b"]), ("r3", "Gamma", Some(1.0), vec![])];
        for (id, name, pts, tags) in rows {
            av.set_value("name", id, ValueData::Block { content: name.into() });
            if let Some(p) = pts {
                av.set_value("pts", id, ValueData::Number { content: p, is_not_empty: true });
            }
            av.set_value("tags", id, ValueData::MSelect { items: tags.into_iter().map(String::from).collect() });
        }
        av
    }

    #[test]
    fn test_query_and_filters_combine() {
        let av = fixture();
        let index = RowIndex::new(&av);
        let mut view = View::new("v", "All", attrview::LayoutType::Table);
        let stage = MemoryQueryStage;

        let rows = stage.filter(&index, &view, "A", index.all_rows()).unwrap();
        assert_eq!(rows, vec![0, 1, 2]);

        view.filters.push(ViewFilter::new("tags", FilterOperator::IsEqual, Some(FilterOperand::Text("B".into()))));
        let rows = stage.filter(&index, &view, "", index.all_rows()).unwrap();
        assert_eq!(rows, vec![1]);

        view.filters.clear();
        view.filters.push(ViewFilter::new("pts", FilterOperator::IsGreaterOrEqual, Some(FilterOperand::Number(2.0))));
        let rows = stage.filter(&index, &view, "", index.all_rows()).unwrap();
        assert_eq!(rows, vec![0]);
    }

    #[test]
    fn test_sort_puts_empty_last_in_both_directions() {
        let av = fixture();
        let index = RowIndex::new(&av);
        let mut view = View::new("v", "All", attrview::LayoutType::Table);
        view.sorts.push(ViewSort::new("pts", SortDirection::Desc));
        let mut rows = index.all_rows();
        MemoryQueryStage.sort(&index, &view, &mut rows).unwrap();
        assert_eq!(rows, vec![0, 2, 1]);

        view.sorts[0].order = SortDirection::Asc;
        let mut rows = index.all_rows();
        MemoryQueryStage.sort(&index, &view, &mut rows).unwrap();
        assert_eq!(rows, vec![2, 0, 1]);
    }

    #[test]
    fn test_calcs() {
        let av = fixture();
        let index = RowIndex::new(&av);
        let mut view = View::new("v", "All", attrview::LayoutType::Table);
        let mut pts = ViewField::new("pts");
        pts.calc = Some(CalcOperator::Sum);
        let mut tags = ViewField::new("tags");
        tags.calc = Some(CalcOperator::CountUniqueValues);
        view.fields = vec![ViewField::new("name"), pts, tags];

        let results = MemoryQueryStage.calc(&index, &view, &index.all_rows()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].value, CalcValue::Number(4.0));
        assert_eq!(results[1].value, CalcValue::Number(2.0));

        assert_eq!(calculate(CalcOperator::Average, &[]), CalcValue::Empty);
        let nums: Vec<ValueData> = [1.0, 4.0, 2.0, 3.0]
            .iter()
            .map(|n| ValueData::Number { content: *n, is_not_empty: true })
            .collect();
        assert_eq!(calculate(CalcOperator::Median, &nums), CalcValue::Number(2.5));
        assert_eq!(calculate(CalcOperator::Range, &nums), CalcValue::Number(3.0));
    }
}
