//! FILENAME: tests/test_grouping.rs
//! Integration tests for grouped rendering: bucketing, ordering and the
//! persisted group records.

mod common;

use attrview::{
    FilterOperand, FilterOperator, GroupMethod, GroupOrder, GroupRange, Key, KeyType, LayoutType,
    Sentinel, ViewFilter,
};
use common::{group_summary, group_values, TestHarness};
use view_engine::{
    render_attribute_view, EnglishLocalizer, RenderContext, RenderError, RenderRequest, StageError,
    MemoryQueryStage, QueryStage, RowIndex, RowPos, CalcResult, Viewable,
};

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_status_groups_in_option_order() {
    let mut harness = TestHarness::with_status_data();
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::SelectOption);

    let output = harness.render_view(&view_id);

    assert!(output.needs_save);
    assert_eq!(
        group_summary(&output.viewable),
        vec![("Todo".to_string(), 2), ("Done".to_string(), 1)]
    );
    assert!(!group_values(&output.viewable).contains(&Sentinel::Default.wire().to_string()));
    assert_eq!(output.viewable.item_count(), 3);

    let view = harness.view(&view_id);
    assert_eq!(view.groups.len(), 2);
    assert_eq!(view.group_key_id.as_deref(), Some("status"));
    assert!(view.group_created > 0);
}

#[test]
fn test_group_rows_follow_view_sort() {
    let mut harness = TestHarness::with_status_data();
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::SelectOption);
    harness
        .view_mut(&view_id)
        .sorts
        .push(attrview::ViewSort::new("name", attrview::SortDirection::Desc));

    let output = harness.render_view(&view_id);
    let todo = &output.viewable.groups()[0];
    assert_eq!(todo.item_ids(), vec!["row-3", "row-2"]);
}

// ============================================================================
// ORDERING
// ============================================================================

#[test]
fn test_manual_order_is_stable_across_renders() {
    let mut harness = TestHarness::with_status_data();
    let row = harness.add_row("Task 4");
    harness.set_select("status", &row, "Doing");
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::Manual);

    let first = harness.render_view(&view_id);
    let second = harness.render_view(&view_id);

    assert!(!second.needs_save);
    let ids = |v: &Viewable| v.groups().iter().map(|g| g.header().id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first.viewable), ids(&second.viewable));
}

#[test]
fn test_default_group_last_in_select_option_order() {
    let mut harness = TestHarness::with_status_data();
    harness.add_row("No status");
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::SelectOption);

    let output = harness.render_view(&view_id);
    assert_eq!(
        group_summary(&output.viewable).last(),
        Some(&("No Status".to_string(), 1))
    );

    // Even a manual sort pointing to the front does not move it.
    let view = harness.view_mut(&view_id);
    let default = view
        .groups
        .iter_mut()
        .find(|g| g.value.is_default())
        .unwrap();
    default.sort = -100;

    let output = harness.render_view(&view_id);
    assert_eq!(
        group_values(&output.viewable).last().map(String::as_str),
        Some(Sentinel::Default.wire())
    );
    assert!(output.needs_save);
}

#[test]
fn test_date_relative_ascending_layout() {
    let mut harness = TestHarness::new();
    harness.add_key(Key::new("due", "Due", KeyType::Date));
    for offset in [0, -1, 1, -5, 5, -20, 20, -60, 60] {
        let row = harness.add_row(&format!("Due {}", offset));
        harness.set_date_offset("due", &row, offset);
    }
    harness.add_row("Undated");
    let view_id = harness.add_grouped_view(LayoutType::Table, "due", GroupMethod::DateRelative, GroupOrder::Ascending);

    let output = harness.render_view(&view_id);
    let names: Vec<String> = group_summary(&output.viewable).into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec![
            "2024-04",
            "Next 30 days",
            "Next 7 days",
            "Tomorrow",
            "Today",
            "Yesterday",
            "Last 7 days",
            "Last 30 days",
            "2024-08",
            "No Due",
        ]
    );
}

#[test]
fn test_number_ranges_with_not_in_range() {
    let mut harness = TestHarness::new();
    harness.add_key(Key::new("pts", "Points", KeyType::Number));
    for n in [5.0, 15.0, 12.0, 250.0] {
        let row = harness.add_row(&format!("n{}", n));
        harness.set_number("pts", &row, n);
    }
    harness.add_row("none");
    let view_id = harness.add_grouped_view(LayoutType::Table, "pts", GroupMethod::RangeNum, GroupOrder::Ascending);
    harness.view_mut(&view_id).group.as_mut().unwrap().range = Some(GroupRange { start: 0.0, end: 100.0, step: 10.0 });

    let output = harness.render_view(&view_id);
    assert_eq!(
        group_summary(&output.viewable),
        vec![
            ("0 - 10".to_string(), 1),
            ("10 - 20".to_string(), 2),
            ("Not in range".to_string(), 1),
            ("No Points".to_string(), 1),
        ]
    );
}

// ============================================================================
// FALLBACKS AND ERRORS
// ============================================================================

#[test]
fn test_kanban_installs_first_choice_key() {
    let mut harness = TestHarness::with_status_data();
    let mut view = attrview::View::new("board", "Board", LayoutType::Kanban);
    view.fields.clear();
    harness.av.views.push(view);

    let output = harness.render_view("board");
    assert!(output.needs_save);
    assert!(matches!(output.viewable, Viewable::Kanban(_)));
    assert_eq!(group_summary(&output.viewable).len(), 2);

    let group = harness.view("board").group.clone().unwrap();
    assert_eq!(group.field, "status");
    assert_eq!(group.order, GroupOrder::SelectOption);
}

#[test]
fn test_missing_group_key_renders_ungrouped() {
    let mut harness = TestHarness::with_status_data();
    let view_id = harness.add_grouped_view(LayoutType::Table, "deleted", GroupMethod::Value, GroupOrder::Manual);

    let output = harness.render_view(&view_id);
    assert!(output.viewable.groups().is_empty());
    assert_eq!(output.viewable.item_count(), 3);
}

#[test]
fn test_kanban_without_choice_key_renders_ungrouped() {
    let mut harness = TestHarness::with_rows(3);
    harness.av.views.push(attrview::View::new("board", "Board", LayoutType::Kanban));

    let output = harness.render_view("board");
    assert!(output.viewable.groups().is_empty());
    assert!(harness.view("board").group.is_none());
}

#[test]
fn test_filtered_rows_leave_groups_empty() {
    let mut harness = TestHarness::with_status_data();
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::SelectOption);
    harness.view_mut(&view_id).filters.push(ViewFilter::new(
        "status",
        FilterOperator::IsNotEqual,
        Some(FilterOperand::Text("Done".into())),
    ));

    let output = harness.render_view(&view_id);
    assert_eq!(
        group_summary(&output.viewable),
        vec![("Todo".to_string(), 2), ("Done".to_string(), 0)]
    );
}

struct OfflineStage;

impl QueryStage for OfflineStage {
    fn filter(&self, _: &RowIndex<'_>, _: &attrview::View, _: &str, _: Vec<RowPos>) -> Result<Vec<RowPos>, StageError> {
        Err(StageError::new("index offline"))
    }

    fn sort(&self, _: &RowIndex<'_>, _: &attrview::View, _: &mut [RowPos]) -> Result<(), StageError> {
        Ok(())
    }

    fn calc(&self, _: &RowIndex<'_>, _: &attrview::View, _: &[RowPos]) -> Result<Vec<CalcResult>, StageError> {
        Ok(Vec::new())
    }
}

#[test]
fn test_stage_errors_pass_through() {
    let mut harness = TestHarness::with_status_data();
    let ctx: RenderContext = harness.ctx.clone();
    let err = render_attribute_view(&mut harness.av, &RenderRequest::default(), &OfflineStage, &EnglishLocalizer, &ctx)
        .unwrap_err();
    assert!(matches!(err, RenderError::Stage(_)));
    assert_eq!(err.to_string(), "index offline");
}

#[test]
fn test_unknown_view_id_falls_back_to_first_view() {
    let mut harness = TestHarness::with_status_data();
    let view_id = harness.add_grouped_view(LayoutType::Table, "status", GroupMethod::Value, GroupOrder::Manual);

    let output = harness.render(&RenderRequest::for_view("missing"));
    assert_eq!(output.view_id, view_id);
    assert_eq!(harness.av.view_id, view_id);
}

#[test]
fn test_no_view_and_no_primary_key() {
    let mut av = attrview::AttributeView::new("bare", "Bare");
    let ctx = common::TestHarness::new().ctx;
    let err = render_attribute_view(&mut av, &RenderRequest::default(), &MemoryQueryStage, &EnglishLocalizer, &ctx)
        .unwrap_err();
    assert!(matches!(err, RenderError::ViewNotFound(_)));
}
