//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for view-engine integration tests.

#![allow(dead_code)]

use attrview::{AttributeView, GroupMethod, GroupOrder, Key, KeyType, LayoutType, ValueData, View, ViewGroup};
use chrono::{DateTime, Duration, FixedOffset};
use view_engine::{
    render_attribute_view, EngineConfig, EnglishLocalizer, MemoryQueryStage, RenderContext,
    RenderOutput, RenderRequest, Viewable,
};

/// Fixed "now" used by every test: a Saturday.
pub const NOW: &str = "2024-06-15T12:00:00+00:00";

pub fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(NOW).unwrap()
}

/// Test harness around one attribute view and a fixed render clock.
pub struct TestHarness {
    pub av: AttributeView,
    pub ctx: RenderContext,
}

impl TestHarness {
    /// Empty attribute view with only a primary key.
    pub fn new() -> Self {
        let mut av = AttributeView::new("av-test", "Tasks");
        av.add_key(Key::new("name", "Name", KeyType::Block));
        TestHarness {
            av,
            ctx: RenderContext::new(now(), EngineConfig::default()),
        }
    }

    /// Status select `[Todo, Doing, Done]` with rows `[Done, Todo, Todo]`.
    pub fn with_status_data() -> Self {
        let mut harness = Self::new();
        harness.add_key(Key::new("status", "Status", KeyType::Select).with_options(["Todo", "Doing", "Done"]));
        for (i, status) in ["Done", "Todo", "Todo"].iter().enumerate() {
            let row = harness.add_row(&format!("Task {}", i + 1));
            harness.set_select("status", &row, status);
        }
        harness
    }

    /// `count` rows named "Row 1".."Row n".
    pub fn with_rows(count: usize) -> Self {
        let mut harness = Self::new();
        for i in 0..count {
            harness.add_row(&format!("Row {}", i + 1));
        }
        harness
    }

    pub fn add_key(&mut self, key: Key) {
        self.av.add_key(key);
    }

    /// Adds a row and returns its ID.
    pub fn add_row(&mut self, title: &str) -> String {
        let id = format!("row-{}", self.av.row_ids().len() + 1);
        self.av.set_value("name", &id, ValueData::Block { content: title.to_string() });
        id
    }

    pub fn set_select(&mut self, key_id: &str, row: &str, option: &str) {
        self.av.set_value(key_id, row, ValueData::Select { items: vec![option.to_string()] });
    }

    pub fn set_number(&mut self, key_id: &str, row: &str, n: f64) {
        self.av.set_value(key_id, row, ValueData::Number { content: n, is_not_empty: true });
    }

    /// Sets a date `days` away from `NOW`.
    pub fn set_date_offset(&mut self, key_id: &str, row: &str, days: i64) {
        let millis = (now() + Duration::days(days)).timestamp_millis();
        self.av.set_value(
            key_id,
            row,
            ValueData::Date { content: millis, is_not_empty: true, has_end_date: false, content2: 0 },
        );
    }

    /// Adds a view grouped by `key_id` and returns its ID.
    pub fn add_grouped_view(&mut self, layout: LayoutType, key_id: &str, method: GroupMethod, order: GroupOrder) -> String {
        let mut view = View::new(format!("view-{}", self.av.views.len() + 1), "Grouped", layout)
            .with_all_fields(self.av.keys());
        view.group = Some(ViewGroup::new(key_id, method, order));
        let id = view.id.clone();
        self.av.views.push(view);
        id
    }

    pub fn view(&self, view_id: &str) -> &View {
        self.av.view(view_id).unwrap()
    }

    pub fn view_mut(&mut self, view_id: &str) -> &mut View {
        self.av.view_mut(view_id).unwrap()
    }

    pub fn render(&mut self, request: &RenderRequest) -> RenderOutput {
        render_attribute_view(&mut self.av, request, &MemoryQueryStage, &EnglishLocalizer, &self.ctx).unwrap()
    }

    pub fn render_view(&mut self, view_id: &str) -> RenderOutput {
        self.render(&RenderRequest::for_view(view_id))
    }
}

/// `(name, item count)` of every group child.
pub fn group_summary(viewable: &Viewable) -> Vec<(String, usize)> {
    viewable
        .groups()
        .iter()
        .map(|g| (g.header().name.clone(), g.item_count()))
        .collect()
}

pub fn group_values(viewable: &Viewable) -> Vec<String> {
    viewable
        .groups()
        .iter()
        .filter_map(|g| g.header().group_value.as_ref().map(|v| v.to_string()))
        .collect()
}
