//! FILENAME: core/view-engine/src/config.rs
//! Engine configuration and the per-render context.

use attrview::DEFAULT_PAGE_SIZE;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Engine-wide settings. Missing fields take their defaults when parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Page size used when neither the request nor the view sets one.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Drop per-group column/field definitions from the output; they repeat
    /// the parent's.
    #[serde(default = "default_true")]
    pub strip_group_fields: bool,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_page_size: DEFAULT_PAGE_SIZE,
            strip_group_fields: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Clock and configuration for one render call.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// "Now" in the offset used for calendar bucketing.
    pub now: DateTime<FixedOffset>,
    pub config: EngineConfig,
}

impl RenderContext {
    pub fn new(now: DateTime<FixedOffset>, config: EngineConfig) -> Self {
        RenderContext { now, config }
    }

    /// Context for the local clock and default configuration.
    pub fn local() -> Self {
        RenderContext::new(Local::now().fixed_offset(), EngineConfig::default())
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn now_millis(&self) -> i64 {
        self.now.timestamp_millis()
    }

    /// Calendar day of an epoch-millis timestamp in the render offset.
    pub fn date_of(&self, millis: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(millis).map(|d| d.with_timezone(&self.now.timezone()).date_naive())
    }
}
