//! FILENAME: core/view-engine/src/locale.rs
//! Localized display names for sentinel groups.
//!
//! The engine never reads a global language table. Callers pass a
//! `Localizer`; `EnglishLocalizer` is the built-in fallback and
//! `TableLocalizer` loads a language pack from JSON.

use attrview::Sentinel;
use rustc_hash::FxHashMap;

pub const TEXT_GROUP_DEFAULT: &str = "group.default";
pub const TEXT_GROUP_NOT_IN_RANGE: &str = "group.notInRange";
pub const TEXT_GROUP_LAST_DAYS: &str = "group.lastDays";
pub const TEXT_GROUP_NEXT_DAYS: &str = "group.nextDays";
pub const TEXT_GROUP_YESTERDAY: &str = "group.yesterday";
pub const TEXT_GROUP_TODAY: &str = "group.today";
pub const TEXT_GROUP_TOMORROW: &str = "group.tomorrow";
pub const TEXT_VIEW_TABLE: &str = "view.table";

/// String-table lookup. `{0}`, `{1}`, ... in the template are replaced by
/// `args`.
pub trait Localizer: Send + Sync {
    fn text(&self, key: &str, args: &[&str]) -> String;
}

/// Replaces positional `{n}` placeholders.
pub fn substitute(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        out = out.replace(&format!("{{{}}}", i), arg);
    }
    out
}

/// Built-in English strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl EnglishLocalizer {
    fn template(key: &str) -> Option<&'static str> {
        let text = match key {
            TEXT_GROUP_DEFAULT => "No {0}",
            TEXT_GROUP_NOT_IN_RANGE => "Not in range",
            TEXT_GROUP_LAST_DAYS => "Last {0} days",
            TEXT_GROUP_NEXT_DAYS => "Next {0} days",
            TEXT_GROUP_YESTERDAY => "Yesterday",
            TEXT_GROUP_TODAY => "Today",
            TEXT_GROUP_TOMORROW => "Tomorrow",
            TEXT_VIEW_TABLE => "Table",
            _ => return None,
        };
        Some(text)
    }
}

impl Localizer for EnglishLocalizer {
    fn text(&self, key: &str, args: &[&str]) -> String {
        match Self::template(key) {
            Some(template) => substitute(template, args),
            None => key.to_string(),
        }
    }
}

/// Language pack loaded from a flat JSON object; falls back to English for
/// missing keys.
#[derive(Debug, Clone, Default)]
pub struct TableLocalizer {
    table: FxHashMap<String, String>,
}

impl TableLocalizer {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let table: FxHashMap<String, String> = serde_json::from_str(json)?;
        Ok(TableLocalizer { table })
    }
}

impl Localizer for TableLocalizer {
    fn text(&self, key: &str, args: &[&str]) -> String {
        match self.table.get(key) {
            Some(template) => substitute(template, args),
            None => EnglishLocalizer.text(key, args),
        }
    }
}

/// Display name of a sentinel group. `key_name` is the grouping key's name,
/// used by the "no value" bucket.
pub fn sentinel_name(sentinel: Sentinel, key_name: &str, localizer: &dyn Localizer) -> String {
    match sentinel {
        Sentinel::Default => localizer.text(TEXT_GROUP_DEFAULT, &[key_name]),
        Sentinel::NotInRange => localizer.text(TEXT_GROUP_NOT_IN_RANGE, &[]),
        Sentinel::Last30Days => localizer.text(TEXT_GROUP_LAST_DAYS, &["30"]),
        Sentinel::Last7Days => localizer.text(TEXT_GROUP_LAST_DAYS, &["7"]),
        Sentinel::Yesterday => localizer.text(TEXT_GROUP_YESTERDAY, &[]),
        Sentinel::Today => localizer.text(TEXT_GROUP_TODAY, &[]),
        Sentinel::Tomorrow => localizer.text(TEXT_GROUP_TOMORROW, &[]),
        Sentinel::Next7Days => localizer.text(TEXT_GROUP_NEXT_DAYS, &["7"]),
        Sentinel::Next30Days => localizer.text(TEXT_GROUP_NEXT_DAYS, &["30"]),
    }
}
