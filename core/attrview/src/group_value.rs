//! FILENAME: core/attrview/src/group_value.rs
//! Group values - the canonical identity of a group.
//!
//! A group value is either a real data value (an option name, a date bucket,
//! a range label) or one of the reserved sentinels. Sentinels keep a stable
//! wire string so persisted documents stay readable across versions.
//!
//! Wire strings starting with `_@` are reserved. A data value whose text
//! falls in that namespace is written with a leading `\` so it never reads
//! back as a sentinel.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// SENTINELS
// ============================================================================

/// Reserved, non-data group identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// Rows whose grouping value is empty or absent.
    Default,
    /// Numeric value outside the configured bucket range.
    NotInRange,
    Last30Days,
    Last7Days,
    Yesterday,
    Today,
    Tomorrow,
    Next7Days,
    Next30Days,
}

impl Sentinel {
    /// The relative-date block in its fixed display order.
    pub const RELATIVE_ORDER: [Sentinel; 7] = [
        Sentinel::Next30Days,
        Sentinel::Next7Days,
        Sentinel::Tomorrow,
        Sentinel::Today,
        Sentinel::Yesterday,
        Sentinel::Last7Days,
        Sentinel::Last30Days,
    ];

    pub const ALL: [Sentinel; 9] = [
        Sentinel::Default,
        Sentinel::NotInRange,
        Sentinel::Last30Days,
        Sentinel::Last7Days,
        Sentinel::Yesterday,
        Sentinel::Today,
        Sentinel::Tomorrow,
        Sentinel::Next7Days,
        Sentinel::Next30Days,
    ];

    /// Stable persisted form.
    pub fn wire(self) -> &'static str {
        match self {
            Sentinel::Default => "_@default@_",
            Sentinel::NotInRange => "_@notInRange@_",
            Sentinel::Last30Days => "_@last30Days@_",
            Sentinel::Last7Days => "_@last7Days@_",
            Sentinel::Yesterday => "_@yesterday@_",
            Sentinel::Today => "_@today@_",
            Sentinel::Tomorrow => "_@tomorrow@_",
            Sentinel::Next7Days => "_@next7Days@_",
            Sentinel::Next30Days => "_@next30Days@_",
        }
    }

    pub fn from_wire(s: &str) -> Option<Sentinel> {
        Sentinel::ALL.iter().copied().find(|sentinel| sentinel.wire() == s)
    }

    /// One of the seven relative-date buckets.
    pub fn is_relative(self) -> bool {
        !matches!(self, Sentinel::Default | Sentinel::NotInRange)
    }
}

// ============================================================================
// GROUP VALUE
// ============================================================================

/// Canonical identity of a group, persisted as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GroupValue {
    Sentinel(Sentinel),
    Data(String),
}

impl GroupValue {
    pub fn data(s: impl Into<String>) -> Self {
        GroupValue::Data(s.into())
    }

    pub fn sentinel(&self) -> Option<Sentinel> {
        match self {
            GroupValue::Sentinel(s) => Some(*s),
            GroupValue::Data(_) => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, GroupValue::Sentinel(Sentinel::Default))
    }

    pub fn as_wire(&self) -> &str {
        match self {
            GroupValue::Sentinel(s) => s.wire(),
            GroupValue::Data(d) => d,
        }
    }
}

const RESERVED_PREFIX: &str = "_@";
const ESCAPE: char = '\\';

/// Data text that needs escaping on the wire: the reserved prefix behind
/// any number of escapes.
fn is_reserved_text(s: &str) -> bool {
    s.trim_start_matches(ESCAPE).starts_with(RESERVED_PREFIX)
}

impl From<String> for GroupValue {
    fn from(s: String) -> Self {
        if let Some(sentinel) = Sentinel::from_wire(&s) {
            return GroupValue::Sentinel(sentinel);
        }
        match s.strip_prefix(ESCAPE) {
            Some(unescaped) if is_reserved_text(unescaped) => GroupValue::Data(unescaped.to_string()),
            _ => GroupValue::Data(s),
        }
    }
}

impl From<GroupValue> for String {
    fn from(value: GroupValue) -> Self {
        match value {
            GroupValue::Sentinel(s) => s.wire().to_string(),
            GroupValue::Data(d) if is_reserved_text(&d) => format!("{}{}", ESCAPE, d),
            GroupValue::Data(d) => d,
        }
    }
}

impl From<Sentinel> for GroupValue {
    fn from(s: Sentinel) -> Self {
        GroupValue::Sentinel(s)
    }
}

impl fmt::Display for GroupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_wire_strings_parse_back() {
        for sentinel in Sentinel::ALL {
            let value = GroupValue::from(sentinel.wire().to_string());
            assert_eq!(value, GroupValue::Sentinel(sentinel));
        }
        assert_eq!(GroupValue::from("Todo".to_string()), GroupValue::data("Todo"));
    }

    #[test]
    fn test_group_value_serializes_as_string() {
        let json = serde_json::to_string(&GroupValue::Sentinel(Sentinel::Today)).unwrap();
        assert_eq!(json, "\"_@today@_\"");
        let value: GroupValue = serde_json::from_str("\"2024-05\"").unwrap();
        assert_eq!(value, GroupValue::data("2024-05"));
    }

    #[test]
    fn test_relative_block_excludes_default() {
        assert!(!Sentinel::RELATIVE_ORDER.contains(&Sentinel::Default));
        assert!(Sentinel::RELATIVE_ORDER.iter().all(|s| s.is_relative()));
    }

    #[test]
    fn test_data_in_reserved_namespace_stays_data() {
        for text in ["_@today@_", "_@custom", "\\_@default@_", "\\plain"] {
            let value = GroupValue::data(text);
            let json = serde_json::to_string(&value).unwrap();
            let back: GroupValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value, "{}", text);
        }
        assert_eq!(String::from(GroupValue::data("_@today@_")), "\\_@today@_");
        assert_eq!(String::from(GroupValue::data("\\plain")), "\\plain");
    }
}
