//! FILENAME: core/view-engine/src/error.rs

use thiserror::Error;

/// Errors surfaced by a render call. Everything else self-heals.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No renderable view in attribute view {0}")]
    ViewNotFound(String),

    /// Index / query stage failures pass through unchanged.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Error reported by a `QueryStage` implementation.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StageError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StageError {
    pub fn new(message: impl Into<String>) -> Self {
        StageError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        StageError {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Why a view renders ungrouped. Never returned to callers, only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingUnavailable {
    #[error("grouping key {0} does not exist")]
    MissingKey(String),

    #[error("no select or multi-select key to group the kanban by")]
    NoPreferredKey,
}

/// Errors of explicit group-state operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    #[error("View {0} is not grouped")]
    NotGrouped(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),
}
