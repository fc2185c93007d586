//! FILENAME: core/persistence/src/lib.rs
//! Attribute View Persistence Module
//!
//! Handles saving and loading attribute view documents as JSON, one file
//! per attribute view.

mod error;
mod json_reader;
mod json_writer;
mod store;

pub use error::PersistenceError;
pub use json_reader::load_attribute_view;
pub use json_writer::save_attribute_view;
pub use store::AvStore;

/// File extension of stored documents.
pub const AV_FILE_EXTENSION: &str = "json";
