//! FILENAME: core/persistence/src/json_reader.rs

use crate::PersistenceError;
use attrview::AttributeView;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Loads an attribute view document and runs the value-type compatibility
/// pass on it. Returns the document and whether the pass changed anything.
pub fn load_attribute_view(path: &Path) -> Result<(AttributeView, bool), PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PersistenceError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut av: AttributeView = serde_json::from_slice(&bytes)?;
    let repaired = av.repair_value_types();
    Ok((av, repaired))
}
