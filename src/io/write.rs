//! Writes a [`TriangulationData`](crate::io::model::TriangulationData)
//! document to disk, pretty-printed.

use std::fs;
use std::path::Path;

use crate::error::{TinError, TinResult};
use crate::io::model::TriangulationData;

pub fn write(path: &Path, data: &TriangulationData) -> TinResult<()> {
    let json = serde_json::to_string_pretty(data).map_err(|e| {
        TinError::InvalidState(format!("failed to serialize triangulation data: {e}"))
    })?;
    fs::write(path, json)
        .map_err(|e| TinError::InvalidState(format!("cannot write {}: {e}", path.display())))
}
