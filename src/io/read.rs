//! Reads a [`MeshDocument`](crate::io::model::MeshDocument) from disk.

use std::fs;
use std::path::Path;

use crate::error::{TinError, TinResult};
use crate::io::model::MeshDocument;

pub fn read(path: &Path) -> TinResult<MeshDocument> {
    let json = fs::read_to_string(path).map_err(|e| {
        TinError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
    })?;
    serde_json::from_str(&json).map_err(|e| {
        TinError::InvalidArgument(format!("malformed mesh document in {}: {e}", path.display()))
    })
}
