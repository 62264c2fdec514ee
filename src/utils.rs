use crate::error::{HarvestError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Convert a remote name (category, title, filename) into a single path component
pub fn sanitize_component(name: &str) -> String {
    let name = name.replace(['/', '\\', '\0'], "_");
    if matches!(name.trim(), "" | "." | "..") {
        return "_".to_string();
    }
    name
}

/// Ensures `base/segment/...` exists, creating missing parents.
///
/// Pre-existing directories (fully or partially) are not an error.
pub fn ensure_directory<S: AsRef<str>>(base: &Path, segments: &[S]) -> Result<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in segments {
        path.push(sanitize_component(segment.as_ref()));
    }

    std::fs::create_dir_all(&path).map_err(|e| HarvestError::io(&path, e))?;
    ::log::trace!("Directory ready: {}", path.display());
    Ok(path)
}

/// Reads an id that the remote side may send either as a string or a number
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
