//! Package Descriptor Updater: reduces the published metadata to the
//! minimal public surface.

use std::fs;

use serde::Serialize;
use serde_json::Value;

use crate::errors::{AssembleError, Phase, Result};
use crate::layout::Layout;

/// The reduced descriptor written back into the merged tree. Every other
/// field of the original is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub main: String,
}

/// Reads `dist/package.json`, keeps exactly `name` and `version`, points
/// `main` at the composed entry module, and writes the result back.
///
/// A missing file or unparsable content is fatal to this phase.
pub fn update(layout: &Layout) -> Result<PackageDescriptor> {
    let path = layout.manifest();
    let text = fs::read_to_string(&path).map_err(|e| AssembleError::io(Phase::Manifest, &path, e))?;
    let original: Value = serde_json::from_str(&text).map_err(|e| AssembleError::ManifestParse {
        path: path.clone(),
        source: e,
    })?;

    let descriptor = PackageDescriptor {
        name: required_field(&original, "name", &path)?,
        version: required_field(&original, "version", &path)?,
        main: "index.js".to_string(),
    };

    let mut reduced = serde_json::to_string_pretty(&descriptor).map_err(|e| {
        AssembleError::ManifestParse {
            path: path.clone(),
            source: e,
        }
    })?;
    reduced.push('\n');
    fs::write(&path, reduced).map_err(|e| AssembleError::io(Phase::Manifest, &path, e))?;
    Ok(descriptor)
}

fn required_field(value: &Value, field: &'static str, path: &std::path::Path) -> Result<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AssembleError::ManifestField {
            path: path.to_path_buf(),
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_must_be_strings() {
        let value: Value = serde_json::from_str(r#"{"name": "arbor", "version": 3}"#).unwrap();
        let path = std::path::PathBuf::from("package.json");
        assert_eq!(required_field(&value, "name", &path).unwrap(), "arbor");
        assert!(matches!(
            required_field(&value, "version", &path),
            Err(AssembleError::ManifestField { field: "version", .. })
        ));
    }
}
