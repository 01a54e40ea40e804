use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::ScanError;
use crate::model::ManifestKind;

/// Extracts the top-level `dependencies` keys of an npm lockfile.
///
/// A missing or null `dependencies` field yields an empty set. Nested
/// dependencies are not walked.
///
/// # Errors
///
/// Returns [`ScanError::MalformedManifest`] if the text is not JSON, the
/// document is not an object, or `dependencies` is not an object.
pub fn parse_package_lock(text: &str) -> Result<BTreeSet<String>, ScanError> {
    let malformed = |reason: String| ScanError::MalformedManifest {
        kind: ManifestKind::PackageLockJson,
        reason,
    };

    let document: Value = serde_json::from_str(text).map_err(|e| malformed(e.to_string()))?;

    let root = document
        .as_object()
        .ok_or_else(|| malformed("top-level value is not an object".to_owned()))?;

    match root.get("dependencies") {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::Object(deps)) => Ok(deps.keys().cloned().collect()),
        Some(_) => Err(malformed("`dependencies` is not an object".to_owned())),
    }
}
