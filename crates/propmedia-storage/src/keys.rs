//! Storage key helpers shared by the backends.

use crate::traits::{StorageError, StorageResult};

/// Reject keys that could escape a backend's root.
///
/// Keys are relative paths; `..` segments and absolute paths are refused
/// before any backend call.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty storage key".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
        return Err(StorageError::InvalidKey(format!(
            "storage key contains invalid segments: {}",
            key
        )));
    }
    Ok(())
}

/// Sanitize a user-supplied folder name (property names end up in folder
/// names). Characters that are path separators or problematic on common
/// backends are replaced with '-'.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' => '-',
            other => other,
        })
        .collect()
}
