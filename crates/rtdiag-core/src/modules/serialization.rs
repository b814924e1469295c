use crate::domain::{RtDiagError, RtDiagResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Canonical `\n` line endings and a trailing newline for non-empty text.
pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub fn write_text_artifact(path: &Path, content: &str) -> RtDiagResult<()> {
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        RtDiagError::io_system(
            "IO.ARTIFACT_WRITE",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

pub fn to_json_text<T: Serialize>(value: &T) -> RtDiagResult<String> {
    serde_json::to_string_pretty(value)
        .map(|json| normalize_text_artifact(&json))
        .map_err(|source| {
            RtDiagError::internal(
                "INTERNAL.JSON_ENCODE",
                format!("failed to encode JSON output: {source}"),
            )
        })
}

pub fn write_json_artifact<T: Serialize>(path: &Path, value: &T) -> RtDiagResult<()> {
    write_text_artifact(path, &to_json_text(value)?)
}
