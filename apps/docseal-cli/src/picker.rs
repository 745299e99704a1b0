//! Caller-side document filter.
//!
//! The engine accepts any readable file. The command line narrows that the
//! way a file picker would: only allowed extensions, nothing over the size
//! limit. Messages are written for people, not for logs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Maximum file size allowed (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("{name} is not an accepted document type (expected: {expected})")]
    Extension { name: String, expected: String },

    #[error("{name} is too large ({size} bytes, limit {limit} bytes). Please select a smaller file.")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("Could not access the selected file {name}. ({reason})")]
    Access { name: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PickerConfig {
    /// Accepted extensions, compared case-insensitively. Empty accepts all.
    pub allowed_extensions: Vec<String>,
    /// Largest document accepted, in bytes
    pub max_file_size: u64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["pdf".to_string()],
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl PickerConfig {
    /// Filter that accepts any file name, keeping the size limit
    pub fn any_file(self) -> Self {
        Self {
            allowed_extensions: Vec::new(),
            ..self
        }
    }

    /// Check the extension of `path` against the allow list
    pub fn check_extension(&self, path: &Path) -> Result<(), PickerError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.allowed_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false);

        if accepted {
            Ok(())
        } else {
            Err(PickerError::Extension {
                name: display_name(path),
                expected: self.allowed_extensions.join(", "),
            })
        }
    }

    /// Validates file size against the configured limit
    pub fn check_size(&self, path: &Path, size: u64) -> Result<(), PickerError> {
        if size > self.max_file_size {
            Err(PickerError::TooLarge {
                name: display_name(path),
                size,
                limit: self.max_file_size,
            })
        } else {
            Ok(())
        }
    }

    /// Run every check on a document path.
    ///
    /// A file whose metadata cannot be read is passed through so the
    /// engine can report the underlying read error itself.
    pub fn select(&self, path: &Path) -> Result<(), PickerError> {
        self.check_extension(path)?;

        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => self.check_size(path, meta.len()),
            Ok(_) => Err(PickerError::Access {
                name: display_name(path),
                reason: "not a regular file".to_string(),
            }),
            Err(_) => Ok(()),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: extension matching ignores ASCII case
        #[test]
        fn extension_case_insensitive(stem in "[a-z0-9_]{1,20}", upper in any::<bool>()) {
            let ext = if upper { "PDF" } else { "pdf" };
            let name = format!("{}.{}", stem, ext);
            prop_assert!(PickerConfig::default().check_extension(Path::new(&name)).is_ok());
        }

        /// Property: sizes at or under the limit are accepted, above are rejected
        #[test]
        fn size_limit_boundary(limit in 0u64..1_000_000, size in 0u64..2_000_000) {
            let picker = PickerConfig { max_file_size: limit, ..Default::default() };
            prop_assert_eq!(picker.check_size(Path::new("a.pdf"), size).is_ok(), size <= limit);
        }
    }
}
