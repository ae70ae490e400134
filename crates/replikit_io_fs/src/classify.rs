//! Hidden-entry classification.

use std::path::Path;

/// Host convention used to decide whether an entry is hidden.
///
/// The policy is picked once (usually via [`EnumHiddenEntryClassifier::for_host`])
/// and handed to the replicator; `is_hidden` never branches on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumHiddenEntryClassifier {
    /// Hidden iff the base name starts with `.`.
    DotPrefix,
    /// Hidden iff the file-attribute query reports the hidden bit.
    ///
    /// Fails open: an unavailable or failing query means visible.
    AttributeBit,
}

impl EnumHiddenEntryClassifier {
    /// Policy matching the compile target.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::AttributeBit
        } else {
            Self::DotPrefix
        }
    }

    /// Classify one file or directory by its own path.
    ///
    /// Ancestors are not inspected and no traversal happens here.
    pub fn is_hidden(&self, path: &Path) -> bool {
        match self {
            Self::DotPrefix => is_dot_prefixed(path),
            Self::AttributeBit => has_hidden_attribute(path),
        }
    }
}

fn is_dot_prefixed(path: &Path) -> bool {
    // `file_name` is None for `..` and roots.
    path.file_name()
        .map(|name| name.as_encoded_bytes().starts_with(b"."))
        .unwrap_or(false)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    use windows_sys::Win32::Storage::FileSystem::FILE_ATTRIBUTE_HIDDEN;

    match std::fs::symlink_metadata(path) {
        Ok(meta) => meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0,
        Err(_) => false,
    }
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}
