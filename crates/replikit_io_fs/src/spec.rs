//! Replication specification models and top-level error types.

use std::fmt;
use std::path::PathBuf;

use crate::classify::EnumHiddenEntryClassifier;
use crate::util::SpecExtensionExclusions;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Per-file result of one traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCopyOutcome {
    /// Content and timestamps were written to destination.
    Copied,
    /// Base name is hidden under the active classifier.
    SkippedHidden,
    /// Extension is a member of the exclusion set.
    SkippedExcluded,
    /// Host access control rejected the copy.
    SkippedPermissionDenied,
    /// Any other failure while creating the directory or copying the file.
    SkippedOtherError,
}

impl EnumCopyOutcome {
    /// `true` for the two error outcomes.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Self::SkippedPermissionDenied | Self::SkippedOtherError
        )
    }

    /// Stable lowercase label, used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::SkippedHidden => "skipped_hidden",
            Self::SkippedExcluded => "skipped_excluded",
            Self::SkippedPermissionDenied => "skipped_permission_denied",
            Self::SkippedOtherError => "skipped_other_error",
        }
    }
}

impl fmt::Display for EnumCopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the progress denominator is computed before the copy walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumCopyTotalCountMode {
    /// Count files in every directory the copy walk will visit.
    ///
    /// Hidden subdirectories (and a destination nested in the source) are
    /// pruned exactly like the walk does, but hidden and excluded files
    /// inside visited directories are still counted.
    #[default]
    Pruned,
    /// Count every file below the source, hidden subtrees included.
    ///
    /// The denominator may exceed the number of progress ticks.
    Unpruned,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `replicate_tree`.
#[derive(Debug, Clone)]
pub struct SpecCopyOptions {
    /// Extension exclusion set, fixed for the run.
    pub spec_exclusions: SpecExtensionExclusions,
    /// Hidden-entry policy, chosen once per run.
    pub classifier_hidden: EnumHiddenEntryClassifier,
    /// Progress denominator policy.
    pub rule_total_count: EnumCopyTotalCountMode,
}

impl Default for SpecCopyOptions {
    fn default() -> Self {
        Self {
            spec_exclusions: SpecExtensionExclusions::default(),
            classifier_hidden: EnumHiddenEntryClassifier::for_host(),
            rule_total_count: EnumCopyTotalCountMode::Pruned,
        }
    }
}

/// One copy failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyError {
    /// Failed source path, relative to the source root.
    pub path: PathBuf,
    /// Outcome recorded for this path.
    pub outcome: EnumCopyOutcome,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (input validation / setup stage).
#[derive(Debug)]
pub enum CopyTreeError {
    /// Source path is missing or cannot be enumerated.
    SourceNotFound {
        /// Source path as given by the caller.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// Invalid extension exclusion entry.
    InvalidExclusion(String),
}

impl fmt::Display for CopyTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceNotFound { path, message } => {
                write!(
                    f,
                    "Source directory does not exist: {} ({message})",
                    path.display()
                )
            }
            Self::InvalidExclusion(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CopyTreeError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
