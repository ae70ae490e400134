//! Replication report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::{EnumCopyOutcome, SpecCopyError};

/// Aggregate counters and diagnostics for one `replicate_tree` run.
///
/// `cnt_copied <= cnt_visited`. On a tree that does not change during the
/// run, `cnt_visited == cnt_total` with [`crate::EnumCopyTotalCountMode::Pruned`]
/// and `cnt_visited <= cnt_total` with [`crate::EnumCopyTotalCountMode::Unpruned`].
#[derive(Debug, Default, Clone)]
pub struct ReportCopy {
    /// Progress denominator computed before the walk.
    pub cnt_total: u64,
    /// File entries that received an outcome.
    pub cnt_visited: u64,
    /// Files copied successfully.
    pub cnt_copied: u64,
    /// Files skipped because they are hidden.
    pub cnt_skipped_hidden: u64,
    /// Files skipped because of their extension.
    pub cnt_skipped_excluded: u64,
    /// Files rejected by access control.
    pub cnt_permission_denied: u64,
    /// Files that failed for any other reason.
    pub cnt_failed: u64,
    /// Hidden subdirectories removed from the walk.
    pub cnt_pruned_dirs: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-file failures.
    pub errors: Vec<SpecCopyError>,
}

impl ReportCopy {
    /// Number of collected per-file errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_total".to_string(), self.cnt_total);
        dict_counts.insert("cnt_visited".to_string(), self.cnt_visited);
        dict_counts.insert("cnt_copied".to_string(), self.cnt_copied);
        dict_counts.insert("cnt_skipped_hidden".to_string(), self.cnt_skipped_hidden);
        dict_counts.insert("cnt_skipped_excluded".to_string(), self.cnt_skipped_excluded);
        dict_counts.insert(
            "cnt_permission_denied".to_string(),
            self.cnt_permission_denied,
        );
        dict_counts.insert("cnt_failed".to_string(), self.cnt_failed);
        dict_counts.insert("cnt_pruned_dirs".to_string(), self.cnt_pruned_dirs);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line breakdown.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} copied={} total={} hidden={} excluded={} denied={} failed={} pruned_dirs={} warnings={}",
            self.cnt_copied,
            self.cnt_total,
            self.cnt_skipped_hidden,
            self.cnt_skipped_excluded,
            self.cnt_permission_denied,
            self.cnt_failed,
            self.cnt_pruned_dirs,
            self.warning_count()
        )
    }

    /// Terminal summary: "Copied N files out of M".
    pub fn format_summary(&self) -> String {
        format!(
            "Copied {} files out of {}",
            self.cnt_copied, self.cnt_total
        )
    }
}

impl fmt::Display for ReportCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REPLICATE]"))
    }
}

/// Mutable accumulator for replication statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportCopyBuilder {
    /// See [`ReportCopy::cnt_total`].
    pub cnt_total: u64,
    /// See [`ReportCopy::cnt_visited`].
    pub cnt_visited: u64,
    /// See [`ReportCopy::cnt_copied`].
    pub cnt_copied: u64,
    /// See [`ReportCopy::cnt_skipped_hidden`].
    pub cnt_skipped_hidden: u64,
    /// See [`ReportCopy::cnt_skipped_excluded`].
    pub cnt_skipped_excluded: u64,
    /// See [`ReportCopy::cnt_permission_denied`].
    pub cnt_permission_denied: u64,
    /// See [`ReportCopy::cnt_failed`].
    pub cnt_failed: u64,
    /// See [`ReportCopy::cnt_pruned_dirs`].
    pub cnt_pruned_dirs: u64,
    /// See [`ReportCopy::errors`].
    pub errors: Vec<SpecCopyError>,
    /// See [`ReportCopy::warnings`].
    pub warnings: Vec<String>,
}

impl ReportCopyBuilder {
    /// Start a builder with a fixed progress denominator.
    pub fn with_total(cnt_total: u64) -> Self {
        Self {
            cnt_total,
            ..Self::default()
        }
    }

    /// Record one file outcome. Error outcomes also keep their message.
    pub fn add_outcome(&mut self, path_rel: PathBuf, outcome: EnumCopyOutcome, detail: Option<&str>) {
        self.cnt_visited += 1;
        match outcome {
            EnumCopyOutcome::Copied => self.cnt_copied += 1,
            EnumCopyOutcome::SkippedHidden => self.cnt_skipped_hidden += 1,
            EnumCopyOutcome::SkippedExcluded => self.cnt_skipped_excluded += 1,
            EnumCopyOutcome::SkippedPermissionDenied => self.cnt_permission_denied += 1,
            EnumCopyOutcome::SkippedOtherError => self.cnt_failed += 1,
        }
        if outcome.is_error() {
            self.errors.push(SpecCopyError {
                path: path_rel,
                outcome,
                exception: detail.unwrap_or_default().to_string(),
            });
        }
    }

    /// Increment pruned directory count by one.
    pub fn add_pruned_dir(&mut self) {
        self.cnt_pruned_dirs += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportCopy {
        ReportCopy {
            cnt_total: self.cnt_total,
            cnt_visited: self.cnt_visited,
            cnt_copied: self.cnt_copied,
            cnt_skipped_hidden: self.cnt_skipped_hidden,
            cnt_skipped_excluded: self.cnt_skipped_excluded,
            cnt_permission_denied: self.cnt_permission_denied,
            cnt_failed: self.cnt_failed,
            cnt_pruned_dirs: self.cnt_pruned_dirs,
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportCopy, ReportCopyBuilder};
    use crate::spec::EnumCopyOutcome;

    #[test]
    fn report_copy_to_dict_and_format() {
        let report = ReportCopy {
            cnt_total: 8,
            cnt_visited: 7,
            cnt_copied: 3,
            cnt_skipped_hidden: 1,
            cnt_skipped_excluded: 2,
            cnt_permission_denied: 1,
            cnt_failed: 0,
            cnt_pruned_dirs: 1,
            warnings: vec!["w".to_string()],
            errors: vec![],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["cnt_total"], 8);
        assert_eq!(dict_counts["cnt_copied"], 3);
        assert_eq!(dict_counts["cnt_skipped_excluded"], 2);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[REPLICATE]");
        assert_eq!(
            txt,
            "[REPLICATE] copied=3 total=8 hidden=1 excluded=2 denied=1 failed=0 pruned_dirs=1 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
        assert_eq!(report.format_summary(), "Copied 3 files out of 8");
    }

    #[test]
    fn builder_routes_outcomes_to_counters() {
        let mut builder = ReportCopyBuilder::with_total(5);
        builder.add_outcome(PathBuf::from("a.txt"), EnumCopyOutcome::Copied, None);
        builder.add_outcome(PathBuf::from(".env"), EnumCopyOutcome::SkippedHidden, None);
        builder.add_outcome(PathBuf::from("b.tmp"), EnumCopyOutcome::SkippedExcluded, None);
        builder.add_outcome(
            PathBuf::from("locked.txt"),
            EnumCopyOutcome::SkippedPermissionDenied,
            Some("Permission denied"),
        );
        builder.add_outcome(
            PathBuf::from("fifo"),
            EnumCopyOutcome::SkippedOtherError,
            Some("Not a regular file"),
        );
        builder.add_pruned_dir();

        let report = builder.build();
        assert_eq!(report.cnt_total, 5);
        assert_eq!(report.cnt_visited, 5);
        assert_eq!(report.cnt_copied, 1);
        assert_eq!(report.cnt_skipped_hidden, 1);
        assert_eq!(report.cnt_skipped_excluded, 1);
        assert_eq!(report.cnt_permission_denied, 1);
        assert_eq!(report.cnt_failed, 1);
        assert_eq!(report.cnt_pruned_dirs, 1);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.errors[0].path, PathBuf::from("locked.txt"));
        assert_eq!(report.errors[1].exception, "Not a regular file");
    }
}
