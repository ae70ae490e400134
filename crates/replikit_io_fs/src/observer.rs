//! Observer contract for per-file outcomes and progress.
//!
//! The replicator reports through an explicitly passed observer instead of
//! process-wide logger or progress-bar state. Every hook has a no-op default,
//! so `()` and [`NoopObserver`] are valid observers.

use std::path::{Path, PathBuf};

use crate::report::ReportCopy;
use crate::spec::EnumCopyOutcome;

/// Sink for replication events. All hooks run inline on the walking thread.
pub trait CopyObserver {
    /// Called once before the walk, after the pre-count.
    fn on_start(&mut self, _path_dir_src: &Path, _path_dir_dst: &Path, _n_total: u64) {}

    /// Called once per visited file entry.
    ///
    /// `detail` carries the error text for the two error outcomes.
    fn on_outcome(&mut self, _path_rel: &Path, _outcome: EnumCopyOutcome, _detail: Option<&str>) {}

    /// Called after every file entry regardless of outcome.
    fn on_progress(&mut self, _n_completed: u64, _n_total: u64) {}

    /// Called when a hidden subdirectory is removed from the descent set.
    fn on_prune(&mut self, _path_rel: &Path) {}

    /// Non-fatal traversal trouble (unreadable directory and similar).
    fn on_warning(&mut self, _message: &str) {}

    /// Called once after the walk with the final report.
    fn on_finish(&mut self, _report: &ReportCopy) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CopyObserver for NoopObserver {}

impl CopyObserver for () {}

impl<O: CopyObserver + ?Sized> CopyObserver for &mut O {
    fn on_start(&mut self, path_dir_src: &Path, path_dir_dst: &Path, n_total: u64) {
        (**self).on_start(path_dir_src, path_dir_dst, n_total);
    }

    fn on_outcome(&mut self, path_rel: &Path, outcome: EnumCopyOutcome, detail: Option<&str>) {
        (**self).on_outcome(path_rel, outcome, detail);
    }

    fn on_progress(&mut self, n_completed: u64, n_total: u64) {
        (**self).on_progress(n_completed, n_total);
    }

    fn on_prune(&mut self, path_rel: &Path) {
        (**self).on_prune(path_rel);
    }

    fn on_warning(&mut self, message: &str) {
        (**self).on_warning(message);
    }

    fn on_finish(&mut self, report: &ReportCopy) {
        (**self).on_finish(report);
    }
}

/// Fan-out: both observers receive every event, left first.
impl<A: CopyObserver, B: CopyObserver> CopyObserver for (A, B) {
    fn on_start(&mut self, path_dir_src: &Path, path_dir_dst: &Path, n_total: u64) {
        self.0.on_start(path_dir_src, path_dir_dst, n_total);
        self.1.on_start(path_dir_src, path_dir_dst, n_total);
    }

    fn on_outcome(&mut self, path_rel: &Path, outcome: EnumCopyOutcome, detail: Option<&str>) {
        self.0.on_outcome(path_rel, outcome, detail);
        self.1.on_outcome(path_rel, outcome, detail);
    }

    fn on_progress(&mut self, n_completed: u64, n_total: u64) {
        self.0.on_progress(n_completed, n_total);
        self.1.on_progress(n_completed, n_total);
    }

    fn on_prune(&mut self, path_rel: &Path) {
        self.0.on_prune(path_rel);
        self.1.on_prune(path_rel);
    }

    fn on_warning(&mut self, message: &str) {
        self.0.on_warning(message);
        self.1.on_warning(message);
    }

    fn on_finish(&mut self, report: &ReportCopy) {
        self.0.on_finish(report);
        self.1.on_finish(report);
    }
}

/// Log sink: turns events into `tracing` records.
///
/// INFO for copies and policy skips, ERROR for failed copies.
#[derive(Debug, Default, Clone)]
pub struct TracingObserver {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CopyObserver for TracingObserver {
    fn on_start(&mut self, path_dir_src: &Path, path_dir_dst: &Path, _n_total: u64) {
        self.path_dir_src = path_dir_src.to_path_buf();
        self.path_dir_dst = path_dir_dst.to_path_buf();
        tracing::info!(
            "Starting copy operation from {} to {}",
            path_dir_src.display(),
            path_dir_dst.display()
        );
    }

    fn on_outcome(&mut self, path_rel: &Path, outcome: EnumCopyOutcome, detail: Option<&str>) {
        let path_src = self.path_dir_src.join(path_rel);
        match outcome {
            EnumCopyOutcome::Copied => {
                let path_dir_dst = match path_rel.parent() {
                    Some(parent) => self.path_dir_dst.join(parent),
                    None => self.path_dir_dst.clone(),
                };
                tracing::info!(
                    "Copied: {} to {}",
                    path_src.display(),
                    path_dir_dst.display()
                );
            }
            EnumCopyOutcome::SkippedHidden => {
                tracing::info!("Skipped hidden file: {}", path_src.display());
            }
            EnumCopyOutcome::SkippedExcluded => {
                tracing::info!("Skipped excluded file type: {}", path_src.display());
            }
            EnumCopyOutcome::SkippedPermissionDenied => {
                tracing::error!("Access Denied: {}. Skipping...", path_src.display());
            }
            EnumCopyOutcome::SkippedOtherError => {
                tracing::error!(
                    "Error copying {}: {}",
                    path_src.display(),
                    detail.unwrap_or("unknown error")
                );
            }
        }
    }

    fn on_prune(&mut self, path_rel: &Path) {
        tracing::debug!(
            "Pruned hidden directory: {}",
            self.path_dir_src.join(path_rel).display()
        );
    }

    fn on_warning(&mut self, message: &str) {
        tracing::warn!("{message}");
    }

    fn on_finish(&mut self, report: &ReportCopy) {
        tracing::info!("{}", report.format_summary());
    }
}
