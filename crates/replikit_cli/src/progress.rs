//! Console progress bar driven by replication events.

use std::path::Path;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use replikit_io_fs::{CopyObserver, ReportCopy};

const C_PROGRESS_TEMPLATE: &str =
    "{percent:>3}%|{wide_bar}| {pos}/{len} [{elapsed_precise}<{eta_precise}, {per_sec}]";

/// Observer rendering a file-count progress bar on stderr.
pub struct ProgressObserver {
    draw_target: Option<ProgressDrawTarget>,
    bar: Option<ProgressBar>,
}

impl ProgressObserver {
    /// `if_enabled = false` gives an observer that draws nothing.
    pub fn new(if_enabled: bool) -> Self {
        Self {
            draw_target: if_enabled.then(ProgressDrawTarget::stderr),
            bar: None,
        }
    }

    /// Bar that tracks position without drawing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            draw_target: Some(ProgressDrawTarget::hidden()),
            bar: None,
        }
    }

    /// Current `(position, length)`, once started.
    #[cfg(test)]
    pub fn position(&self) -> Option<(u64, u64)> {
        self.bar
            .as_ref()
            .map(|bar| (bar.position(), bar.length().unwrap_or_default()))
    }
}

impl CopyObserver for ProgressObserver {
    fn on_start(&mut self, _path_dir_src: &Path, _path_dir_dst: &Path, n_total: u64) {
        let Some(draw_target) = self.draw_target.take() else {
            return;
        };
        let style = ProgressStyle::with_template(C_PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = ProgressBar::with_draw_target(Some(n_total), draw_target).with_style(style);
        self.bar = Some(bar);
    }

    fn on_progress(&mut self, n_completed: u64, n_total: u64) {
        let Some(bar) = &self.bar else {
            return;
        };
        // The unpruned pre-count can undershoot if the tree grows mid-run.
        bar.set_length(n_total.max(n_completed));
        bar.set_position(n_completed);
    }

    fn on_warning(&mut self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.suspend(|| eprintln!("warning: {message}"));
        }
    }

    fn on_finish(&mut self, _report: &ReportCopy) {
        if let Some(bar) = &self.bar {
            bar.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use replikit_io_fs::{CopyObserver, ReportCopy};

    use super::ProgressObserver;

    #[test]
    fn hidden_bar_tracks_progress() {
        let mut observer = ProgressObserver::hidden();
        assert_eq!(observer.position(), None);

        observer.on_start(Path::new("src"), Path::new("dst"), 3);
        observer.on_progress(1, 3);
        observer.on_progress(2, 3);
        assert_eq!(observer.position(), Some((2, 3)));

        observer.on_progress(4, 3);
        assert_eq!(observer.position(), Some((4, 4)));
        observer.on_finish(&ReportCopy::default());
    }

    #[test]
    fn disabled_observer_never_creates_bar() {
        let mut observer = ProgressObserver::new(false);
        observer.on_start(Path::new("src"), Path::new("dst"), 3);
        observer.on_progress(1, 3);
        assert_eq!(observer.position(), None);
    }
}
