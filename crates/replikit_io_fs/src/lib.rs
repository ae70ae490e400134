//! `replikit_io_fs` v1:
//! Directory-tree replication engine.
//!
//! Modules:
//! - `copy`     : traversal and per-file replication
//! - `classify` : hidden-entry policies
//! - `observer` : outcome/progress sink contract
//! - `spec`     : enums/options/errors
//! - `report`   : run-time report model
//! - `util`     : extension matching and shared helpers

pub mod classify;
pub mod copy;
pub mod observer;
pub mod report;
pub mod spec;
mod util;

pub use classify::EnumHiddenEntryClassifier;
pub use copy::replicate_tree;
pub use observer::{CopyObserver, NoopObserver, TracingObserver};
pub use report::{ReportCopy, ReportCopyBuilder};
pub use spec::{
    CopyTreeError, EnumCopyOutcome, EnumCopyTotalCountMode, SpecCopyError, SpecCopyOptions,
};
pub use util::SpecExtensionExclusions;
