//! Filesystem tree traversal and replication.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::observer::CopyObserver;
use crate::report::{ReportCopy, ReportCopyBuilder};
use crate::spec::{CopyTreeError, EnumCopyOutcome, EnumCopyTotalCountMode, SpecCopyOptions};
use crate::util::{
    classify_copy_error, copy_file_with_metadata, derive_destination_dir,
    derive_nested_destination, is_same_file, normalize_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnumFileKind {
    Regular,
    Symlink,
    Special,
}

#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file_os: OsString,
    name_file: String,
    kind_file: EnumFileKind,
}

#[derive(Debug, Default)]
struct SpecDirListing {
    l_dirs: Vec<SpecDirEntry>,
    l_files: Vec<SpecFileEntry>,
    l_warnings: Vec<String>,
}

struct SpecCopyContext<'a> {
    path_dir_src: PathBuf,
    path_dir_dst: PathBuf,
    path_dir_dst_nested: Option<PathBuf>,
    spec_cp_options: &'a SpecCopyOptions,
    builder_cp_report: ReportCopyBuilder,
    n_completed: u64,
    observer: &'a mut dyn CopyObserver,
}

/// Replicate the tree below `dir_source` into `dir_destination`.
///
/// The walk is single-threaded and top-down. Hidden subdirectories are pruned
/// before descent; every file in a visited directory gets exactly one
/// [`EnumCopyOutcome`], reported to `observer` together with a progress tick.
/// Destination directories are created lazily and idempotently.
///
/// Returns [`CopyTreeError::SourceNotFound`] before touching the destination
/// when the source cannot be enumerated. Every other failure is per-file and
/// ends up in the returned [`ReportCopy`].
pub fn replicate_tree<P, Q, O>(
    dir_source: P,
    dir_destination: Q,
    spec_cp_options: &SpecCopyOptions,
    observer: &mut O,
) -> Result<ReportCopy, CopyTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    O: CopyObserver,
{
    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if let Err(e) = fs::read_dir(&path_dir_src) {
        return Err(CopyTreeError::SourceNotFound {
            path: path_dir_src,
            message: e.to_string(),
        });
    }

    let _span = tracing::info_span!(
        "replicate_tree",
        src = %path_dir_src.display(),
        dst = %path_dir_dst.display()
    )
    .entered();

    let path_dir_dst_nested = derive_nested_destination(&path_dir_src, &path_dir_dst);
    let mut spec_cp_ctx = SpecCopyContext {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst,
        path_dir_dst_nested,
        spec_cp_options,
        builder_cp_report: ReportCopyBuilder::default(),
        n_completed: 0,
        observer,
    };

    let n_total = count_files(&path_dir_src, &spec_cp_ctx);
    tracing::debug!(n_total, "pre-count finished");
    spec_cp_ctx.builder_cp_report.cnt_total = n_total;
    spec_cp_ctx
        .observer
        .on_start(&spec_cp_ctx.path_dir_src, &spec_cp_ctx.path_dir_dst, n_total);

    walk_directory(&path_dir_src, &mut spec_cp_ctx);

    let report = spec_cp_ctx.builder_cp_report.build();
    spec_cp_ctx.observer.on_finish(&report);
    Ok(report)
}

fn read_directory(path_root: &Path) -> Result<SpecDirListing, io::Error> {
    let mut listing = SpecDirListing::default();

    for _entry_res in fs::read_dir(path_root)? {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                listing.l_warnings.push(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_root.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                listing
                    .l_warnings
                    .push(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        let kind_file = if cfg_file_type.is_dir() {
            listing.l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
            });
            continue;
        } else if cfg_file_type.is_symlink() {
            // Directory links are neither followed nor copied.
            if path_entry.is_dir() {
                continue;
            }
            EnumFileKind::Symlink
        } else if cfg_file_type.is_file() {
            EnumFileKind::Regular
        } else {
            EnumFileKind::Special
        };

        let name_file_os = entry.file_name();
        listing.l_files.push(SpecFileEntry {
            path_file_src: path_entry,
            name_file: name_file_os.to_string_lossy().to_string(),
            name_file_os,
            kind_file,
        });
    }

    listing
        .l_dirs
        .sort_by(|a, b| a.path_dir_src_sub.cmp(&b.path_dir_src_sub));
    listing.l_files.sort_by(|a, b| a.name_file_os.cmp(&b.name_file_os));
    Ok(listing)
}

fn is_nested_destination(path_dir: &Path, spec_cp_ctx: &SpecCopyContext<'_>) -> bool {
    match &spec_cp_ctx.path_dir_dst_nested {
        Some(path_nested) => normalize_path(path_dir) == *path_nested,
        None => false,
    }
}

fn count_files(path_root: &Path, spec_cp_ctx: &SpecCopyContext<'_>) -> u64 {
    let Ok(listing) = read_directory(path_root) else {
        return 0;
    };
    let if_prune_hidden =
        spec_cp_ctx.spec_cp_options.rule_total_count == EnumCopyTotalCountMode::Pruned;
    let classifier_hidden = spec_cp_ctx.spec_cp_options.classifier_hidden;

    let mut n_files = listing.l_files.len() as u64;
    for _dir_entry in listing.l_dirs {
        let path_sub = &_dir_entry.path_dir_src_sub;
        if if_prune_hidden && classifier_hidden.is_hidden(path_sub) {
            continue;
        }
        if is_nested_destination(path_sub, spec_cp_ctx) {
            continue;
        }
        n_files += count_files(path_sub, spec_cp_ctx);
    }
    n_files
}

fn derive_relative_path(path: &Path, path_dir_src: &Path) -> PathBuf {
    match path.strip_prefix(path_dir_src) {
        Ok(path_rel) => path_rel.to_path_buf(),
        Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
    }
}

fn record_warning(message: String, spec_cp_ctx: &mut SpecCopyContext<'_>) {
    spec_cp_ctx.observer.on_warning(&message);
    spec_cp_ctx.builder_cp_report.add_warning(message);
}

fn walk_directory(path_root: &Path, spec_cp_ctx: &mut SpecCopyContext<'_>) {
    let listing = match read_directory(path_root) {
        Ok(v) => v,
        Err(e) => {
            record_warning(
                format!("Failed to read directory {} ({e})", path_root.display()),
                spec_cp_ctx,
            );
            return;
        }
    };
    for warning in listing.l_warnings {
        record_warning(warning, spec_cp_ctx);
    }

    let classifier_hidden = spec_cp_ctx.spec_cp_options.classifier_hidden;
    let mut l_dirs_descend = Vec::with_capacity(listing.l_dirs.len());
    for _dir_entry in listing.l_dirs {
        let path_sub = _dir_entry.path_dir_src_sub;
        if classifier_hidden.is_hidden(&path_sub) {
            let path_rel = derive_relative_path(&path_sub, &spec_cp_ctx.path_dir_src);
            spec_cp_ctx.builder_cp_report.add_pruned_dir();
            spec_cp_ctx.observer.on_prune(&path_rel);
            continue;
        }
        if is_nested_destination(&path_sub, spec_cp_ctx) {
            record_warning(
                format!(
                    "Destination inside source skipped: {}",
                    path_sub.display()
                ),
                spec_cp_ctx,
            );
            continue;
        }
        l_dirs_descend.push(path_sub);
    }

    let path_dir_dst_cur =
        derive_destination_dir(path_root, &spec_cp_ctx.path_dir_src, &spec_cp_ctx.path_dir_dst);
    let mut if_dir_dst_ready = false;
    for _file_entry in listing.l_files {
        handle_file_entry(
            _file_entry,
            &path_dir_dst_cur,
            &mut if_dir_dst_ready,
            spec_cp_ctx,
        );
    }

    for path_sub in l_dirs_descend {
        walk_directory(&path_sub, spec_cp_ctx);
    }
}

fn handle_file_entry(
    spec_file_entry: SpecFileEntry,
    path_dir_dst_cur: &Path,
    if_dir_dst_ready: &mut bool,
    spec_cp_ctx: &mut SpecCopyContext<'_>,
) {
    let path_rel = derive_relative_path(&spec_file_entry.path_file_src, &spec_cp_ctx.path_dir_src);
    let (outcome, detail) =
        decide_file_outcome(&spec_file_entry, path_dir_dst_cur, if_dir_dst_ready, spec_cp_ctx);

    spec_cp_ctx
        .builder_cp_report
        .add_outcome(path_rel.clone(), outcome, detail.as_deref());
    spec_cp_ctx
        .observer
        .on_outcome(&path_rel, outcome, detail.as_deref());

    spec_cp_ctx.n_completed += 1;
    let n_total = spec_cp_ctx.builder_cp_report.cnt_total;
    spec_cp_ctx
        .observer
        .on_progress(spec_cp_ctx.n_completed, n_total);
}

fn decide_file_outcome(
    spec_file_entry: &SpecFileEntry,
    path_dir_dst_cur: &Path,
    if_dir_dst_ready: &mut bool,
    spec_cp_ctx: &SpecCopyContext<'_>,
) -> (EnumCopyOutcome, Option<String>) {
    let spec_cp_options = spec_cp_ctx.spec_cp_options;
    let path_file_src = &spec_file_entry.path_file_src;

    if spec_cp_options.classifier_hidden.is_hidden(path_file_src) {
        return (EnumCopyOutcome::SkippedHidden, None);
    }
    if spec_cp_options
        .spec_exclusions
        .is_excluded(&spec_file_entry.name_file)
    {
        return (EnumCopyOutcome::SkippedExcluded, None);
    }
    if spec_file_entry.kind_file == EnumFileKind::Special {
        return (
            EnumCopyOutcome::SkippedOtherError,
            Some(format!("Not a regular file: {}", path_file_src.display())),
        );
    }

    if !*if_dir_dst_ready {
        if let Err(e) = fs::create_dir_all(path_dir_dst_cur) {
            return (
                EnumCopyOutcome::SkippedOtherError,
                Some(format!(
                    "Failed to create directory {} ({e})",
                    path_dir_dst_cur.display()
                )),
            );
        }
        *if_dir_dst_ready = true;
    }

    let path_file_dst = path_dir_dst_cur.join(&spec_file_entry.name_file_os);
    if is_same_file(path_file_src, &path_file_dst) {
        return (
            EnumCopyOutcome::SkippedOtherError,
            Some(format!(
                "{} and {} are the same file",
                path_file_src.display(),
                path_file_dst.display()
            )),
        );
    }

    match copy_file_with_metadata(path_file_src, &path_file_dst) {
        Ok(()) => (EnumCopyOutcome::Copied, None),
        Err(e) => (classify_copy_error(&e), Some(e.to_string())),
    }
}
