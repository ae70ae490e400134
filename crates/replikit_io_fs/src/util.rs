use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobMatcher};

use crate::spec::{CopyTreeError, EnumCopyOutcome};

////////////////////////////////////////////////////////////////////////////////
// #region ExtensionMatching

const C_GLOB_META_CHARS: [char; 4] = ['*', '?', '[', '{'];

/// Immutable set of excluded file extensions.
///
/// Plain entries match the suffix after the final `.` of a base name exactly
/// (case-sensitive). Entries with glob metacharacters are matched against the
/// whole base name as `*.<entry>`.
#[derive(Debug, Clone, Default)]
pub struct SpecExtensionExclusions {
    set_literals: BTreeSet<String>,
    l_globs: Vec<GlobMatcher>,
}

impl SpecExtensionExclusions {
    /// Compile raw entries. Entries are trimmed, a leading `.` is dropped and
    /// empty entries are ignored.
    pub fn from_raw<S: AsRef<str>>(entries: &[S]) -> Result<Self, CopyTreeError> {
        let mut set_literals = BTreeSet::new();
        let mut l_globs = Vec::new();

        for entry in entries {
            let c_ext = entry.as_ref().trim();
            let c_ext = c_ext.strip_prefix('.').unwrap_or(c_ext);
            if c_ext.is_empty() {
                continue;
            }

            if c_ext.contains(C_GLOB_META_CHARS) {
                let matcher = Glob::new(&format!("*.{c_ext}"))
                    .map_err(|e| {
                        CopyTreeError::InvalidExclusion(format!(
                            "Invalid extension pattern `{c_ext}`: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_globs.push(matcher);
            } else {
                set_literals.insert(c_ext.to_string());
            }
        }

        Ok(Self {
            set_literals,
            l_globs,
        })
    }

    /// `true` when no entry was supplied.
    pub fn is_empty(&self) -> bool {
        self.set_literals.is_empty() && self.l_globs.is_empty()
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.set_literals.len() + self.l_globs.len()
    }

    /// Decide exclusion for one base file name.
    pub fn is_excluded(&self, name_file: &str) -> bool {
        if let Some(c_ext) = derive_extension(name_file)
            && self.set_literals.contains(c_ext)
        {
            return true;
        }
        self.l_globs.iter().any(|m| m.is_match(name_file))
    }
}

/// Suffix after the final `.`; `None` when the name has no dot.
pub(crate) fn derive_extension(name_file: &str) -> Option<&str> {
    name_file.rsplit_once('.').map(|(_, ext)| ext)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Resolve `path` through its deepest existing ancestor.
///
/// Missing trailing components are re-appended lexically, so a not-yet-created
/// destination still compares equal to the directory it later becomes.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    let path_abs = absolutize_path(path);
    let l_components = path_abs.components().collect::<Vec<_>>();
    for n_head in (1..l_components.len()).rev() {
        let path_head = l_components[..n_head].iter().collect::<PathBuf>();
        let Ok(mut path_resolved) = fs::canonicalize(&path_head) else {
            continue;
        };
        for component in &l_components[n_head..] {
            match component {
                Component::ParentDir => {
                    path_resolved.pop();
                }
                Component::Normal(name) => path_resolved.push(name),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        return path_resolved;
    }
    path_abs
}

fn absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Destination root when it is nested strictly inside the source root.
pub(crate) fn derive_nested_destination(path_dir_src: &Path, path_dir_dst: &Path) -> Option<PathBuf> {
    let path_src_norm = normalize_path(path_dir_src);
    let path_dst_norm = normalize_path(path_dir_dst);
    if path_dst_norm != path_src_norm && path_dst_norm.starts_with(&path_src_norm) {
        return Some(path_dst_norm);
    }
    None
}

/// Mirror a source directory onto the destination root.
pub(crate) fn derive_destination_dir(
    path_dir_cur: &Path,
    path_dir_src: &Path,
    path_dir_dst: &Path,
) -> PathBuf {
    match path_dir_cur.strip_prefix(path_dir_src) {
        Ok(path_rel) if path_rel.as_os_str().is_empty() => path_dir_dst.to_path_buf(),
        Ok(path_rel) => path_dir_dst.join(path_rel),
        Err(_) => path_dir_dst.to_path_buf(),
    }
}

pub(crate) fn is_same_file(path_file_src: &Path, path_file_dst: &Path) -> bool {
    match (fs::canonicalize(path_file_src), fs::canonicalize(path_file_dst)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyPrimitives

/// Map an IO error from the copy step onto a per-file outcome.
pub(crate) fn classify_copy_error(e: &io::Error) -> EnumCopyOutcome {
    match e.kind() {
        io::ErrorKind::PermissionDenied => EnumCopyOutcome::SkippedPermissionDenied,
        _ => EnumCopyOutcome::SkippedOtherError,
    }
}

/// Copy bytes and permission bits, then access/modification times.
///
/// Both handles opened by `fs::copy` are closed before timestamps are set.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    fs::copy(path_file_src, path_file_dst)?;

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use super::{
        SpecExtensionExclusions, classify_copy_error, derive_destination_dir, derive_extension,
        derive_nested_destination, normalize_path,
    };
    use crate::spec::{CopyTreeError, EnumCopyOutcome};

    #[test]
    fn extension_is_suffix_after_final_dot() {
        assert_eq!(derive_extension("a.tar.gz"), Some("gz"));
        assert_eq!(derive_extension("build.tmp"), Some("tmp"));
        assert_eq!(derive_extension("trailing."), Some(""));
        assert_eq!(derive_extension("Makefile"), None);
    }

    #[test]
    fn literal_exclusions_are_case_sensitive() {
        let spec_exclusions = SpecExtensionExclusions::from_raw(&["tmp", " exe "]).expect("compile");
        assert!(spec_exclusions.is_excluded("build.tmp"));
        assert!(spec_exclusions.is_excluded("setup.exe"));
        assert!(!spec_exclusions.is_excluded("BUILD.TMP"));
        assert!(!spec_exclusions.is_excluded("tmp"));
        assert!(!spec_exclusions.is_excluded("notes.tmp.txt"));
    }

    #[test]
    fn literal_matches_final_suffix_only() {
        let spec_exclusions = SpecExtensionExclusions::from_raw(&["tar.gz"]).expect("compile");
        assert!(!spec_exclusions.is_excluded("a.tar.gz"));
        let spec_exclusions = SpecExtensionExclusions::from_raw(&["gz"]).expect("compile");
        assert!(spec_exclusions.is_excluded("a.tar.gz"));
    }

    #[test]
    fn empty_and_dotted_entries_are_normalized() {
        let spec_exclusions =
            SpecExtensionExclusions::from_raw(&["", "  ", ".log"]).expect("compile");
        assert_eq!(spec_exclusions.len(), 1);
        assert!(spec_exclusions.is_excluded("server.log"));
        assert!(!spec_exclusions.is_excluded("trailing."));

        let spec_none = SpecExtensionExclusions::from_raw::<&str>(&[]).expect("compile");
        assert!(spec_none.is_empty());
        assert!(!spec_none.is_excluded("anything.txt"));
    }

    #[test]
    fn wildcard_entries_match_like_shell_patterns() {
        let spec_exclusions = SpecExtensionExclusions::from_raw(&["t?p", "bak*"]).expect("compile");
        assert!(spec_exclusions.is_excluded("a.tmp"));
        assert!(spec_exclusions.is_excluded("a.bak1"));
        assert!(!spec_exclusions.is_excluded("a.txt"));
        assert!(!spec_exclusions.is_excluded("tmp"));
    }

    #[test]
    fn invalid_wildcard_entry_rejected() {
        let err = SpecExtensionExclusions::from_raw(&["[x"]).expect_err("invalid glob must fail");
        assert!(matches!(err, CopyTreeError::InvalidExclusion(_)));
    }

    #[test]
    fn destination_dir_mirrors_relative_path() {
        let src = Path::new("/data/src");
        let dst = Path::new("/backup/dst");
        assert_eq!(derive_destination_dir(src, src, dst), dst);
        assert_eq!(
            derive_destination_dir(&src.join("a/b"), src, dst),
            dst.join("a/b")
        );
    }

    #[test]
    fn missing_path_resolves_through_existing_ancestor() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path_root = std::fs::canonicalize(tmp.path()).expect("canonicalize");
        std::fs::create_dir_all(path_root.join("a")).expect("mkdir");

        let path_missing = tmp.path().join("a").join("..").join("a").join("backup").join("x");
        assert_eq!(normalize_path(&path_missing), path_root.join("a/backup/x"));
    }

    #[test]
    fn missing_destination_with_parent_components_is_nested() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(src.join("a")).expect("mkdir");

        let path_nested = derive_nested_destination(&src, &src.join("a/../backup"))
            .expect("nested destination");
        assert_eq!(
            path_nested,
            std::fs::canonicalize(&src).expect("canonicalize").join("backup")
        );
        assert!(derive_nested_destination(&src, &tmp.path().join("src/..")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn missing_destination_below_symlinked_source_is_nested() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path_real = tmp.path().join("real");
        std::fs::create_dir_all(path_real.join("a")).expect("mkdir");
        let path_link = tmp.path().join("link");
        std::os::unix::fs::symlink(&path_real, &path_link).expect("dir link");

        let path_nested = derive_nested_destination(&path_link, &path_link.join("a/backup"))
            .expect("nested destination");
        assert_eq!(
            path_nested,
            std::fs::canonicalize(&path_real).expect("canonicalize").join("a/backup")
        );
    }

    #[test]
    fn permission_errors_map_to_permission_outcome() {
        let e = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            classify_copy_error(&e),
            EnumCopyOutcome::SkippedPermissionDenied
        );
        let e = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(classify_copy_error(&e), EnumCopyOutcome::SkippedOtherError);
    }
}
