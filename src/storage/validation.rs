//! Path validation
//!
//! Resolves caller-supplied paths against the storage root and rejects
//! anything that would land outside it.
//!
//! Resolution is lexical first, so targets that do not exist yet (uploads,
//! new folders) can still be validated. The longest existing ancestor is then
//! canonicalized, which keeps a symlink inside the tree from carrying the
//! result outside the root.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Canonical directory every operation is confined to.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Open an existing directory as the storage root
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", path.display()),
            ));
        }
        Ok(Self { path })
    }

    /// Create the directory if it is missing, then open it
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Resolves `relative` and any `extra` segments beneath the storage root.
///
/// Both `/` and `\` separate segments. A leading separator is rooted at the
/// storage root rather than the host filesystem. Any `..` that would climb
/// above the root is a containment failure, even if it later descends back
/// in. The result is the root itself or a path strictly below it.
pub fn resolve(
    root: &StorageRoot,
    relative: &str,
    extra: &[&str],
) -> Result<PathBuf, StorageError> {
    let mut joined = root.path().to_path_buf();
    let mut depth = 0usize;

    for input in std::iter::once(relative).chain(extra.iter().copied()) {
        for segment in input.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if depth == 0 {
                        return Err(containment_error(relative, extra));
                    }
                    joined.pop();
                    depth -= 1;
                }
                s if s.contains('\0') => {
                    return Err(StorageError::Validation("path contains NUL byte".into()));
                }
                s => {
                    joined.push(s);
                    depth += 1;
                }
            }
        }
    }

    let resolved = canonicalize_existing(&joined)?;

    // Component-wise: /srv/files-evil does not start with /srv/files
    if !resolved.starts_with(root.path()) {
        return Err(containment_error(relative, extra));
    }

    Ok(resolved)
}

/// Resolves a file inside `relative`, following symlinks all the way.
///
/// Returns the real path and the caller-facing virtual path.
pub fn resolve_and_validate_file_path(
    root: &StorageRoot,
    relative: &str,
    filename: &str,
) -> Result<(PathBuf, String), StorageError> {
    let file_path = resolve(root, relative, &[filename])?;
    validate_leaf_name(relative, filename)?;
    let virtual_file_path = virtual_path(root, &file_path);
    Ok((file_path, virtual_file_path))
}

/// Resolves a directory entry without dereferencing the leaf itself.
///
/// Used where the operation acts on the entry (removing a symlink removes the
/// link, not its target).
pub fn resolve_entry_path(
    root: &StorageRoot,
    relative: &str,
    name: &str,
) -> Result<(PathBuf, String), StorageError> {
    validate_leaf_name(relative, name)?;
    let directory = resolve(root, relative, &[])?;
    let entry_path = directory.join(name);
    let virtual_entry_path = virtual_path(root, &entry_path);
    Ok((entry_path, virtual_entry_path))
}

/// Renders a resolved path relative to the root, e.g. `/2024/q1/report.csv`.
pub fn virtual_path(root: &StorageRoot, path: &Path) -> String {
    let relative = path.strip_prefix(root.path()).unwrap_or(Path::new(""));
    let segments: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", segments.join("/"))
}

/// A leaf is a name, not a path: one normal segment.
fn validate_leaf_name(relative: &str, name: &str) -> Result<(), StorageError> {
    let is_single_segment =
        !name.contains(['/', '\\']) && name != "." && name != ".." && !name.is_empty();
    if !is_single_segment {
        return Err(containment_error(relative, &[name]));
    }
    if name.contains('\0') {
        return Err(StorageError::Validation("path contains NUL byte".into()));
    }
    Ok(())
}

/// Canonicalizes the longest existing prefix of `path` and re-appends the rest.
fn canonicalize_existing(path: &Path) -> Result<PathBuf, StorageError> {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(mut canonical) => {
                for segment in missing.iter().rev() {
                    canonical.push(segment);
                }
                return Ok(canonical);
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(StorageError::Io(e)),
                }
            }
            Err(e) => return Err(StorageError::Io(e)),
        }
    }
}

fn containment_error(relative: &str, extra: &[&str]) -> StorageError {
    let mut input = relative.to_string();
    for segment in extra {
        input.push_str(" + ");
        input.push_str(segment);
    }
    StorageError::Containment(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, StorageRoot) {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::create(dir.path().join("data")).unwrap();
        (dir, root)
    }

    fn assert_containment(result: Result<PathBuf, StorageError>) {
        match result {
            Err(StorageError::Containment(_)) => {}
            other => panic!("expected containment error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_path_is_root() {
        let (_dir, root) = setup();
        assert_eq!(resolve(&root, "", &[]).unwrap(), root.path());
        assert_eq!(resolve(&root, ".", &[]).unwrap(), root.path());
        assert_eq!(resolve(&root, "a/..", &[]).unwrap(), root.path());
    }

    #[test]
    fn test_nested_path_need_not_exist() {
        let (_dir, root) = setup();
        let resolved = resolve(&root, "2024/q1", &["report.csv"]).unwrap();
        assert_eq!(resolved, root.path().join("2024/q1/report.csv"));
        assert!(resolved.starts_with(root.path()));
    }

    #[test]
    fn test_traversal_rejected() {
        let (dir, root) = setup();
        // Target exists: the parent of the root
        assert!(dir.path().exists());
        assert_containment(resolve(&root, "..", &[]));
        assert_containment(resolve(&root, "../..", &[]));
        assert_containment(resolve(&root, "a/../../x", &[]));
        assert_containment(resolve(&root, "../../etc", &["passwd"]));
        assert_containment(resolve(&root, "..\\..\\etc", &[]));
    }

    #[test]
    fn test_climbing_out_and_back_in_is_rejected() {
        let (_dir, root) = setup();
        assert_containment(resolve(&root, "../data/file.txt", &[]));
    }

    #[test]
    fn test_leading_separator_is_rooted_at_storage_root() {
        let (_dir, root) = setup();
        let resolved = resolve(&root, "/etc/passwd", &[]).unwrap();
        assert_eq!(resolved, root.path().join("etc/passwd"));
    }

    #[test]
    fn test_traversal_in_extra_segment_rejected() {
        let (_dir, root) = setup();
        assert_containment(resolve(&root, "", &["../../etc/passwd"]));
        assert_containment(resolve(&root, "docs", &["../../outside"]));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let (_dir, root) = setup();
        match resolve(&root, "a\0b", &[]) {
            Err(StorageError::Validation(_)) => {}
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_path_under_regular_file_resolves() {
        let (_dir, root) = setup();
        fs::write(root.path().join("a.txt"), b"x").unwrap();
        let resolved = resolve(&root, "a.txt/child", &[]).unwrap();
        assert_eq!(resolved, root.path().join("a.txt/child"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_sibling_with_shared_prefix_rejected() {
        let (dir, root) = setup();
        let sibling = dir.path().join("data-evil");
        fs::create_dir_all(&sibling).unwrap();
        std::os::unix::fs::symlink(&sibling, root.path().join("link")).unwrap();

        assert_containment(resolve(&root, "link", &[]));
        assert_containment(resolve(&root, "link/new-file.txt", &[]));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        let (_dir, root) = setup();
        fs::create_dir_all(root.path().join("real")).unwrap();
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("alias")).unwrap();

        let resolved = resolve(&root, "alias", &["x.txt"]).unwrap();
        assert_eq!(resolved, root.path().join("real/x.txt"));
    }

    #[test]
    fn test_file_path_leaf_validation() {
        let (_dir, root) = setup();
        let (path, virtual_path) =
            resolve_and_validate_file_path(&root, "docs", "report.csv").unwrap();
        assert_eq!(path, root.path().join("docs/report.csv"));
        assert_eq!(virtual_path, "/docs/report.csv");

        for bad in ["a/b.txt", "..", ".", "..\\x", "sub/../x.txt"] {
            assert!(matches!(
                resolve_and_validate_file_path(&root, "", bad),
                Err(StorageError::Containment(_))
            ));
        }
    }

    #[test]
    fn test_entry_path_keeps_leaf_name() {
        let (_dir, root) = setup();
        let (path, virtual_path) = resolve_entry_path(&root, "", "notes.txt").unwrap();
        assert_eq!(path, root.path().join("notes.txt"));
        assert_eq!(virtual_path, "/notes.txt");
        assert!(matches!(
            resolve_entry_path(&root, "..", "notes.txt"),
            Err(StorageError::Containment(_))
        ));
    }

    #[test]
    fn test_virtual_path_of_root() {
        let (_dir, root) = setup();
        assert_eq!(virtual_path(&root, root.path()), "/");
    }

    #[test]
    fn test_open_rejects_file_root() {
        let (_dir, root) = setup();
        let file = root.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();
        assert!(StorageRoot::open(&file).is_err());
    }
}
