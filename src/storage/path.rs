//! Lexical root containment
//!
//! Client-supplied names are joined under the root without touching the
//! filesystem, so the check also covers files that do not exist yet.

use std::path::{Component, Path, PathBuf};

use super::StorageError;

/// Join `relative` under `root`, refusing anything that would land outside it.
///
/// Absolute paths, drive prefixes and `..` components that climb above the
/// root are rejected; `.` components are dropped. A `..` that stays inside
/// the root (`a/../b`) is folded away.
pub fn join_within(root: &Path, relative: &str) -> Result<PathBuf, StorageError> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(StorageError::OutsideRoot(relative.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::OutsideRoot(relative.to_string()));
            }
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(parts);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let root = Path::new("/srv/files");
        assert_eq!(
            join_within(root, "a.txt").unwrap(),
            Path::new("/srv/files/a.txt")
        );
    }

    #[test]
    fn test_inner_parent_is_folded() {
        let root = Path::new("/srv/files");
        assert_eq!(
            join_within(root, "./sub/../b.txt").unwrap(),
            Path::new("/srv/files/b.txt")
        );
    }

    #[test]
    fn test_escapes_rejected() {
        let root = Path::new("/srv/files");
        for name in ["../secret", "a/../../secret", "/etc/passwd", ".."] {
            assert!(
                matches!(join_within(root, name), Err(StorageError::OutsideRoot(_))),
                "expected {name} to be rejected"
            );
        }
    }

    #[test]
    fn test_empty_resolves_to_root() {
        let root = Path::new("/srv/files");
        assert_eq!(join_within(root, "").unwrap(), root);
    }
}
