//! Shared helpers reused across modules (e.g., path validation).

use std::path::{Component, Path, PathBuf};

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Join `relative` onto `base` and fold `.`/`..` segments lexically.
///
/// An absolute `relative` replaces `base`, mirroring how manifests may point anywhere.
pub fn resolve_under(base: &Path, relative: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in base.join(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !resolved.pop() {
                    resolved.push(component);
                }
            }
            other => resolved.push(other),
        }
    }
    resolved
}
