use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Create a symbolic link at `link` whose content is `target`.
///
/// `target` is stored verbatim, so a relative target is resolved against the
/// directory containing `link`.
pub fn symlink_file(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_file(target, link);

    #[cfg(not(any(unix, windows)))]
    let result = Err(std::io::Error::from(std::io::ErrorKind::Unsupported));

    result.map_err(|e| Error::Link {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}

/// Compute the path to store in a symlink at `link` so that it points to `target`.
///
/// The relative form is preferred. When it cannot be expressed (different
/// drive prefixes) or would be deeper than the absolute path, the absolute
/// path is returned instead.
pub fn link_target(target: &Path, link: &Path) -> PathBuf {
    let abs_target = absolute(target);
    let Some(base) = absolute(link).parent().map(Path::to_path_buf) else {
        return abs_target;
    };

    match relative_path(&abs_target, &base) {
        Some(rel) if rel.components().count() <= abs_target.components().count() => rel,
        _ => abs_target,
    }
}

/// True when `path` is a symlink whose target does not exist.
pub fn is_dangling_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
        && !path.exists()
}

fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&path)
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn relative_path(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_parts = target.components().peekable();
    let mut base_parts = base.components().peekable();

    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (target_parts.peek(), base_parts.peek())
        && a != b
    {
        return None;
    }

    while let (Some(a), Some(b)) = (target_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        target_parts.next();
        base_parts.next();
    }

    let mut rel = PathBuf::new();
    for _ in base_parts {
        rel.push("..");
    }
    for part in target_parts {
        rel.push(part);
    }
    Some(rel)
}
