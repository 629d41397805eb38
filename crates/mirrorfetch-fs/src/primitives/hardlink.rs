use crate::{Error, Result};
use std::path::Path;

/// Create a hard link at `dest` sharing the inode of `src`.
///
/// Fails with the OS error on cross-device links, unsupported filesystems or
/// an already existing `dest`; there is no copy fallback.
pub fn hard_link(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    std::fs::hard_link(src, dest).map_err(|e| Error::Link {
        target: src.to_path_buf(),
        link: dest.to_path_buf(),
        source: e,
    })
}

/// True when both paths resolve to the same file on disk.
pub fn same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (std::fs::metadata(a), std::fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
            _ => false,
        }
    }

    #[cfg(not(unix))]
    {
        match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }
}

/// Move `from` to `to`, creating the parent directories of `to` first.
pub fn rename(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let from = from.as_ref();
    let to = to.as_ref();

    if let Some(parent) = to.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::rename(from, to).map_err(|e| Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source: e,
    })
}
