use crate::permissions::PermissionMode;
use crate::primitives::symlink::is_dangling_symlink;
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    pub permissions: PermissionMode,
    pub modified: Option<SystemTime>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn permissions(mut self, mode: PermissionMode) -> Self {
        self.permissions = mode;
        self
    }
    pub fn modified(mut self, mtime: Option<SystemTime>) -> Self {
        self.modified = mtime;
        self
    }
}

/// Write a downloaded payload to `path`.
///
/// Parent directories are created and a dangling symlink at `path` is
/// removed first. The payload is staged as a private temporary sibling of the
/// file `path` resolves to, and renamed over it once content, mode and mtime
/// are final. A symlink at `path` keeps pointing at the replaced file; hard
/// links to the old file keep the old content.
pub fn write_payload(path: impl AsRef<Path>, content: &[u8], options: Options) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(parent_dir(path)?).map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;

    if is_dangling_symlink(path) {
        fs::remove_file(path).map_err(|e| Error::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    replace_with(&target, |file, staged| finish(file, staged, content, options))
}

/// Stage a file next to `target`, fill it, then rename it into place.
///
/// `target` is untouched when `fill` fails; the staged file is removed.
fn replace_with(
    target: &Path,
    fill: impl FnOnce(&mut File, &Path) -> Result<()>,
) -> Result<()> {
    let parent = parent_dir(target)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    PermissionMode::Private.apply_to_file(tmp.as_file(), tmp.path())?;
    let tmp_path = tmp.path().to_path_buf();
    fill(tmp.as_file_mut(), &tmp_path)?;

    tmp.persist(target).map_err(|e| Error::Rename {
        from: tmp_path,
        to: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn parent_dir(path: &Path) -> Result<&Path> {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        Some(_) => Ok(Path::new(".")),
        None => Err(Error::NoParent(path.to_path_buf())),
    }
}

fn finish(file: &mut File, path: &Path, content: &[u8], options: Options) -> Result<()> {
    let write_err = |e: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source: e,
    };

    file.write_all(content).map_err(write_err)?;
    file.flush().map_err(write_err)?;
    options.permissions.apply_to_file(file, path)?;
    if let Some(mtime) = options.modified {
        file.set_modified(mtime).map_err(write_err)?;
    }
    Ok(())
}

pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| Error::Read {
        path: path.to_path_buf(),
        source: e,
    })
}
