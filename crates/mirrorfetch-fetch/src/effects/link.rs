//! Sharing cache entries with destinations.
//!
//! Failures here are never fatal: a destination that cannot be linked is
//! simply downloaded or left as its own copy.

use std::fs;
use std::path::Path;

use mirrorfetch_fs::{hard_link, link_target, rename, same_file, symlink_file};

use crate::data::FetchOptions;

/// Make `dest` share the existing cache entry.
///
/// A symbolic link is tried first when enabled, then a hard link. Returns
/// whether `dest` now refers to the cache entry.
pub fn try_link(cache: Option<&Path>, dest: &Path, name: &str, options: &FetchOptions) -> bool {
    let Some(cache) = cache else {
        return false;
    };
    if !cache.exists() {
        return false;
    }
    if cache == dest {
        return true;
    }
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = fs::create_dir_all(parent);
    }

    if options.symlinks {
        match symlink_file(link_target(cache, dest), dest) {
            Ok(()) => {
                report!(options.verbose, "made symlink {} to {}", name, cache.display());
                return true;
            }
            Err(e) => tracing::debug!(error = %e, "symlink failed, trying hard link"),
        }
    }

    match hard_link(cache, dest) {
        Ok(()) => {
            report!(options.verbose, "made link {} to {}", name, cache.display());
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "hard link failed");
            false
        }
    }
}

/// Move a freshly written destination into the cache and link it back.
///
/// - cache entry is `dest` already: nothing to do
/// - otherwise `dest` takes the cache entry's place, whatever its age
///
/// `dest` is relinked afterwards, falling back to a plain copy.
pub fn save_link(cache: Option<&Path>, dest: &Path, name: &str, options: &FetchOptions) {
    let Some(cache) = cache else {
        return;
    };
    if cache == dest || (cache.exists() && same_file(cache, dest)) {
        return;
    }

    if let Err(e) = rename(dest, cache) {
        tracing::debug!(error = %e, "cannot move {} into cache", name);
        return;
    }
    if !try_link(Some(cache), dest, name, options) {
        copy_back(cache, dest);
    }
}

fn copy_back(cache: &Path, dest: &Path) {
    let copied = fs::copy(cache, dest).and_then(|_| {
        let mtime = fs::metadata(cache)?.modified()?;
        fs::File::options().write(true).open(dest)?.set_modified(mtime)
    });
    if let Err(e) = copied {
        tracing::warn!(error = %e, "cannot restore {} from {}", dest.display(), cache.display());
    }
}
