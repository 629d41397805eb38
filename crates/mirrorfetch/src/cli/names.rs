//! Mapping of command-line names to logical names and destination directories.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub dir: Option<PathBuf>,
}

/// Resolve a name given on the command line.
///
/// Without a prefix the name is used as is under `destdir`. With one, a
/// name inside `destdir` keeps its sub-directories (which move into the
/// destination directory), anything else is reduced to its file name, and
/// the prefix is prepended.
pub fn resolve(name: &str, destdir: Option<&Path>, prefix: Option<&str>) -> Target {
    let Some(prefix) = prefix else {
        return Target {
            name: name.to_string(),
            dir: destdir.map(Path::to_path_buf),
        };
    };

    let name = name.strip_prefix("./").unwrap_or(name);
    let mut dir = destdir.map(Path::to_path_buf);
    let inner = destdir.and_then(|destdir| {
        let destdir = destdir.to_string_lossy();
        let destdir = destdir.strip_prefix("./").unwrap_or(&destdir);
        name.strip_prefix(destdir)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
    });

    let name = match inner {
        Some(rest) => {
            if let Some((sub, _)) = rest.rsplit_once('/') {
                dir = dir.map(|d| d.join(sub));
            }
            rest
        }
        None => basename(name).to_string(),
    };

    Target {
        name: format!("{prefix}/{name}"),
        dir,
    }
}

fn basename(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
