use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// How a download request was satisfied. Failures are the `Err` arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Destination existed and the policy forbids touching it.
    Existing(PathBuf),
    /// Nothing was done, the transfer was only reported.
    DryRun(PathBuf),
    /// Destination now shares the cache entry.
    Linked(PathBuf),
    /// Payload transferred and written; `mtime` is the server's Last-Modified.
    Written {
        path: PathBuf,
        mtime: Option<SystemTime>,
    },
    /// Server answered 304.
    NotModified(PathBuf),
    /// Server answered 4xx and client errors were tolerated.
    SkippedClientError(PathBuf),
    /// Network unusable, the existing destination was kept.
    Stale(PathBuf),
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Existing(p)
            | Self::DryRun(p)
            | Self::Linked(p)
            | Self::NotModified(p)
            | Self::SkippedClientError(p)
            | Self::Stale(p) => p,
            Self::Written { path, .. } => path,
        }
    }

    /// Whether a payload was transferred in this call.
    pub fn transferred(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}
