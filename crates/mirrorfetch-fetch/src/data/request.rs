use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::FetchOptions;

/// When an existing destination counts as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    /// Always transfer.
    Unconditional,
    /// Never touch an existing destination.
    IfAbsent,
    /// Transfer only if the server copy changed after the given time.
    IfNewer(SystemTime),
    /// Transfer only if the server copy changed after the destination's mtime.
    #[default]
    IfNewerThanFile,
}

impl StalenessPolicy {
    /// Reference time for `If-Modified-Since`, if any.
    pub fn since(&self, file: &Path) -> Option<SystemTime> {
        match self {
            Self::Unconditional => None,
            Self::IfNewer(time) => Some(*time),
            Self::IfAbsent | Self::IfNewerThanFile => {
                fs::metadata(file).and_then(|m| m.modified()).ok()
            }
        }
    }
}

/// One file to download.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// Logical name: destination path relative to `dir` and cache key.
    /// Defaults to the URL's last path segment.
    pub name: Option<String>,
    pub dir: Option<PathBuf>,
    pub policy: StalenessPolicy,
    pub options: FetchOptions,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            dir: None,
            policy: StalenessPolicy::default(),
            options: FetchOptions::default(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: StalenessPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }
}
