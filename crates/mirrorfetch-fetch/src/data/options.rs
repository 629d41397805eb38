use std::path::PathBuf;

use crate::core::{CacheDir, DEFAULT_MAX_RETRIES};

/// Per-download behavior switches.
///
/// # Examples
///
/// ```
/// use mirrorfetch_fetch::{CacheDir, FetchOptions};
///
/// let options = FetchOptions::new()
///     .cache_dir(CacheDir::Disabled)
///     .verbose(true)
///     .max_retries(3);
/// assert!(options.cache_save);
/// assert_eq!(options.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Populate the cache from fresh downloads.
    pub cache_save: bool,
    pub cache_dir: CacheDir,
    /// Treat any 4xx response as a skip instead of a failure.
    pub tolerate_client_errors: bool,
    /// Report what would be downloaded without touching the network.
    pub dry_run: bool,
    /// Log progress at info level instead of debug.
    pub verbose: bool,
    /// PEM files trusted in addition to the default roots.
    pub ca_certs: Vec<PathBuf>,
    /// Prefer symbolic links over hard links when sharing cache entries.
    pub symlinks: bool,
    pub max_retries: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache_save: true,
            cache_dir: CacheDir::Default,
            tolerate_client_errors: false,
            dry_run: false,
            verbose: false,
            ca_certs: Vec::new(),
            symlinks: true,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cache_save(mut self, enabled: bool) -> Self {
        self.cache_save = enabled;
        self
    }

    #[must_use]
    pub fn cache_dir(mut self, dir: CacheDir) -> Self {
        self.cache_dir = dir;
        self
    }

    #[must_use]
    pub fn tolerate_client_errors(mut self, enabled: bool) -> Self {
        self.tolerate_client_errors = enabled;
        self
    }

    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    #[must_use]
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    #[must_use]
    pub fn ca_certs(mut self, certs: Vec<PathBuf>) -> Self {
        self.ca_certs = certs;
        self
    }

    #[must_use]
    pub fn symlinks(mut self, enabled: bool) -> Self {
        self.symlinks = enabled;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
