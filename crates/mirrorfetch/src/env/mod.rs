use std::env;
use std::path::PathBuf;

use mirrorfetch_fetch::{CacheDir, FetchOptions};

use crate::cli::App;

/// Certificates shipped next to the registry client in a source tree.
pub const DEFAULT_TRUST_STORE: &str = "lib/rubygems/ssl_certs";

/// Settings taken from the environment, then overridden by flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cache_dir: CacheDir,
    pub cache_save: bool,
    pub trust_store: PathBuf,
}

impl Config {
    /// Reads `CACHE_DIR` and `CACHE_SAVE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_dir: CacheDir::from_setting(lookup("CACHE_DIR").as_deref()),
            cache_save: lookup("CACHE_SAVE").as_deref() != Some("no"),
            trust_store: PathBuf::from(DEFAULT_TRUST_STORE),
        }
    }

    #[must_use]
    pub fn with_app(mut self, app: &App) -> Self {
        if let Some(dir) = &app.cache_dir {
            self.cache_dir = CacheDir::from_setting(Some(dir));
        }
        if let Some(dir) = &app.trust_store {
            self.trust_store = dir.clone();
        }
        self
    }

    pub fn fetch_options(&self, dry_run: bool) -> FetchOptions {
        FetchOptions::new()
            .cache_dir(self.cache_dir.clone())
            .cache_save(self.cache_save)
            .dry_run(dry_run)
            .verbose(true)
    }
}
