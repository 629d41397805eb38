//! Package archives from the RubyGems registry.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mirrorfetch_fetch::{DownloadOutcome, Fetcher, HttpClient};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::adapter::{SourceAdapter, SourceRequest};
use crate::{Error, Result};

pub const RUBYGEMS_DOWNLOADS: &str = "https://rubygems.org/downloads/";

static GEM_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([^-]*)\.gem$").expect("gem version regex is valid"));

pub struct RegistrySource<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    base: String,
    trust_store: Option<PathBuf>,
}

impl<C: HttpClient> RegistrySource<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>) -> Self {
        Self {
            fetcher,
            base: RUBYGEMS_DOWNLOADS.to_string(),
            trust_store: None,
        }
    }

    /// Trust every `*.pem` file below `dir` for registry downloads.
    #[must_use]
    pub fn trust_store(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trust_store = Some(dir.into());
        self
    }

    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }
}

impl<C: HttpClient> SourceAdapter for RegistrySource<C> {
    fn name(&self) -> &'static str {
        "rubygems"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["gems"]
    }

    fn resolve_and_fetch(&self, request: &SourceRequest) -> Result<DownloadOutcome> {
        let mut fetch = request.fetch_request(format!("{}{}", self.base, request.name));
        if let Some(dir) = &self.trust_store {
            fetch.options.ca_certs = pem_files(dir)?;
        }
        // Pre-release gems get yanked; a missing one is not an error.
        if is_prerelease(&request.name) {
            fetch.options.tolerate_client_errors = true;
        }
        Ok(self.fetcher.download(&fetch)?)
    }
}

/// Whether `<gem>-<version>.gem` carries a pre-release version.
pub fn is_prerelease(name: &str) -> bool {
    GEM_VERSION
        .captures(name)
        .is_some_and(|caps| caps[1].chars().any(|c| c.is_ascii_alphabetic()))
}

/// Every `*.pem` file below `dir`, sorted. A missing directory has none.
pub fn pem_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let trust_error = |message: String| Error::TrustStore {
        path: dir.to_path_buf(),
        message,
    };
    let pattern = format!("{}/**/*.pem", glob::Pattern::escape(&dir.to_string_lossy()));

    let mut files = glob::glob(&pattern)
        .map_err(|e| trust_error(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| trust_error(e.to_string()))?;
    files.sort();
    Ok(files)
}
