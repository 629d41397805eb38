use std::path::PathBuf;

use mirrorfetch_fetch::{DownloadOutcome, FetchOptions, FetchRequest, StalenessPolicy};

use crate::Result;

/// A named download strategy layered over the shared fetcher.
pub trait SourceAdapter {
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Compute the origin for `request.name` and bring it up to date.
    fn resolve_and_fetch(&self, request: &SourceRequest) -> Result<DownloadOutcome>;
}

/// A logical file to fetch from a source.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    /// Path relative to the source's root, e.g. `15.1.0/ucd/UnicodeData.txt`.
    pub name: String,
    pub dir: Option<PathBuf>,
    pub policy: StalenessPolicy,
    pub options: FetchOptions,
    /// Unicode beta switch; only `YES` enables beta resolution.
    pub unicode_beta: Option<String>,
}

impl SourceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: None,
            policy: StalenessPolicy::default(),
            options: FetchOptions::default(),
            unicode_beta: None,
        }
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

    #[must_use]
    pub fn unicode_beta(mut self, value: impl Into<String>) -> Self {
        self.unicode_beta = Some(value.into());
        self
    }

    /// Fetch request for `url`, keeping this request's name, directory,
    /// policy and options.
    pub(crate) fn fetch_request(&self, url: impl Into<String>) -> FetchRequest {
        let mut request = FetchRequest::new(url)
            .name(self.name.clone())
            .policy(self.policy)
            .options(self.options.clone());
        request.dir = self.dir.clone();
        request
    }
}
