//! Unicode Character Database files, with beta name resolution.
//!
//! During a beta period the published files carry a draft suffix, e.g.
//! `UnicodeData-15.1.0d3.txt`. The exact name is looked up in the
//! directory's `index.html`, which is fetched once per directory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mirrorfetch_fetch::{DownloadOutcome, FetchRequest, Fetcher, HttpClient, StalenessPolicy, under};
use regex::Regex;

use crate::adapter::{SourceAdapter, SourceRequest};
use crate::{Error, Result};

pub const UNICODE_PUBLIC: &str = "https://www.unicode.org/Public/";

/// Directories whose index pages are expected outside a beta period.
const INDEX_EXCEPTIONS: [&str; 2] = ["12.1.0", "emoji/12.0"];

#[derive(Debug, Clone)]
struct IndexState {
    content: String,
    changed: bool,
    outcome: DownloadOutcome,
}

pub struct UnicodeSource<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    base: String,
    index: Mutex<HashMap<String, IndexState>>,
}

impl<C: HttpClient> UnicodeSource<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>) -> Self {
        Self::with_base(fetcher, UNICODE_PUBLIC)
    }

    pub fn with_base(fetcher: Arc<Fetcher<C>>, base: impl Into<String>) -> Self {
        Self {
            fetcher,
            base: base.into(),
            index: Mutex::new(HashMap::new()),
        }
    }

    fn fetch_beta(&self, request: &SourceRequest, dir_part: &str) -> Result<DownloadOutcome> {
        let Some(index) = self.index_for(request, dir_part)? else {
            return Ok(DownloadOutcome::DryRun(under(request.dir.as_deref(), &request.name)));
        };

        let base = file_base(&request.name);
        if base == "." {
            return Ok(index.outcome);
        }

        let pattern = Regex::new(&format!(r"{}(-[0-9.]+d\d+)?\.txt", regex::escape(base)))
            .map_err(|e| Error::IndexParse {
                base: format!("{base}: {e}"),
                index: index.outcome.path().to_path_buf(),
            })?;
        let Some(found) = pattern.find(&index.content) else {
            return Err(Error::IndexParse {
                base: base.to_string(),
                index: index.outcome.path().to_path_buf(),
            });
        };

        let mut fetch = request.fetch_request(format!("{}{}{}", self.base, dir_part, found.as_str()));
        fetch.policy = if index.changed {
            StalenessPolicy::IfNewerThanFile
        } else {
            StalenessPolicy::IfAbsent
        };
        Ok(self.fetcher.download(&fetch)?)
    }

    /// The directory's index page, fetched on first use.
    ///
    /// `None` in a dry run when no index page is available locally.
    fn index_for(&self, request: &SourceRequest, dir_part: &str) -> Result<Option<IndexState>> {
        let mut memo = self.index.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(state) = memo.get(dir_part) {
            return Ok(Some(state.clone()));
        }

        let index_name = format!("{dir_part}index.html");
        let local = under(request.dir.as_deref(), &index_name);
        let previous = mirrorfetch_fs::read(&local).ok();

        let mut fetch = FetchRequest::new(format!("{}{}", self.base, dir_part))
            .name(index_name)
            .policy(StalenessPolicy::IfNewerThanFile)
            .options(request.options.clone().cache_save(false));
        fetch.dir = request.dir.clone();
        let outcome = self.fetcher.download(&fetch)?;

        if request.options.dry_run && !outcome.path().exists() {
            return Ok(None);
        }
        let content = mirrorfetch_fs::read(outcome.path())?;
        let changed = previous.as_deref() != Some(content.as_slice());
        tracing::debug!(dir = dir_part, changed, "loaded Unicode index");

        let state = IndexState {
            content: String::from_utf8_lossy(&content).into_owned(),
            changed,
            outcome,
        };
        memo.insert(dir_part.to_string(), state.clone());
        Ok(Some(state))
    }

    fn fetch_release(&self, request: &SourceRequest, dir_part: &str) -> Result<DownloadOutcome> {
        let index_file = under(request.dir.as_deref(), &format!("{dir_part}index.html"));
        if index_file.exists() && !INDEX_EXCEPTIONS.iter().any(|e| dir_part.starts_with(e)) {
            return Err(Error::ConfigurationConsistency(index_file));
        }
        let fetch = request.fetch_request(format!("{}{}", self.base, request.name));
        Ok(self.fetcher.download(&fetch)?)
    }
}

impl<C: HttpClient> SourceAdapter for UnicodeSource<C> {
    fn name(&self) -> &'static str {
        "unicode"
    }

    fn resolve_and_fetch(&self, request: &SourceRequest) -> Result<DownloadOutcome> {
        let dir_part = dir_part(&request.name);
        if request.unicode_beta.as_deref() == Some("YES") {
            self.fetch_beta(request, dir_part)
        } else {
            self.fetch_release(request, dir_part)
        }
    }
}

/// Everything up to and including the last `/`.
fn dir_part(name: &str) -> &str {
    match name.rfind('/') {
        Some(i) => &name[..=i],
        None => "",
    }
}

/// Last path component without a `.txt` extension.
fn file_base(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    match last.strip_suffix(".txt") {
        Some(stem) if !stem.is_empty() => stem,
        _ => last,
    }
}
