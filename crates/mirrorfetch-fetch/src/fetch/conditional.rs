//! Conditional download into a destination backed by the shared cache.
//!
//! A request either short-circuits (destination kept, dry run, cache hit) or
//! performs one retried GET, optionally with `If-Modified-Since`. Fresh
//! payloads are written once and shared between the cache and the
//! destination through links.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use mirrorfetch_fs::{PermissionMode, WriteOptions, same_file, write_payload};
use url::Url;

use crate::core::{RetryPolicy, cache_file, format_http_date, parse_http_date, under, url_basename};
use crate::data::{DownloadOutcome, FetchOptions, FetchRequest, StalenessPolicy};
use crate::effects::{HttpClient, Request, save_link, try_link};
use crate::error::{Error, Result};

/// The fetch engine shared by every source.
pub struct Fetcher<C: HttpClient> {
    client: C,
    sleep: fn(Duration),
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            sleep: std::thread::sleep,
        }
    }

    /// Replace the function used to wait between retries.
    #[must_use]
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bring the request's destination up to date.
    ///
    /// Every error is wrapped as [`Error::Download`] with the logical name
    /// and the URL.
    pub fn download(&self, request: &FetchRequest) -> Result<DownloadOutcome> {
        let name = match &request.name {
            Some(name) => name.clone(),
            None => Url::parse(&request.url)
                .map(|u| url_basename(&u))
                .unwrap_or_else(|_| request.url.clone()),
        };
        self.fetch(request, &name)
            .map_err(|e| e.into_download(&name, &request.url))
    }

    fn fetch(&self, request: &FetchRequest, name: &str) -> Result<DownloadOutcome> {
        let options = &request.options;
        let url = Url::parse(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let cache = cache_file(&url, Some(name), &options.cache_dir);
        let dest = match (&request.name, &cache) {
            (Some(name), _) => under(request.dir.as_deref(), name),
            (None, Some(cache)) => cache.clone(),
            (None, None) => {
                return Err(Error::InvalidRequest(
                    "no file name given and caching is disabled".to_string(),
                ));
            }
        };

        if request.policy == StalenessPolicy::IfAbsent && dest.exists() {
            report!(options.verbose, "{} already exists", dest.display());
            return Ok(DownloadOutcome::Existing(dest));
        }
        if options.dry_run {
            tracing::info!("Download {} into {}", url, dest.display());
            return Ok(DownloadOutcome::DryRun(dest));
        }
        if try_link(cache.as_deref(), &dest, name, options) {
            return Ok(DownloadOutcome::Linked(dest));
        }

        report!(options.verbose, "downloading {} ...", name);
        let mut http = Request::get(url.as_str()).ca_certs(options.ca_certs.clone());
        if let Some(since) = request.policy.since(&dest) {
            http = http.header("If-Modified-Since", format_http_date(since));
        }

        let retry = RetryPolicy::new(options.max_retries);
        let response = match retry.run_with(self.sleep, || self.client.get(&http)?.error_for_status()) {
            Ok(response) => response,
            Err(e) => return recover(e, request, &url, dest),
        };

        if response.is_not_modified() {
            report!(options.verbose, "{} not modified", name);
            return Ok(DownloadOutcome::NotModified(dest));
        }

        let mtime = response
            .last_modified
            .as_deref()
            .map(parse_http_date)
            .transpose()?;
        persist(&response.body, mtime, cache.as_deref(), &dest, name, options)?;
        report!(options.verbose, "{} done", name);

        Ok(DownloadOutcome::Written { path: dest, mtime })
    }
}

/// Turn a tolerated failure into an outcome, or give it back.
fn recover(err: Error, request: &FetchRequest, url: &Url, dest: PathBuf) -> Result<DownloadOutcome> {
    if request.options.tolerate_client_errors
        && let Some(status) = err.status()
        && (400..500).contains(&status)
    {
        tracing::info!("Ignore {}: {}", url, err);
        return Ok(DownloadOutcome::SkippedClientError(dest));
    }

    if err.is_transport() && request.policy == StalenessPolicy::IfAbsent && dest.exists() {
        match err {
            Error::ConnectTimeout(_) | Error::OpenTimeout(_) | Error::ReadTimeout(_) => {
                tracing::warn!("Request for {} timed out, using old version.", url);
            }
            _ => {
                tracing::warn!(
                    "No network connection, unable to download {}, using old version.",
                    url
                );
            }
        }
        return Ok(DownloadOutcome::Stale(dest));
    }

    Err(err)
}

/// Write a fresh payload and share it between cache and destination.
///
/// The payload goes straight into the cache when the entry does not exist
/// yet and cache saving is on; the destination is then linked to it.
/// Otherwise the destination is written and promoted into the cache.
fn persist(
    body: &[u8],
    mtime: Option<SystemTime>,
    cache: Option<&Path>,
    dest: &Path,
    name: &str,
    options: &FetchOptions,
) -> Result<()> {
    let target = match cache {
        Some(cache) if options.cache_save && !cache.exists() => cache,
        _ => dest,
    };
    let write = WriteOptions::new()
        .permissions(PermissionMode::for_content(body))
        .modified(mtime);
    write_payload(target, body, write)?;

    if target == dest {
        if options.cache_save {
            save_link(cache, dest, name, options);
        }
        return Ok(());
    }

    if same_file(target, dest) || try_link(cache, dest, name, options) {
        return Ok(());
    }
    // An older copy of its own is in the way of the link.
    if dest.symlink_metadata().is_ok() {
        fs::remove_file(dest).map_err(|e| mirrorfetch_fs::Error::Write {
            path: dest.to_path_buf(),
            source: e,
        })?;
        if try_link(cache, dest, name, options) {
            return Ok(());
        }
    }
    write_payload(dest, body, write)?;
    Ok(())
}
