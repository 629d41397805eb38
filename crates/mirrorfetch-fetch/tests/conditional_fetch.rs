//! End-to-end behavior of the fetcher against an in-process origin.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use mirrorfetch_fetch::core::{format_http_date, parse_http_date};
use mirrorfetch_fetch::{
    CacheDir, DownloadOutcome, Error, FetchOptions, FetchRequest, Fetcher, HttpClient, Request,
    Response, StalenessPolicy,
};
use tempfile::tempdir;

const URL: &str = "https://www.unicode.org/Public/15.1.0/ucd/UnicodeData.txt";

/// Serves one document, honoring `If-Modified-Since`, after an optional run
/// of failing statuses.
struct Origin {
    body: Mutex<Vec<u8>>,
    modified: Mutex<SystemTime>,
    failures: Mutex<Vec<u16>>,
    calls: AtomicUsize,
}

impl Origin {
    fn new(body: &[u8], modified: SystemTime) -> Self {
        Self {
            body: Mutex::new(body.to_vec()),
            modified: Mutex::new(modified),
            failures: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_first(self, statuses: &[u16]) -> Self {
        *self.failures.lock().unwrap() = statuses.to_vec();
        self
    }

    fn update(&self, body: &[u8], modified: SystemTime) {
        *self.body.lock().unwrap() = body.to_vec();
        *self.modified.lock().unwrap() = modified;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for Origin {
    fn get(&self, request: &Request) -> mirrorfetch_fetch::Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            let status = failures.remove(0);
            return Ok(Response {
                status,
                reason: match status {
                    404 => "Not Found",
                    _ => "Service Unavailable",
                }
                .to_string(),
                last_modified: None,
                body: Vec::new(),
            });
        }

        let modified = *self.modified.lock().unwrap();
        if let Some(since) = request.header_value("If-Modified-Since")
            && modified <= parse_http_date(since)?
        {
            return Ok(Response {
                status: 304,
                reason: "Not Modified".to_string(),
                last_modified: None,
                body: Vec::new(),
            });
        }
        Ok(Response {
            status: 200,
            reason: "OK".to_string(),
            last_modified: Some(format_http_date(modified)),
            body: self.body.lock().unwrap().clone(),
        })
    }
}

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn request(dir: &Path, cache: &Path) -> FetchRequest {
    FetchRequest::new(URL)
        .name("15.1.0/ucd/UnicodeData.txt")
        .dir(dir)
        .options(FetchOptions::new().cache_dir(CacheDir::Path(cache.to_path_buf())))
}

#[test]
fn test_unchanged_resource_is_not_modified() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("enc/unicode/data");
    let cache = root.path().join("cache");
    let fetcher = Fetcher::new(Origin::new(b"0000;<control>", at(1_700_000_000)));
    let req = request(&dest_dir, &cache).options(
        FetchOptions::new()
            .cache_dir(CacheDir::Path(cache.clone()))
            .symlinks(false),
    );

    let first = fetcher.download(&req).unwrap();
    let dest = first.path().to_path_buf();
    assert!(first.transferred());
    let before = (fs::read(&dest).unwrap(), mtime(&dest));

    let second = fetcher.download(&req).unwrap();
    assert_eq!(second, DownloadOutcome::NotModified(dest.clone()));
    assert_eq!((fs::read(&dest).unwrap(), mtime(&dest)), before);
    assert_eq!(fetcher.client().calls(), 2);
}

#[test]
fn test_destination_matches_cache_after_write() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let cache = root.path().join("cache");
    let fetcher = Fetcher::new(Origin::new(b"15.1.0", at(1_700_000_000)));

    let outcome = fetcher.download(&request(&dest_dir, &cache)).unwrap();
    let dest = outcome.path().to_path_buf();
    let entry = cache.join("15.1.0/ucd/UnicodeData.txt");
    assert_eq!(dest, dest_dir.join("UnicodeData.txt"));
    assert_eq!(fs::read(&dest).unwrap(), fs::read(&entry).unwrap());

    // A newer upstream version rewrites the shared entry.
    fetcher.client().update(b"15.1.1", at(1_800_000_000));
    let outcome = fetcher.download(&request(&dest_dir, &cache)).unwrap();
    assert!(outcome.transferred());
    assert_eq!(fs::read(&dest).unwrap(), b"15.1.1");
    assert_eq!(fs::read(&entry).unwrap(), b"15.1.1");
}

#[test]
fn test_separate_copy_is_promoted_into_cache() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let cache = root.path().join("cache");
    let entry = cache.join("15.1.0/ucd/UnicodeData.txt");
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(&entry, "old entry").unwrap();
    fs::File::options().write(true).open(&entry).unwrap().set_modified(at(1_000)).unwrap();
    fs::create_dir_all(&dest_dir).unwrap();
    fs::write(dest_dir.join("UnicodeData.txt"), "old copy").unwrap();

    let fetcher = Fetcher::new(Origin::new(b"fresh", at(1_700_000_000)));
    let req = request(&dest_dir, &cache).policy(StalenessPolicy::Unconditional);
    let outcome = fetcher.download(&req).unwrap();

    assert!(outcome.transferred());
    assert_eq!(fs::read(outcome.path()).unwrap(), b"fresh");
    assert_eq!(fs::read(&entry).unwrap(), b"fresh");
}

#[test]
fn test_cache_shared_across_destinations() {
    let root = tempdir().unwrap();
    let cache = root.path().join("cache");
    let fetcher = Fetcher::new(Origin::new(b"shared", at(1_700_000_000)));

    fetcher.download(&request(&root.path().join("a"), &cache)).unwrap();
    let second = fetcher.download(&request(&root.path().join("b"), &cache)).unwrap();

    assert_eq!(second, DownloadOutcome::Linked(root.path().join("b/UnicodeData.txt")));
    assert_eq!(fs::read(second.path()).unwrap(), b"shared");
    assert_eq!(fetcher.client().calls(), 1);
}

#[test]
fn test_if_absent_never_touches_network() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    fs::create_dir_all(&dest_dir).unwrap();
    fs::write(dest_dir.join("UnicodeData.txt"), "local").unwrap();
    let fetcher = Fetcher::new(Origin::new(b"remote", at(1_700_000_000)));
    let req = request(&dest_dir, &root.path().join("cache")).policy(StalenessPolicy::IfAbsent);

    for _ in 0..3 {
        let outcome = fetcher.download(&req).unwrap();
        assert_eq!(outcome, DownloadOutcome::Existing(dest_dir.join("UnicodeData.txt")));
    }
    assert_eq!(fetcher.client().calls(), 0);
    assert_eq!(fs::read(dest_dir.join("UnicodeData.txt")).unwrap(), b"local");
}

static SLEPT_SECS: AtomicU64 = AtomicU64::new(0);

fn record_sleep(d: Duration) {
    SLEPT_SECS.fetch_add(d.as_secs(), Ordering::SeqCst);
}

#[test]
fn test_unavailable_origin_is_retried_with_backoff() {
    let root = tempdir().unwrap();
    let origin = Origin::new(b"after retries", at(1_700_000_000)).failing_first(&[503, 503, 503]);
    let fetcher = Fetcher::new(origin).with_sleep(record_sleep);

    let outcome = fetcher
        .download(&request(&root.path().join("data"), &root.path().join("cache")))
        .unwrap();

    assert_eq!(fs::read(outcome.path()).unwrap(), b"after retries");
    assert_eq!(fetcher.client().calls(), 4);
    assert_eq!(SLEPT_SECS.load(Ordering::SeqCst), 1 + 4 + 9);
}

#[test]
fn test_not_found_is_not_retried() {
    let root = tempdir().unwrap();
    let origin = Origin::new(b"", at(0)).failing_first(&[404]);
    let fetcher = Fetcher::new(origin).with_sleep(|_| panic!("must not sleep"));

    let err = fetcher
        .download(&request(&root.path().join("data"), &root.path().join("cache")))
        .unwrap_err();

    assert!(matches!(err, Error::Download { .. }));
    assert_eq!(err.status(), Some(404));
    assert!(
        err.to_string()
            .starts_with("failed to download 15.1.0/ucd/UnicodeData.txt\nHttpError: 404 ")
    );
    assert_eq!(fetcher.client().calls(), 1);
}

#[test]
fn test_fresh_payload_replaces_newer_cache_entry() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let cache = root.path().join("cache");
    let entry = cache.join("15.1.0/ucd/UnicodeData.txt");
    fs::create_dir_all(entry.parent().unwrap()).unwrap();
    fs::write(&entry, "cached from other mirror").unwrap();
    fs::File::options()
        .write(true)
        .open(&entry)
        .unwrap()
        .set_modified(at(1_800_000_000))
        .unwrap();
    fs::create_dir_all(&dest_dir).unwrap();
    fs::write(dest_dir.join("UnicodeData.txt"), "local copy").unwrap();

    let fetcher = Fetcher::new(Origin::new(b"FRESH", at(1_445_412_480)));
    let req = request(&dest_dir, &cache).policy(StalenessPolicy::Unconditional);
    let outcome = fetcher.download(&req).unwrap();

    assert_eq!(
        outcome,
        DownloadOutcome::Written {
            path: dest_dir.join("UnicodeData.txt"),
            mtime: Some(at(1_445_412_480)),
        }
    );
    assert_eq!(fs::read(outcome.path()).unwrap(), b"FRESH");
    assert_eq!(fs::read(&entry).unwrap(), b"FRESH");
}

#[test]
fn test_hard_linked_destination_is_relinked_after_update() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let cache = root.path().join("cache");
    let entry = cache.join("15.1.0/ucd/UnicodeData.txt");
    let fetcher = Fetcher::new(Origin::new(b"15.1.0", at(1_700_000_000)));
    let req = request(&dest_dir, &cache).options(
        FetchOptions::new()
            .cache_dir(CacheDir::Path(cache.clone()))
            .symlinks(false),
    );

    fetcher.download(&req).unwrap();
    fetcher.client().update(b"15.1.1", at(1_800_000_000));
    let outcome = fetcher.download(&req).unwrap();

    assert!(outcome.transferred());
    assert_eq!(fs::read(outcome.path()).unwrap(), b"15.1.1");
    assert_eq!(fs::read(&entry).unwrap(), b"15.1.1");
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let dest_meta = fs::metadata(outcome.path()).unwrap();
        let entry_meta = fs::metadata(&entry).unwrap();
        assert_eq!(
            (dest_meta.dev(), dest_meta.ino()),
            (entry_meta.dev(), entry_meta.ino())
        );
    }
}

/// Fails every request, after another process has put the destination in place.
struct Flaky {
    dest: std::path::PathBuf,
    error: fn() -> Error,
}

impl HttpClient for Flaky {
    fn get(&self, _request: &Request) -> mirrorfetch_fetch::Result<Response> {
        fs::create_dir_all(self.dest.parent().unwrap()).unwrap();
        fs::write(&self.dest, "written meanwhile").unwrap();
        Err((self.error)())
    }
}

#[test]
fn test_transport_failure_keeps_concurrent_copy() {
    for error in [
        (|| Error::Socket("connection refused".into())) as fn() -> Error,
        || Error::ReadTimeout("operation timed out".into()),
    ] {
        let root = tempdir().unwrap();
        let dest_dir = root.path().join("data");
        let dest = dest_dir.join("UnicodeData.txt");
        let fetcher = Fetcher::new(Flaky {
            dest: dest.clone(),
            error,
        });
        let req = FetchRequest::new(URL)
            .name("15.1.0/ucd/UnicodeData.txt")
            .dir(&dest_dir)
            .policy(StalenessPolicy::IfAbsent)
            .options(FetchOptions::new().cache_dir(CacheDir::Disabled).max_retries(0));

        let outcome = fetcher.download(&req).unwrap();
        assert_eq!(outcome, DownloadOutcome::Stale(dest.clone()));
        assert_eq!(fs::read(&dest).unwrap(), b"written meanwhile");
    }
}

#[test]
fn test_transport_failure_with_update_policy_is_an_error() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let fetcher = Fetcher::new(Flaky {
        dest: dest_dir.join("UnicodeData.txt"),
        error: || Error::Socket("connection refused".into()),
    });
    let req = FetchRequest::new(URL)
        .name("15.1.0/ucd/UnicodeData.txt")
        .dir(&dest_dir)
        .options(FetchOptions::new().cache_dir(CacheDir::Disabled));

    let err = fetcher.download(&req).unwrap_err();
    assert_eq!(err.kind(), "SocketError");
}

#[cfg(unix)]
#[test]
fn test_dangling_destination_symlink_is_replaced() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let dest = dest_dir.join("UnicodeData.txt");
    fs::create_dir_all(&dest_dir).unwrap();
    std::os::unix::fs::symlink("../removed/UnicodeData.txt", &dest).unwrap();

    let fetcher = Fetcher::new(Origin::new(b"fresh", at(1_700_000_000)));
    let req = FetchRequest::new(URL)
        .name("15.1.0/ucd/UnicodeData.txt")
        .dir(&dest_dir)
        .options(FetchOptions::new().cache_dir(CacheDir::Disabled));
    let outcome = fetcher.download(&req).unwrap();

    assert!(outcome.transferred());
    assert!(!dest.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(fs::read(&dest).unwrap(), b"fresh");
    assert!(!root.path().join("removed").exists());
}

#[cfg(unix)]
#[test]
fn test_link_to_removed_cache_entry_is_restored() {
    let root = tempdir().unwrap();
    let dest_dir = root.path().join("data");
    let cache = root.path().join("cache");
    let fetcher = Fetcher::new(Origin::new(b"first", at(1_700_000_000)));

    let first = fetcher.download(&request(&dest_dir, &cache)).unwrap();
    let dest = first.path().to_path_buf();
    assert!(dest.symlink_metadata().unwrap().file_type().is_symlink());
    fs::remove_dir_all(&cache).unwrap();

    fetcher.client().update(b"second", at(1_800_000_000));
    let outcome = fetcher.download(&request(&dest_dir, &cache)).unwrap();

    assert!(outcome.transferred());
    assert_eq!(fs::read(&dest).unwrap(), b"second");
    assert_eq!(fs::read(cache.join("15.1.0/ucd/UnicodeData.txt")).unwrap(), b"second");
}

static EXHAUSTED_SLEEP_SECS: AtomicU64 = AtomicU64::new(0);

#[test]
fn test_retries_stop_at_default_ceiling() {
    let root = tempdir().unwrap();
    let origin = Origin::new(b"never served", at(1_700_000_000)).failing_first(&[503; 12]);
    let fetcher = Fetcher::new(origin).with_sleep(|d| {
        EXHAUSTED_SLEEP_SECS.fetch_add(d.as_secs(), Ordering::SeqCst);
    });

    let err = fetcher
        .download(&request(&root.path().join("data"), &root.path().join("cache")))
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(fetcher.client().calls(), 11);
    assert_eq!(
        EXHAUSTED_SLEEP_SECS.load(Ordering::SeqCst),
        (1..=10).map(|n| n * n).sum::<u64>()
    );
}
