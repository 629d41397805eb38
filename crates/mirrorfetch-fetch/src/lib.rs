//! Conditional HTTP fetching with a shared on-disk download cache.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Requests, options and outcomes
//! - [`core`] - Cache naming, HTTP dates and retry orchestration
//! - [`effects`] - Network and link operations with trait abstraction
//!
//! [`Fetcher`] ties them together: it skips, links from the cache or performs
//! a conditional GET, then writes the payload once and shares it between the
//! cache entry and the requested destination.
//!
//! # Example
//!
//! ```no_run
//! use mirrorfetch_fetch::{FetchRequest, Fetcher, ReqwestClient, StalenessPolicy};
//!
//! let fetcher = Fetcher::new(ReqwestClient::new()?);
//! let request = FetchRequest::new("https://www.unicode.org/Public/UCD/latest/ucd/UnicodeData.txt")
//!     .name("UnicodeData.txt")
//!     .dir("enc/unicode/data")
//!     .policy(StalenessPolicy::IfNewerThanFile);
//! let outcome = fetcher.download(&request)?;
//! println!("{}", outcome.path().display());
//! # Ok::<(), mirrorfetch_fetch::Error>(())
//! ```

/// Progress line: `info` when the caller asked for verbose output, else `debug`.
macro_rules! report {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

pub mod core;
pub mod data;
pub mod effects;
mod error;
mod fetch;

pub use self::core::{CacheDir, DEFAULT_CACHE_DIR, RetryPolicy, cache_file, under};
pub use data::{DownloadOutcome, FetchOptions, FetchRequest, StalenessPolicy};
pub use effects::{HttpClient, Request, Response};
#[cfg(feature = "reqwest")]
pub use effects::{ReqwestClient, Timeouts};
#[cfg(any(test, feature = "mock"))]
pub use effects::{MockClient, Reply};
pub use error::{Error, IsRetryable, Result};
pub use fetch::Fetcher;
