//! Core layer: cache naming, HTTP dates and retry orchestration.

pub mod cache;
pub mod httpdate;
pub mod retry;

pub use cache::{CacheDir, DEFAULT_CACHE_DIR, cache_file, under, url_basename};
pub use httpdate::{format_http_date, parse_http_date};
pub use retry::{DEFAULT_MAX_RETRIES, RetryPolicy, retry_delay};
