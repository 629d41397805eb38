//! Data layer: requests, options and outcomes of a download.

mod options;
mod outcome;
mod request;

pub use options::FetchOptions;
pub use outcome::DownloadOutcome;
pub use request::{FetchRequest, StalenessPolicy};
