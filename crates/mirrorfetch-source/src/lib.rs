//! Source adapters for mirrorfetch.
//!
//! Each adapter turns a logical file name into an origin URL and hands the
//! download to a shared [`Fetcher`](mirrorfetch_fetch::Fetcher):
//!
//! - [`MirrorSource`] (`gnu`): tries a list of mirrors in order
//! - [`RegistrySource`] (`rubygems`, `gems`): registry archives with a pinned trust store
//! - [`UnicodeSource`] (`unicode`): UCD files, resolving beta names from the index page
//!
//! [`Sources`] looks adapters up by name.

mod adapter;
mod error;
pub mod mirror;
pub mod rubygems;
mod sources;
pub mod unicode;

pub use adapter::{SourceAdapter, SourceRequest};
pub use error::{Error, Result};
pub use mirror::{GNU_MIRRORS, MirrorSource};
pub use rubygems::{RUBYGEMS_DOWNLOADS, RegistrySource};
pub use sources::Sources;
pub use unicode::{UNICODE_PUBLIC, UnicodeSource};
