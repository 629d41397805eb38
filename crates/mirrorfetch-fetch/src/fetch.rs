//! Fetch layer: the conditional download engine.

mod conditional;

pub use conditional::Fetcher;
