use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] mirrorfetch_fetch::Error),

    #[error(transparent)]
    Fs(#[from] mirrorfetch_fs::Error),

    /// The beta file name could not be found in a directory listing.
    #[error("no file matching {base} in index {index}")]
    IndexParse { base: String, index: PathBuf },

    /// Beta leftovers found while fetching released data.
    #[error(
        "Although Unicode is not in beta, file {0} exists. Remove all files in this directory \
         and in .downloaded-cache/ because they may be leftovers from the beta period."
    )]
    ConfigurationConsistency(PathBuf),

    #[error("failed to read trust store {path}: {message}")]
    TrustStore { path: PathBuf, message: String },

    #[error("no mirrors configured")]
    NoMirrors,
}
