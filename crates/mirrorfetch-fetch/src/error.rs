//! Error types for mirrorfetch-fetch.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("connection timed out: {0}")]
    ConnectTimeout(String),

    #[error("failed to resolve host: {0}")]
    Resolve(String),

    /// A non-success status. Displays like a status line, e.g. `404 Not Found`.
    #[error("{status} {reason}")]
    Http { status: u16, reason: String },

    #[error("read timed out: {0}")]
    ReadTimeout(String),

    #[error("open timed out: {0}")]
    OpenTimeout(String),

    #[error("malformed response header: {0}")]
    MalformedHeader(String),

    #[error("socket error: {0}")]
    Socket(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid HTTP date: {0}")]
    InvalidDate(String),

    #[error("failed to load certificate {path}: {message}")]
    Certificate { path: PathBuf, message: String },

    #[error(transparent)]
    Fs(#[from] mirrorfetch_fs::Error),

    /// Any failure of a single download, labelled with what was being fetched.
    ///
    /// The first line names the logical file, the second line carries the
    /// underlying kind, its message and the URL.
    #[error("failed to download {name}\n{kind}: {source}: {url}")]
    Download {
        name: String,
        url: String,
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Short name of the failure class, used in log lines and wrapped messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectTimeout(_) => "ConnectTimeout",
            Self::Resolve(_) => "Resolve",
            Self::Http { .. } => "HttpError",
            Self::ReadTimeout(_) => "ReadTimeout",
            Self::OpenTimeout(_) => "OpenTimeout",
            Self::MalformedHeader(_) => "MalformedHeader",
            Self::Socket(_) => "SocketError",
            Self::InvalidUrl(_) => "InvalidUrl",
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::InvalidDate(_) => "InvalidDate",
            Self::Certificate { .. } => "CertificateError",
            Self::Fs(_) => "IOError",
            Self::Download { kind, .. } => *kind,
        }
    }

    /// HTTP status of the failure, looking through a download wrapper.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Download { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Timeouts and host/socket failures: the network could not be used at all.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::ConnectTimeout(_)
            | Self::ReadTimeout(_)
            | Self::OpenTimeout(_)
            | Self::Resolve(_)
            | Self::Socket(_) => true,
            Self::Download { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Label a failure with the logical file name and URL it belongs to.
    ///
    /// Already wrapped errors are returned unchanged.
    pub fn into_download(self, name: impl Into<String>, url: impl Into<String>) -> Self {
        if let Self::Download { .. } = self {
            return self;
        }
        Self::Download {
            name: name.into(),
            url: url.into(),
            kind: self.kind(),
            source: Box::new(self),
        }
    }
}

/// Classification of errors worth another attempt.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectTimeout(_)
            | Self::Resolve(_)
            | Self::ReadTimeout(_)
            | Self::OpenTimeout(_)
            | Self::MalformedHeader(_) => true,
            Self::Http { status, .. } => matches!(status, 500 | 502 | 503),
            Self::Download { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
