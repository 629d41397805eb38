use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A single GET request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// PEM files to trust for this request in addition to the default roots.
    pub ca_certs: Vec<PathBuf>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn ca_certs(mut self, certs: Vec<PathBuf>) -> Self {
        self.ca_certs = certs;
        self
    }

    /// Value of the named header, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    /// Raw `Last-Modified` header.
    pub last_modified: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Turn anything but 2xx and 304 into [`Error::Http`].
    pub fn error_for_status(self) -> Result<Self> {
        if (200..300).contains(&self.status) || self.status == 304 {
            Ok(self)
        } else {
            Err(Error::Http {
                status: self.status,
                reason: self.reason,
            })
        }
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == 304
    }
}

/// Blocking HTTP client abstraction.
///
/// Implementations follow redirects themselves and map transport failures
/// to the matching [`Error`] kind. Any received status is returned as a
/// [`Response`]; status handling is left to the caller.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - `MockClient`: scripted responses for tests (feature `mock`)
pub trait HttpClient: Send + Sync {
    fn get(&self, request: &Request) -> Result<Response>;
}

impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    fn get(&self, request: &Request) -> Result<Response> {
        (**self).get(request)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, request: &Request) -> Result<Response> {
        (**self).get(request)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use reqwest::blocking::{Client, ClientBuilder};
    use reqwest::header::{ACCEPT_ENCODING, LAST_MODIFIED};

    use super::*;

    /// Request timeouts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Timeouts {
        pub connect: Duration,
        /// Limit for the whole request, body included. Expiry is reported as
        /// a read timeout and retried from the start.
        pub total: Duration,
    }

    impl Default for Timeouts {
        fn default() -> Self {
            Self {
                connect: Duration::from_secs(30),
                total: Duration::from_secs(600),
            }
        }
    }

    /// Root certificates a client trusts.
    enum TrustRoots {
        BuiltIn,
        /// Only these roots; the built-in store is off.
        Pinned(Vec<reqwest::Certificate>),
    }

    impl TrustRoots {
        fn load(ca_certs: &[PathBuf]) -> Result<Self> {
            if ca_certs.is_empty() {
                return Ok(Self::BuiltIn);
            }
            let mut certs = Vec::with_capacity(ca_certs.len());
            for path in ca_certs {
                let pem = std::fs::read(path).map_err(|e| Error::Certificate {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| Error::Certificate {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                certs.push(cert);
            }
            Ok(Self::Pinned(certs))
        }

        fn uses_built_in(&self) -> bool {
            matches!(self, Self::BuiltIn)
        }

        fn apply(self, builder: ClientBuilder) -> ClientBuilder {
            match self {
                Self::BuiltIn => builder,
                Self::Pinned(certs) => certs
                    .into_iter()
                    .fold(builder.tls_built_in_root_certs(false), |b, cert| {
                        b.add_root_certificate(cert)
                    }),
            }
        }
    }

    /// Production HTTP client implementation using blocking reqwest.
    ///
    /// One underlying client is built per distinct trust store. A request
    /// carrying certificates trusts only those.
    pub struct ReqwestClient {
        timeouts: Timeouts,
        clients: Mutex<HashMap<Vec<PathBuf>, Client>>,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            Self::with_timeouts(Timeouts::default())
        }

        pub fn with_timeouts(timeouts: Timeouts) -> Result<Self> {
            let this = Self {
                timeouts,
                clients: Mutex::new(HashMap::new()),
            };
            // Surface TLS backend problems at construction time.
            this.client_for(&[])?;
            Ok(this)
        }

        fn client_for(&self, ca_certs: &[PathBuf]) -> Result<Client> {
            let mut clients = self.clients.lock().unwrap_or_else(|p| p.into_inner());
            if let Some(client) = clients.get(ca_certs) {
                return Ok(client.clone());
            }

            let roots = TrustRoots::load(ca_certs)?;
            let builder = Client::builder()
                .user_agent(concat!("mirrorfetch/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(self.timeouts.connect)
                .timeout(self.timeouts.total);
            let client = roots.apply(builder).build().map_err(|e| match ca_certs.first() {
                Some(path) => Error::Certificate {
                    path: path.clone(),
                    message: error_chain(&e),
                },
                None => map_error(e),
            })?;
            clients.insert(ca_certs.to_vec(), client.clone());
            Ok(client)
        }
    }

    impl HttpClient for ReqwestClient {
        fn get(&self, request: &Request) -> Result<Response> {
            let client = self.client_for(&request.ca_certs)?;
            let mut builder = client.get(&request.url).header(ACCEPT_ENCODING, "identity");
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            let response = builder.send().map_err(map_error)?;
            let status = response.status();
            let last_modified = response
                .headers()
                .get(LAST_MODIFIED)
                .map(|v| {
                    v.to_str()
                        .map(str::to_string)
                        .map_err(|e| Error::MalformedHeader(format!("Last-Modified: {e}")))
                })
                .transpose()?;
            let body = response.bytes().map_err(map_error)?.to_vec();

            Ok(Response {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                last_modified,
                body,
            })
        }
    }

    fn map_error(err: reqwest::Error) -> Error {
        let message = error_chain(&err);
        if err.is_builder() {
            return Error::InvalidUrl(message);
        }
        if err.is_timeout() {
            return if err.is_connect() {
                Error::OpenTimeout(message)
            } else {
                Error::ReadTimeout(message)
            };
        }
        if let Some(io) = find_io_error(&err)
            && io.kind() == std::io::ErrorKind::TimedOut
        {
            return Error::ConnectTimeout(message);
        }
        if err.is_connect() {
            let lower = message.to_ascii_lowercase();
            if lower.contains("dns error") || lower.contains("failed to lookup address") {
                return Error::Resolve(message);
            }
        }
        Error::Socket(message)
    }

    fn find_io_error(err: &reqwest::Error) -> Option<&std::io::Error> {
        let mut source = std::error::Error::source(err);
        while let Some(e) = source {
            if let Some(io) = e.downcast_ref::<std::io::Error>() {
                return Some(io);
            }
            source = e.source();
        }
        None
    }

    fn error_chain(err: &reqwest::Error) -> String {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(e) = source {
            message.push_str(": ");
            message.push_str(&e.to_string());
            source = e.source();
        }
        message
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ReqwestClient, Timeouts};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let ok = Response {
            status: 200,
            reason: "OK".into(),
            last_modified: None,
            body: b"x".to_vec(),
        };
        assert!(ok.clone().error_for_status().is_ok());

        let not_modified = Response { status: 304, ..ok.clone() };
        assert!(not_modified.error_for_status().unwrap().is_not_modified());

        let missing = Response {
            status: 404,
            reason: "Not Found".into(),
            ..ok
        };
        let err = missing.error_for_status().unwrap_err();
        assert_eq!(err.to_string(), "404 Not Found");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = Request::get("https://example.com/").header("If-Modified-Since", "x");
        assert_eq!(request.header_value("if-modified-since"), Some("x"));
        assert_eq!(request.header_value("etag"), None);
    }
}
