//! Files mirrored on several hosts, tried in order.

use std::sync::Arc;

use mirrorfetch_fetch::{DownloadOutcome, Fetcher, HttpClient};

use crate::adapter::{SourceAdapter, SourceRequest};
use crate::{Error, Result};

/// Default hosts for GNU `build-aux` files such as `config.guess`.
pub const GNU_MIRRORS: [&str; 2] = [
    "https://raw.githubusercontent.com/autotools-mirror/autoconf/refs/heads/master/build-aux/",
    "https://cdn.jsdelivr.net/gh/gcc-mirror/gcc@master",
];

pub struct MirrorSource<C: HttpClient> {
    fetcher: Arc<Fetcher<C>>,
    mirrors: Vec<String>,
}

impl<C: HttpClient> MirrorSource<C> {
    pub fn new(fetcher: Arc<Fetcher<C>>) -> Self {
        Self::with_mirrors(fetcher, GNU_MIRRORS.iter().map(|m| m.to_string()).collect())
    }

    pub fn with_mirrors(fetcher: Arc<Fetcher<C>>, mirrors: Vec<String>) -> Self {
        Self { fetcher, mirrors }
    }

    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }
}

impl<C: HttpClient> SourceAdapter for MirrorSource<C> {
    fn name(&self) -> &'static str {
        "gnu"
    }

    fn resolve_and_fetch(&self, request: &SourceRequest) -> Result<DownloadOutcome> {
        let Some((last, rest)) = self.mirrors.split_last() else {
            return Err(Error::NoMirrors);
        };

        for prefix in rest {
            match self.fetcher.download(&request.fetch_request(join(prefix, &request.name))) {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    let message = e.to_string();
                    let (headline, detail) = message.split_once('\n').unwrap_or((&message, ""));
                    tracing::warn!("Download failed ({headline}), try another URL\n{detail}");
                }
            }
        }

        Ok(self.fetcher.download(&request.fetch_request(join(last, &request.name)))?)
    }
}

fn join(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_normalizes_slashes() {
        assert_eq!(
            join(GNU_MIRRORS[0], "config.guess"),
            "https://raw.githubusercontent.com/autotools-mirror/autoconf/refs/heads/master/build-aux/config.guess"
        );
        assert_eq!(
            join(GNU_MIRRORS[1], "config.sub"),
            "https://cdn.jsdelivr.net/gh/gcc-mirror/gcc@master/config.sub"
        );
    }
}
