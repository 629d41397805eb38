//! Scripted in-memory [`HttpClient`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::http::{HttpClient, Request, Response};
use crate::core::parse_http_date;
use crate::error::{Error, Result};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with a body. Honors `If-Modified-Since` when `last_modified` is set.
    Body {
        body: Vec<u8>,
        last_modified: Option<String>,
    },
    Status(u16),
    ConnectTimeout,
    ReadTimeout,
    Unresolvable,
    Refused,
}

impl Reply {
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self::Body {
            body: body.into(),
            last_modified: None,
        }
    }

    pub fn dated(body: impl Into<Vec<u8>>, last_modified: impl Into<String>) -> Self {
        Self::Body {
            body: body.into(),
            last_modified: Some(last_modified.into()),
        }
    }
}

/// Answers requests from per-URL reply queues.
///
/// Replies for a URL are consumed in order; the last one repeats forever.
/// Unknown URLs answer 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct MockClient {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Request>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `url`.
    #[must_use]
    pub fn route(self, url: impl Into<String>, reply: Reply) -> Self {
        self.push(url, reply);
        self
    }

    pub fn push(&self, url: impl Into<String>, reply: Reply) {
        self.routes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .entry(url.into())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<Request> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap_or_else(|p| p.into_inner());
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Status(404)),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Status(404)),
            None => Reply::Status(404),
        }
    }
}

impl HttpClient for MockClient {
    fn get(&self, request: &Request) -> Result<Response> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(request.clone());

        match self.next_reply(&request.url) {
            Reply::Body {
                body,
                last_modified,
            } => {
                if let (Some(lm), Some(since)) =
                    (&last_modified, request.header_value("If-Modified-Since"))
                    && parse_http_date(lm)? <= parse_http_date(since)?
                {
                    return Ok(status(304, last_modified));
                }
                Ok(Response {
                    status: 200,
                    reason: "OK".to_string(),
                    last_modified,
                    body,
                })
            }
            Reply::Status(code) => Ok(status(code, None)),
            Reply::ConnectTimeout => Err(Error::ConnectTimeout(format!("connect to {}", request.url))),
            Reply::ReadTimeout => Err(Error::ReadTimeout(format!("reading {}", request.url))),
            Reply::Unresolvable => Err(Error::Resolve(format!("lookup for {}", request.url))),
            Reply::Refused => Err(Error::Socket("connection refused".to_string())),
        }
    }
}

fn status(code: u16, last_modified: Option<String>) -> Response {
    let reason = match code {
        304 => "Not Modified",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    };
    Response {
        status: code,
        reason: reason.to_string(),
        last_modified,
        body: Vec::new(),
    }
}
