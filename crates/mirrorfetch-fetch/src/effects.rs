//! Effects layer: network and filesystem side effects behind small seams.

pub mod http;
pub mod link;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use http::{HttpClient, Request, Response};
#[cfg(feature = "reqwest")]
pub use http::{ReqwestClient, Timeouts};
pub use link::{save_link, try_link};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockClient, Reply};
