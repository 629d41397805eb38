//! Filesystem primitives behind the mirrorfetch download cache.
//!
//! - [`symlink_file`] / [`hard_link`]: the two strategies used to make a
//!   destination path share a cached file
//! - [`link_target`]: relative symlink content for a cache entry
//! - [`write_payload`]: write a downloaded payload with its final mode and mtime
//! - [`PermissionMode`]: modes derived from payload content

mod error;
pub mod permissions;
pub mod primitives;

pub use error::{Error, Result};
pub use permissions::PermissionMode;
pub use primitives::{
    WriteOptions, hard_link, is_dangling_symlink, link_target, read, rename, same_file,
    symlink_file, write_payload,
};
