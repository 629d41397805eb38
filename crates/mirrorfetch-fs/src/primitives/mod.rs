pub mod atomic_write;
pub mod hardlink;
pub mod symlink;

pub use atomic_write::{Options as WriteOptions, read, write_payload};
pub use hardlink::{hard_link, rename, same_file};
pub use symlink::{is_dangling_symlink, link_target, symlink_file};
