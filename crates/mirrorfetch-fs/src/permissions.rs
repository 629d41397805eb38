use crate::{Error, Result};
use std::fs::File;
use std::path::Path;

/// File modes used for downloaded payloads.
///
/// Payloads start out [`Private`](Self::Private) while they are being written
/// and are switched to a mode derived from their content once complete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PermissionMode {
    /// Owner read/write only.
    ///
    /// On Unix: `0o600`. On Windows: writable.
    #[default]
    Private,

    /// Scripts and binaries.
    ///
    /// On Unix: `0o755`. On Windows: writable.
    Executable,

    /// Plain data files.
    ///
    /// On Unix: `0o644`. On Windows: writable.
    ReadWrite,
}

impl PermissionMode {
    /// Derive the final mode of a payload from its first bytes.
    ///
    /// Anything starting with a `#!` interpreter line is executable.
    pub fn for_content(data: &[u8]) -> Self {
        if data.starts_with(b"#!") {
            Self::Executable
        } else {
            Self::ReadWrite
        }
    }

    pub fn to_unix_mode(self) -> u32 {
        match self {
            Self::Private => 0o600,
            Self::Executable => 0o755,
            Self::ReadWrite => 0o644,
        }
    }

    /// Apply the mode to an open file handle.
    pub fn apply_to_file(self, file: &File, path: &Path) -> Result<()> {
        let map_err = |e: std::io::Error| Error::Write {
            path: path.to_path_buf(),
            source: e,
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(self.to_unix_mode()))
                .map_err(map_err)
        }

        #[cfg(not(unix))]
        {
            // Only a readonly flag exists here; every mode above is writable.
            let mut perms = file.metadata().map_err(map_err)?.permissions();
            perms.set_readonly(false);
            file.set_permissions(perms).map_err(map_err)
        }
    }
}
