use std::path::PathBuf;

use clap::Parser;
use mirrorfetch_fetch::StalenessPolicy;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "mirrorfetch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Download or update mirrored build files",
    long_about = None
)]
pub struct App {
    /// Download into the directory
    #[arg(short = 'd', long = "destdir", value_name = "DIRECTORY")]
    pub destdir: Option<PathBuf>,

    /// Strip directory names from the name to download, and add the prefix instead
    #[arg(short = 'p', long = "prefix")]
    pub prefix: Option<String>,

    /// Skip already existent files
    #[arg(
        short = 'e',
        long = "exist",
        visible_alias = "non-existent-only",
        overrides_with_all = ["always", "update"]
    )]
    pub exist: bool,

    /// Download all files
    #[arg(short = 'a', long = "always", overrides_with_all = ["exist", "update"])]
    pub always: bool,

    /// Download newer files only (default)
    #[arg(
        short = 'u',
        long = "update",
        visible_alias = "if-modified",
        overrides_with_all = ["exist", "always"]
    )]
    pub update: bool,

    /// Do not download actually
    #[arg(short = 'n', long = "dry-run", visible_alias = "dryrun")]
    pub dry_run: bool,

    /// Cache downloaded files in the directory
    #[arg(long = "cache-dir", value_name = "DIRECTORY")]
    pub cache_dir: Option<String>,

    /// Resolve Unicode beta file names when set to YES
    #[arg(long = "unicode-beta", value_name = "VALUE")]
    pub unicode_beta: Option<String>,

    /// Certificates trusted for registry downloads
    #[arg(long = "trust-store", value_name = "DIRECTORY")]
    pub trust_store: Option<PathBuf>,

    /// SOURCE NAME... (gnu, rubygems, gems, unicode) or URL NAME
    #[arg(required = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl App {
    pub fn policy(&self) -> StalenessPolicy {
        if self.exist {
            StalenessPolicy::IfAbsent
        } else if self.always {
            StalenessPolicy::Unconditional
        } else {
            StalenessPolicy::IfNewerThanFile
        }
    }
}
