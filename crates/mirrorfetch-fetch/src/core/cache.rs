//! Where downloads live in the shared cache.

use std::path::{Path, PathBuf};

use url::Url;

/// Cache directory used when none is configured, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".downloaded-cache";

/// Cache root selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheDir {
    /// [`DEFAULT_CACHE_DIR`].
    #[default]
    Default,
    /// No caching at all.
    Disabled,
    Path(PathBuf),
}

impl CacheDir {
    /// Interpret a configured value: empty means default.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::Path(PathBuf::from(v)),
            _ => Self::Default,
        }
    }

    pub fn root(&self) -> Option<PathBuf> {
        match self {
            Self::Default => Some(PathBuf::from(DEFAULT_CACHE_DIR)),
            Self::Disabled => None,
            Self::Path(p) => Some(p.clone()),
        }
    }
}

/// Cache path for a download.
///
/// The logical `name` keeps its directory components so that e.g.
/// `15.1.0/ucd/UnicodeData.txt` and `16.0.0/ucd/UnicodeData.txt` never share
/// an entry. Without a name the URL's last path segment is used.
pub fn cache_file(url: &Url, name: Option<&str>, cache_dir: &CacheDir) -> Option<PathBuf> {
    let root = cache_dir.root()?;
    let name = match name {
        Some(n) => n.to_string(),
        None => url_basename(url),
    };
    Some(root.join(relative_name(&name)))
}

/// Last path segment of a URL, `index.html` for a bare directory.
pub fn url_basename(url: &Url) -> String {
    url.path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("index.html")
        .to_string()
}

/// `dir/basename(name)` when `dir` is set, otherwise `name` unchanged.
pub fn under(dir: Option<&Path>, name: &str) -> PathBuf {
    match dir {
        Some(dir) => dir.join(basename(name)),
        None => PathBuf::from(name),
    }
}

fn basename(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}

fn relative_name(name: &str) -> &str {
    let mut name = name;
    while let Some(rest) = name.strip_prefix("./").or_else(|| name.strip_prefix('/')) {
        name = rest;
    }
    name
}
