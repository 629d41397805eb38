use std::path::PathBuf;
use std::sync::Arc;

use mirrorfetch_fetch::{Fetcher, HttpClient};

use crate::adapter::SourceAdapter;
use crate::mirror::MirrorSource;
use crate::rubygems::RegistrySource;
use crate::unicode::UnicodeSource;

/// Adapters selectable by name.
#[derive(Default)]
pub struct Sources {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    /// The GNU mirror, RubyGems and Unicode adapters sharing one fetcher.
    pub fn standard<C: HttpClient + 'static>(
        fetcher: Arc<Fetcher<C>>,
        trust_store: Option<PathBuf>,
    ) -> Self {
        let mut registry = RegistrySource::new(Arc::clone(&fetcher));
        if let Some(dir) = trust_store {
            registry = registry.trust_store(dir);
        }
        Self::new()
            .with(MirrorSource::new(Arc::clone(&fetcher)))
            .with(registry)
            .with(UnicodeSource::new(fetcher))
    }

    #[must_use]
    pub fn with(mut self, adapter: impl SourceAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Case-insensitive lookup by name or alias.
    pub fn find(&self, name: &str) -> Option<&dyn SourceAdapter> {
        for adapter in &self.adapters {
            if adapter.name().eq_ignore_ascii_case(name)
                || adapter.aliases().iter().any(|a| a.eq_ignore_ascii_case(name))
            {
                return Some(adapter.as_ref());
            }
        }
        None
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.adapters.iter().map(|a| a.name())
    }
}
