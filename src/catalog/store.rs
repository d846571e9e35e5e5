//! Read-only catalog snapshots and the reload-swap store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::{Entry, EntrySummary};

/// Immutable index of entries keyed by id.
///
/// A catalog is built once and never mutated; reload produces a new one and
/// swaps it in through [`CatalogStore`].
#[derive(Debug, Default)]
pub struct Catalog {
    entries: HashMap<String, Arc<Entry>>,
}

impl Catalog {
    pub fn new(entries: HashMap<String, Arc<Entry>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full entry lookup, shared without copying.
    pub fn get(&self, id: &str) -> Option<Arc<Entry>> {
        self.entries.get(id).cloned()
    }

    /// Listing projections, sorted by title case-insensitively (Unicode
    /// lowercase key, raw title as tiebreaker).
    pub fn summaries(&self) -> Vec<EntrySummary> {
        let mut summaries: Vec<EntrySummary> =
            self.entries.values().map(|e| EntrySummary::of(e)).collect();
        summaries.sort_by(|a, b| {
            (a.title.to_lowercase(), &a.title).cmp(&(b.title.to_lowercase(), &b.title))
        });
        summaries
    }

    /// Entry ids in listing order.
    pub fn ids(&self) -> Vec<String> {
        self.summaries().into_iter().map(|s| s.id).collect()
    }
}

/// Shared handle to the active catalog snapshot.
///
/// Readers take an `Arc` clone of the snapshot and keep it for the duration
/// of their request; `swap` replaces the active snapshot atomically, so a
/// reload never exposes a half-populated catalog.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<RwLock<Arc<Catalog>>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        self.inner
            .read()
            .expect("Catalog store lock poisoned")
            .clone()
    }

    pub fn swap(&self, catalog: Catalog) {
        *self.inner.write().expect("Catalog store lock poisoned") = Arc::new(catalog);
    }

    /// Rebuild from disk and swap the snapshot in.
    pub fn reload(&self, content_root: &Path) {
        self.swap(super::build_catalog(content_root));
    }
}
