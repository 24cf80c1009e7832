// SPDX-License-Identifier: MPL-2.0

//! A [`RepositoryPool`] is the resolver's view of "everything that could be
//! installed". [`InMemoryPool`] is a minimal, in-process implementation
//! useful for tests and small embedders, in the spirit of pubgrub's own
//! `OfflineDependencyProvider`.

use indexmap::IndexMap;

use crate::package::Package;

/// Source of candidate packages, keyed by resolver-level identity
/// (`complete_name`, i.e. `name` or `name[feature,...]`).
pub trait RepositoryPool {
    /// All known packages sharing this `complete_name`, in ascending
    /// version order.
    fn packages(&self, complete_name: &str) -> Vec<Package>;
}

/// A pool backed by an in-memory map, populated ahead of time. Versions are
/// kept sorted on insertion so [`RepositoryPool::packages`] never needs to
/// re-sort on the hot path.
#[derive(Default)]
pub struct InMemoryPool {
    by_complete_name: IndexMap<String, Vec<Package>>,
}

impl InMemoryPool {
    pub fn new() -> Self {
        InMemoryPool::default()
    }

    pub fn add(&mut self, package: Package) {
        let entry = self.by_complete_name.entry(package.complete_name()).or_default();
        let insert_at = entry
            .iter()
            .position(|existing| existing.version() > package.version())
            .unwrap_or(entry.len());
        entry.insert(insert_at, package);
    }
}

impl RepositoryPool for InMemoryPool {
    fn packages(&self, complete_name: &str) -> Vec<Package> {
        self.by_complete_name
            .get(complete_name)
            .cloned()
            .unwrap_or_default()
    }
}
