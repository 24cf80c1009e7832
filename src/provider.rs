// SPDX-License-Identifier: MPL-2.0

//! The bridge between our domain model and the `pubgrub` resolution engine.
//!
//! [`Provider`] is the contract the rest of this crate programs against
//! (debug logging, overrides, scoped progress/environment hooks). The
//! concrete [`PoolProvider`] also implements `pubgrub::DependencyProvider`
//! directly, so it can be handed straight to `pubgrub::resolve`.
//!
//! Two adaptations bridge Poetry-style semantics onto the real pubgrub
//! crate, which only ever binds one version per resolver-level package
//! identity and carries no notion of a locked set:
//!
//! - `locked`/`use_latest` are configured on the provider itself rather
//!   than passed into the resolve call, since `pubgrub::resolve` takes
//!   only a provider, a root package, and a root version.
//! - a single package name can be required more than once (once per
//!   dependency group); since `pubgrub::DependencyConstraints` allows only
//!   one range per name, same-named requirements are intersected before
//!   being handed to the engine.

use std::cell::RefCell;
use std::convert::Infallible;

use indexmap::IndexMap;
use pubgrub::Dependencies;

use crate::package::{Dependency, Package};
use crate::pool::RepositoryPool;
use crate::version::{Version, VersionSet};

/// A proposed pin for one or more packages, tried as a unit during
/// compatibility-mode retries.
pub type Overrides = IndexMap<String, Dependency>;

/// Operational hooks the solver façade drives the provider through.
/// Default bodies are no-ops so embedders only implement what they need.
pub trait Provider {
    fn debug(&self, _message: &str) {}

    fn set_overrides(&self, overrides: Overrides);

    fn overrides(&self) -> Overrides;

    fn set_use_latest(&self, names: Vec<String>);

    /// Run `f` with progress reporting scoped around it. The default runs
    /// `f` directly with no reporting.
    fn with_progress<T>(&self, f: impl FnOnce() -> T) -> T {
        f()
    }

    /// Run `f` with an ephemeral environment marker (e.g. a null/test
    /// environment) scoped around it, mirroring Poetry's
    /// `Solver.use_environment` context manager.
    fn with_environment<E, T>(&self, env: &E, f: impl FnOnce(&E) -> T) -> T {
        f(env)
    }
}

/// Binds a [`RepositoryPool`] into something `pubgrub::resolve` can drive,
/// while also exposing our own [`Provider`] contract.
pub struct PoolProvider<'a, R: RepositoryPool> {
    root: Package,
    pool: &'a R,
    locked: IndexMap<String, Package>,
    use_latest: RefCell<Vec<String>>,
    overrides: RefCell<Overrides>,
    debug_log: RefCell<Vec<String>>,
}

impl<'a, R: RepositoryPool> PoolProvider<'a, R> {
    pub fn new(root: Package, pool: &'a R, locked: Vec<Package>) -> Self {
        let locked = locked.into_iter().map(|p| (p.name(), p)).collect();
        PoolProvider {
            root,
            pool,
            locked,
            use_latest: RefCell::new(Vec::new()),
            overrides: RefCell::new(Overrides::new()),
            debug_log: RefCell::new(Vec::new()),
        }
    }

    pub fn root(&self) -> &Package {
        &self.root
    }

    pub fn debug_log(&self) -> Vec<String> {
        self.debug_log.borrow().clone()
    }

    /// Resolve a `(complete_name, version)` pair produced by the engine
    /// back into the rich [`Package`] it names.
    pub fn package_at(&self, complete_name: &str, version: &Version) -> Option<Package> {
        if complete_name == self.root.complete_name() && *version == self.root.version() {
            return Some(self.root.clone());
        }
        self.pool
            .packages(complete_name)
            .into_iter()
            .find(|p| p.version() == *version)
    }

    fn base_name(complete_name: &str) -> &str {
        complete_name.split('[').next().unwrap_or(complete_name)
    }

    fn candidates(&self, complete_name: &str, range: &VersionSet) -> Vec<Package> {
        self.pool
            .packages(complete_name)
            .into_iter()
            .filter(|p| range.contains(&p.version()))
            .collect()
    }
}

impl<'a, R: RepositoryPool> Provider for PoolProvider<'a, R> {
    fn debug(&self, message: &str) {
        log::debug!("{message}");
        self.debug_log.borrow_mut().push(message.to_string());
    }

    fn set_overrides(&self, overrides: Overrides) {
        *self.overrides.borrow_mut() = overrides;
    }

    fn overrides(&self) -> Overrides {
        self.overrides.borrow().clone()
    }

    fn set_use_latest(&self, names: Vec<String>) {
        *self.use_latest.borrow_mut() = names;
    }
}

impl<'a, R: RepositoryPool> pubgrub::DependencyProvider for PoolProvider<'a, R> {
    type P = String;
    type V = Version;
    type VS = VersionSet;
    type M = String;
    type Priority = std::cmp::Reverse<usize>;
    type Err = Infallible;

    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err> {
        let base = Self::base_name(package);
        if !self.use_latest.borrow().iter().any(|n| n == base) {
            if let Some(locked) = self.locked.get(base) {
                if &locked.complete_name() == package && range.contains(&locked.version()) {
                    return Ok(Some(locked.version()));
                }
            }
        }

        Ok(self
            .candidates(package, range)
            .into_iter()
            .max_by(|a, b| a.version().cmp(&b.version()))
            .map(|p| p.version()))
    }

    fn prioritize(&self, package: &Self::P, range: &Self::VS) -> Self::Priority {
        std::cmp::Reverse(self.candidates(package, range).len())
    }

    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err> {
        let Some(pkg) = self.package_at(package, version) else {
            return Ok(Dependencies::Unavailable(format!(
                "{package} {version} is no longer present in the pool"
            )));
        };

        let overrides = self.overrides.borrow();
        let mut grouped: IndexMap<String, VersionSet> = IndexMap::new();
        for dep in pkg.all_requires() {
            // An override replaces every requirement on this name with the
            // override's own constraint, rather than intersecting with it,
            // so a retry can actually escape the conflict that triggered it.
            if let Some(pinned) = overrides.get(&dep.complete_name) {
                grouped.insert(dep.complete_name.clone(), pinned.constraint.ranges().clone());
                continue;
            }
            grouped
                .entry(dep.complete_name.clone())
                .and_modify(|existing| *existing = existing.intersection(dep.constraint.ranges()))
                .or_insert_with(|| dep.constraint.ranges().clone());
        }

        let mut constraints = pubgrub::DependencyConstraints::default();
        for (name, ranges) in grouped {
            constraints.insert(name, ranges);
        }
        Ok(Dependencies::Available(constraints))
    }
}
