// SPDX-License-Identifier: MPL-2.0

//! The solver façade: override-retry control flow around a single-pass
//! resolve, followed by the depth/category/optional aggregation pass.
//!
//! Ported from Poetry's `puzzle.solver.Solver`: `solve` drives
//! `solve_in_compatibility_mode`, which retries `_solve` once per proposed
//! override and merges same-package results across retries; `_solve` runs
//! one resolve and folds its output through the DFS aggregator.

use std::cell::RefCell;

use crate::engine::{self, EngineError};
use crate::error::SolverProblemError;
use crate::node;
use crate::package::Package;
use crate::pool::RepositoryPool;
use crate::provider::{Overrides, PoolProvider, Provider};
use crate::transaction::Transaction;

pub struct Solver<'a, R: RepositoryPool> {
    root: Package,
    installed: Vec<Package>,
    locked: Vec<Package>,
    provider: PoolProvider<'a, R>,
    overrides_history: RefCell<Vec<Overrides>>,
}

impl<'a, R: RepositoryPool> Solver<'a, R> {
    pub fn new(root: Package, pool: &'a R, installed: Vec<Package>, locked: Vec<Package>) -> Self {
        let provider = PoolProvider::new(root.clone(), pool, locked.clone());
        Solver {
            root,
            installed,
            locked,
            provider,
            overrides_history: RefCell::new(Vec::new()),
        }
    }

    pub fn provider(&self) -> &PoolProvider<'a, R> {
        &self.provider
    }

    /// Run `f` with an ephemeral value scoped around it, mirroring
    /// Poetry's `Solver.use_environment` context manager.
    pub fn use_environment<E, T>(&self, env: &E, f: impl FnOnce(&E) -> T) -> T {
        self.provider.with_environment(env, f)
    }

    pub fn solve(&self, use_latest: &[String]) -> Result<Transaction, SolverProblemError> {
        let (packages, depths) = self.provider.with_progress(|| self._solve(use_latest))?;

        if self.overrides_history.borrow().len() > 1 {
            self.provider.debug(&format!(
                "Resolved with {} overrides applied across retries",
                self.overrides_history.borrow().len()
            ));
        }

        Ok(Transaction {
            root_package: self.root.clone(),
            locked_packages: self.locked.clone(),
            installed_packages: self.installed.clone(),
            resolved: packages.into_iter().zip(depths).collect(),
        })
    }

    /// Retry `_solve` once per proposed override, merging results for
    /// packages resolved identically across retries: depth is promoted to
    /// the maximum seen, and dependency edges are unioned.
    fn solve_in_compatibility_mode(
        &self,
        overrides: Vec<Overrides>,
        use_latest: &[String],
    ) -> Result<(Vec<Package>, Vec<i64>), SolverProblemError> {
        let mut packages: Vec<Package> = Vec::new();
        let mut depths: Vec<i64> = Vec::new();

        for override_map in overrides {
            self.provider.debug(&format!(
                "Retrying dependency resolution with {} override(s)",
                override_map.len()
            ));
            self.provider.set_overrides(override_map);

            let (sub_packages, sub_depths) = self._solve(use_latest)?;
            for (package, depth) in sub_packages.into_iter().zip(sub_depths) {
                match packages.iter().position(|p| *p == package) {
                    Some(idx) => {
                        depths[idx] = depths[idx].max(depth);
                        for dep in package.all_requires() {
                            if !packages[idx].all_requires().contains(&dep) {
                                packages[idx].add_dependency(dep);
                            }
                        }
                    }
                    None => {
                        packages.push(package);
                        depths.push(depth);
                    }
                }
            }
        }

        Ok((packages, depths))
    }

    fn _solve(&self, use_latest: &[String]) -> Result<(Vec<Package>, Vec<i64>), SolverProblemError> {
        let current_overrides = self.provider.overrides();
        if !current_overrides.is_empty() {
            self.overrides_history.borrow_mut().push(current_overrides);
        }
        self.provider.set_use_latest(use_latest.to_vec());

        match engine::resolve_version(&self.root, &self.provider) {
            Ok(solution) => Ok(self.fold_solution(solution.packages)),
            Err(EngineError::OverrideNeeded(overrides)) => {
                self.solve_in_compatibility_mode(overrides, use_latest)
            }
            Err(err @ EngineError::SolveFailure(_)) => Err(SolverProblemError(err.to_string())),
        }
    }

    /// Merge feature-variant requirements into their base packages, run the
    /// DFS aggregator for its depth/category/optional verdicts, then emit
    /// `(package, depth)` pairs in the engine's own original order (not the
    /// DFS's topological order), dropping the root and any feature-variant
    /// package.
    fn fold_solution(&self, packages: Vec<Package>) -> (Vec<Package>, Vec<i64>) {
        for package in &packages {
            if package.features().is_empty() {
                continue;
            }
            for other in &packages {
                if other.name() != package.name()
                    || other.version() != package.version()
                    || package.is_same_package_as(other)
                {
                    continue;
                }
                for dep in package.all_requires() {
                    if dep.is_same_package_as(other) {
                        continue;
                    }
                    if !other.all_requires().contains(&dep) {
                        other.add_dependency(dep);
                    }
                }
            }
        }

        let depths_by_package = node::depth_first_search(self.root.clone(), packages.clone());

        let mut final_packages = Vec::new();
        let mut depths = Vec::new();
        for package in packages {
            if package == self.root || !package.features().is_empty() {
                continue;
            }
            let depth = depths_by_package
                .iter()
                .find(|(p, _)| *p == package)
                .map(|(_, depth)| *depth)
                .unwrap_or(0);
            final_packages.push(package);
            depths.push(depth);
        }

        (final_packages, depths)
    }
}
