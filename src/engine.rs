// SPDX-License-Identifier: MPL-2.0

//! Thin wrapper around `pubgrub::resolve`.
//!
//! The real pubgrub crate has no concept of "this set of requirements
//! needs an override retry" — that is a Poetry-ism layered on top here.
//! When pubgrub reports a failure, we look for the shape of conflict an
//! override retry can fix: the root package requiring the same name more
//! than once (typically from different dependency groups) with
//! constraints that cannot all hold simultaneously. Each such requirement
//! becomes one override proposal, tried in turn by the solver façade. Any
//! failure that isn't that shape is surfaced as-is.

use thiserror::Error;

use crate::package::{Dependency, Package};
use crate::pool::RepositoryPool;
use crate::provider::{Overrides, PoolProvider, Provider};

#[derive(Debug, Error)]
pub enum EngineError {
    /// Conflicting root-level requirements were found; retry once per
    /// proposed override.
    #[error("version solving requires retrying with {0} possible override(s)")]
    OverrideNeeded(Vec<Overrides>),

    /// No solution exists and no override retry shape was recognized.
    #[error("{0}")]
    SolveFailure(String),
}

pub struct EngineSolution {
    pub packages: Vec<Package>,
}

pub fn resolve_version<R: RepositoryPool>(
    root: &Package,
    provider: &PoolProvider<'_, R>,
) -> Result<EngineSolution, EngineError> {
    let root_name = root.complete_name();
    let root_version = root.version();
    let active_overrides = provider.overrides();

    log::info!(
        "entering resolve_version for {root_name} {root_version} ({} override(s) active: {})",
        active_overrides.len(),
        describe_overrides(&active_overrides),
    );

    let result = resolve_inner(root, provider, root_name.clone(), root_version.clone());

    match &result {
        Ok(solution) => log::info!(
            "leaving resolve_version for {root_name} {root_version}: resolved {} package(s)",
            solution.packages.len()
        ),
        Err(err) => log::info!("leaving resolve_version for {root_name} {root_version}: {err}"),
    }

    result
}

fn resolve_inner<R: RepositoryPool>(
    root: &Package,
    provider: &PoolProvider<'_, R>,
    root_name: String,
    root_version: crate::version::Version,
) -> Result<EngineSolution, EngineError> {
    match pubgrub::resolve(provider, root_name, root_version) {
        Ok(selected) => {
            let mut packages = Vec::new();
            for (name, version) in selected.into_iter() {
                match provider.package_at(&name, &version) {
                    Some(pkg) => packages.push(pkg),
                    None => {
                        return Err(EngineError::SolveFailure(format!(
                            "resolved package {name} {version} is no longer present in the pool"
                        )))
                    }
                }
            }
            Ok(EngineSolution { packages })
        }
        Err(failure) => match detect_overrides(root) {
            Some(proposals) => Err(EngineError::OverrideNeeded(proposals)),
            None => Err(EngineError::SolveFailure(failure.to_string())),
        },
    }
}

fn describe_overrides(overrides: &Overrides) -> String {
    if overrides.is_empty() {
        return "none".to_string();
    }
    overrides
        .values()
        .map(|dep| format!("{}={}", dep.complete_name, dep.constraint))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Root-level requirements that name the same package more than once with
/// differing constraints are exactly the shape Poetry's override retry
/// targets (e.g. a package pinned under `main` and again, differently,
/// under a `dev` group). Each conflicting requirement becomes one
/// override proposal, in the order it was declared.
fn detect_overrides(root: &Package) -> Option<Vec<Overrides>> {
    let requires = root.all_requires();

    let mut by_complete_name: indexmap::IndexMap<String, Vec<&Dependency>> =
        indexmap::IndexMap::new();
    for dep in &requires {
        by_complete_name
            .entry(dep.complete_name.clone())
            .or_default()
            .push(dep);
    }

    let (_, conflicting) = by_complete_name
        .into_iter()
        .find(|(_, deps)| deps.len() > 1 && deps.windows(2).any(|w| w[0].constraint != w[1].constraint))?;

    let mut proposals = Vec::with_capacity(conflicting.len());
    for dep in conflicting {
        let mut overrides = Overrides::new();
        overrides.insert(dep.complete_name.clone(), dep.clone());
        proposals.push(overrides);
    }
    Some(proposals)
}
