// SPDX-License-Identifier: MPL-2.0

//! The outcome of a solve: the resolved graph alongside the locked and
//! currently-installed sets it was computed against.

use crate::package::Package;

/// A resolved dependency graph, annotated with the depth each package was
/// found at, plus the context it was resolved against.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub root_package: Package,
    pub locked_packages: Vec<Package>,
    pub installed_packages: Vec<Package>,
    /// Every resolved package paired with its depth from the root (direct
    /// dependencies are depth 0).
    pub resolved: Vec<(Package, i64)>,
}

impl Transaction {
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.resolved.iter().map(|(package, _)| package)
    }

    pub fn depth_of(&self, package: &Package) -> Option<i64> {
        self.resolved
            .iter()
            .find(|(p, _)| p == package)
            .map(|(_, depth)| *depth)
    }
}
