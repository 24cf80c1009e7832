// SPDX-License-Identifier: MPL-2.0

//! Packages and the dependency edges between them.
//!
//! A [`Package`] is a resolved (name, version, feature set) triple. Several
//! [`Package`] handles can alias the same underlying node — the override
//! merge pass and the depth/category aggregation pass both write back into
//! packages reached through different paths in the graph — so the node is
//! kept behind `Rc<RefCell<_>>` rather than copied.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::version::{Constraint, Version};

/// Where a package sits in the install plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Main,
    Dev,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Main => f.write_str("main"),
            Category::Dev => f.write_str("dev"),
        }
    }
}

/// A single dependency edge: "owner requires `name` matching `constraint`".
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub complete_name: String,
    pub constraint: Constraint,
    pub groups: BTreeSet<String>,
    optional: bool,
}

impl Dependency {
    pub fn new(name: impl Into<String>, constraint: Constraint) -> Self {
        let name = name.into();
        Dependency {
            complete_name: name.clone(),
            name,
            constraint,
            groups: BTreeSet::new(),
            optional: false,
        }
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        if !features.is_empty() {
            self.complete_name = format!("{}[{}]", self.name, features.join(","));
        }
        self
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn allows_prereleases(&self) -> bool {
        self.constraint.allows_prereleases()
    }

    /// Whether `other` is the same named target as this edge (ignores constraint).
    pub fn is_same_package_as(&self, other: &Package) -> bool {
        self.complete_name == other.complete_name()
    }
}

struct PackageData {
    name: String,
    version: Version,
    features: Vec<String>,
    requires: Vec<Dependency>,
    category: Category,
    optional: bool,
}

/// A resolved package node, cheaply cloneable, shared by every edge that
/// points at it.
#[derive(Clone)]
pub struct Package(Rc<RefCell<PackageData>>);

impl Package {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Package(Rc::new(RefCell::new(PackageData {
            name: name.into(),
            version,
            features: Vec::new(),
            requires: Vec::new(),
            category: Category::Dev,
            optional: true,
        })))
    }

    pub fn with_features(self, features: Vec<String>) -> Self {
        self.0.borrow_mut().features = features;
        self
    }

    pub fn with_requires(self, requires: Vec<Dependency>) -> Self {
        self.0.borrow_mut().requires = requires;
        self
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn version(&self) -> Version {
        self.0.borrow().version.clone()
    }

    pub fn features(&self) -> Vec<String> {
        self.0.borrow().features.clone()
    }

    /// `name[feature,feature]` when this package node is a feature variant,
    /// else just `name`. This, not `name`, is the resolver-level identity.
    pub fn complete_name(&self) -> String {
        let data = self.0.borrow();
        if data.features.is_empty() {
            data.name.clone()
        } else {
            format!("{}[{}]", data.name, data.features.join(","))
        }
    }

    pub fn all_requires(&self) -> Vec<Dependency> {
        self.0.borrow().requires.clone()
    }

    pub fn add_dependency(&self, dep: Dependency) {
        self.0.borrow_mut().requires.push(dep);
    }

    pub fn category(&self) -> Category {
        self.0.borrow().category
    }

    pub fn set_category(&self, category: Category) {
        self.0.borrow_mut().category = category;
    }

    pub fn is_optional(&self) -> bool {
        self.0.borrow().optional
    }

    pub fn set_optional(&self, optional: bool) {
        self.0.borrow_mut().optional = optional;
    }

    pub fn is_same_package_as(&self, other: &Package) -> bool {
        self.complete_name() == other.complete_name()
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.complete_name() == other.complete_name()
            && self.version() == other.version()
    }
}

impl Eq for Package {}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("name", &self.name())
            .field("version", &self.version().to_string())
            .finish()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.complete_name(), self.version())
    }
}
