// SPDX-License-Identifier: MPL-2.0

//! Depth, category and optionality aggregation over the resolved graph.
//!
//! This is a direct port of Poetry's `puzzle.solver` DFS: walk every path
//! from the root, build one [`PackageNode`] per (package, groups,
//! optional) occurrence, then combine same-named occurrences into a
//! single depth/category/optional verdict per package.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::package::{Category, Package};

type NodeId = (String, BTreeSet<String>, bool);

struct PackageNode {
    package: Package,
    base_name: String,
    packages: Rc<Vec<Package>>,
    seen: Rc<Cell<Vec<Package>>>,
    previous: Option<Rc<PackageNode>>,
    previous_dep: Option<crate::package::Dependency>,
    dep: Option<crate::package::Dependency>,
    groups: BTreeSet<String>,
    id: NodeId,
    depth: Cell<i64>,
    category: Cell<Category>,
    optional: Cell<bool>,
}

impl PackageNode {
    fn new(
        package: Package,
        packages: Rc<Vec<Package>>,
        seen: Rc<Cell<Vec<Package>>>,
        previous: Option<Rc<PackageNode>>,
        previous_dep: Option<crate::package::Dependency>,
        dep: Option<crate::package::Dependency>,
    ) -> Rc<PackageNode> {
        let (category, groups, optional) = match (&previous, &dep) {
            (None, _) => (Category::Dev, BTreeSet::new(), true),
            (Some(_), Some(d)) => {
                let groups = d.groups.clone();
                let category = if groups.contains("default") {
                    Category::Main
                } else {
                    Category::Dev
                };
                (category, groups, d.is_optional())
            }
            (Some(_), None) => unreachable!("PackageNode requires `dep` whenever `previous` is set"),
        };

        let base_name = package.name();
        let id = (package.complete_name(), groups.clone(), optional);

        Rc::new(PackageNode {
            package,
            base_name,
            packages,
            seen,
            previous,
            previous_dep,
            dep,
            groups,
            id,
            depth: Cell::new(-1),
            category: Cell::new(category),
            optional: Cell::new(optional),
        })
    }

    /// Packages this node's edges lead to, applying the traversal guards:
    /// don't revisit a package already seen on this walk, don't walk back
    /// up the edge we arrived on, and don't replay an edge of the same
    /// name once we've already descended through an inherited one.
    fn reachable(node: &Rc<PackageNode>) -> Vec<Rc<PackageNode>> {
        let mut children = Vec::new();

        {
            let mut seen = node.seen.take();
            if seen.iter().any(|p| *p == node.package) {
                node.seen.set(seen);
                return children;
            }
            seen.push(node.package.clone());
            node.seen.set(seen);
        }

        if let (Some(dep), Some(previous_dep)) = (&node.dep, &node.previous_dep) {
            // `dep` and `previous_dep` are the very same edge only for a
            // first-level child (the parent had no inherited `dep` yet).
            // Deeper in the tree they necessarily differ, so a name match
            // there means we're about to replay an edge already walked.
            let inherited = node
                .previous
                .as_ref()
                .map(|p| p.dep.is_some())
                .unwrap_or(false);
            if inherited && dep.name == previous_dep.name {
                return children;
            }
        }

        for dependency in node.package.all_requires() {
            if let Some(previous) = &node.previous {
                if previous.package.complete_name() == dependency.name {
                    continue;
                }
            }
            for candidate in node.packages.iter() {
                if candidate.complete_name() != dependency.complete_name {
                    continue;
                }
                let satisfied = dependency.constraint.allows(&candidate.version());
                if !satisfied {
                    continue;
                }
                if children
                    .iter()
                    .any(|c: &Rc<PackageNode>| c.package.name() == candidate.name() && c.groups == dependency.groups)
                {
                    continue;
                }
                let inherited_dep = node.dep.clone().unwrap_or_else(|| dependency.clone());
                children.push(PackageNode::new(
                    candidate.clone(),
                    node.packages.clone(),
                    node.seen.clone(),
                    Some(node.clone()),
                    Some(dependency.clone()),
                    Some(inherited_dep),
                ));
            }
        }

        children
    }

    /// Depth is one more than the shallowest parent, except when a parent
    /// shares this node's package name (a feature variant of the same
    /// package reached some other way), in which case that parent's own
    /// depth already accounts for this level.
    fn visit(node: &Rc<PackageNode>, parents: &[Rc<PackageNode>]) {
        let max_parent_depth = parents
            .iter()
            .map(|parent| {
                if parent.base_name != node.base_name {
                    parent.depth.get()
                } else {
                    parent.depth.get() - 1
                }
            })
            .max()
            .unwrap_or(-2);
        node.depth.set(1 + max_parent_depth);
    }
}

enum VisitState {
    Partial,
    Done,
}

fn dfs_visit(
    node: &Rc<PackageNode>,
    back_edges: &mut FxHashMap<NodeId, Vec<Rc<PackageNode>>>,
    visited: &mut FxHashMap<NodeId, VisitState>,
    topo_sorted: &mut Vec<Rc<PackageNode>>,
) {
    match visited.get(&node.id) {
        Some(_) => return,
        None => {}
    }
    visited.insert(node.id.clone(), VisitState::Partial);

    for child in PackageNode::reachable(node) {
        back_edges.entry(child.id.clone()).or_default().push(node.clone());
        dfs_visit(&child, back_edges, visited, topo_sorted);
    }

    visited.insert(node.id.clone(), VisitState::Done);
    topo_sorted.insert(0, node.clone());
}

/// Combine every node sharing a package name into one (depth, category,
/// optional) verdict, writing the result back onto the shared `Package`.
///
/// Note: a second `reachable()` sweep over the topologically sorted nodes
/// would, by construction, always return empty here — `seen` has already
/// been exhausted by the traversal above. Per-edge context (the "this
/// package seen under the `default` group" distinction that feeds
/// `category`) is not lost, though: it already lives on the distinct
/// nodes collected per name, one per edge the DFS actually walked.
fn aggregate_package_nodes(nodes: &[Rc<PackageNode>]) -> (Package, i64) {
    let package = nodes[0].package.clone();
    let depth = nodes.iter().map(|n| n.depth.get()).max().unwrap_or(0);
    let category = if nodes.iter().any(|n| n.groups.contains("default")) {
        Category::Main
    } else {
        Category::Dev
    };
    let optional = nodes.iter().all(|n| n.optional.get());

    for node in nodes {
        node.depth.set(depth);
        node.category.set(category);
        node.optional.set(optional);
    }
    package.set_category(category);
    package.set_optional(optional);

    (package, depth)
}

/// Walk every path from `root` through `packages`, returning one
/// `(package, depth)` pair per distinct package reached, with `category`
/// and `optional` written back onto each `Package`.
pub fn depth_first_search(root: Package, packages: Vec<Package>) -> Vec<(Package, i64)> {
    let packages = Rc::new(packages);
    let seen = Rc::new(Cell::new(Vec::new()));
    let source = PackageNode::new(root, packages, seen, None, None, None);

    let mut back_edges: FxHashMap<NodeId, Vec<Rc<PackageNode>>> = FxHashMap::default();
    let mut visited: FxHashMap<NodeId, VisitState> = FxHashMap::default();
    let mut topo_sorted: Vec<Rc<PackageNode>> = Vec::new();
    dfs_visit(&source, &mut back_edges, &mut visited, &mut topo_sorted);

    let mut combined: IndexMap<String, Vec<Rc<PackageNode>>> = IndexMap::new();
    for node in &topo_sorted {
        let parents = back_edges.get(&node.id).cloned().unwrap_or_default();
        PackageNode::visit(node, &parents);
        combined.entry(node.base_name.clone()).or_default().push(node.clone());
    }

    combined
        .into_values()
        .map(|nodes| aggregate_package_nodes(&nodes))
        .collect()
}
