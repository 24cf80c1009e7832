// SPDX-License-Identifier: MPL-2.0

//! End-to-end scenarios for the solver façade and DFS aggregator.

use depsolve_core::pool::InMemoryPool;
use depsolve_core::version::{Constraint, VersionSet};
use depsolve_core::{Category, Dependency, Package, Solver, Version};

fn v(release: &[u64]) -> Version {
    Version::new(release.to_vec())
}

fn dep(name: &str, constraint: Constraint) -> Dependency {
    Dependency::new(name, constraint).with_groups(["default"])
}

fn find<'a>(transaction: &'a depsolve_core::Transaction, name: &str) -> (&'a Package, i64) {
    transaction
        .resolved
        .iter()
        .find(|(p, _)| p.name() == name)
        .map(|(p, d)| (p, *d))
        .unwrap_or_else(|| panic!("{name} missing from resolved set"))
}

#[test]
fn s1_trivial() {
    let mut pool = InMemoryPool::new();
    pool.add(Package::new("x", v(&[1, 2, 0])));

    let root = Package::new("root", v(&[0, 1, 0]))
        .with_requires(vec![dep("x", Constraint::any())]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    assert_eq!(transaction.resolved.len(), 1);
    let (x, depth) = find(&transaction, "x");
    assert_eq!(depth, 0);
    assert_eq!(x.category(), Category::Main);
    assert!(!x.is_optional());
}

#[test]
fn s2_diamond() {
    let mut pool = InMemoryPool::new();
    pool.add(Package::new("a", v(&[1, 0, 0])).with_requires(vec![dep("c", Constraint::any())]));
    pool.add(Package::new("b", v(&[1, 0, 0])).with_requires(vec![dep("c", Constraint::any())]));
    pool.add(Package::new("c", v(&[1, 0, 0])));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![
        dep("a", Constraint::any()),
        dep("b", Constraint::any()),
    ]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    assert_eq!(transaction.resolved.len(), 3);
    let (_, depth_a) = find(&transaction, "a");
    let (_, depth_b) = find(&transaction, "b");
    let (c, depth_c) = find(&transaction, "c");
    assert_eq!(depth_a, 0);
    assert_eq!(depth_b, 0);
    assert_eq!(depth_c, 1);
    assert_eq!(c.category(), Category::Main);
}

#[test]
fn s3_cycle_terminates() {
    let mut pool = InMemoryPool::new();
    pool.add(Package::new("a", v(&[1, 0, 0])).with_requires(vec![dep("b", Constraint::any())]));
    pool.add(Package::new("b", v(&[1, 0, 0])).with_requires(vec![dep("a", Constraint::any())]));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![dep("a", Constraint::any())]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    assert_eq!(transaction.resolved.len(), 2);
    let (_, depth_a) = find(&transaction, "a");
    let (_, depth_b) = find(&transaction, "b");
    assert_eq!(depth_a, 0);
    assert_eq!(depth_b, 1);
}

#[test]
fn s4_dev_group_does_not_shadow_main() {
    let mut pool = InMemoryPool::new();
    pool.add(
        Package::new("a", v(&[1, 0, 0])).with_requires(vec![dep("libx", Constraint::any())]),
    );
    pool.add(
        Package::new("d", v(&[1, 0, 0])).with_requires(vec![dep("libx", Constraint::any())]),
    );
    pool.add(Package::new("libx", v(&[1, 0, 0])));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![
        dep("a", Constraint::any()),
        Dependency::new("d", Constraint::any()).with_groups(["dev"]),
    ]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    let (libx, _) = find(&transaction, "libx");
    assert_eq!(libx.category(), Category::Main);
}

#[test]
fn s5_optional_propagates_down_a_single_path() {
    let mut pool = InMemoryPool::new();
    pool.add(
        Package::new("a", v(&[1, 0, 0])).with_requires(vec![dep("libx", Constraint::any())]),
    );
    pool.add(Package::new("libx", v(&[1, 0, 0])));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![
        Dependency::new("a", Constraint::any())
            .with_groups(["default"])
            .with_optional(true),
    ]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    let (a, _) = find(&transaction, "a");
    let (libx, _) = find(&transaction, "libx");
    assert!(a.is_optional());
    assert!(libx.is_optional());
}

#[test]
fn s6_feature_package_merges_into_base() {
    let mut pool = InMemoryPool::new();
    pool.add(Package::new("pkg", v(&[1, 0, 0])).with_requires(vec![dep("dep1", Constraint::any())]));
    pool.add(
        Package::new("pkg", v(&[1, 0, 0]))
            .with_features(vec!["extra".to_string()])
            .with_requires(vec![dep("dep1", Constraint::any()), dep("dep2", Constraint::any())]),
    );
    pool.add(Package::new("dep1", v(&[1, 0, 0])));
    pool.add(Package::new("dep2", v(&[1, 0, 0])));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![Dependency::new(
        "pkg",
        Constraint::any(),
    )
    .with_features(&["extra"])
    .with_groups(["default"])]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    let names: Vec<_> = transaction.packages().map(|p| p.complete_name()).collect();
    assert!(names.contains(&"pkg".to_string()));
    assert!(!names.iter().any(|n| n == "pkg[extra]"));

    let (pkg, _) = find(&transaction, "pkg");
    let dep_names: Vec<_> = pkg.all_requires().into_iter().map(|d| d.name).collect();
    assert!(dep_names.contains(&"dep1".to_string()));
    assert!(dep_names.contains(&"dep2".to_string()));
}

#[test]
fn s7_override_retry_merges_depths() {
    // Root requires `picked` twice with incompatible constraints (`^1`
    // under the default group, `^2` under dev) — unsatisfiable as
    // written, forcing one retry per alternative. `picked@1` reaches
    // `common` directly; `picked@2` reaches it through `intermediate`
    // one level deeper. `common` itself is unambiguous (the pool only
    // has one version), so it should come out of the merge exactly once,
    // at the deeper of the two depths.
    let mut pool = InMemoryPool::new();
    pool.add(Package::new("common", v(&[1, 0, 0])));
    pool.add(
        Package::new("intermediate", v(&[1, 0, 0]))
            .with_requires(vec![dep("common", Constraint::any())]),
    );
    pool.add(
        Package::new("picked", v(&[1, 0, 0]))
            .with_requires(vec![dep("common", Constraint::any())]),
    );
    pool.add(
        Package::new("picked", v(&[2, 0, 0]))
            .with_requires(vec![dep("intermediate", Constraint::any())]),
    );

    let range_v1 = VersionSet::between(v(&[1, 0, 0]), v(&[2, 0, 0]));
    let range_v2 = VersionSet::between(v(&[2, 0, 0]), v(&[3, 0, 0]));

    let root = Package::new("root", v(&[0, 1, 0])).with_requires(vec![
        dep("picked", Constraint::from_ranges(range_v1, false)),
        Dependency::new("picked", Constraint::from_ranges(range_v2, false))
            .with_groups(["dev"]),
    ]);

    let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
    let transaction = solver.solve(&[]).unwrap();

    let common_matches: Vec<_> = transaction
        .resolved
        .iter()
        .filter(|(p, _)| p.name() == "common")
        .collect();
    assert_eq!(common_matches.len(), 1);
    assert_eq!(common_matches[0].1, 2);
}
