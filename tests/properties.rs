// SPDX-License-Identifier: MPL-2.0

//! Property-based checks over randomly generated dependency chains,
//! in the spirit of the pubgrub crate's own `tests/proptest.rs`.

use proptest::prelude::*;

use depsolve_core::pool::InMemoryPool;
use depsolve_core::version::Constraint;
use depsolve_core::{Category, Dependency, Package, Solver, Version};

fn v(major: u64) -> Version {
    Version::new(vec![major, 0, 0])
}

fn dep(name: &str) -> Dependency {
    Dependency::new(name, Constraint::any()).with_groups(["default"])
}

/// Builds a straight-line chain `root -> pkg0 -> pkg1 -> ... -> pkg(n-1)`
/// and returns the solved transaction.
fn solve_chain(chain_len: usize) -> depsolve_core::Transaction {
    let names: Vec<String> = (0..chain_len).map(|i| format!("pkg{i}")).collect();
    let mut pool = InMemoryPool::new();
    for (i, name) in names.iter().enumerate() {
        let requires = if i + 1 < names.len() {
            vec![dep(&names[i + 1])]
        } else {
            Vec::new()
        };
        pool.add(Package::new(name.clone(), v(1)).with_requires(requires));
    }

    let root = Package::new("root", v(0)).with_requires(if chain_len > 0 {
        vec![dep(&names[0])]
    } else {
        Vec::new()
    });

    Solver::new(root, &pool, Vec::new(), Vec::new())
        .solve(&[])
        .expect("a straight-line chain always has a solution")
}

proptest! {
    /// Invariants 1, 3 and 5 from the testable-properties list: every
    /// depth is non-negative, every node reached only through `default`
    /// groups is categorized `main`, and a chain comes out in dependency
    /// order (each package before the one it depends on).
    #[test]
    fn chain_resolves_in_order_with_nonnegative_depths(chain_len in 1usize..8) {
        let transaction = solve_chain(chain_len);

        prop_assert_eq!(transaction.resolved.len(), chain_len);
        for (i, (package, depth)) in transaction.resolved.iter().enumerate() {
            prop_assert_eq!(*depth, i as i64);
            prop_assert_eq!(package.category(), Category::Main);
            prop_assert_eq!(package.name(), format!("pkg{i}"));
        }
    }

    /// Invariant 6: a cycle anywhere in the chain still terminates and
    /// still emits each package exactly once.
    #[test]
    fn cycle_back_to_root_dependency_terminates(chain_len in 2usize..6) {
        let names: Vec<String> = (0..chain_len).map(|i| format!("pkg{i}")).collect();
        let mut pool = InMemoryPool::new();
        for (i, name) in names.iter().enumerate() {
            let mut requires = Vec::new();
            if i + 1 < names.len() {
                requires.push(dep(&names[i + 1]));
            } else {
                // last package points back to the first, forming a cycle
                requires.push(dep(&names[0]));
            }
            pool.add(Package::new(name.clone(), v(1)).with_requires(requires));
        }

        let root = Package::new("root", v(0)).with_requires(vec![dep(&names[0])]);
        let transaction = Solver::new(root, &pool, Vec::new(), Vec::new())
            .solve(&[])
            .expect("cyclic graphs still have a solution");

        prop_assert_eq!(transaction.resolved.len(), chain_len);
        let mut seen = std::collections::HashSet::new();
        for (package, _) in &transaction.resolved {
            prop_assert!(seen.insert(package.name()));
        }
    }
}
