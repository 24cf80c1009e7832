// SPDX-License-Identifier: MPL-2.0

//! `depsolve-core` resolves a project's dependency graph to one concrete
//! version per package, then annotates the result with how deep each
//! package sits below the root and whether it belongs to the main install
//! or a dev-only group.
//!
//! Version constraint solving itself is delegated to the [`pubgrub`]
//! crate; this crate supplies the package/dependency data model, the
//! provider that bridges that model onto `pubgrub::DependencyProvider`,
//! an override-retry loop for requirement sets pubgrub alone cannot
//! settle, and the post-resolve depth/category aggregation pass.
//!
//! ```
//! use depsolve_core::{Constraint, Dependency, Package, Solver, Version};
//! use depsolve_core::pool::InMemoryPool;
//!
//! let mut pool = InMemoryPool::new();
//! pool.add(Package::new("libb", Version::new([1, 0, 0])));
//!
//! let root = Package::new("root", Version::new([0, 1, 0])).with_requires(vec![
//!     Dependency::new("libb", Constraint::any()).with_groups(["default"]),
//! ]);
//!
//! let solver = Solver::new(root, &pool, Vec::new(), Vec::new());
//! let transaction = solver.solve(&[]).unwrap();
//! assert_eq!(transaction.resolved.len(), 1);
//! ```

mod engine;
mod node;

pub mod package;
pub mod pool;
pub mod provider;
pub mod transaction;
pub mod version;

pub mod error;

pub use error::SolverProblemError;
pub use package::{Category, Dependency, Package};
pub use pool::RepositoryPool;
pub use provider::{Overrides, PoolProvider, Provider};
pub use transaction::Transaction;
pub use version::{Constraint, Version};

mod solver;
pub use solver::Solver;
