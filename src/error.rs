// SPDX-License-Identifier: MPL-2.0

//! The error surface the solver façade exposes to callers.

use thiserror::Error;

/// Version solving failed: no combination of available versions satisfies
/// every requirement, even after trying every detected override.
#[derive(Debug, Error)]
#[error("the version solver found no solution: {0}")]
pub struct SolverProblemError(pub String);

impl From<crate::engine::EngineError> for SolverProblemError {
    fn from(err: crate::engine::EngineError) -> Self {
        SolverProblemError(err.to_string())
    }
}
