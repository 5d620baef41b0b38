//! Construction-time error types.
//!
//! The execution path never throws — `run`/`check_run` only ever return
//! `bool`/[`CheckResult`](crate::node::CheckResult), per the engine's
//! exception-less failure model. `BuildError` exists for the one place a
//! careful caller may want an up-front diagnosable check: unresolved
//! forward references left dangling when a tree is finalized.

use std::error::Error;

/// Errors surfaced by opt-in build-time checks.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    /// One or more `ref(name)` calls were never matched by a `record(name, ...)`
    /// before the tree was finalized.
    #[error("unresolved forward references: {0:?}")]
    UnresolvedReferences(Vec<String>),

    /// Escape hatch for caller-defined build-time failures, mirroring the
    /// catch-all arm every error enum in this workspace carries.
    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}
