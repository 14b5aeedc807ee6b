//! Invariant checks that run in debug builds.
//!
//! Meshes produced by the change committer are re-validated here so a broken
//! renumbering surfaces at the point it happens rather than in a later stage.

use crate::mesh_error::MeshError;

/// Structures whose internal consistency can be verified.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation.
    fn validate_invariants(&self) -> Result<(), MeshError>;

    /// Panic on a violation when invariant checking is enabled; no-op otherwise.
    fn debug_assert_invariants(&self);
}

/// Run a fallible check and panic with context on error, only in debug builds
/// or with the `strict-invariants` / `check-invariants` features.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, " violated: {}"), e);
        }
    };
}
