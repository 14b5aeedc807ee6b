#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-baffles
//!
//! mesh-baffles converts selected internal faces of a polyhedral
//! (owner/neighbour addressed) mesh into pairs of boundary faces, "baffles",
//! without duplicating any mesh point. Boundary faces inside the selection
//! can be re-routed into the baffle patches as well.
//!
//! ## Features
//! - Face-based [`PolyMesh`](topology::PolyMesh) with patches and face zones, validated on construction
//! - Pluggable face selectors (`faceZone`, `faceList`, `plane`) resolved by name from a registry
//! - JSON baffle configuration with master/slave patch pairs and per-patch field overrides
//! - A deterministic planner that emits `Modify`/`Add` face operations
//! - An in-memory committer producing the new mesh and a face map
//! - Field carry-over through the change
//! - Serial, threaded and MPI (`mpi-support`) collective backends
//!
//! ## Usage
//!
//! ```no_run
//! use mesh_baffles::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mesh = PolyMesh::block([4, 1, 1], [4.0, 1.0, 1.0])?;
//! let config = BafflesConfig::load("system/createBafflesDict.json")?;
//! let out = create_baffles(&mesh, &FieldStore::new(), &config, &PolyTopoChange, &NoComm)?;
//! println!("converted {} faces", out.report.converted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Determinism
//!
//! Given the same mesh and configuration, the operation sequence and the
//! resulting mesh are identical from run to run: selectors are applied in
//! configuration order and zone faces are visited in increasing face order.

pub mod algs;
pub mod baffles;
pub mod config;
pub mod debug_invariants;
pub mod fields;
pub mod mesh_error;
pub mod selection;
pub mod topo_change;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, ThreadComm};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::baffles::{
        BaffleOutcome, BaffleReport, BafflePlanner, FaceOperation, create_baffles,
    };
    pub use crate::config::{BaffleSpec, BafflesConfig, PatchFieldSpec, PatchSpec};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::fields::{FieldStore, PatchField, VolField};
    pub use crate::mesh_error::{
        BaffleError, CommitError, ConfigError, MeshError, SelectionError,
    };
    pub use crate::selection::{FaceSelector, ZoneSelection};
    pub use crate::topo_change::{MeshMap, PolyTopoChange, TopoCommitter};
    pub use crate::topology::{Face, FaceZone, Patch, PatchType, PolyMesh};
}

static_assertions::assert_impl_all!(topology::PolyMesh: Send, Sync, Clone);
static_assertions::assert_impl_all!(fields::FieldStore: Send, Sync);
static_assertions::assert_impl_all!(algs::communicator::ThreadComm: Send, Sync);
