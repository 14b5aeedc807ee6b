//! Mesh topology: faces, patches, face zones and the polyhedral mesh itself.

pub mod block;
pub mod face;
pub mod patch;
pub mod poly_mesh;
pub mod zone;

pub use face::Face;
pub use patch::{Patch, PatchId, PatchType};
pub use poly_mesh::PolyMesh;
pub use zone::{FaceZone, ZoneId};
