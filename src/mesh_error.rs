//! Error types for mesh-baffles public APIs.
//!
//! Every fallible entry point returns one of the enums below. The umbrella
//! [`BaffleError`] is what [`create_baffles`](crate::baffles::create_baffles)
//! reports; the narrower enums are returned by the individual stages.

use thiserror::Error;

/// Inconsistent mesh topology.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// The owner list must have one entry per face.
    #[error("owner list has {found} entries, expected one per face ({expected})")]
    OwnerLengthMismatch { expected: usize, found: usize },
    /// There cannot be more internal faces than faces.
    #[error("neighbour list has {found} entries but the mesh has only {faces} faces")]
    NeighbourLengthMismatch { faces: usize, found: usize },
    /// A face with fewer than three points.
    #[error("face {face} has fewer than 3 points")]
    DegenerateFace { face: usize },
    /// A face references a point that does not exist.
    #[error("face {face} references point {point} but the mesh has {n_points} points")]
    PointOutOfRange {
        face: usize,
        point: usize,
        n_points: usize,
    },
    /// Internal faces are stored with the lower cell index as owner.
    #[error("internal face {face} has owner {owner} not below neighbour {neighbour}")]
    OwnerNotBelowNeighbour {
        face: usize,
        owner: usize,
        neighbour: usize,
    },
    /// Boundary patches must follow each other without gaps.
    #[error("patch `{name}` starts at face {start}, expected {expected}")]
    PatchNotContiguous {
        name: String,
        start: usize,
        expected: usize,
    },
    /// Patches must cover every boundary face.
    #[error("patches end at face {covered}, the mesh has {faces} faces")]
    PatchCoverage { covered: usize, faces: usize },
    /// Patch names are unique.
    #[error("duplicate patch name `{0}`")]
    DuplicatePatch(String),
    /// Face zone names are unique.
    #[error("duplicate face zone name `{0}`")]
    DuplicateZone(String),
    /// A zone lists a face index outside the mesh.
    #[error("face zone `{zone}` references face {face} outside the mesh")]
    ZoneFaceOutOfRange { zone: String, face: usize },
    /// A zone needs one flip flag per face.
    #[error("face zone `{zone}` has {faces} faces but {flips} flip flags")]
    ZoneFlipLengthMismatch {
        zone: String,
        faces: usize,
        flips: usize,
    },
    /// A face can be a member of at most one zone.
    #[error("face {face} belongs to both zone `{first}` and zone `{second}`")]
    ZoneOverlap {
        face: usize,
        first: String,
        second: String,
    },
    /// A patch expected by name is missing.
    #[error("patch `{0}` not found")]
    PatchNotFound(String),
    /// Field values do not match the mesh they are attached to.
    #[error("field `{field}`: {reason}")]
    FieldMismatch { field: String, reason: String },
    /// Bad arguments to the block generator.
    #[error("invalid block: {0}")]
    InvalidBlock(String),
}

/// Problems in the baffle configuration. Always reported before the mesh
/// is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {message}")]
    Io { path: String, message: String },
    #[error("malformed baffle configuration: {0}")]
    Parse(String),
    /// Baffle entries are keyed by their name; it may not be blank.
    #[error("baffle entry {0} has an empty name")]
    EmptyBaffleName(usize),
    #[error("duplicate baffle name `{0}`")]
    DuplicateBaffle(String),
    /// A patch entry without a destination patch name.
    #[error("baffle `{baffle}`: patch entry {index} has no `name`")]
    MissingPatchName { baffle: String, index: usize },
    #[error("baffle `{baffle}`: patch `{patch}` has unknown type `{kind}`")]
    UnknownPatchType {
        baffle: String,
        patch: String,
        kind: String,
    },
    /// Patches pair up master/slave; the last master has no partner.
    #[error("baffle `{baffle}`: master patch `{patch}` has no slave patch")]
    UnpairedPatch { baffle: String, patch: String },
    #[error("patch `{patch}` of type `{kind}` requires `{key}`")]
    MissingPatchKey {
        patch: String,
        kind: &'static str,
        key: &'static str,
    },
    #[error("baffle `{baffle}`: unknown selection type `{kind}`")]
    UnknownSelector { baffle: String, kind: String },
    #[error("baffle `{baffle}`: invalid `{kind}` settings: {message}")]
    InvalidSelector {
        baffle: String,
        kind: String,
        message: String,
    },
}

/// A selector could not evaluate its criterion against the mesh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selector `{selector}`: face zone `{zone}` not found in mesh")]
    ZoneNotFound { selector: String, zone: String },
    #[error("selector `{selector}`: face {face} outside mesh with {n_faces} faces")]
    FaceOutOfRange {
        selector: String,
        face: usize,
        n_faces: usize,
    },
}

/// The change committer rejected an operation sequence.
///
/// A correct planning run never produces one of these; they indicate a
/// broken invariant and abort the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("operation {op}: patch {patch} does not exist")]
    UnknownPatch { op: usize, patch: usize },
    #[error("operation {op}: zone {zone} does not exist")]
    UnknownZone { op: usize, zone: usize },
    #[error("operation {op}: owner cell {owner} outside mesh with {n_cells} cells")]
    OwnerOutOfRange {
        op: usize,
        owner: usize,
        n_cells: usize,
    },
    #[error("operation {op}: face {face} outside mesh with {n_faces} faces")]
    FaceOutOfRange {
        op: usize,
        face: usize,
        n_faces: usize,
    },
    #[error("operation {op}: face {face} already modified by operation {first}")]
    RepeatedModify { op: usize, face: usize, first: usize },
    #[error("operation {op}: face has fewer than 3 points")]
    DegenerateFace { op: usize },
    #[error("operation {op}: point {point} outside mesh with {n_points} points")]
    PointOutOfRange {
        op: usize,
        point: usize,
        n_points: usize,
    },
    /// The new owner must be one of the cells next to the source face.
    #[error("operation {op}: cell {owner} is not adjacent to face {face}")]
    OwnerNotAdjacent { op: usize, owner: usize, face: usize },
    #[error("resulting mesh is invalid: {0}")]
    InvalidResult(#[from] MeshError),
}

/// Umbrella error for a whole baffle creation run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaffleError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("mesh change failed: {0}")]
    Commit(#[from] CommitError),
    /// Patches or face zones are not the same on every worker.
    #[error("patches or face zones are not synchronised across workers (rank {rank})")]
    ParallelSync { rank: usize },
}
