//! Re-export public algorithms.

pub mod communicator;
pub mod parallel_sync;

pub use communicator::{Communicator, NoComm, ThreadComm};
pub use parallel_sync::{check_parallel_sync, sync_fingerprint};
