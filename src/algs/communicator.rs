//! Thin façade over the collective operations a baffle run needs.
//!
//! A run only ever reduces a handful of counters across workers, so the
//! interface is three blocking all-reduces on `u64`. Backends:
//!
//! * [`NoComm`]: a single worker, every reduction is the identity;
//! * [`ThreadComm`]: workers are threads of one process exchanging values
//!   through a shared mailbox;
//! * `MpiComm` (feature `mpi-support`): workers are MPI ranks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use dashmap::DashMap;

/// Blocking collective reductions over all workers.
pub trait Communicator {
    fn rank(&self) -> usize;
    fn size(&self) -> usize;

    fn all_reduce_sum(&self, value: u64) -> u64;
    fn all_reduce_min(&self, value: u64) -> u64;
    fn all_reduce_max(&self, value: u64) -> u64;

    fn is_parallel(&self) -> bool {
        self.size() > 1
    }
}

/// Serial run: one worker, no communication.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoComm;

impl Communicator for NoComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        value
    }

    fn all_reduce_min(&self, value: u64) -> u64 {
        value
    }

    fn all_reduce_max(&self, value: u64) -> u64 {
        value
    }
}

// --- ThreadComm: intra-process / multi-thread ---
type Key = (u64, usize); // (round, rank)

#[derive(Debug, Default)]
struct Mailbox {
    posted: DashMap<Key, Bytes>,
    readers: DashMap<u64, usize>,
}

/// One worker of a group of threads in the same process.
///
/// Every worker of a group must call the same reductions in the same order.
#[derive(Debug)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    round: AtomicU64,
    mailbox: Arc<Mailbox>,
}

impl ThreadComm {
    /// Handles for a group of `size` workers, indexed by rank.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let mailbox = Arc::new(Mailbox::default());
        (0..size)
            .map(|rank| ThreadComm {
                rank,
                size,
                round: AtomicU64::new(0),
                mailbox: Arc::clone(&mailbox),
            })
            .collect()
    }

    /// Post `value`, wait for every worker's value of this round and fold
    /// them with `op`.
    fn all_reduce(&self, value: u64, op: impl Fn(u64, u64) -> u64) -> u64 {
        let round = self.round.fetch_add(1, Ordering::Relaxed);
        let mut buf = BytesMut::with_capacity(8);
        buf.put_u64_le(value);
        self.mailbox.posted.insert((round, self.rank), buf.freeze());

        while !(0..self.size).all(|r| self.mailbox.posted.contains_key(&(round, r))) {
            std::thread::yield_now();
        }
        let result = (0..self.size)
            .filter_map(|r| self.mailbox.posted.get(&(round, r)).map(|b| b.clone().get_u64_le()))
            .reduce(&op)
            .unwrap_or(value);

        let readers = {
            let mut count = self.mailbox.readers.entry(round).or_insert(0);
            *count += 1;
            *count
        };
        if readers == self.size {
            self.mailbox.readers.remove(&round);
            for r in 0..self.size {
                self.mailbox.posted.remove(&(round, r));
            }
        }
        result
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce_sum(&self, value: u64) -> u64 {
        self.all_reduce(value, |a, b| a + b)
    }

    fn all_reduce_min(&self, value: u64) -> u64 {
        self.all_reduce(value, u64::min)
    }

    fn all_reduce_max(&self, value: u64) -> u64 {
        self.all_reduce(value, u64::max)
    }
}

// --- MPI backend (feature = "mpi-support") ---
#[cfg(feature = "mpi-support")]
mod mpi_backend {
    use super::Communicator;
    use mpi::collective::SystemOperation;
    use mpi::environment::Universe;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::*;

    /// Workers are the ranks of `MPI_COMM_WORLD`.
    pub struct MpiComm {
        world: SimpleCommunicator,
        rank: usize,
        size: usize,
        _universe: Universe,
    }

    impl MpiComm {
        /// Initialize MPI. `None` if it was already initialized.
        pub fn new() -> Option<Self> {
            let universe = mpi::initialize()?;
            let world = universe.world();
            let rank = world.rank() as usize;
            let size = world.size() as usize;
            Some(Self {
                world,
                rank,
                size,
                _universe: universe,
            })
        }

        fn reduce(&self, value: u64, op: SystemOperation) -> u64 {
            let mut out = 0u64;
            self.world.all_reduce_into(&value, &mut out, op);
            out
        }
    }

    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.rank
        }

        fn size(&self) -> usize {
            self.size
        }

        fn all_reduce_sum(&self, value: u64) -> u64 {
            self.reduce(value, SystemOperation::sum())
        }

        fn all_reduce_min(&self, value: u64) -> u64 {
            self.reduce(value, SystemOperation::min())
        }

        fn all_reduce_max(&self, value: u64) -> u64 {
            self.reduce(value, SystemOperation::max())
        }
    }
}

#[cfg(feature = "mpi-support")]
pub use mpi_backend::MpiComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comm_is_identity() {
        assert_eq!(NoComm.all_reduce_sum(5), 5);
        assert_eq!(NoComm.all_reduce_max(5), 5);
        assert!(!NoComm.is_parallel());
    }

    #[test]
    fn thread_group_reduces() {
        let group = ThreadComm::group(3);
        let results: Vec<(u64, u64, u64)> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| {
                    s.spawn(move || {
                        let v = comm.rank() as u64 + 1;
                        (
                            comm.all_reduce_sum(v),
                            comm.all_reduce_min(v),
                            comm.all_reduce_max(v),
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.iter().all(|&r| r == (6, 1, 3)));
        assert!(group[0].mailbox.posted.is_empty());
    }
}
