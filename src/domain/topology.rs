//! The shape of a launched cluster.

use serde::Serialize;

use super::address::Address;

/// Addresses produced by one bootstrap call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterTopology {
    /// Scheduler every other process was bound to.
    pub scheduler_address: Address,
    /// Object stores in launch order.
    pub objstore_addresses: Vec<Address>,
    /// Workers launched per object store.
    pub workers_per_store: usize,
}

impl ClusterTopology {
    /// Total number of worker processes in this topology.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.objstore_addresses
            .len()
            .saturating_mul(self.workers_per_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology(stores: usize, workers_per_store: usize) -> ClusterTopology {
        ClusterTopology {
            scheduler_address: Address::new("127.0.0.1", 10001),
            objstore_addresses: (1..=stores)
                .map(|i| Address::new("127.0.0.1", 20000 + i as u16))
                .collect(),
            workers_per_store,
        }
    }

    #[test]
    fn worker_count_multiplies_stores_by_workers() {
        assert_eq!(topology(3, 2).worker_count(), 6);
        assert_eq!(topology(0, 5).worker_count(), 0);
    }

    #[test]
    fn worker_count_saturates() {
        assert_eq!(topology(2, usize::MAX).worker_count(), usize::MAX);
    }
}
