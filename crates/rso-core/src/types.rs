//! Common types used throughout RSO

use serde::{Deserialize, Serialize};

/// Smallest base unit size accepted for the idle container (GB)
pub const MIN_BASE_UNIT_SIZE: u64 = 10;

/// Largest base unit size accepted for the idle container (GB)
pub const MAX_BASE_UNIT_SIZE: u64 = 100;

/// Base unit size used when nothing else is configured (GB)
pub const DEFAULT_BASE_UNIT_SIZE: u64 = 50;

/// Upper bound on the size of a single container (GB)
pub const MAX_CONTAINER_SIZE: u64 = 100;

/// Largest usage the controller accepts (GB); packs into 12 000 containers
pub const MAX_USAGE_GB: u64 = 1_000_000;

/// Headroom added on top of used capacity before packing
pub const DEFAULT_BUFFER_PERCENT: f64 = 0.20;

/// A single storage container produced by a repack.
///
/// Ids restart at 1 on every repack; no identity survives between
/// allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: u32,
    /// Capacity in GB
    pub size: u64,
    /// Used GB, never above `size`
    pub used: u64,
}

impl Container {
    pub fn new(id: u32, size: u64) -> Self {
        Self { id, size, used: 0 }
    }

    /// Unused GB in this container
    pub fn free(&self) -> u64 {
        self.size.saturating_sub(self.used)
    }

    /// Fill ratio in [0, 1]
    pub fn fill_ratio(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.used as f64 / self.size as f64
        }
    }
}

/// Result of packing a used amount into containers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub containers: Vec<Container>,
    /// Always the sum of container sizes
    pub total: u64,
}

impl Allocation {
    /// Build an allocation, deriving `total` from the containers
    pub fn from_containers(containers: Vec<Container>) -> Self {
        let total = containers.iter().map(|c| c.size).sum();
        Self { containers, total }
    }

    /// Single empty container of the given size
    pub fn idle(base_unit_size: u64) -> Self {
        Self::from_containers(vec![Container::new(1, base_unit_size)])
    }

    /// Sum of used GB across containers
    pub fn used(&self) -> u64 {
        self.containers.iter().map(|c| c.used).sum()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// used / total
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used() as f64 / self.total as f64
        }
    }

    /// Allocated but unused GB
    pub fn waste(&self) -> u64 {
        self.total.saturating_sub(self.used())
    }
}
