//! Storage allocator - repacks used capacity into bounded containers
//!
//! The allocator adds a percentage buffer to the requested amount, splits
//! the result greedily into containers of at most `max_container_size`,
//! then fills them in id order. A zero request collapses to a single idle
//! container of the base unit size.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{
    Allocation, Container, DEFAULT_BUFFER_PERCENT, MAX_CONTAINER_SIZE,
};
use crate::util::clamp_base_unit_size;

/// Tunables for the allocator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocatorParams {
    /// Largest container emitted (GB)
    pub max_container_size: u64,
    /// Fractional headroom on top of used capacity
    pub buffer_percent: f64,
}

impl Default for AllocatorParams {
    fn default() -> Self {
        Self {
            max_container_size: MAX_CONTAINER_SIZE,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
        }
    }
}

/// Stateless bin packer
#[derive(Debug, Clone, Copy, Default)]
pub struct Allocator {
    params: AllocatorParams,
}

impl Allocator {
    pub fn new(params: AllocatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AllocatorParams {
        &self.params
    }

    /// Capacity needed for `used` GB once the buffer is applied
    pub fn required(&self, used: u64) -> u64 {
        (used as f64 * (1.0 + self.params.buffer_percent)).ceil() as u64
    }

    /// Pack `used` GB into containers.
    ///
    /// `base_unit_size` only matters for the idle case and is clamped into
    /// [10, 100].
    pub fn optimize(&self, used: u64, base_unit_size: u64) -> Allocation {
        let base = clamp_base_unit_size(base_unit_size);
        if base != base_unit_size {
            debug!(requested = base_unit_size, clamped = base, "Base unit size clamped");
        }

        let required = self.required(used);
        if required == 0 {
            return Allocation::idle(base);
        }

        // max(1) keeps a misconfigured zero limit from looping forever
        let max_size = self.params.max_container_size.max(1);

        let mut containers = Vec::with_capacity(required.div_ceil(max_size) as usize);
        let mut remaining = required;
        let mut next_id = 1u32;
        while remaining > 0 {
            let size = max_size.min(remaining);
            containers.push(Container::new(next_id, size));
            remaining -= size;
            next_id += 1;
        }

        let mut remaining_used = used;
        for container in &mut containers {
            let take = remaining_used.min(container.size);
            container.used = take;
            remaining_used -= take;
        }

        let allocation = Allocation::from_containers(containers);
        debug!(
            used,
            required,
            total = allocation.total,
            containers = allocation.len(),
            "Repacked storage"
        );
        allocation
    }
}

/// Pack with the default 100 GB container limit and 20% buffer
pub fn optimize(used: u64, base_unit_size: u64) -> Allocation {
    Allocator::default().optimize(used, base_unit_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_case() {
        let alloc = optimize(0, 50);
        assert_eq!(alloc.containers, vec![Container::new(1, 50)]);
        assert_eq!(alloc.total, 50);
    }

    #[test]
    fn test_single_container() {
        let alloc = optimize(80, 50);
        assert_eq!(alloc.len(), 1);
        assert_eq!(alloc.containers[0].size, 96);
        assert_eq!(alloc.containers[0].used, 80);
        assert_eq!(alloc.total, 96);
    }

    #[test]
    fn test_split_across_containers() {
        let alloc = optimize(150, 50);
        let sizes: Vec<u64> = alloc.containers.iter().map(|c| c.size).collect();
        let used: Vec<u64> = alloc.containers.iter().map(|c| c.used).collect();
        assert_eq!(sizes, vec![100, 80]);
        assert_eq!(used, vec![100, 50]);
        assert_eq!(alloc.total, 180);
    }

    #[test]
    fn test_ids_sequential() {
        let alloc = optimize(500, 50);
        for (i, container) in alloc.containers.iter().enumerate() {
            assert_eq!(container.id as usize, i + 1);
        }
    }

    #[test]
    fn test_base_unit_clamped() {
        assert_eq!(optimize(0, 5).total, 10);
        assert_eq!(optimize(0, 500).total, 100);
    }

    #[test]
    fn test_custom_params() {
        let allocator = Allocator::new(AllocatorParams {
            max_container_size: 40,
            buffer_percent: 0.5,
        });
        let alloc = allocator.optimize(60, 50);
        let sizes: Vec<u64> = alloc.containers.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![40, 40, 10]);
        assert_eq!(alloc.used(), 60);
    }

    #[test]
    fn test_required() {
        let allocator = Allocator::default();
        assert_eq!(allocator.required(0), 0);
        assert_eq!(allocator.required(1), 2);
        assert_eq!(allocator.required(80), 96);
        assert_eq!(allocator.required(150), 180);
    }
}
