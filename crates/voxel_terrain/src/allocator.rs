//! Allocation interface for dense voxel blocks.
//!
//! Blocks are the dominant allocation of a populated octree (4 KiB each, one
//! per written leaf). The octree never boxes blocks itself; it asks the
//! injected [`BlockAllocator`], which may be shared with polygonizer workers
//! and must therefore tolerate concurrent calls.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::constants::BLOCK_VOLUME;
use crate::types::{Voxel, VoxelBlock};

/// Source of dense leaf blocks.
pub trait BlockAllocator: Send + Sync {
  /// Allocate a block with every voxel set to `fill`.
  fn allocate(&self, fill: Voxel) -> Box<VoxelBlock>;

  /// Return a block to the allocator.
  fn free(&self, block: Box<VoxelBlock>);

  /// Reuse an existing block for new contents.
  fn reallocate(&self, mut block: Box<VoxelBlock>, fill: Voxel) -> Box<VoxelBlock> {
    block.fill(fill);
    block
  }
}

/// Allocator backed by the global heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapBlockAllocator;

impl BlockAllocator for HeapBlockAllocator {
  fn allocate(&self, fill: Voxel) -> Box<VoxelBlock> {
    Box::new([fill; BLOCK_VOLUME])
  }

  fn free(&self, block: Box<VoxelBlock>) {
    drop(block);
  }
}

/// Heap allocator that counts live and total block allocations.
#[derive(Debug, Default)]
pub struct TrackingBlockAllocator {
  live: AtomicU64,
  total: AtomicU64,
  reused: AtomicU64,
}

impl TrackingBlockAllocator {
  /// Create an allocator with zeroed counters.
  pub fn new() -> Self {
    Self::default()
  }

  /// Blocks allocated and not yet freed.
  pub fn live_blocks(&self) -> u64 {
    self.live.load(Ordering::Relaxed)
  }

  /// Blocks allocated over the allocator's lifetime.
  pub fn total_allocations(&self) -> u64 {
    self.total.load(Ordering::Relaxed)
  }

  /// Calls to [`BlockAllocator::reallocate`].
  pub fn reallocations(&self) -> u64 {
    self.reused.load(Ordering::Relaxed)
  }

  /// Bytes held by live blocks.
  pub fn live_bytes(&self) -> u64 {
    self.live_blocks() * BLOCK_VOLUME as u64
  }
}

impl BlockAllocator for TrackingBlockAllocator {
  fn allocate(&self, fill: Voxel) -> Box<VoxelBlock> {
    self.live.fetch_add(1, Ordering::Relaxed);
    self.total.fetch_add(1, Ordering::Relaxed);
    Box::new([fill; BLOCK_VOLUME])
  }

  fn free(&self, block: Box<VoxelBlock>) {
    self.live.fetch_sub(1, Ordering::Relaxed);
    drop(block);
  }

  fn reallocate(&self, mut block: Box<VoxelBlock>, fill: Voxel) -> Box<VoxelBlock> {
    self.reused.fetch_add(1, Ordering::Relaxed);
    block.fill(fill);
    block
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  #[test]
  fn test_allocate_fills_block() {
    let block = HeapBlockAllocator.allocate(-3);
    assert!(block.iter().all(|&v| v == -3));
  }

  #[test]
  fn test_tracking_counts_live_blocks() {
    let allocator = TrackingBlockAllocator::new();
    let a = allocator.allocate(0);
    let b = allocator.allocate(0);
    assert_eq!(allocator.live_blocks(), 2);
    allocator.free(a);
    assert_eq!(allocator.live_blocks(), 1);
    assert_eq!(allocator.total_allocations(), 2);
    assert_eq!(allocator.live_bytes(), 4096);
    allocator.free(b);
    assert_eq!(allocator.live_blocks(), 0);
  }

  #[test]
  fn test_reallocate_refills() {
    let allocator = TrackingBlockAllocator::new();
    let block = allocator.allocate(5);
    let block = allocator.reallocate(block, 9);
    assert!(block.iter().all(|&v| v == 9));
    assert_eq!(allocator.live_blocks(), 1);
    assert_eq!(allocator.reallocations(), 1);
  }

  #[test]
  fn test_concurrent_allocation() {
    let allocator = Arc::new(TrackingBlockAllocator::new());
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let allocator = Arc::clone(&allocator);
        std::thread::spawn(move || {
          for _ in 0..100 {
            let block = allocator.allocate(1);
            allocator.free(block);
          }
        })
      })
      .collect();
    for handle in handles {
      handle.join().unwrap();
    }
    assert_eq!(allocator.live_blocks(), 0);
    assert_eq!(allocator.total_allocations(), 400);
  }
}
