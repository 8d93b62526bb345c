//! Binary export and import of leaf blocks.
//!
//! ```text
//! u32 version   (little endian)
//! u32 count
//! count × { u64 octree_index, 4096 × i8 block }
//! ```
//!
//! Only dense leaf blocks are stored; the node tree is rebuilt from each
//! record's index on load. There is no migration between versions.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::constants::BLOCK_VOLUME;
use crate::octree::VoxelDataSource;
use crate::types::{OctreeIndex, VoxelBlock};

/// Version written by [`save_leaves`].
pub const FORMAT_VERSION: u32 = 0;

/// Bytes in one record.
pub const RECORD_SIZE: usize = std::mem::size_of::<u64>() + BLOCK_VOLUME;

#[derive(Debug, Error)]
pub enum SerializationError {
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
  /// The index names no allocated leaf (on save) or no valid leaf path
  /// (on load).
  #[error("no leaf block for octree index {0:#x}")]
  MissingLeaf(OctreeIndex),
}

/// Write the blocks of the leaves named by `indices`.
///
/// Every index is resolved before anything is written, so a missing leaf
/// leaves `writer` untouched.
pub fn save_leaves(
  writer: &mut dyn Write,
  indices: &[OctreeIndex],
  source: &dyn VoxelDataSource,
) -> Result<(), SerializationError> {
  let blocks = indices
    .iter()
    .map(|&index| {
      source
        .node_voxel_data(index)
        .map(|block| (index, block))
        .ok_or(SerializationError::MissingLeaf(index))
    })
    .collect::<Result<Vec<_>, _>>()?;

  writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
  writer.write_all(&(blocks.len() as u32).to_le_bytes())?;

  let mut bytes = [0u8; BLOCK_VOLUME];
  for (index, block) in blocks {
    writer.write_all(&index.to_le_bytes())?;
    encode_block(block, &mut bytes);
    writer.write_all(&bytes)?;
  }
  writer.flush()?;

  tracing::debug!(leaves = indices.len(), "saved leaf blocks");
  Ok(())
}

/// Read records into `target`, creating each leaf and its ancestors.
///
/// Returns the number of leaves loaded. Loaded paths are flagged for
/// regeneration.
pub fn load_leaves(
  reader: &mut dyn Read,
  target: &mut dyn VoxelDataSource,
) -> Result<usize, SerializationError> {
  let version = read_u32(reader)?;
  if version != FORMAT_VERSION {
    tracing::warn!(
      version,
      expected = FORMAT_VERSION,
      "leaf file version mismatch, loading anyway"
    );
  }
  let count = read_u32(reader)? as usize;

  let mut bytes = [0u8; BLOCK_VOLUME];
  for _ in 0..count {
    let index = read_u64(reader)?;
    reader.read_exact(&mut bytes)?;

    if target.find_node_from_index_mut(index, true).is_none() {
      return Err(SerializationError::MissingLeaf(index));
    }
    let block = target
      .allocate_node_voxel_data(index)
      .ok_or(SerializationError::MissingLeaf(index))?;
    decode_block(&bytes, block);
  }

  tracing::debug!(leaves = count, "loaded leaf blocks");
  Ok(count)
}

/// [`save_leaves`] into a new file at `path`.
pub fn save_to_file(
  path: impl AsRef<Path>,
  indices: &[OctreeIndex],
  source: &dyn VoxelDataSource,
) -> Result<(), SerializationError> {
  let mut writer = BufWriter::new(File::create(path)?);
  save_leaves(&mut writer, indices, source)
}

/// [`load_leaves`] from the file at `path`.
pub fn load_from_file(
  path: impl AsRef<Path>,
  target: &mut dyn VoxelDataSource,
) -> Result<usize, SerializationError> {
  let mut reader = BufReader::new(File::open(path)?);
  load_leaves(&mut reader, target)
}

fn encode_block(block: &VoxelBlock, out: &mut [u8; BLOCK_VOLUME]) {
  for (byte, &voxel) in out.iter_mut().zip(block.iter()) {
    *byte = voxel as u8;
  }
}

fn decode_block(bytes: &[u8; BLOCK_VOLUME], block: &mut VoxelBlock) {
  for (voxel, &byte) in block.iter_mut().zip(bytes.iter()) {
    *voxel = byte as i8;
  }
}

fn read_u32(reader: &mut dyn Read) -> std::io::Result<u32> {
  let mut buf = [0u8; 4];
  reader.read_exact(&mut buf)?;
  Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut dyn Read) -> std::io::Result<u64> {
  let mut buf = [0u8; 8];
  reader.read_exact(&mut buf)?;
  Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
#[path = "serialization_test.rs"]
mod serialization_test;
