//! Content-based routing to determine shard assignment.
//!
//! Uses 32-bit FNV-1a over the full record bytes, reduced modulo the shard
//! count. The hash has no seed, so assignment is identical across runs,
//! processes and machines.

use crate::error::{Error, Result};
use crate::util::shard_filename;

const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV32_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
#[inline]
pub fn fnv1a32(data: &[u8]) -> u32 {
  data
    .iter()
    .fold(FNV32_OFFSET_BASIS, |hash, &byte| (hash ^ byte as u32).wrapping_mul(FNV32_PRIME))
}

/// Shard index of `data` among `shard_count` shards.
pub fn shard_of(data: &[u8], shard_count: usize) -> Result<usize> {
  if shard_count == 0 {
    return Err(Error::InvalidConfig("shard_count must be greater than zero".into()));
  }
  Ok(fnv1a32(data) as usize % shard_count)
}

/// Maps record bytes to a shard index in `0..shard_count()`.
///
/// Implementations must be pure: the same bytes always map to the same shard,
/// because retried work may re-run the assignment.
pub trait ShardAssigner: Send + Sync {
  fn shard_of(&self, data: &[u8]) -> usize;

  fn shard_count(&self) -> usize;
}

/// Routes records to shards by FNV-1a hash.
#[derive(Debug, Clone, Copy)]
pub struct Router {
  shard_count: usize,
}

impl Router {
  /// Creates a new router with the specified shard count.
  ///
  /// # Errors
  ///
  /// Returns `InvalidConfig` if `shard_count` is zero.
  pub fn new(shard_count: usize) -> Result<Self> {
    if shard_count == 0 {
      return Err(Error::InvalidConfig("shard_count must be greater than zero".into()));
    }
    Ok(Self { shard_count })
  }

  /// Generates the output path of a shard.
  ///
  /// # Panics
  ///
  /// Panics if `shard >= shard_count`.
  pub fn shard_path(&self, prefix: &str, shard: usize) -> String {
    assert!(
      shard < self.shard_count,
      "shard {} out of range (max: {})",
      shard,
      self.shard_count - 1
    );
    shard_filename(prefix, shard, self.shard_count)
  }
}

impl ShardAssigner for Router {
  #[inline]
  fn shard_of(&self, data: &[u8]) -> usize {
    fnv1a32(data) as usize % self.shard_count
  }

  fn shard_count(&self) -> usize {
    self.shard_count
  }
}
