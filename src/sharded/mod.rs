//! # Sharded Writes
//!
//! This module splits a record set across a fixed number of record files
//! through the `ShardedWriter` orchestrator. It provides:
//!
//! - **Content-based routing** of every record to one of N shards (FNV-1a)
//! - **Single-owner shard files**: each shard's records are grouped and
//!   written by exactly one invocation
//! - **Parallel shard writes** on a rayon pool, or sequential execution
//! - **Idempotent re-runs**: every shard file is fully rewritten
//!
//! ## Architecture
//!
//! A write runs in two stages supplied by an [`Executor`]: an elementwise
//! stage that tags each record with `fnv1a32(record) % shard_count`, and a
//! grouping stage that delivers all records of one shard to a single call.
//! That call opens `{prefix}-{shard+1:05}-of-{shard_count:05}`, writes the
//! records in arrival order, then flushes and closes the file. Grouping
//! first means no shard file ever needs a teardown hook from the runtime.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> shardio::Result<()> {
//! let records: Vec<Vec<u8>> = (0..1000u32).map(|i| i.to_le_bytes().to_vec()).collect();
//!
//! let report = shardio::sharded::write_sharded("/data/out/records", 5, records)?;
//! println!("wrote {} records", report.total_records());
//!
//! // Read everything back, across all shard files
//! let reader = shardio::RecordReader::for_shards(
//!     shardio::LocalStorage::default(),
//!     "/data/out/records",
//!     5,
//!     shardio::ReaderOptions::default(),
//! )?;
//! for record in reader {
//!     let _bytes = record?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! - **Fixed shard count**: a different count produces a different file set
//! - **Whole input in memory**: records are collected before grouping
//! - **Sparse output**: shards that receive no records produce no file, and
//!   files left over from an earlier run for such shards are not removed

mod executor;
mod router;
mod writer;

use crate::config::ShardOptions;
use crate::error::Result;
use crate::storage::LocalStorage;

// Public API exports
pub use executor::{Executor, LocalExecutor, ParallelExecutor, Tagged, group_by_shard};
pub use router::{Router, ShardAssigner, fnv1a32, shard_of};
pub use writer::{ShardOutcome, ShardStats, ShardedWriter, WriteReport};

/// Writes `records` into `shard_count` local files named after `prefix`,
/// in parallel, with default buffering.
pub fn write_sharded<I>(prefix: &str, shard_count: usize, records: I) -> Result<WriteReport>
where
  I: IntoIterator<Item = Vec<u8>>,
{
  let writer = ShardedWriter::new(LocalStorage::default(), ShardOptions::new(prefix, shard_count))?;
  writer.write(records)
}
