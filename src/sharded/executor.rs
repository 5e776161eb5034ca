//! Execution substrates for the two stages of a sharded write.
//!
//! A sharded write needs exactly two things from whatever runs it: an
//! elementwise stage that tags each record with its shard, and a grouping
//! stage that hands every record of one shard to a single invocation. The
//! grouping stage is what guarantees a shard file has exactly one owner.

use rayon::ThreadPool;
use rayon::prelude::*;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sharded::router::ShardAssigner;

/// A record tagged with its shard index.
pub type Tagged = (usize, Vec<u8>);

pub trait Executor: Send + Sync {
  /// Tags every record with its shard index. Output order matches input order.
  fn assign<A: ShardAssigner>(&self, records: Vec<Vec<u8>>, assigner: &A) -> Vec<Tagged>;

  /// Invokes `f` exactly once per distinct shard index, passing all records
  /// of that shard in arrival order. Results are ordered by shard index.
  fn for_each_group<T, F>(&self, tagged: Vec<Tagged>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize, Vec<Vec<u8>>) -> T + Send + Sync;
}

/// Groups tagged records by shard with a stable sort, so records sharing a
/// shard keep their relative order.
pub fn group_by_shard(mut tagged: Vec<Tagged>) -> Vec<(usize, Vec<Vec<u8>>)> {
  tagged.sort_by_key(|(shard, _)| *shard);

  let mut groups: Vec<(usize, Vec<Vec<u8>>)> = Vec::new();
  for (shard, record) in tagged {
    match groups.last_mut() {
      Some((current, records)) if *current == shard => records.push(record),
      _ => groups.push((shard, vec![record])),
    }
  }
  groups
}

/// Runs both stages on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalExecutor;

impl Executor for LocalExecutor {
  fn assign<A: ShardAssigner>(&self, records: Vec<Vec<u8>>, assigner: &A) -> Vec<Tagged> {
    records.into_iter().map(|r| (assigner.shard_of(&r), r)).collect()
  }

  fn for_each_group<T, F>(&self, tagged: Vec<Tagged>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize, Vec<Vec<u8>>) -> T + Send + Sync,
  {
    group_by_shard(tagged)
      .into_iter()
      .map(|(shard, records)| f(shard, records))
      .collect()
  }
}

/// Runs both stages on a rayon thread pool, one task per shard in the
/// grouping stage.
#[derive(Clone, Default)]
pub struct ParallelExecutor {
  /// Dedicated pool; `None` uses rayon's global pool.
  pool: Option<Arc<ThreadPool>>,
}

impl ParallelExecutor {
  pub fn new() -> Self {
    Self::default()
  }

  /// Uses a dedicated pool of `threads` workers.
  pub fn with_threads(threads: usize) -> Result<Self> {
    if threads == 0 {
      return Err(Error::InvalidConfig("thread count must be greater than zero".into()));
    }
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(threads)
      .thread_name(|i| format!("shardio-worker-{}", i))
      .build()
      .map_err(|e| Error::InvalidConfig(format!("failed to build thread pool: {}", e)))?;
    Ok(Self { pool: Some(Arc::new(pool)) })
  }

  fn run<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
    match &self.pool {
      Some(pool) => pool.install(op),
      None => op(),
    }
  }
}

impl Executor for ParallelExecutor {
  fn assign<A: ShardAssigner>(&self, records: Vec<Vec<u8>>, assigner: &A) -> Vec<Tagged> {
    self.run(|| {
      records
        .into_par_iter()
        .map(|r| (assigner.shard_of(&r), r))
        .collect()
    })
  }

  fn for_each_group<T, F>(&self, tagged: Vec<Tagged>, f: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize, Vec<Vec<u8>>) -> T + Send + Sync,
  {
    let groups = group_by_shard(tagged);
    self.run(|| {
      groups
        .into_par_iter()
        .map(|(shard, records)| f(shard, records))
        .collect()
    })
  }
}
