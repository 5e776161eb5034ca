//! ShardedWriter implementation - the main public API.

use crate::config::ShardOptions;
use crate::error::Result;
use crate::sharded::executor::{Executor, ParallelExecutor};
use crate::sharded::router::{Router, ShardAssigner};
use crate::storage::Storage;
use crate::writer::RecordWriter;

/// Counters for one completed shard file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShardStats {
  pub records: u64,
  /// Encoded bytes, including entry framing.
  pub bytes: u64,
}

/// Result of one shard invocation.
#[derive(Debug)]
pub struct ShardOutcome {
  pub shard: usize,
  pub path: String,
  pub result: Result<ShardStats>,
}

/// Per-shard results of a sharded write, ordered by shard index.
///
/// Only shards that received at least one record appear.
#[derive(Debug)]
pub struct WriteReport {
  shard_count: usize,
  outcomes: Vec<ShardOutcome>,
}

impl WriteReport {
  pub fn shard_count(&self) -> usize {
    self.shard_count
  }

  pub fn outcomes(&self) -> &[ShardOutcome] {
    &self.outcomes
  }

  pub fn is_success(&self) -> bool {
    self.outcomes.iter().all(|o| o.result.is_ok())
  }

  pub fn failures(&self) -> impl Iterator<Item = &ShardOutcome> {
    self.outcomes.iter().filter(|o| o.result.is_err())
  }

  /// Records written across all successful shards.
  pub fn total_records(&self) -> u64 {
    self
      .outcomes
      .iter()
      .filter_map(|o| o.result.as_ref().ok())
      .map(|s| s.records)
      .sum()
  }

  /// Paths of the shard files written successfully.
  pub fn written_paths(&self) -> Vec<&str> {
    self
      .outcomes
      .iter()
      .filter(|o| o.result.is_ok())
      .map(|o| o.path.as_str())
      .collect()
  }

  /// Converts the report into `(path, stats)` pairs, or the first shard error.
  pub fn into_result(self) -> Result<Vec<(String, ShardStats)>> {
    self
      .outcomes
      .into_iter()
      .map(|o| o.result.map(|stats| (o.path, stats)))
      .collect()
  }
}

/// Splits a record set across a fixed number of shard files.
///
/// Records are routed by content hash, grouped so that each shard is owned by
/// exactly one invocation, and written through one [`RecordWriter`] per
/// shard. Every run rewrites each shard file from scratch, so re-running a
/// failed write is safe.
///
/// # Example
///
/// ```no_run
/// use shardio::sharded::ShardedWriter;
/// use shardio::{LocalStorage, ShardOptions};
///
/// # fn main() -> shardio::Result<()> {
/// let writer = ShardedWriter::new(LocalStorage::default(), ShardOptions::new("/data/out/records", 4))?;
/// let records = vec![b"alpha".to_vec(), b"beta".to_vec()];
///
/// let report = writer.write(records)?;
/// for (path, stats) in report.into_result()? {
///     println!("{}: {} records", path, stats.records);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ShardedWriter<S: Storage, E: Executor = ParallelExecutor> {
  storage: S,
  executor: E,
  router: Router,
  options: ShardOptions,
}

impl<S: Storage> ShardedWriter<S, ParallelExecutor> {
  /// Creates a writer that runs shards in parallel on rayon's global pool.
  pub fn new(storage: S, options: ShardOptions) -> Result<Self> {
    Self::with_executor(storage, ParallelExecutor::new(), options)
  }
}

impl<S: Storage, E: Executor> ShardedWriter<S, E> {
  /// Creates a writer with an explicit executor.
  ///
  /// # Errors
  ///
  /// Returns error if:
  /// - `shard_count` is zero or the buffer size is zero (`InvalidConfig`)
  /// - the storage backend cannot address the prefix (`UnsupportedScheme`)
  pub fn with_executor(storage: S, executor: E, options: ShardOptions) -> Result<Self> {
    options.validate()?;
    storage.validate_scheme(&options.prefix)?;
    let router = Router::new(options.shard_count)?;

    Ok(Self {
      storage,
      executor,
      router,
      options,
    })
  }

  pub fn router(&self) -> &Router {
    &self.router
  }

  pub fn options(&self) -> &ShardOptions {
    &self.options
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Output path of `shard`.
  pub fn shard_path(&self, shard: usize) -> String {
    self.router.shard_path(&self.options.prefix, shard)
  }

  /// Writes `records` across the shard files.
  ///
  /// A failure inside one shard (empty record, I/O error) only fails that
  /// shard and is reported in its [`ShardOutcome`]; the other shards are
  /// still written. Use [`WriteReport::into_result`] for all-or-nothing.
  pub fn write<I>(&self, records: I) -> Result<WriteReport>
  where
    I: IntoIterator<Item = Vec<u8>>,
  {
    let records: Vec<Vec<u8>> = records.into_iter().collect();
    tracing::info!(
      target: "shardio::sharded",
      "Sharding {} records into {} shards under {}",
      records.len(),
      self.router.shard_count(),
      self.options.prefix
    );

    let tagged = self.executor.assign(records, &self.router);
    let outcomes = self.executor.for_each_group(tagged, |shard, group| {
      let path = self.shard_path(shard);
      let result = self.write_shard(&path, group);
      match &result {
        Ok(stats) => tracing::info!(
          target: "shardio::sharded",
          "Wrote shard {} ({} records, {} bytes) to {}",
          shard,
          stats.records,
          stats.bytes,
          path
        ),
        Err(e) => tracing::warn!(
          target: "shardio::sharded",
          "Shard {} failed, {} is invalid until rewritten: {}",
          shard,
          path,
          e
        ),
      }
      ShardOutcome { shard, path, result }
    });

    Ok(WriteReport {
      shard_count: self.router.shard_count(),
      outcomes,
    })
  }

  /// Writes one shard file. Flush and close run even if a record fails;
  /// the first error wins.
  fn write_shard(&self, path: &str, records: Vec<Vec<u8>>) -> Result<ShardStats> {
    tracing::debug!(target: "shardio::sharded", "Opening {} for {} records", path, records.len());

    let sink = self.storage.open_write(path)?;
    let mut writer = RecordWriter::with_options(sink, &self.options.writer)?;

    let written = records.iter().try_for_each(|record| writer.write_record(record));
    let stats = ShardStats {
      records: writer.records_written(),
      bytes: writer.bytes_written(),
    };
    let closed = writer.close();

    written.and(closed).map(|()| stats)
  }
}
