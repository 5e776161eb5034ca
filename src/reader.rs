use std::collections::VecDeque;
use std::io::BufReader;

use crate::config::ReaderOptions;
use crate::error::Result;
use crate::frame::decode;
use crate::storage::{LocalStorage, Storage};
use crate::util::shard_paths;

/// Sequentially yields validated records from an ordered queue of files.
/// Transparently moves on to the next file when one is exhausted.
///
/// A reader is single-owner: it mutates its queue and open stream in place.
pub struct RecordReader<S: Storage = LocalStorage> {
  storage: S,
  options: ReaderOptions,
  /// Files not yet opened, front is next.
  queue: VecDeque<String>,

  current: Option<BufReader<S::Reader>>,
  current_path: Option<String>,

  records_produced: u64,
  /// Set once the iterator has surfaced an error.
  failed: bool,
}

impl RecordReader<LocalStorage> {
  /// Reads local files with default options.
  pub fn open<I, P>(paths: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<String>,
  {
    Self::with_storage(LocalStorage::default(), paths, ReaderOptions::default())
  }
}

impl<S: Storage> RecordReader<S> {
  pub fn with_storage<I, P>(storage: S, paths: I, options: ReaderOptions) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<String>,
  {
    Self {
      storage,
      options,
      queue: paths.into_iter().map(Into::into).collect(),
      current: None,
      current_path: None,
      records_produced: 0,
      failed: false,
    }
  }

  /// Queues every shard of a sharded output that exists, in name order.
  /// Shard indices that received no records have no file and are skipped.
  pub fn for_shards(storage: S, prefix: &str, shard_count: usize, options: ReaderOptions) -> Result<Self> {
    storage.validate_scheme(prefix)?;
    let mut present = Vec::with_capacity(shard_count);
    for path in shard_paths(prefix, shard_count) {
      if storage.exists(&path)? {
        present.push(path);
      }
    }
    Ok(Self::with_storage(storage, present, options))
  }

  /// Number of records successfully returned so far.
  pub fn records_produced(&self) -> u64 {
    self.records_produced
  }

  /// Path of the file currently being read, if any.
  pub fn current_path(&self) -> Option<&str> {
    self.current_path.as_deref()
  }

  /// Files still waiting to be opened.
  pub fn remaining_files(&self) -> usize {
    self.queue.len()
  }

  /// Returns the next record across all queued files, or `Ok(None)` once
  /// every file has been consumed.
  ///
  /// Corruption and mid-entry truncation are returned as-is; the reader does
  /// not skip ahead to the next file.
  pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
    loop {
      // 1. Open the next file if nothing is open
      let stream = match &mut self.current {
        Some(stream) => stream,
        None => {
          let path = match self.queue.pop_front() {
            Some(p) => p,
            None => return Ok(None),
          };
          tracing::debug!(target: "shardio", "Opening record file {}", path);
          let stream = self.storage.open_read(&path)?;
          self.current_path = Some(path);
          self.current.insert(BufReader::with_capacity(self.options.buffer_size, stream))
        }
      };

      // 2. Decode; a clean end of file moves on to the next one
      match decode(stream)? {
        Some(record) => {
          self.records_produced += 1;
          return Ok(Some(record));
        }
        None => {
          self.current = None;
          self.current_path = None;
        }
      }
    }
  }
}

impl<S: Storage> Iterator for RecordReader<S> {
  type Item = Result<Vec<u8>>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }
    match self.read_record() {
      Ok(Some(record)) => Some(Ok(record)),
      Ok(None) => None,
      Err(e) => {
        self.failed = true;
        Some(Err(e))
      }
    }
  }
}
