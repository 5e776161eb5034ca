use crate::error::{Error, Result};

/// Defines the strategy used for reading record files from local disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
  /// Uses standard buffered `File::read`.
  /// Safe, reliable, and respectful of memory limits.
  StandardIo,

  /// Memory-maps each file as it is opened.
  /// Fastest for large sequential scans.
  /// WARNING: The file must not be truncated while it is mapped (SIGBUS).
  Mmap,
}

#[derive(Debug, Clone)]
pub struct WriterOptions {
  /// Size of the in-memory write buffer in front of the output sink.
  /// Large buffers amortize write syscalls over long record streams.
  /// Default: 5 MB.
  pub buffer_size: usize,
}

impl Default for WriterOptions {
  fn default() -> Self {
    Self {
      buffer_size: 5 * 1000 * 1000, // 5 MB
    }
  }
}

impl WriterOptions {
  pub fn new(buffer_size: usize) -> Self {
    Self { buffer_size }
  }

  pub(crate) fn validate(&self) -> Result<()> {
    if self.buffer_size == 0 {
      return Err(Error::InvalidConfig("write buffer_size must be greater than zero".into()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct ReaderOptions {
  /// Size of the buffer placed in front of each input stream.
  /// Default: 128 KB.
  pub buffer_size: usize,
}

impl Default for ReaderOptions {
  fn default() -> Self {
    Self {
      buffer_size: 128 * 1024, // 128 KB
    }
  }
}

impl ReaderOptions {
  pub fn new(buffer_size: usize) -> Self {
    Self { buffer_size }
  }
}

/// Configuration for a sharded write.
#[derive(Debug, Clone)]
pub struct ShardOptions {
  /// Output path prefix. Shard files are named
  /// `{prefix}-{shard+1:05}-of-{shard_count:05}`.
  pub prefix: String,

  /// Number of output shards. Must be greater than zero.
  /// Default: 1.
  pub shard_count: usize,

  /// Buffering applied to every shard file.
  pub writer: WriterOptions,
}

impl Default for ShardOptions {
  fn default() -> Self {
    Self {
      prefix: String::from("./records"),
      shard_count: 1,
      writer: WriterOptions::default(),
    }
  }
}

impl ShardOptions {
  pub fn new(prefix: impl Into<String>, shard_count: usize) -> Self {
    Self {
      prefix: prefix.into(),
      shard_count,
      ..Default::default()
    }
  }

  /// Checks everything that can be checked without touching storage.
  pub fn validate(&self) -> Result<()> {
    if self.shard_count == 0 {
      return Err(Error::InvalidConfig(format!(
        "invalid shard_count {} (must be greater than zero)",
        self.shard_count
      )));
    }
    if self.prefix.trim().is_empty() {
      return Err(Error::InvalidConfig("output prefix cannot be empty".into()));
    }
    self.writer.validate()
  }
}
