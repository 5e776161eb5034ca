use std::io::{BufWriter, Write};

use crate::config::WriterOptions;
use crate::error::{Error, Result};
use crate::frame::encode_into;
use crate::storage::Sink;

/// Writes record entries to a single output sink through an in-memory buffer.
///
/// A writer owns its sink for its whole lifetime. Call [`RecordWriter::close`]
/// on every exit path: dropping a writer makes a best-effort flush and
/// silently discards any error, which can leave a truncated file.
pub struct RecordWriter<W: Write> {
  inner: BufWriter<W>,
  records_written: u64,
  bytes_written: u64,
}

impl<W: Write> RecordWriter<W> {
  /// Creates a writer with the default 5 MB buffer.
  pub fn new(sink: W) -> Self {
    Self::with_capacity(WriterOptions::default().buffer_size, sink)
  }

  pub fn with_options(sink: W, options: &WriterOptions) -> Result<Self> {
    options.validate()?;
    Ok(Self::with_capacity(options.buffer_size, sink))
  }

  fn with_capacity(capacity: usize, sink: W) -> Self {
    Self {
      inner: BufWriter::with_capacity(capacity, sink),
      records_written: 0,
      bytes_written: 0,
    }
  }

  /// Appends one record. Empty records are rejected before anything is written.
  pub fn write_record(&mut self, data: &[u8]) -> Result<()> {
    let written = encode_into(&mut self.inner, data)?;
    self.records_written += 1;
    self.bytes_written += written;
    Ok(())
  }

  /// Pushes buffered bytes down to the sink.
  pub fn flush(&mut self) -> Result<()> {
    self.inner.flush().map_err(Error::Io)
  }

  pub fn records_written(&self) -> u64 {
    self.records_written
  }

  /// Encoded bytes handed to the writer so far, buffered or not.
  pub fn bytes_written(&self) -> u64 {
    self.bytes_written
  }

  /// Flushes and returns the underlying sink.
  pub fn into_inner(self) -> Result<W> {
    self.inner.into_inner().map_err(|e| Error::Io(e.into_error()))
  }
}

impl<W: Sink> RecordWriter<W> {
  /// Flushes the buffer and releases the sink.
  pub fn close(self) -> Result<()> {
    let sink = self.into_inner()?;
    sink.close().map_err(Error::Io)
  }
}
