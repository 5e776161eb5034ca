//! # shardio
//!
//! `shardio` stores opaque binary records (serialized protocol messages,
//! training examples, log events) in checksummed container files, and splits
//! large record sets across a fixed number of shard files by content hash.
//!
//! ## Key Features
//!
//! * **Integrity**: Masked CRC32-C on every record's length and data.
//! * **Streaming Reads**: One logical record stream across many files.
//! * **Deterministic Sharding**: FNV-1a routing, stable across runs.
//! * **Single-Owner Shards**: Each shard file is written by one invocation.
//! * **Pluggable Storage**: Local files (buffered or mmap) or in-memory.
//!
//! ## File Format
//!
//! A record file is a sequence of entries with no file header or footer:
//!
//! ```text
//! [Length: u64 LE][Length CRC: u32 LE][Data: Length bytes][Data CRC: u32 LE]
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use shardio::{RecordReader, RecordWriter};
//!
//! # fn main() -> shardio::Result<()> {
//! let file = std::fs::File::create("/tmp/records.bin")?;
//! let mut writer = RecordWriter::new(file);
//! writer.write_record(b"first")?;
//! writer.write_record(b"second")?;
//! writer.close()?;
//!
//! let mut reader = RecordReader::open(["/tmp/records.bin"]);
//! while let Some(record) = reader.read_record()? {
//!     println!("{} bytes", record.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
pub mod crc;
mod error;
pub mod frame;
mod reader;
mod storage;
mod util;
mod writer;

// Sharded write orchestration (optional feature)
#[cfg(feature = "sharded")]
pub mod sharded;

// Re-exports for the flat public API
pub use config::{ReadStrategy, ReaderOptions, ShardOptions, WriterOptions};
pub use error::{Error, Result};
pub use frame::{decode, encode};
pub use reader::RecordReader;
pub use storage::{LocalReader, LocalStorage, MemorySink, MemoryStorage, Sink, Storage};
pub use util::{parse_shard_filename, shard_filename, shard_paths};
pub use writer::RecordWriter;
