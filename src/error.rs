use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O Error: {0}")]
  Io(#[from] io::Error),

  #[error("Empty record: zero-length records cannot be encoded")]
  EmptyRecord,

  #[error("Configuration Error: {0}")]
  InvalidConfig(String),

  #[error("Data Corruption: {0}")]
  Corrupt(String),

  #[error("Unexpected end of stream: {0}")]
  UnexpectedEof(String),

  #[error("Unsupported path scheme: {0}")]
  UnsupportedScheme(String),
}

impl Error {
  /// True for errors that mean the stream can no longer be trusted.
  pub fn is_corruption(&self) -> bool {
    matches!(self, Error::Corrupt(_) | Error::UnexpectedEof(_))
  }
}
