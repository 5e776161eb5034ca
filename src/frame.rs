use crate::crc;
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Size of the trailing data checksum.
pub const FOOTER_SIZE: usize = 4;

/// Upper bound on the capacity reserved up front for a record body.
/// Larger records grow the buffer as bytes actually arrive.
const MAX_PREALLOC: usize = 1 << 20;

/// The fixed-size prefix of every entry on disk (12 bytes).
///
/// [Length: 8]
/// [Length CRC: 4]
///
/// Followed by `length` data bytes and a 4-byte masked CRC of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
  pub length: u64,
  pub length_crc: u32,
}

impl EntryHeader {
  pub const SIZE: usize = 8 + 4;

  pub fn new(length: u64) -> Self {
    Self {
      length,
      length_crc: crc::masked_crc(&length.to_le_bytes()),
    }
  }

  pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
    writer.write_u64::<LittleEndian>(self.length)?;
    writer.write_u32::<LittleEndian>(self.length_crc)?;
    Ok(())
  }

  /// Reads a header, distinguishing a clean end of stream (`Ok(None)`)
  /// from one that stops partway through the header.
  pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Self>> {
    let mut raw = [0u8; Self::SIZE];
    let filled = read_full(reader, &mut raw)?;
    if filled == 0 {
      return Ok(None);
    }
    if filled < Self::SIZE {
      return Err(Error::UnexpectedEof(format!(
        "entry header truncated after {} of {} bytes",
        filled,
        Self::SIZE
      )));
    }

    let mut cursor = &raw[..];
    let length = cursor.read_u64::<LittleEndian>()?;
    let length_crc = cursor.read_u32::<LittleEndian>()?;

    if !crc::verify(&raw[..8], length_crc) {
      return Err(Error::Corrupt(format!(
        "length crc mismatch: expected {:#x}, got {:#x}",
        length_crc,
        crc::masked_crc(&raw[..8])
      )));
    }

    Ok(Some(Self { length, length_crc }))
  }
}

/// Total bytes an entry with a `len`-byte body occupies on disk.
#[inline]
pub fn encoded_len(len: usize) -> u64 {
  (EntryHeader::SIZE + FOOTER_SIZE) as u64 + len as u64
}

/// Writes one entry for `data` and returns the number of bytes written.
/// Nothing is written if `data` is empty.
pub fn encode_into<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> Result<u64> {
  if data.is_empty() {
    return Err(Error::EmptyRecord);
  }

  EntryHeader::new(data.len() as u64).write(writer)?;
  writer.write_all(data)?;
  writer.write_u32::<LittleEndian>(crc::masked_crc(data))?;
  Ok(encoded_len(data.len()))
}

/// Serializes `data` into a standalone entry buffer.
pub fn encode(data: &[u8]) -> Result<Vec<u8>> {
  if data.is_empty() {
    return Err(Error::EmptyRecord);
  }
  let mut buffer = Vec::with_capacity(encoded_len(data.len()) as usize);
  encode_into(&mut buffer, data)?;
  Ok(buffer)
}

/// Reads exactly one entry from a stream positioned at an entry boundary.
///
/// Returns `Ok(None)` when the stream ends cleanly before the next entry.
/// The data bytes are only read once the length checksum has been verified.
pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Option<Vec<u8>>> {
  let header = match EntryHeader::read(reader)? {
    Some(h) => h,
    None => return Ok(None),
  };

  if header.length == 0 {
    return Err(Error::Corrupt("zero-length entry".into()));
  }
  let len = usize::try_from(header.length)
    .map_err(|_| Error::Corrupt(format!("entry length {} exceeds addressable memory", header.length)))?;

  let mut data = Vec::with_capacity(len.min(MAX_PREALLOC));
  (&mut *reader).take(header.length).read_to_end(&mut data)?;
  if data.len() < len {
    return Err(Error::UnexpectedEof(format!(
      "entry data truncated after {} of {} bytes",
      data.len(),
      len
    )));
  }

  let data_crc = match reader.read_u32::<LittleEndian>() {
    Ok(v) => v,
    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
      return Err(Error::UnexpectedEof("entry data crc truncated".into()));
    }
    Err(e) => return Err(Error::Io(e)),
  };

  if !crc::verify(&data, data_crc) {
    return Err(Error::Corrupt(format!(
      "data crc mismatch: expected {:#x}, got {:#x}",
      data_crc,
      crc::masked_crc(&data)
    )));
  }

  Ok(Some(data))
}

/// Fills `buf` as far as the stream allows, retrying short reads.
/// Returns the number of bytes read; less than `buf.len()` means end of stream.
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
  let mut filled = 0;
  while filled < buf.len() {
    match reader.read(&mut buf[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(Error::Io(e)),
    }
  }
  Ok(filled)
}
