use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::read_full_box_header;
use crate::container::FourCC;
use crate::{QtvrError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StscBox {
  pub version: u8,
  pub flags: u32,
  pub entries: Vec<StscEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StscEntry {
  pub first_chunk: u32,
  pub samples_per_chunk: u32,
  pub sample_description_index: u32,
}

impl StscBox {
  pub const TYP: FourCC = FourCC::new(*b"stsc");

  pub fn parse(body: &[u8]) -> Result<Self> {
    if body.len() < 8 {
      return Err(QtvrError::Malformed("stsc box too small".into()));
    }
    let mut reader = Cursor::new(body);
    let (version, flags) = read_full_box_header(&mut reader)?;

    let entry_count = reader.read_u32::<BigEndian>()?;
    if body.len() < 8 + entry_count as usize * 12 {
      return Err(QtvrError::Malformed(format!("stsc table truncated, {} entries do not fit", entry_count)));
    }
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
      let entry = StscEntry {
        first_chunk: reader.read_u32::<BigEndian>()?,
        samples_per_chunk: reader.read_u32::<BigEndian>()?,
        sample_description_index: reader.read_u32::<BigEndian>()?,
      };
      entries.push(entry);
    }

    Ok(Self {
      version,
      flags,
      entries,
    })
  }

  /// Chunk containing the given 1-based sample. A non-final entry covers
  /// sample numbers strictly below its chunk-span product; the final entry
  /// absorbs any remaining samples.
  pub fn chunk_for_sample(&self, sample_index: u32) -> Result<u32> {
    if sample_index == 0 {
      return Err(QtvrError::Malformed("sample numbers are 1-based".into()));
    }
    let (last, _) = self
      .entries
      .split_last()
      .ok_or_else(|| QtvrError::Malformed("empty sample-to-chunk table".into()))?;

    let mut remaining = sample_index as u64;
    for pair in self.entries.windows(2) {
      let (entry, next) = (&pair[0], &pair[1]);
      if next.first_chunk <= entry.first_chunk || entry.samples_per_chunk == 0 {
        return Err(QtvrError::Malformed("sample-to-chunk entries out of order".into()));
      }
      let span = (next.first_chunk - entry.first_chunk) as u64 * entry.samples_per_chunk as u64;
      if remaining < span {
        return Ok(entry.first_chunk + ((remaining - 1) / entry.samples_per_chunk as u64) as u32);
      }
      remaining -= span - 1;
    }

    if last.samples_per_chunk == 0 {
      return Err(QtvrError::Malformed("sample-to-chunk entry with zero samples per chunk".into()));
    }
    Ok(last.first_chunk + ((remaining - 1) / last.samples_per_chunk as u64) as u32)
  }
}
