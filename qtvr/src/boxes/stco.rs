use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::read_full_box_header;
use crate::container::FourCC;
use crate::{QtvrError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StcoBox {
  pub version: u8,
  pub flags: u32,
  pub entries: Vec<u32>,
}

impl StcoBox {
  pub const TYP: FourCC = FourCC::new(*b"stco");

  pub fn parse(body: &[u8]) -> Result<Self> {
    if body.len() < 8 {
      return Err(QtvrError::Malformed("stco box too small".into()));
    }
    let mut reader = Cursor::new(body);
    let (version, flags) = read_full_box_header(&mut reader)?;

    let entry_count = reader.read_u32::<BigEndian>()?;
    if body.len() < 8 + entry_count as usize * 4 {
      return Err(QtvrError::Malformed(format!("stco table truncated, {} entries do not fit", entry_count)));
    }
    let mut entries = Vec::with_capacity(entry_count as usize);
    for _ in 0..entry_count {
      let chunk_offset = reader.read_u32::<BigEndian>()?;
      entries.push(chunk_offset);
    }

    Ok(Self {
      version,
      flags,
      entries,
    })
  }

  /// Absolute file offset of the given 1-based chunk.
  pub fn offset_for_chunk(&self, chunk_index: u32) -> Result<u64> {
    if chunk_index == 0 {
      return Err(QtvrError::Malformed("chunk numbers are 1-based".into()));
    }
    self
      .entries
      .get(chunk_index as usize - 1)
      .map(|&offset| offset as u64)
      .ok_or_else(|| QtvrError::Malformed(format!("chunk {} outside chunk-offset table of {} entries", chunk_index, self.entries.len())))
  }
}
