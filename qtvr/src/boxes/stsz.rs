use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::read_full_box_header;
use crate::container::FourCC;
use crate::{QtvrError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StszBox {
  pub version: u8,
  pub flags: u32,
  /// Uniform size applying to every sample, or 0 if sizes vary.
  pub sample_size: u32,
  pub sample_count: u32,
  pub sample_sizes: Vec<u32>,
}

impl StszBox {
  pub const TYP: FourCC = FourCC::new(*b"stsz");

  pub fn parse(body: &[u8]) -> Result<Self> {
    if body.len() < 12 {
      return Err(QtvrError::Malformed("stsz box too small".into()));
    }
    let mut reader = Cursor::new(body);
    let (version, flags) = read_full_box_header(&mut reader)?;

    let sample_size = reader.read_u32::<BigEndian>()?;
    let sample_count = reader.read_u32::<BigEndian>()?;
    let mut sample_sizes = Vec::new();
    if sample_size == 0 {
      if body.len() < 12 + sample_count as usize * 4 {
        return Err(QtvrError::Malformed(format!("stsz table truncated, {} entries do not fit", sample_count)));
      }
      sample_sizes.reserve(sample_count as usize);
      for _ in 0..sample_count {
        sample_sizes.push(reader.read_u32::<BigEndian>()?);
      }
    }

    Ok(Self {
      version,
      flags,
      sample_size,
      sample_count,
      sample_sizes,
    })
  }

  /// Byte size of the given 1-based sample.
  pub fn size_for_sample(&self, sample_index: u32) -> Result<u32> {
    if sample_index == 0 || sample_index > self.sample_count {
      return Err(QtvrError::Malformed(format!(
        "sample {} outside sample-size table of {} samples",
        sample_index, self.sample_count
      )));
    }
    if self.sample_size != 0 {
      return Ok(self.sample_size);
    }
    self
      .sample_sizes
      .get(sample_index as usize - 1)
      .copied()
      .ok_or_else(|| QtvrError::Malformed(format!("sample {} missing from sample-size table", sample_index)))
  }
}
