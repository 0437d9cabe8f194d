//! The proprietary QT atom container nested inside panoramic sample data.
//!
//! This is a second container format distinct from the outer ISO box
//! format: the sample opens with 10 reserved bytes and a 16-bit lock
//! count, followed by the root atom (expected type `sean`). Atoms carry a
//! 20-byte header — size, type, atom id, reserved, child count, reserved —
//! and nest by concatenation, so children of the root start right after
//! its header.

use std::cmp;
use std::io::Cursor;
use std::ops::Range;

use byteorder::{BigEndian, ReadBytesExt};
use log::warn;

use crate::container::FourCC;
use crate::{QtvrError, Result};

/// Reserved bytes plus lock count preceding the root atom.
pub const CONTAINER_PREFIX_LEN: usize = 12;

/// Byte length of an atom header.
pub const ATOM_HEADER_LEN: usize = 20;

/// Expected type of the root atom of an atom container.
pub const SEAN: FourCC = FourCC::new(*b"sean");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomHeader {
  pub size: u32,
  pub typ: FourCC,
  pub atom_id: u32,
  pub child_count: u16,
}

impl AtomHeader {
  pub fn parse(buf: &[u8]) -> Result<Self> {
    if buf.len() < ATOM_HEADER_LEN {
      return Err(QtvrError::Malformed("atom header truncated".into()));
    }
    let mut reader = Cursor::new(buf);
    let size = reader.read_u32::<BigEndian>()?;
    let typ: FourCC = reader.read_u32::<BigEndian>()?.into();
    let atom_id = reader.read_u32::<BigEndian>()?;
    let _reserved = reader.read_u16::<BigEndian>()?;
    let child_count = reader.read_u16::<BigEndian>()?;

    Ok(Self {
      size,
      typ,
      atom_id,
      child_count,
    })
  }
}

/// Find the first child atom of the given type inside a sample's atom
/// container and return the byte range of its payload within `sample`.
pub fn find_atom(sample: &[u8], typ: FourCC) -> Result<Option<Range<usize>>> {
  if sample.len() < CONTAINER_PREFIX_LEN + ATOM_HEADER_LEN {
    return Err(QtvrError::Malformed("pano sample too small for an atom container".into()));
  }
  let root = AtomHeader::parse(&sample[CONTAINER_PREFIX_LEN..])?;
  if root.typ != SEAN {
    warn!("Root atom is '{}', expected '{}'", root.typ, SEAN);
  }

  let end = cmp::min(CONTAINER_PREFIX_LEN + root.size as usize, sample.len());
  let mut cursor = CONTAINER_PREFIX_LEN + ATOM_HEADER_LEN;
  while cursor + ATOM_HEADER_LEN <= end {
    let atom = AtomHeader::parse(&sample[cursor..end])?;
    if (atom.size as usize) < ATOM_HEADER_LEN {
      return Err(QtvrError::Malformed(format!("atom '{}' is smaller than its header", atom.typ)));
    }
    let atom_end = cursor + atom.size as usize;
    if atom_end > end {
      return Err(QtvrError::Malformed(format!("atom '{}' overruns its container", atom.typ)));
    }
    if atom.typ == typ {
      return Ok(Some(cursor + ATOM_HEADER_LEN..atom_end));
    }
    cursor = atom_end;
  }

  Ok(None)
}
