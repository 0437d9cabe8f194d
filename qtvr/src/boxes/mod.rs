//! Decoders for the leaf box payloads the fixer needs: the track handler
//! and the three sample tables. Each decoder takes the box body (the bytes
//! after the size/type header) and builds a small owned view; lookups fail
//! loudly instead of reading out of range.

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

use crate::Result;

pub mod hdlr;
pub mod stco;
pub mod stsc;
pub mod stsz;

/// Version and flags fields shared by all full boxes.
pub(crate) fn read_full_box_header<R: Read>(reader: &mut R) -> Result<(u8, u32)> {
  let version = reader.read_u8()?;
  let flags = reader.read_u24::<BigEndian>()?;
  Ok((version, flags))
}
