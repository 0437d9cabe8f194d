//! Box reader and container model for the ISO-style QuickTime file format.
//!
//! A [`Container`] is a bounded byte range into the mapped movie file plus
//! the coordinates where its children begin and end. Nothing is copied and
//! no tree is built; traversal is a lazy walk over child ranges.

use std::fmt;
use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};
use serde::{Serialize, Serializer};

use crate::{QtvrError, Result};

/// Byte length of a standard box header (u32 size + four-character type).
pub const HEADER_LEN: u64 = 8;

pub const MOOV: FourCC = FourCC::new(*b"moov");
pub const TRAK: FourCC = FourCC::new(*b"trak");
pub const EDTS: FourCC = FourCC::new(*b"edts");
pub const MDIA: FourCC = FourCC::new(*b"mdia");
pub const MINF: FourCC = FourCC::new(*b"minf");
pub const DINF: FourCC = FourCC::new(*b"dinf");
pub const STBL: FourCC = FourCC::new(*b"stbl");
pub const MVEX: FourCC = FourCC::new(*b"mvex");
pub const MOOF: FourCC = FourCC::new(*b"moof");
pub const TRAF: FourCC = FourCC::new(*b"traf");
pub const MFRA: FourCC = FourCC::new(*b"mfra");
pub const UDTA: FourCC = FourCC::new(*b"udta");
pub const META: FourCC = FourCC::new(*b"meta");
pub const IPRO: FourCC = FourCC::new(*b"ipro");
pub const SINF: FourCC = FourCC::new(*b"sinf");

/// Box types known to contain further boxes.
pub const CONTAINER_TYPES: [FourCC; 15] = [MOOV, TRAK, EDTS, MDIA, MINF, DINF, STBL, MVEX, MOOF, TRAF, MFRA, UDTA, META, IPRO, SINF];

pub fn is_container_type(typ: FourCC) -> bool {
  CONTAINER_TYPES.contains(&typ)
}

#[derive(Default, PartialEq, Eq, Clone, Copy)]
pub struct FourCC {
  pub value: [u8; 4],
}

impl FourCC {
  pub const fn new(value: [u8; 4]) -> Self {
    Self { value }
  }
}

impl Serialize for FourCC {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl From<u32> for FourCC {
  fn from(number: u32) -> Self {
    FourCC {
      value: number.to_be_bytes(),
    }
  }
}

impl From<FourCC> for u32 {
  fn from(fourcc: FourCC) -> u32 {
    u32::from_be_bytes(fourcc.value)
  }
}

impl From<[u8; 4]> for FourCC {
  fn from(value: [u8; 4]) -> FourCC {
    FourCC { value }
  }
}

impl fmt::Debug for FourCC {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let code: u32 = (*self).into();
    let string = String::from_utf8_lossy(&self.value[..]);
    write!(f, "{} / {:#010X}", string, code)
  }
}

impl fmt::Display for FourCC {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", String::from_utf8_lossy(&self.value[..]))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoxHeader {
  pub size: u32,
  pub typ: FourCC,
}

/// A bounded view over one box: its header plus the absolute positions of
/// the box itself, its body and its end. `size == 0` in the file means the
/// box extends to the end of the enclosing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
  pub header: BoxHeader,
  pub start: u64,
  pub body: u64,
  pub end: u64,
}

impl Container {
  /// Synthetic root container spanning the whole file.
  pub fn whole_file(len: u64) -> Self {
    Self {
      header: BoxHeader::default(),
      start: 0,
      body: 0,
      end: len,
    }
  }

  /// Decode the box at `start`, bounded by the enclosing container's end.
  pub fn parse(buf: &[u8], start: u64, limit: u64) -> Result<Self> {
    if start + HEADER_LEN > limit {
      return Err(QtvrError::Malformed(format!("box header at {} truncated by container end {}", start, limit)));
    }
    let view = buf
      .get(start as usize..limit as usize)
      .ok_or_else(|| QtvrError::Malformed(format!("container range {}..{} is behind EOF", start, limit)))?;
    let mut reader = Cursor::new(view);
    let size = reader.read_u32::<BigEndian>()?;
    let typ: FourCC = reader.read_u32::<BigEndian>()?.into();

    let end = match size {
      0 => limit,
      1 => {
        return Err(QtvrError::Unsupported(format!("box '{}' at {} uses a 64-bit size", typ, start)));
      }
      2..=7 => {
        return Err(QtvrError::Malformed(format!("box '{}' at {} is smaller than its header", typ, start)));
      }
      _ => {
        let end = start + size as u64;
        if end > limit {
          return Err(QtvrError::Malformed(format!("box '{}' at {} overruns its container end {}", typ, start, limit)));
        }
        end
      }
    };

    Ok(Self {
      header: BoxHeader { size, typ },
      start,
      body: start + HEADER_LEN,
      end,
    })
  }

  /// The box body as a slice of the mapped file.
  pub fn data<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
    &buf[self.body as usize..self.end as usize]
  }

  /// Walk the immediate children left to right.
  pub fn children<'a>(&self, buf: &'a [u8]) -> Children<'a> {
    Children {
      buf,
      cursor: self.body,
      end: self.end,
      done: false,
    }
  }

  /// Walk the immediate children of one type, keeping walk errors.
  pub fn children_of_type<'a>(&self, buf: &'a [u8], typ: FourCC) -> impl Iterator<Item = Result<Container>> + 'a {
    self.children(buf).filter(move |child| match child {
      Ok(child) => child.header.typ == typ,
      Err(_) => true,
    })
  }

  /// First child of the given type, or `None`. Callers treat a missing
  /// required box as a malformed movie.
  pub fn find_first(&self, buf: &[u8], typ: FourCC) -> Result<Option<Container>> {
    self.children_of_type(buf, typ).next().transpose()
  }
}

/// Lazy iterator over a container's immediate children. A child with
/// size 0 extends to the parent's end and is the last one yielded.
pub struct Children<'a> {
  buf: &'a [u8],
  cursor: u64,
  end: u64,
  done: bool,
}

impl Iterator for Children<'_> {
  type Item = Result<Container>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done || self.cursor >= self.end {
      return None;
    }
    match Container::parse(self.buf, self.cursor, self.end) {
      Ok(child) => {
        self.cursor = child.end;
        Some(Ok(child))
      }
      Err(err) => {
        self.done = true;
        Some(Err(err))
      }
    }
  }
}
