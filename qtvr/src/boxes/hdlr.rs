use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use super::read_full_box_header;
use crate::container::FourCC;
use crate::{QtvrError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlrBox {
  pub version: u8,
  pub flags: u32,
  pub handler_type: FourCC,
}

impl HdlrBox {
  pub const TYP: FourCC = FourCC::new(*b"hdlr");

  /// Handler type marking a QTVR panoramic track.
  pub const HANDLER_PANO: FourCC = FourCC::new(*b"pano");

  pub fn parse(body: &[u8]) -> Result<Self> {
    if body.len() < 12 {
      return Err(QtvrError::Malformed("hdlr box too small".into()));
    }
    let mut reader = Cursor::new(body);
    let (version, flags) = read_full_box_header(&mut reader)?;
    let _pre_defined = reader.read_u32::<BigEndian>()?;
    let handler_type: FourCC = reader.read_u32::<BigEndian>()?.into();

    Ok(Self {
      version,
      flags,
      handler_type,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_handler_type() {
    let mut body = vec![0u8; 8];
    body.extend_from_slice(b"pano");
    body.extend_from_slice(&[0; 12]);
    let hdlr = HdlrBox::parse(&body).unwrap();
    assert_eq!(hdlr.handler_type, HdlrBox::HANDLER_PANO);
  }

  #[test]
  fn truncated_hdlr_is_malformed() {
    let err = HdlrBox::parse(&[0; 6]).unwrap_err();
    assert!(matches!(err, QtvrError::Malformed(_)));
  }
}
