//! The panoramic sample descriptor (`pdat`) and the actual fix.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use crate::atom;
use crate::container::FourCC;
use crate::{QtvrError, Result};

/// Decoded `pdat` payload. All fields are stored big-endian in the file.
///
/// The nine pan/tilt/field-of-view fields are 32-bit floats on disk; they
/// are carried as raw bit patterns because the fix never interprets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanoSampleAtom {
  pub major_version: u16,
  pub minor_version: u16,
  pub image_ref_track_index: u32,
  pub hot_spot_ref_track_index: u32,

  pub min_pan: u32,
  pub max_pan: u32,
  pub min_tilt: u32,
  pub max_tilt: u32,
  pub min_field_of_view: u32,
  pub max_field_of_view: u32,
  pub default_pan: u32,
  pub default_tilt: u32,
  pub default_field_of_view: u32,

  pub image_size_x: u32,
  pub image_size_y: u32,
  pub image_num_frames_x: u16,
  pub image_num_frames_y: u16,
  pub hot_spot_size_x: u32,
  pub hot_spot_size_y: u32,
  pub hot_spot_num_frames_x: u16,
  pub hot_spot_num_frames_y: u16,
  pub flags: u32,
  pub pano_type: u32,
  pub reserved: u32,
}

impl PanoSampleAtom {
  pub const TYP: FourCC = FourCC::new(*b"pdat");

  pub const ENCODED_LEN: usize = 84;

  pub fn parse(buf: &[u8]) -> Result<Self> {
    if buf.len() < Self::ENCODED_LEN {
      return Err(QtvrError::Malformed(format!("pdat payload is {} bytes, need {}", buf.len(), Self::ENCODED_LEN)));
    }
    let mut reader = Cursor::new(buf);

    Ok(Self {
      major_version: reader.read_u16::<BigEndian>()?,
      minor_version: reader.read_u16::<BigEndian>()?,
      image_ref_track_index: reader.read_u32::<BigEndian>()?,
      hot_spot_ref_track_index: reader.read_u32::<BigEndian>()?,
      min_pan: reader.read_u32::<BigEndian>()?,
      max_pan: reader.read_u32::<BigEndian>()?,
      min_tilt: reader.read_u32::<BigEndian>()?,
      max_tilt: reader.read_u32::<BigEndian>()?,
      min_field_of_view: reader.read_u32::<BigEndian>()?,
      max_field_of_view: reader.read_u32::<BigEndian>()?,
      default_pan: reader.read_u32::<BigEndian>()?,
      default_tilt: reader.read_u32::<BigEndian>()?,
      default_field_of_view: reader.read_u32::<BigEndian>()?,
      image_size_x: reader.read_u32::<BigEndian>()?,
      image_size_y: reader.read_u32::<BigEndian>()?,
      image_num_frames_x: reader.read_u16::<BigEndian>()?,
      image_num_frames_y: reader.read_u16::<BigEndian>()?,
      hot_spot_size_x: reader.read_u32::<BigEndian>()?,
      hot_spot_size_y: reader.read_u32::<BigEndian>()?,
      hot_spot_num_frames_x: reader.read_u16::<BigEndian>()?,
      hot_spot_num_frames_y: reader.read_u16::<BigEndian>()?,
      flags: reader.read_u32::<BigEndian>()?,
      pano_type: reader.read_u32::<BigEndian>()?,
      reserved: reader.read_u32::<BigEndian>()?,
    })
  }

  pub fn write_to(&self, buf: &mut [u8]) -> Result<()> {
    if buf.len() < Self::ENCODED_LEN {
      return Err(QtvrError::Malformed(format!("pdat payload is {} bytes, need {}", buf.len(), Self::ENCODED_LEN)));
    }
    let mut writer = Cursor::new(buf);

    writer.write_u16::<BigEndian>(self.major_version)?;
    writer.write_u16::<BigEndian>(self.minor_version)?;
    writer.write_u32::<BigEndian>(self.image_ref_track_index)?;
    writer.write_u32::<BigEndian>(self.hot_spot_ref_track_index)?;
    writer.write_u32::<BigEndian>(self.min_pan)?;
    writer.write_u32::<BigEndian>(self.max_pan)?;
    writer.write_u32::<BigEndian>(self.min_tilt)?;
    writer.write_u32::<BigEndian>(self.max_tilt)?;
    writer.write_u32::<BigEndian>(self.min_field_of_view)?;
    writer.write_u32::<BigEndian>(self.max_field_of_view)?;
    writer.write_u32::<BigEndian>(self.default_pan)?;
    writer.write_u32::<BigEndian>(self.default_tilt)?;
    writer.write_u32::<BigEndian>(self.default_field_of_view)?;
    writer.write_u32::<BigEndian>(self.image_size_x)?;
    writer.write_u32::<BigEndian>(self.image_size_y)?;
    writer.write_u16::<BigEndian>(self.image_num_frames_x)?;
    writer.write_u16::<BigEndian>(self.image_num_frames_y)?;
    writer.write_u32::<BigEndian>(self.hot_spot_size_x)?;
    writer.write_u32::<BigEndian>(self.hot_spot_size_y)?;
    writer.write_u16::<BigEndian>(self.hot_spot_num_frames_x)?;
    writer.write_u16::<BigEndian>(self.hot_spot_num_frames_y)?;
    writer.write_u32::<BigEndian>(self.flags)?;
    writer.write_u32::<BigEndian>(self.pano_type)?;
    writer.write_u32::<BigEndian>(self.reserved)?;

    Ok(())
  }

  /// A sample without a hotspot image must not declare hotspot frames;
  /// QuickTime 7.6.9 crashes on the combination.
  pub fn hotspot_frames_inconsistent(&self) -> bool {
    self.hot_spot_size_x == 0 && (self.hot_spot_num_frames_x != 0 || self.hot_spot_num_frames_y != 0)
  }
}

/// Repair one panoramic sample in place. Returns whether any byte changed.
pub fn patch_sample(sample: &mut [u8]) -> Result<bool> {
  let payload = atom::find_atom(sample, PanoSampleAtom::TYP)?
    .ok_or_else(|| QtvrError::Malformed("pdat atom not found in pano sample".into()))?;
  let mut pdat = PanoSampleAtom::parse(&sample[payload.clone()])?;

  if !pdat.hotspot_frames_inconsistent() {
    return Ok(false);
  }

  debug!(
    "Zeroing hotspot frame counts {}x{}",
    pdat.hot_spot_num_frames_x, pdat.hot_spot_num_frames_y
  );
  pdat.hot_spot_num_frames_x = 0;
  pdat.hot_spot_num_frames_y = 0;
  pdat.write_to(&mut sample[payload])?;

  Ok(true)
}
