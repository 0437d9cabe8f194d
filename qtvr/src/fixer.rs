//! Orchestration: map a movie file, locate the panoramic track, resolve
//! each sample's byte range and patch it in place.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use log::debug;
use memmap2::MmapOptions;

use crate::boxes::hdlr::HdlrBox;
use crate::boxes::stco::StcoBox;
use crate::boxes::stsc::StscBox;
use crate::boxes::stsz::StszBox;
use crate::container::{self, Container};
use crate::pano;
use crate::{QtvrError, Result};

/// Movies above this size are refused before mapping.
pub const MAX_MOVIE_SIZE: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixOutcome {
  /// Panoramic samples whose bytes were changed.
  pub samples_patched: u32,
  /// Whether the movie has a panoramic track at all.
  pub pano_track: bool,
}

/// Repair a movie file in place. Movies without a panoramic track are a
/// successful no-op; the file is flushed only when bytes changed.
pub fn fix_movie<P: AsRef<Path>>(path: P) -> Result<FixOutcome> {
  let path = path.as_ref();
  let file = OpenOptions::new().read(true).write(true).open(path).map_err(|err| match err.kind() {
    io::ErrorKind::NotFound => QtvrError::NotFound(path.to_owned()),
    _ => QtvrError::Io(err),
  })?;

  let len = file.metadata()?.len();
  if len > MAX_MOVIE_SIZE {
    return Err(QtvrError::TooLarge(len, MAX_MOVIE_SIZE));
  }

  let mut map = unsafe { MmapOptions::new().map_mut(&file) }.map_err(QtvrError::Map)?;
  debug!("Mapped {} ({} bytes)", path.display(), len);

  let outcome = fix_mapped(&mut map[..])?;
  if outcome.samples_patched > 0 {
    map.flush().map_err(QtvrError::Flush)?;
  }

  Ok(outcome)
}

/// The fix over an already mapped (or in-memory) movie.
pub fn fix_mapped(data: &mut [u8]) -> Result<FixOutcome> {
  let Some((stsc, stco, stsz)) = pano_track_tables(data)? else {
    debug!("No pano track, leaving file untouched");
    return Ok(FixOutcome::default());
  };

  let mut outcome = FixOutcome {
    samples_patched: 0,
    pano_track: true,
  };
  let mut last_chunk = 0;
  let mut chunk_pos = 0u64;

  for sample in 1..=stsz.sample_count {
    let chunk = stsc.chunk_for_sample(sample)?;
    let size = stsz.size_for_sample(sample)? as u64;
    if chunk != last_chunk {
      chunk_pos = 0;
      last_chunk = chunk;
    }
    let offset = stco.offset_for_chunk(chunk)? + chunk_pos;
    chunk_pos += size;

    let end = offset + size;
    if end > data.len() as u64 {
      return Err(QtvrError::Malformed(format!("sample {} at {}+{} is behind EOF", sample, offset, size)));
    }
    if pano::patch_sample(&mut data[offset as usize..end as usize])? {
      debug!("Patched pano sample {} at offset {}", sample, offset);
      outcome.samples_patched += 1;
    }
  }

  Ok(outcome)
}

/// Sample tables of the first track whose handler type is `pano`. Movies
/// are expected to contain at most one panoramic track; later ones are
/// left alone.
fn pano_track_tables(data: &[u8]) -> Result<Option<(StscBox, StcoBox, StszBox)>> {
  let root = Container::whole_file(data.len() as u64);
  let moov = root
    .find_first(data, container::MOOV)?
    .ok_or_else(|| QtvrError::Malformed("moov box not found, corrupt file?".into()))?;

  for trak in moov.children_of_type(data, container::TRAK) {
    let trak = trak?;
    let mdia = trak
      .find_first(data, container::MDIA)?
      .ok_or_else(|| QtvrError::Malformed("mdia box not found, corrupt file?".into()))?;
    let hdlr_box = mdia
      .find_first(data, HdlrBox::TYP)?
      .ok_or_else(|| QtvrError::Malformed("hdlr box not found, corrupt file?".into()))?;
    let hdlr = HdlrBox::parse(hdlr_box.data(data))?;
    if hdlr.handler_type != HdlrBox::HANDLER_PANO {
      continue;
    }
    debug!("Found pano track at offset {}", trak.start);

    let minf = mdia
      .find_first(data, container::MINF)?
      .ok_or_else(|| QtvrError::Malformed("minf box not found, corrupt file?".into()))?;
    let stbl = minf
      .find_first(data, container::STBL)?
      .ok_or_else(|| QtvrError::Malformed("stbl box not found, corrupt file?".into()))?;

    let stsc = stbl
      .find_first(data, StscBox::TYP)?
      .ok_or_else(|| QtvrError::Malformed("stsc box not found, corrupt file?".into()))?;
    let stco = stbl
      .find_first(data, StcoBox::TYP)?
      .ok_or_else(|| QtvrError::Malformed("stco box not found, corrupt file?".into()))?;
    let stsz = stbl
      .find_first(data, StszBox::TYP)?
      .ok_or_else(|| QtvrError::Malformed("stsz box not found, corrupt file?".into()))?;

    return Ok(Some((
      StscBox::parse(stsc.data(data))?,
      StcoBox::parse(stco.data(data))?,
      StszBox::parse(stsz.data(data))?,
    )));
  }

  Ok(None)
}
