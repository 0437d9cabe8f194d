//! Builders for synthetic QTVR movie files.

use qtvr::atom::{ATOM_HEADER_LEN, CONTAINER_PREFIX_LEN};
use qtvr::pano::PanoSampleAtom;

pub fn boxed(typ: &[u8; 4], body: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&(8 + body.len() as u32).to_be_bytes());
  out.extend_from_slice(typ);
  out.extend_from_slice(body);
  out
}

pub fn pdat(hot_spot_size_x: u32, frames_x: u16, frames_y: u16) -> PanoSampleAtom {
  PanoSampleAtom {
    minor_version: 2,
    image_ref_track_index: 1,
    hot_spot_ref_track_index: 2,
    max_pan: 0x43B40000, // 360.0
    min_tilt: 0xC2B40000,
    max_tilt: 0x42B40000,
    min_field_of_view: 0x40A00000,
    max_field_of_view: 0x42B40000,
    default_field_of_view: 0x42700000,
    image_size_x: 4096,
    image_size_y: 1024,
    image_num_frames_x: 1,
    image_num_frames_y: 4,
    hot_spot_size_x,
    hot_spot_num_frames_x: frames_x,
    hot_spot_num_frames_y: frames_y,
    ..PanoSampleAtom::default()
  }
}

/// One panoramic sample: atom container prefix, `sean` root atom, one
/// `pdat` child.
pub fn pano_sample(pdat: &PanoSampleAtom) -> Vec<u8> {
  let mut payload = vec![0u8; PanoSampleAtom::ENCODED_LEN];
  pdat.write_to(&mut payload).unwrap();

  let mut out = vec![0u8; CONTAINER_PREFIX_LEN];
  out.extend_from_slice(&((2 * ATOM_HEADER_LEN + payload.len()) as u32).to_be_bytes());
  out.extend_from_slice(b"sean");
  out.extend_from_slice(&1u32.to_be_bytes());
  out.extend_from_slice(&[0; 2]);
  out.extend_from_slice(&1u16.to_be_bytes());
  out.extend_from_slice(&[0; 4]);
  out.extend_from_slice(&((ATOM_HEADER_LEN + payload.len()) as u32).to_be_bytes());
  out.extend_from_slice(b"pdat");
  out.extend_from_slice(&1u32.to_be_bytes());
  out.extend_from_slice(&[0; 2]);
  out.extend_from_slice(&0u16.to_be_bytes());
  out.extend_from_slice(&[0; 4]);
  out.extend_from_slice(&payload);
  out
}

/// Offset of the hotspot frame-count fields within a sample built by
/// [`pano_sample`].
pub const FRAME_COUNTS_AT: usize = CONTAINER_PREFIX_LEN + 2 * ATOM_HEADER_LEN + 68;

/// A movie with one track of the given handler type whose samples are
/// stored back to back in a single chunk inside `mdat`.
pub fn movie(handler: &[u8; 4], samples: &[Vec<u8>]) -> Vec<u8> {
  let chunk_offset = 24u32; // ftyp and the mdat header precede the chunk
  movie_with_chunks(handler, samples, samples.len() as u32, &[chunk_offset])
}

/// A movie whose samples are distributed over the given chunks:
/// `samples_per_chunk` samples per chunk, chunk offsets as given. Offsets
/// must match the sample layout produced here (samples back to back in
/// `mdat`, first at byte 24).
pub fn movie_with_chunks(handler: &[u8; 4], samples: &[Vec<u8>], samples_per_chunk: u32, chunk_offsets: &[u32]) -> Vec<u8> {
  let mut ftyp_body = Vec::new();
  ftyp_body.extend_from_slice(b"qt  ");
  ftyp_body.extend_from_slice(&0u32.to_be_bytes());
  let ftyp = boxed(b"ftyp", &ftyp_body);

  let mdat = boxed(b"mdat", &samples.concat());

  let hdlr = {
    let mut body = vec![0u8; 4];
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(handler);
    body.extend_from_slice(&[0; 12]);
    boxed(b"hdlr", &body)
  };

  let stsc = {
    let mut body = vec![0u8; 4];
    body.extend_from_slice(&1u32.to_be_bytes());
    body.extend_from_slice(&1u32.to_be_bytes());
    body.extend_from_slice(&samples_per_chunk.to_be_bytes());
    body.extend_from_slice(&1u32.to_be_bytes());
    boxed(b"stsc", &body)
  };
  let stco = {
    let mut body = vec![0u8; 4];
    body.extend_from_slice(&(chunk_offsets.len() as u32).to_be_bytes());
    for offset in chunk_offsets {
      body.extend_from_slice(&offset.to_be_bytes());
    }
    boxed(b"stco", &body)
  };
  let stsz = {
    let mut body = vec![0u8; 4];
    body.extend_from_slice(&0u32.to_be_bytes());
    body.extend_from_slice(&(samples.len() as u32).to_be_bytes());
    for sample in samples {
      body.extend_from_slice(&(sample.len() as u32).to_be_bytes());
    }
    boxed(b"stsz", &body)
  };

  let stbl = boxed(b"stbl", &[stsc, stco, stsz].concat());
  let minf = boxed(b"minf", &stbl);
  let mdia = boxed(b"mdia", &[hdlr, minf].concat());
  let trak = boxed(b"trak", &mdia);
  let moov = boxed(b"moov", &trak);

  [ftyp, mdat, moov].concat()
}
