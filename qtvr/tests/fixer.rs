use std::fs;
use std::io::Write;

use qtvr::{MAX_MOVIE_SIZE, QtvrError, fix_mapped, fix_movie};

mod common;
use common::{FRAME_COUNTS_AT, movie, movie_with_chunks, pano_sample, pdat};

fn write_movie(data: &[u8]) -> tempfile::NamedTempFile {
  let _ = env_logger::builder().is_test(true).try_init();
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(data).unwrap();
  file.flush().unwrap();
  file
}

#[test]
fn patches_defective_movie_in_place() {
  let samples = vec![pano_sample(&pdat(0, 3, 2))];
  let original = movie(b"pano", &samples);
  let file = write_movie(&original);

  let outcome = fix_movie(file.path()).unwrap();
  assert_eq!(outcome.samples_patched, 1);
  assert!(outcome.pano_track);

  let patched = fs::read(file.path()).unwrap();
  assert_eq!(patched.len(), original.len());

  // the frame counts live inside the sample, which starts at byte 24
  let frames_at = 24 + FRAME_COUNTS_AT;
  for (i, (a, b)) in original.iter().zip(patched.iter()).enumerate() {
    if (frames_at..frames_at + 4).contains(&i) {
      continue;
    }
    assert_eq!(a, b, "byte {} changed", i);
  }
  assert_eq!(&patched[frames_at..frames_at + 4], &[0, 0, 0, 0]);
}

#[test]
fn second_run_is_a_no_op() {
  let samples = vec![pano_sample(&pdat(0, 3, 2))];
  let file = write_movie(&movie(b"pano", &samples));

  assert_eq!(fix_movie(file.path()).unwrap().samples_patched, 1);
  let after_first = fs::read(file.path()).unwrap();

  assert_eq!(fix_movie(file.path()).unwrap().samples_patched, 0);
  assert_eq!(fs::read(file.path()).unwrap(), after_first);
}

#[test]
fn patches_every_sample_in_a_chunk() {
  let samples = vec![pano_sample(&pdat(0, 3, 2)), pano_sample(&pdat(0, 1, 0))];
  let file = write_movie(&movie(b"pano", &samples));

  let outcome = fix_movie(file.path()).unwrap();
  assert_eq!(outcome.samples_patched, 2);
}

#[test]
fn patches_samples_across_chunks() {
  let samples = vec![pano_sample(&pdat(0, 3, 2)), pano_sample(&pdat(0, 1, 0))];
  let second_chunk = 24 + samples[0].len() as u32;
  let file = write_movie(&movie_with_chunks(b"pano", &samples, 1, &[24, second_chunk]));

  let outcome = fix_movie(file.path()).unwrap();
  assert_eq!(outcome.samples_patched, 2);
}

#[test]
fn compliant_movie_is_left_untouched() {
  let samples = vec![pano_sample(&pdat(5, 3, 2))];
  let original = movie(b"pano", &samples);
  let file = write_movie(&original);

  let outcome = fix_movie(file.path()).unwrap();
  assert_eq!(outcome.samples_patched, 0);
  assert!(outcome.pano_track);
  assert_eq!(fs::read(file.path()).unwrap(), original);
}

#[test]
fn non_pano_movie_is_ignored() {
  let samples = vec![pano_sample(&pdat(0, 3, 2))];
  let original = movie(b"vide", &samples);
  let file = write_movie(&original);

  let outcome = fix_movie(file.path()).unwrap();
  assert_eq!(outcome.samples_patched, 0);
  assert!(!outcome.pano_track);
  assert_eq!(fs::read(file.path()).unwrap(), original);
}

#[test]
fn missing_moov_is_malformed() {
  let mut data = Vec::new();
  data.extend_from_slice(&16u32.to_be_bytes());
  data.extend_from_slice(b"ftyp");
  data.extend_from_slice(b"qt  ");
  data.extend_from_slice(&0u32.to_be_bytes());
  let file = write_movie(&data);

  let err = fix_movie(file.path()).unwrap_err();
  assert!(matches!(err, QtvrError::Malformed(_)));
}

#[test]
fn missing_file_is_not_found() {
  let err = fix_movie("/no/such/movie.mov").unwrap_err();
  assert!(matches!(err, QtvrError::NotFound(_)));
}

#[test]
fn file_over_the_size_ceiling_is_rejected() {
  let file = tempfile::NamedTempFile::new().unwrap();
  file.as_file().set_len(MAX_MOVIE_SIZE + 1).unwrap();

  let err = fix_movie(file.path()).unwrap_err();
  assert!(matches!(err, QtvrError::TooLarge(_, _)));
}

#[test]
fn file_at_the_size_ceiling_is_accepted() {
  let file = tempfile::NamedTempFile::new().unwrap();
  file.as_file().set_len(MAX_MOVIE_SIZE).unwrap();

  // accepted past the ceiling check; all zeroes then fail the box walk
  let err = fix_movie(file.path()).unwrap_err();
  assert!(matches!(err, QtvrError::Malformed(_)));
}

#[test]
fn sample_range_behind_eof_is_malformed() {
  let samples = vec![pano_sample(&pdat(0, 3, 2))];
  let data = movie_with_chunks(b"pano", &samples, 1, &[60000]);
  let file = write_movie(&data);

  let err = fix_movie(file.path()).unwrap_err();
  assert!(matches!(err, QtvrError::Malformed(_)));
}

#[test]
fn fix_mapped_works_on_plain_buffers() {
  let samples = vec![pano_sample(&pdat(0, 3, 2))];
  let mut data = movie(b"pano", &samples);
  let outcome = fix_mapped(&mut data).unwrap();
  assert_eq!(outcome.samples_patched, 1);
}
