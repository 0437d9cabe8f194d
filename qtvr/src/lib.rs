//! Library to locate panoramic samples in QuickTime VR movies and repair
//! broken hotspot metadata in place.
//!
//! QuickTime 7.6.9 crashes on QTVR movies whose panoramic sample declares
//! hotspot frames while carrying no hotspot image. [`fix_movie`] walks the
//! movie's box tree, resolves each panoramic sample through the track's
//! chunk and size tables, and zeroes the stray frame-count fields where the
//! defect is present. No other bytes are touched and the file never changes
//! size, so repaired movies stay playable in older players.
//!
//! # Example
//! ```rust,no_run
//! fn main() {
//!   let outcome = qtvr::fix_movie("tour.mov").unwrap();
//!   if outcome.samples_patched > 0 {
//!     println!("movie repaired");
//!   }
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod analyze;
pub mod atom;
pub mod boxes;
pub mod container;
pub mod fixer;
pub mod pano;

pub use fixer::{FixOutcome, MAX_MOVIE_SIZE, fix_mapped, fix_movie};

#[derive(Error, Debug)]
pub enum QtvrError {
  #[error("File not found: {}", _0.display())]
  NotFound(PathBuf),

  #[error("File is larger than allowed ({} bytes > {})", _0, _1)]
  TooLarge(u64, u64),

  #[error("Failed to map file: {}", _0)]
  Map(io::Error),

  #[error("I/O error: {}", _0)]
  Io(#[from] io::Error),

  #[error("Malformed movie: {}", _0)]
  Malformed(String),

  #[error("Unsupported format: {}", _0)]
  Unsupported(String),

  #[error("Failed to flush changes: {}", _0)]
  Flush(io::Error),
}

pub type Result<T> = std::result::Result<T, QtvrError>;
