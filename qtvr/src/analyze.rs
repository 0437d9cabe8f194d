//! Diagnostic dump of a movie's box structure. Not on the fix path.

use std::io::Write;

use serde::Serialize;

use crate::container::{Container, FourCC, is_container_type};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStructure {
  pub typ: FourCC,
  pub offset: u64,
  pub size: u32,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub boxes: Vec<BoxStructure>,
}

/// Nested listing of every box in the file, recursing into the known
/// container types only.
pub fn file_structure(data: &[u8]) -> Result<Vec<BoxStructure>> {
  let root = Container::whole_file(data.len() as u64);
  structure_of(data, &root)
}

fn structure_of(data: &[u8], parent: &Container) -> Result<Vec<BoxStructure>> {
  let mut listing = Vec::new();
  for child in parent.children(data) {
    let child = child?;
    let boxes = if is_container_type(child.header.typ) {
      structure_of(data, &child)?
    } else {
      Vec::new()
    };
    listing.push(BoxStructure {
      typ: child.header.typ,
      offset: child.start,
      size: child.header.size,
      boxes,
    });
  }
  Ok(listing)
}

/// Indented text rendering of the box tree.
pub fn write_tree<W: Write>(out: &mut W, data: &[u8]) -> Result<()> {
  let root = Container::whole_file(data.len() as u64);
  write_children(out, data, &root, 0)
}

fn write_children<W: Write>(out: &mut W, data: &[u8], parent: &Container, depth: usize) -> Result<()> {
  for child in parent.children(data) {
    let child = child?;
    writeln!(
      out,
      "{:indent$}{}: '{}' box ({} bytes)",
      "",
      child.start,
      child.header.typ,
      child.header.size,
      indent = depth * 2
    )?;
    if is_container_type(child.header.typ) {
      write_children(out, data, &child, depth + 1)?;
    }
  }
  Ok(())
}
