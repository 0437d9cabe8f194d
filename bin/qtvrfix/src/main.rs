mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, error};
use qtvr::QtvrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
  #[error("I/O error: {}", _0)]
  Io(#[from] std::io::Error),
  #[error("{}", _0)]
  Qtvr(#[from] QtvrError),
  #[error("{}", _0)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

fn main() -> ExitCode {
  let matches = app::create_app().get_matches();

  let colors = ColoredLevelConfig::new().debug(Color::Magenta);
  fern::Dispatch::new()
    .chain(std::io::stderr())
    .level(match matches.get_count("debug") {
      0 => log::LevelFilter::Error,
      1 => log::LevelFilter::Warn,
      2 => log::LevelFilter::Info,
      3 => log::LevelFilter::Debug,
      _ => log::LevelFilter::Trace,
    })
    .format(move |out, message, record| {
      out.finish(format_args!(
        "[{:6}][{}] {} ({}:{})",
        colors.color(record.level()),
        record.target(),
        message,
        record.file().unwrap_or("<undefined>"),
        record.line().unwrap_or(0)
      ))
    })
    .apply()
    .expect("Invalid fern configuration, exiting");

  let structure = matches.get_flag("structure");
  let json = matches.get_flag("json");
  let files: Vec<PathBuf> = matches.get_many::<PathBuf>("FILE").expect("FILE not available").cloned().collect();

  // a failing file must not keep the rest of the batch from being fixed
  let mut failed = 0;
  for path in &files {
    let result = if structure { dump_structure(path, json) } else { fix(path) };
    if let Err(err) = result {
      error!("{}: {}", path.display(), err);
      failed += 1;
    }
  }

  if failed > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

fn fix(path: &PathBuf) -> Result<()> {
  debug!("Processing {}", path.display());
  let outcome = qtvr::fix_movie(path)?;
  if outcome.samples_patched > 0 {
    println!("Updated file {}", path.display());
  } else if outcome.pano_track {
    println!("File {} is already fine", path.display());
  } else {
    println!("File {} is not a QTVR movie, skipping", path.display());
  }
  Ok(())
}

fn dump_structure(path: &PathBuf, json: bool) -> Result<()> {
  let data = std::fs::read(path)?;
  if json {
    let listing = qtvr::analyze::file_structure(&data)?;
    println!("{}", serde_json::to_string_pretty(&listing)?);
  } else {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    qtvr::analyze::write_tree(&mut lock, &data)?;
  }
  Ok(())
}
