use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, crate_version, value_parser};
use log::debug;

pub fn create_app() -> Command {
  debug!("Creating CLAP app configuration");
  Command::new("qtvrfix")
    .version(crate_version!())
    .about("Fixes QTVR movie files which crash QuickTime 7.6.9 and later")
    .after_help(
      "Modifies the specified QTVR movie files in-place to fix a crashing bug which\n\
       occurs when the movie is played using QuickTime 7.6.9 or later.\n\
       The modifications are backwards-compatible. Non-QTVR movies will not be affected.",
    )
    .arg_required_else_help(true)
    .arg(
      Arg::new("debug")
        .short('d')
        .action(ArgAction::Count)
        .help("Sets the level of debugging information"),
    )
    .arg(
      Arg::new("structure")
        .long("structure")
        .action(ArgAction::SetTrue)
        .help("Print the movie's box structure instead of fixing it"),
    )
    .arg(
      Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .requires("structure")
        .help("Format the box structure as JSON"),
    )
    .arg(
      Arg::new("FILE")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .help("QTVR movie file(s) to fix in place"),
    )
}
