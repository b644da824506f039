use std::{io, path::PathBuf};

use color_eyre::eyre::Result;
use siteplan::{
  cli::{Cli, Commands},
  commands,
};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(cli.verbose.log_level_filter())
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let files: &[PathBuf] = &cli.config_files;
  let overrides: &[String] = &cli.config_overrides;
  let mut stdout = io::stdout().lock();

  match &cli.command {
    Commands::Check => commands::check(files, overrides),
    Commands::Export { output } => {
      commands::export(files, overrides, output.as_deref(), &mut stdout)
    },
    Commands::Resolve { path } => {
      commands::resolve(files, overrides, path, &mut stdout)
    },
    Commands::Keys => commands::keys(&mut stdout),
    Commands::Init {
      output,
      format,
      force,
    } => commands::init(output, format, *force),
  }
}
