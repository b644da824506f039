use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

/// Command line interface for siteplan
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "siteplan: validate and export static site navigation config"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  #[command(flatten)]
  pub verbose: Verbosity<InfoLevel>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times), e.g. `--config themeConfig.sidebarDepth=2`
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the siteplan CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Load and validate the configuration, then print a summary.
  Check,

  /// Write the configuration in the shape the site generator consumes.
  Export {
    /// Output file. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Show which sidebar section serves a page path.
  Resolve {
    /// Page path relative to the site base, e.g. `/fitness/keep/`.
    path: String,
  },

  /// List the keys accepted by `--config KEY=VALUE`.
  Keys,

  /// Initialize a new siteplan configuration file.
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "siteplan.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
