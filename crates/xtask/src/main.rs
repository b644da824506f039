use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;

const BIN_NAME: &str = "siteplan";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the siteplan CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Shells to generate completions for. Defaults to all supported shells.
    #[arg(long, value_enum, conflicts_with = "manpage_only")]
    shell: Vec<Shell>,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate the manpage.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  match Xtask::parse().command {
    Commands::Dist {
      output_dir,
      shell,
      completions_only,
      manpage_only,
    } => {
      if !manpage_only {
        let shells = if shell.is_empty() {
          vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell]
        } else {
          shell
        };
        generate_completions(&output_dir, &shells)?;
      }
      if !completions_only {
        generate_manpage(&output_dir)?;
      }
    },
  }

  Ok(())
}

fn generate_completions(output_dir: &Path, shells: &[Shell]) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir)?;

  let mut cmd = siteplan::cli::Cli::command();
  for shell in shells {
    let path = generate_to(*shell, &mut cmd, BIN_NAME, &completions_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
    println!("Wrote {}", path.display());
  }
  Ok(())
}

fn generate_manpage(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)?;

  let file_path = man_dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  Man::new(siteplan::cli::Cli::command())
    .render(&mut file)
    .context("Failed to render manpage")?;

  println!("Wrote {}", file_path.display());
  Ok(())
}
