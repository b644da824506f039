use std::{
  fs,
  io::Write,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use siteplan_config::{SidebarItem, SiteConfig, SiteConfigLiteral};

/// Load the configuration and log a summary of what it contains.
///
/// # Errors
///
/// Returns an error if loading or validation fails.
pub fn check(config_files: &[PathBuf], overrides: &[String]) -> Result<()> {
  let config = SiteConfig::load(config_files, overrides)
    .wrap_err("Configuration is invalid")?;
  let theme = config.theme_config();

  info!(
    "'{}' is valid: {} nav entries ({} links), {} sidebar sections, {} pages",
    config.title(),
    theme.nav.len(),
    theme.nav.links().count(),
    theme.sidebar.len(),
    theme.sidebar.page_count()
  );
  Ok(())
}

/// Write the generator JSON to `output`, or to `out` when no file is given.
///
/// # Errors
///
/// Returns an error if loading fails or the output cannot be written.
pub fn export(
  config_files: &[PathBuf],
  overrides: &[String],
  output: Option<&Path>,
  out: &mut impl Write,
) -> Result<()> {
  let config = SiteConfig::load(config_files, overrides)
    .wrap_err("Configuration is invalid")?;
  let json = config.to_generator_json()?;

  if let Some(path) = output {
    fs::write(path, format!("{json}\n")).wrap_err_with(|| {
      format!("Failed to write config to {}", path.display())
    })?;
    info!("Exported config to {}", path.display());
  } else {
    writeln!(out, "{json}")?;
  }
  Ok(())
}

/// Describe the section serving `page_path` and the groups listing it.
///
/// # Errors
///
/// Returns an error if loading fails or no section serves the path.
pub fn resolve(
  config_files: &[PathBuf],
  overrides: &[String],
  page_path: &str,
  out: &mut impl Write,
) -> Result<()> {
  let config = SiteConfig::load(config_files, overrides)
    .wrap_err("Configuration is invalid")?;

  let Some((root, items)) =
    config.theme_config().sidebar.section_for(page_path)
  else {
    bail!("No sidebar section serves {page_path}");
  };

  writeln!(out, "section: {root}")?;
  writeln!(out, "url: {}", config.url_for(page_path))?;

  let wanted = siteplan_config::sidebar::normalize_page_path(page_path);
  for item in items {
    match item {
      SidebarItem::Page(page) => {
        let label = page.title().unwrap_or("(page title)");
        writeln!(out, "- {label}")?;
      },
      SidebarItem::Group(group) => {
        let listed = group.children.iter().any(|page| {
          siteplan_config::sidebar::normalize_page_path(page.path()) == wanted
        });
        let marker = if listed { "*" } else { "-" };
        writeln!(out, "{marker} {}", group.title)?;
      },
    }
  }
  Ok(())
}

/// List the keys accepted by `--config KEY=VALUE`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn keys(out: &mut impl Write) -> Result<()> {
  for key in SiteConfigLiteral::override_keys() {
    writeln!(out, "{key}")?;
  }
  Ok(())
}

/// Write a starter configuration file.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or if it
/// cannot be written.
pub fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  SiteConfig::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!(
    "Configuration file created successfully. Edit it, then run `siteplan \
     check`."
  );
  Ok(())
}
