use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use siteplan_macros::Configurable;

use crate::{
  error::ConfigError,
  head::HeadTag,
  markdown::{MarkdownLiteral, MarkdownOptions},
  theme::{ThemeConfig, ThemeConfigLiteral},
};

/// Base path used when the site is served from the domain root.
pub const DEFAULT_BASE: &str = "/";

/// File names probed, in order, when no config file is given.
const CONFIG_FILENAMES: [&str; 6] = [
  "siteplan.toml",
  "siteplan.json",
  ".siteplan.toml",
  ".siteplan.json",
  ".config/siteplan.toml",
  ".config/siteplan.json",
];

/// Site configuration as written in one or more config files.
///
/// Every scalar is optional so that layering files only replaces what a
/// later file actually sets. Nothing here is validated; turn it into a
/// [`SiteConfig`] with [`SiteConfig::assemble`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Configurable)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfigLiteral {
  /// Site title, shown in the navbar and used as the title suffix.
  #[config(key = "title", allow_empty)]
  pub title: Option<String>,

  /// Site description, rendered as `<meta name="description">`.
  #[config(key = "description", allow_empty)]
  pub description: Option<String>,

  /// Extra tags injected into every page's `<head>`.
  pub head: Vec<HeadTag>,

  /// Path the site is deployed under, e.g. `/Blog/` for a GitHub project
  /// page.
  #[config(key = "base", allow_empty)]
  pub base: Option<String>,

  #[config(key = "markdown", nested)]
  pub markdown: MarkdownLiteral,

  #[config(key = "themeConfig", nested)]
  pub theme_config: ThemeConfigLiteral,
}

impl SiteConfigLiteral {
  /// Load a literal from a JSON or TOML file, chosen by extension.
  ///
  /// Keys the model does not know about are logged and ignored, since the
  /// generator accepts many options this crate leaves alone.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if its
  /// extension is neither `json` nor `toml`.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .ok_or_else(|| {
        ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        ))
      })?;

    let value: serde_json::Value = match extension.as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })?
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })?
      },
      _ => {
        return Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )));
      },
    };

    let (literal, ignored) = Self::from_value(value).map_err(|e| {
      ConfigError::Config(format!(
        "Invalid config in {}: {}",
        path.display(),
        e
      ))
    })?;

    for key in ignored {
      log::warn!("{}: ignoring unknown key '{key}'", path.display());
    }

    Ok(literal)
  }

  /// Deserialize a literal from an already parsed document, returning it
  /// together with the paths of any keys that were not recognized.
  ///
  /// # Errors
  ///
  /// Returns an error if the document does not have the expected shape.
  pub fn from_value(
    value: serde_json::Value,
  ) -> Result<(Self, Vec<String>), ConfigError> {
    let mut ignored = Vec::new();
    let literal = serde_ignored::deserialize(value, |path: serde_ignored::Path| {
      ignored.push(path.to_string());
    })?;
    Ok((literal, ignored))
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// Keys use the exported names, dotted for nested sections:
  /// `title`, `base`, `markdown.lineNumber`, `themeConfig.sidebarDepth`,
  /// `themeConfig.lastUpdated`.
  ///
  /// # Errors
  ///
  /// Returns an error if a string is not `KEY=VALUE`, the key is unknown, or
  /// the value does not parse for that key.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Override {
          key:    override_str.clone(),
          reason: "expected KEY=VALUE".to_string(),
        }
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Merge another literal into this one, the other taking precedence.
  ///
  /// # Merge Rules
  ///
  /// - Scalars (`title`, `base`, `sidebarDepth`, ...): replaced when the other
  ///   literal sets them
  /// - `head` and `nav`: the other's entries are appended
  /// - `sidebar`: sections are added; a section root present in both takes
  ///   the other's items
  pub fn merge(&mut self, other: Self) {
    self.merge_fields(other);
  }
}

/// The assembled, validated site configuration.
///
/// Built once by [`SiteConfig::assemble`] or [`SiteConfig::load`] and read
/// only afterwards. Its serialized form is exactly what the site generator
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SiteConfigLiteral")]
pub struct SiteConfig {
  title:        String,
  description:  String,
  head:         Vec<HeadTag>,
  base:         String,
  markdown:     MarkdownOptions,
  theme_config: ThemeConfig,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      title:        String::new(),
      description:  String::new(),
      head:         Vec::new(),
      base:         DEFAULT_BASE.to_string(),
      markdown:     MarkdownOptions::default(),
      theme_config: ThemeConfig::default(),
    }
  }
}

impl TryFrom<SiteConfigLiteral> for SiteConfig {
  type Error = ConfigError;

  fn try_from(literal: SiteConfigLiteral) -> Result<Self, Self::Error> {
    Self::assemble(literal)
  }
}

impl SiteConfig {
  /// Validate a literal and assemble the immutable configuration.
  ///
  /// Missing fields take the generator's defaults.
  ///
  /// # Errors
  ///
  /// Returns the first validation failure: a malformed head tag, a base path
  /// that does not begin and end with `/`, or any nav or sidebar error.
  pub fn assemble(literal: SiteConfigLiteral) -> Result<Self, ConfigError> {
    for (index, tag) in literal.head.iter().enumerate() {
      tag.validate(index)?;
    }

    let base = literal.base.unwrap_or_else(|| DEFAULT_BASE.to_string());
    if !base.starts_with('/') || !base.ends_with('/') {
      return Err(ConfigError::InvalidBase(base));
    }

    let config = Self {
      title: literal.title.unwrap_or_default(),
      description: literal.description.unwrap_or_default(),
      head: literal.head,
      base,
      markdown: literal.markdown.into(),
      theme_config: ThemeConfig::try_from(literal.theme_config)?,
    };

    log::debug!(
      "Assembled site config: {} nav entries, {} sidebar sections, {} pages",
      config.theme_config.nav.len(),
      config.theme_config.sidebar.len(),
      config.theme_config.sidebar.page_count()
    );

    Ok(config)
  }

  /// Load, merge, override and assemble a configuration.
  ///
  /// Config files are merged in order, later files overriding earlier ones.
  /// Without explicit files a config is discovered with
  /// [`find_config_file`](Self::find_config_file), falling back to the
  /// defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if any file fails to load, an override is invalid, or
  /// the merged result fails validation.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut literal = if let Some((first, rest)) = config_files.split_first()
    {
      let mut merged = SiteConfigLiteral::from_file(first)?;
      for path in rest {
        merged.merge(SiteConfigLiteral::from_file(path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      SiteConfigLiteral::from_file(&discovered)?
    } else {
      log::info!("No config file found, using defaults");
      SiteConfigLiteral::default()
    };

    literal.apply_overrides(config_overrides)?;

    Self::assemble(literal)
  }

  /// Search for a config file in the working directory, then in
  /// `$XDG_CONFIG_HOME`.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    if let Some(found) = Self::find_config_file_in(&current_dir) {
      return Some(found);
    }

    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME")?;
    let xdg_config_dir = PathBuf::from(xdg_config_home);
    ["siteplan.toml", "siteplan.json"]
      .iter()
      .map(|name| xdg_config_dir.join(name))
      .find(|path| path.is_file())
  }

  /// Probe `dir` for the standard config file names.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  /// Write a commented starter configuration.
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// The configuration as pretty-printed generator JSON.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_generator_json(&self) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  #[must_use]
  pub fn title(&self) -> &str {
    &self.title
  }

  #[must_use]
  pub fn description(&self) -> &str {
    &self.description
  }

  #[must_use]
  pub fn head(&self) -> &[HeadTag] {
    &self.head
  }

  #[must_use]
  pub fn base(&self) -> &str {
    &self.base
  }

  #[must_use]
  pub const fn markdown(&self) -> &MarkdownOptions {
    &self.markdown
  }

  #[must_use]
  pub const fn theme_config(&self) -> &ThemeConfig {
    &self.theme_config
  }

  /// Absolute URL path of a site page once `base` is applied.
  #[must_use]
  pub fn url_for(&self, page_path: &str) -> String {
    format!("{}{}", self.base, page_path.trim_start_matches('/'))
  }
}
