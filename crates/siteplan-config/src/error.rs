use thiserror::Error;

/// Error type for siteplan-config operations.
///
/// Every variant is raised while loading or assembling a configuration.
/// Nothing here is recoverable at runtime; a malformed config fails the
/// build.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Malformed nav entry at {location}: {reason}")]
  MalformedNavEntry { location: String, reason: String },

  #[error("Malformed sidebar group at {location}: {reason}")]
  MalformedSidebarGroup { location: String, reason: String },

  #[error("Duplicate page '{path}' in sidebar section '{section}' ({group})")]
  DuplicatePageRef {
    section: String,
    group:   String,
    path:    String,
  },

  #[error("Invalid sidebar section root '{0}': must begin and end with '/'")]
  InvalidSectionRoot(String),

  #[error("Sidebar section '{inner}' overlaps section '{outer}'")]
  OverlappingSectionRoots { outer: String, inner: String },

  #[error("Malformed head tag #{index}: {reason}")]
  MalformedHeadTag { index: usize, reason: String },

  #[error("Invalid base path '{0}': must begin and end with '/'")]
  InvalidBase(String),

  #[error("Invalid override for '{key}': {reason}")]
  Override { key: String, reason: String },

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Template error: {0}")]
  Template(String),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

impl ConfigError {
  /// Qualify an override error with the section it was raised in, so that
  /// `sidebarDepth` is reported as `themeConfig.sidebarDepth`.
  #[must_use]
  pub fn within(self, section: &str) -> Self {
    match self {
      Self::Override { key, reason } => {
        Self::Override {
          key: format!("{section}.{key}"),
          reason,
        }
      },
      other => other,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_within_prefixes_override_keys() {
    let err = ConfigError::Override {
      key:    "sidebarDepth".to_string(),
      reason: "bad".to_string(),
    }
    .within("themeConfig");

    assert_eq!(
      err.to_string(),
      "Invalid override for 'themeConfig.sidebarDepth': bad"
    );
  }

  #[test]
  fn test_within_leaves_other_variants_alone() {
    let err = ConfigError::InvalidBase("Blog".to_string()).within("x");
    assert!(matches!(err, ConfigError::InvalidBase(ref b) if b == "Blog"));
  }
}
