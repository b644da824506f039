use std::{convert::Infallible, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use siteplan_macros::Configurable;

use crate::{
  error::ConfigError,
  nav::{NavEntryLiteral, NavModel},
  sidebar::{SidebarItemLiteral, SidebarTree},
};

/// Default heading depth the generator extracts into the sidebar.
pub const DEFAULT_SIDEBAR_DEPTH: u8 = 1;

/// The `lastUpdated` theme option: off, on with the generator's own label,
/// or on with a custom label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastUpdated {
  Enabled(bool),
  Label(String),
}

impl Default for LastUpdated {
  fn default() -> Self {
    Self::Enabled(false)
  }
}

impl LastUpdated {
  #[must_use]
  pub const fn is_enabled(&self) -> bool {
    match self {
      Self::Enabled(enabled) => *enabled,
      Self::Label(_) => true,
    }
  }
}

impl FromStr for LastUpdated {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "true" => Self::Enabled(true),
      "false" => Self::Enabled(false),
      label => Self::Label(label.to_string()),
    })
  }
}

/// Theme options as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Configurable)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfigLiteral {
  /// Heading depth extracted into the sidebar (0 = page titles only).
  #[config(key = "sidebarDepth", allow_empty)]
  pub sidebar_depth: Option<u8>,

  #[config(key = "lastUpdated", allow_empty)]
  pub last_updated: Option<LastUpdated>,

  pub nav: Vec<NavEntryLiteral>,

  pub sidebar: IndexMap<String, Vec<SidebarItemLiteral>>,
}

/// Validated theme options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
  pub sidebar_depth: u8,
  pub last_updated:  LastUpdated,
  pub nav:           NavModel,
  pub sidebar:       SidebarTree,
}

impl Default for ThemeConfig {
  fn default() -> Self {
    Self {
      sidebar_depth: DEFAULT_SIDEBAR_DEPTH,
      last_updated:  LastUpdated::default(),
      nav:           NavModel::default(),
      sidebar:       SidebarTree::default(),
    }
  }
}

impl TryFrom<ThemeConfigLiteral> for ThemeConfig {
  type Error = ConfigError;

  fn try_from(literal: ThemeConfigLiteral) -> Result<Self, Self::Error> {
    Ok(Self {
      sidebar_depth: literal.sidebar_depth.unwrap_or(DEFAULT_SIDEBAR_DEPTH),
      last_updated:  literal.last_updated.unwrap_or_default(),
      nav:           NavModel::build(literal.nav)?,
      sidebar:       SidebarTree::build(literal.sidebar)?,
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use serde_json::json;

  use super::*;

  #[test]
  fn test_last_updated_shapes() {
    let label: LastUpdated = serde_json::from_value(json!("Last Updated")).unwrap();
    assert_eq!(label, LastUpdated::Label("Last Updated".to_string()));
    assert!(label.is_enabled());

    let off: LastUpdated = serde_json::from_value(json!(false)).unwrap();
    assert!(!off.is_enabled());
    assert_eq!(serde_json::to_value(&off).unwrap(), json!(false));
  }

  #[test]
  fn test_last_updated_from_str() {
    assert_eq!("true".parse::<LastUpdated>().unwrap(), LastUpdated::Enabled(true));
    assert_eq!(
      "Updated".parse::<LastUpdated>().unwrap(),
      LastUpdated::Label("Updated".to_string())
    );
  }

  #[test]
  fn test_defaults_apply_to_missing_fields() {
    let theme = ThemeConfig::try_from(ThemeConfigLiteral::default()).unwrap();
    assert_eq!(theme, ThemeConfig::default());
    assert_eq!(theme.sidebar_depth, 1);
  }

  #[test]
  fn test_overrides() {
    let mut literal = ThemeConfigLiteral::default();
    literal.apply_override("sidebarDepth", "0").unwrap();
    literal.apply_override("lastUpdated", "Last Updated").unwrap();

    assert_eq!(literal.sidebar_depth, Some(0));
    assert_eq!(
      literal.last_updated,
      Some(LastUpdated::Label("Last Updated".to_string()))
    );

    literal.apply_override("sidebarDepth", "").unwrap();
    assert_eq!(literal.sidebar_depth, None);

    let err = literal.apply_override("sidebarDepth", "deep").unwrap_err();
    assert!(err.to_string().contains("sidebarDepth"));
  }

  #[test]
  fn test_override_keys() {
    assert_eq!(ThemeConfigLiteral::override_keys(), [
      "sidebarDepth",
      "lastUpdated"
    ]);
  }

  #[test]
  fn test_merge_appends_nav_and_replaces_sections() {
    let mut base: ThemeConfigLiteral = serde_json::from_value(json!({
      "sidebarDepth": 0,
      "nav": [{ "text": "前端", "link": "/front-end/" }],
      "sidebar": { "/front-end/": ["/front-end/a"] }
    }))
    .unwrap();
    let other: ThemeConfigLiteral = serde_json::from_value(json!({
      "nav": [{ "text": "算法", "link": "/algorithm/" }],
      "sidebar": { "/front-end/": ["/front-end/b"], "/algorithm/": [] }
    }))
    .unwrap();

    base.merge_fields(other);

    assert_eq!(base.sidebar_depth, Some(0));
    assert_eq!(base.nav.len(), 2);
    assert_eq!(base.sidebar.len(), 2);
    assert_eq!(
      base.sidebar["/front-end/"],
      [SidebarItemLiteral::Page(crate::sidebar::PageRefLiteral::Bare(
        "/front-end/b".to_string()
      ))]
    );
  }
}
