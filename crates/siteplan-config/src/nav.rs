use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A nav entry as written in a config file, before validation.
///
/// Exactly one of `link` or a non-empty `items` must be present; the
/// builder enforces this and produces a [`NavEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NavEntryLiteral {
  /// Label shown in the navigation bar.
  #[serde(default)]
  pub text: String,

  /// Target of a direct link.
  #[serde(default)]
  pub link: Option<String>,

  /// Dropdown items of a group.
  #[serde(default)]
  pub items: Option<Vec<NavEntryLiteral>>,
}

impl NavEntryLiteral {
  /// Literal for a direct link.
  #[must_use]
  pub fn link(text: impl Into<String>, link: impl Into<String>) -> Self {
    Self {
      text:  text.into(),
      link:  Some(link.into()),
      items: None,
    }
  }

  /// Literal for a dropdown group.
  #[must_use]
  pub fn group(text: impl Into<String>, items: Vec<Self>) -> Self {
    Self {
      text:  text.into(),
      link:  None,
      items: Some(items),
    }
  }
}

/// A leaf navigation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
  pub text: String,
  pub link: String,
}

impl NavLink {
  /// Whether the link leaves the site. The generator renders these with an
  /// external-link marker and does not resolve them against `base`.
  #[must_use]
  pub fn is_external(&self) -> bool {
    const SCHEMES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];
    self.link.starts_with("//")
      || SCHEMES.iter().any(|scheme| self.link.starts_with(scheme))
  }
}

/// A dropdown group. Items are always links; groups do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavGroup {
  pub text:  String,
  pub items: Vec<NavLink>,
}

/// One entry in the top navigation bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NavEntry {
  Link(NavLink),
  Group(NavGroup),
}

impl NavEntry {
  /// Label shown in the navigation bar.
  #[must_use]
  pub fn text(&self) -> &str {
    match self {
      Self::Link(link) => &link.text,
      Self::Group(group) => &group.text,
    }
  }

  fn from_literal(
    literal: NavEntryLiteral,
    location: &str,
    top_level: bool,
  ) -> Result<Self, ConfigError> {
    let malformed = |reason: &str| {
      ConfigError::MalformedNavEntry {
        location: format!("{location} ('{}')", literal.text),
        reason:   reason.to_string(),
      }
    };

    if literal.text.trim().is_empty() {
      return Err(malformed("entry has no text"));
    }

    let has_link = literal.link.is_some();
    let blank_link = literal
      .link
      .as_deref()
      .is_some_and(|link| link.trim().is_empty());
    let item_count = literal.items.as_ref().map(Vec::len);

    match (has_link, item_count) {
      (true, Some(count)) if count > 0 => {
        Err(malformed("entry has both 'link' and 'items'"))
      },
      (true, _) if blank_link => Err(malformed("entry has an empty 'link'")),
      (false, None) => Err(malformed("entry has neither 'link' nor 'items'")),
      (false, Some(0)) => Err(malformed("group has no items")),
      (false, Some(_)) if !top_level => {
        Err(malformed("groups cannot be nested inside a group"))
      },
      (true, _) => {
        Ok(Self::Link(NavLink {
          text: literal.text,
          link: literal.link.unwrap_or_default(),
        }))
      },
      (false, Some(_)) => {
        let items = literal
          .items
          .unwrap_or_default()
          .into_iter()
          .enumerate()
          .map(|(idx, item)| {
            match Self::from_literal(
              item,
              &format!("{location}.items[{idx}]"),
              false,
            )? {
              Self::Link(link) => Ok(link),
              Self::Group(_) => {
                Err(malformed("groups cannot be nested inside a group"))
              },
            }
          })
          .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Group(NavGroup {
          text: literal.text,
          items,
        }))
      },
    }
  }
}

/// The validated top navigation bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavModel {
  entries: Vec<NavEntry>,
}

impl NavModel {
  /// Validate literal entries into a [`NavModel`], preserving their order.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::MalformedNavEntry`] for an entry with both or
  /// neither of `link` and `items`, an empty group, a group nested inside a
  /// group, or an entry without text.
  pub fn build(literals: Vec<NavEntryLiteral>) -> Result<Self, ConfigError> {
    let entries = literals
      .into_iter()
      .enumerate()
      .map(|(idx, literal)| {
        NavEntry::from_literal(literal, &format!("nav[{idx}]"), true)
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self { entries })
  }

  #[must_use]
  pub fn entries(&self) -> &[NavEntry] {
    &self.entries
  }

  #[must_use]
  pub const fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Every link in display order, dropdown items included.
  pub fn links(&self) -> impl Iterator<Item = &NavLink> {
    self.entries.iter().flat_map(|entry| {
      match entry {
        NavEntry::Link(link) => std::slice::from_ref(link).iter(),
        NavEntry::Group(group) => group.items.iter(),
      }
    })
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  fn journey() -> NavEntryLiteral {
    NavEntryLiteral::group("旅途", vec![
      NavEntryLiteral::link("每日记录", "/daily-record/"),
      NavEntryLiteral::link("健身&营养学", "/fitness/"),
    ])
  }

  #[test]
  fn test_build_preserves_order_and_shape() {
    let nav = NavModel::build(vec![
      NavEntryLiteral::link("前端", "/front-end/"),
      journey(),
      NavEntryLiteral::link("GitHub", "https://github.com/JuntingLiu"),
    ])
    .unwrap();

    let texts: Vec<_> = nav.entries().iter().map(NavEntry::text).collect();
    assert_eq!(texts, ["前端", "旅途", "GitHub"]);
    assert!(matches!(&nav.entries()[1], NavEntry::Group(g) if g.items.len() == 2));
  }

  #[test]
  fn test_link_with_items_is_rejected() {
    let mut github = NavEntryLiteral::link("GitHub", "https://github.com/x");
    github.items = Some(vec![NavEntryLiteral::link("Repo", "/repo/")]);

    let err = NavModel::build(vec![github]).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedNavEntry { .. }));
    assert!(err.to_string().contains("both 'link' and 'items'"));
    assert!(err.to_string().contains("nav[0]"));
  }

  #[test]
  fn test_link_with_empty_items_is_a_link() {
    let mut github = NavEntryLiteral::link("GitHub", "https://github.com/x");
    github.items = Some(Vec::new());

    let nav = NavModel::build(vec![github]).unwrap();
    assert!(matches!(nav.entries()[0], NavEntry::Link(_)));
  }

  #[test]
  fn test_entry_with_neither_is_rejected() {
    let bare = NavEntryLiteral {
      text: "Orphan".to_string(),
      ..Default::default()
    };
    let err = NavModel::build(vec![bare]).unwrap_err();
    assert!(err.to_string().contains("neither 'link' nor 'items'"));
  }

  #[test]
  fn test_empty_group_is_rejected() {
    let err =
      NavModel::build(vec![NavEntryLiteral::group("Empty", Vec::new())])
        .unwrap_err();
    assert!(err.to_string().contains("group has no items"));
  }

  #[test]
  fn test_nested_group_is_rejected() {
    let nested = NavEntryLiteral::group("Outer", vec![journey()]);
    let err = NavModel::build(vec![nested]).unwrap_err();
    assert!(err.to_string().contains("nav[0].items[0]"));
    assert!(err.to_string().contains("cannot be nested"));
  }

  #[test]
  fn test_missing_text_is_rejected() {
    let err =
      NavModel::build(vec![NavEntryLiteral::link(" ", "/x/")]).unwrap_err();
    assert!(err.to_string().contains("no text"));
  }

  #[test]
  fn test_links_flattens_groups() {
    let nav = NavModel::build(vec![
      NavEntryLiteral::link("书", "/books/"),
      journey(),
    ])
    .unwrap();

    let targets: Vec<_> = nav.links().map(|l| l.link.as_str()).collect();
    assert_eq!(targets, ["/books/", "/daily-record/", "/fitness/"]);
  }

  #[test]
  fn test_is_external() {
    let link = |target: &str| {
      NavLink {
        text: "x".to_string(),
        link: target.to_string(),
      }
    };
    assert!(link("https://juntingliu.github.io/resume/").is_external());
    assert!(link("mailto:someone@example.com").is_external());
    assert!(link("//cdn.example.com").is_external());
    assert!(!link("/about-me/").is_external());
  }

  #[test]
  fn test_serializes_to_generator_shape() {
    let nav = NavModel::build(vec![
      NavEntryLiteral::link("算法", "/algorithm/"),
      NavEntryLiteral::group("关于我", vec![NavEntryLiteral::link(
        "介绍",
        "/about-me/",
      )]),
    ])
    .unwrap();

    assert_eq!(
      serde_json::to_value(&nav).unwrap(),
      serde_json::json!([
        { "text": "算法", "link": "/algorithm/" },
        { "text": "关于我", "items": [{ "text": "介绍", "link": "/about-me/" }] }
      ])
    );
  }
}
