//! Tags injected into every page's `<head>`.
//!
//! The generator expects each tag as a JSON array:
//!
//! ```json
//! ["meta", { "name": "theme-color", "content": "#3eaf7c" }]
//! ["script", { "src": "/analytics.js" }, ""]
//! ```
//!
//! The optional third element is the tag's inner content.

use std::fmt;

use indexmap::IndexMap;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer,
  de::{self, SeqAccess, Visitor},
  ser::SerializeSeq,
};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadTag {
  pub name:       String,
  pub attributes: IndexMap<String, String>,
  pub content:    Option<String>,
}

impl HeadTag {
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  #[must_use]
  pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.attributes.insert(key.into(), value.into());
    self
  }

  #[must_use]
  pub fn with_content(mut self, content: impl Into<String>) -> Self {
    self.content = Some(content.into());
    self
  }

  /// Check that the tag name is a plausible HTML element name.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::MalformedHeadTag`] if the name is empty or holds
  /// anything other than ASCII letters, digits and `-`, or if an attribute
  /// name is empty.
  pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
    let malformed = |reason: String| {
      Err(ConfigError::MalformedHeadTag { index, reason })
    };

    if self.name.is_empty() {
      return malformed("tag name is empty".to_string());
    }
    if !self
      .name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
      return malformed(format!("invalid tag name '{}'", self.name));
    }
    if self.attributes.keys().any(|k| k.trim().is_empty()) {
      return malformed(format!("<{}> has an empty attribute name", self.name));
    }

    Ok(())
  }
}

impl Serialize for HeadTag {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let len = if self.content.is_some() { 3 } else { 2 };
    let mut seq = serializer.serialize_seq(Some(len))?;
    seq.serialize_element(&self.name)?;
    seq.serialize_element(&self.attributes)?;
    if let Some(ref content) = self.content {
      seq.serialize_element(content)?;
    }
    seq.end()
  }
}

struct HeadTagVisitor;

impl<'de> Visitor<'de> for HeadTagVisitor {
  type Value = HeadTag;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.write_str("a [tag, attributes] or [tag, attributes, content] array")
  }

  fn visit_seq<A>(self, mut seq: A) -> Result<HeadTag, A::Error>
  where
    A: SeqAccess<'de>,
  {
    let name: String = seq
      .next_element()?
      .ok_or_else(|| de::Error::invalid_length(0, &self))?;
    let attributes = seq.next_element()?.unwrap_or_default();
    let content = seq.next_element()?;

    if seq.next_element::<de::IgnoredAny>()?.is_some() {
      return Err(de::Error::invalid_length(4, &self));
    }

    Ok(HeadTag {
      name,
      attributes,
      content,
    })
  }
}

impl<'de> Deserialize<'de> for HeadTag {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_seq(HeadTagVisitor)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use serde_json::json;

  use super::*;

  #[test]
  fn test_round_trips_generator_shape() {
    let raw = json!(["meta", { "name": "theme-color", "content": "#3eaf7c" }]);
    let tag: HeadTag = serde_json::from_value(raw.clone()).unwrap();

    assert_eq!(tag.name, "meta");
    assert_eq!(tag.attributes["content"], "#3eaf7c");
    assert_eq!(tag.content, None);
    assert_eq!(serde_json::to_value(&tag).unwrap(), raw);
  }

  #[test]
  fn test_attribute_order_is_preserved() {
    let tag = HeadTag::new("link").attr("rel", "icon").attr("href", "/favicon.ico");
    assert_eq!(
      serde_json::to_string(&tag).unwrap(),
      r#"["link",{"rel":"icon","href":"/favicon.ico"}]"#
    );
  }

  #[test]
  fn test_inner_content() {
    let tag: HeadTag =
      serde_json::from_value(json!(["script", {}, "window.x = 1"])).unwrap();
    assert_eq!(tag, HeadTag::new("script").with_content("window.x = 1"));
    assert_eq!(
      serde_json::to_value(&tag).unwrap(),
      json!(["script", {}, "window.x = 1"])
    );
  }

  #[test]
  fn test_bad_arity_fails_to_parse() {
    assert!(serde_json::from_value::<HeadTag>(json!([])).is_err());
    assert!(
      serde_json::from_value::<HeadTag>(json!(["meta", {}, "", "extra"]))
        .is_err()
    );
  }

  #[test]
  fn test_validate() {
    assert!(HeadTag::new("meta").validate(0).is_ok());
    assert!(HeadTag::new("").validate(0).is_err());

    let err = HeadTag::new("my tag").validate(3).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedHeadTag { index: 3, .. }));

    let err = HeadTag::new("meta").attr(" ", "x").validate(1).unwrap_err();
    assert!(err.to_string().contains("empty attribute name"));
  }
}
