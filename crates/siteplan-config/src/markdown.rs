use serde::{Deserialize, Serialize};
use siteplan_macros::Configurable;

/// Markdown rendering options passed through to the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Configurable)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownLiteral {
  /// Show line numbers on code blocks.
  #[config(key = "lineNumber", allow_empty)]
  pub line_number: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownOptions {
  pub line_number: bool,
}

impl From<MarkdownLiteral> for MarkdownOptions {
  fn from(literal: MarkdownLiteral) -> Self {
    Self {
      line_number: literal.line_number.unwrap_or_default(),
    }
  }
}
