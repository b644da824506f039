use thiserror::Error;

/// Error type for template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
  /// The requested configuration format is not supported.
  #[error("Unsupported config format: {0}")]
  UnsupportedFormat(String),
}

/// Starter configuration in TOML, commented so a new user can find their way
/// around the generator's keys.
pub const DEFAULT_TOML_TEMPLATE: &str = r##"# siteplan configuration
#
# Key names match the site generator's own config object, so this file can be
# exported verbatim with `siteplan export`.

# Site title, shown in the navbar
title = "My Blog"

# Rendered as <meta name="description">
description = "Notes, one step at a time"

# Path the site is deployed under. Must begin and end with "/".
# For a GitHub project page this is "/<repository>/".
base = "/"

# Tags injected into every page's <head>: [tag, { attributes }, content?]
head = [
  ["link", { rel = "icon", href = "/favicon.ico" }],
  ["meta", { name = "theme-color", content = "#3eaf7c" }],
]

[markdown]
# Show line numbers on code blocks
lineNumber = true

[themeConfig]
# Heading depth extracted into the sidebar (0 = page titles only)
sidebarDepth = 0

# false, true, or a custom label such as "Last Updated"
lastUpdated = "Last Updated"

# Top navigation. Each entry has either `link` or `items`, never both.
# Dropdown items are always plain links.
nav = [
  { text = "Guide", link = "/guide/" },
  { text = "More", items = [
    { text = "About", link = "/about/" },
    { text = "GitHub", link = "https://github.com/" },
  ] },
]

# Sidebar per section root. Roots begin and end with "/" and may not nest.
# Items are a page path, a [path, title] pair, or a group with a title and
# children. A page may appear only once per group.
[themeConfig.sidebar]
"/guide/" = [
  ["/guide/", "Introduction"],
  { title = "Basics", children = [
    "/guide/getting-started",
    ["/guide/configuration", "Configuration"],
  ] },
]
"/about/" = [
  { title = "About", children = [["/about/", "Me"]] },
]
"##;

/// Starter configuration in JSON.
pub const DEFAULT_JSON_TEMPLATE: &str = r##"{
  "title": "My Blog",
  "description": "Notes, one step at a time",
  "head": [
    ["link", { "rel": "icon", "href": "/favicon.ico" }],
    ["meta", { "name": "theme-color", "content": "#3eaf7c" }]
  ],
  "base": "/",
  "markdown": {
    "lineNumber": true
  },
  "themeConfig": {
    "sidebarDepth": 0,
    "lastUpdated": "Last Updated",
    "nav": [
      { "text": "Guide", "link": "/guide/" },
      {
        "text": "More",
        "items": [
          { "text": "About", "link": "/about/" },
          { "text": "GitHub", "link": "https://github.com/" }
        ]
      }
    ],
    "sidebar": {
      "/guide/": [
        ["/guide/", "Introduction"],
        {
          "title": "Basics",
          "children": [
            "/guide/getting-started",
            ["/guide/configuration", "Configuration"]
          ]
        }
      ],
      "/about/": [
        { "title": "About", "children": [["/about/", "Me"]] }
      ]
    }
  }
}
"##;

/// Get the starter configuration for the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::config::{SiteConfig, SiteConfigLiteral};

  fn assemble(value: serde_json::Value) -> SiteConfig {
    let (literal, ignored) = SiteConfigLiteral::from_value(value).unwrap();
    assert!(ignored.is_empty(), "unexpected keys: {ignored:?}");
    SiteConfig::assemble(literal).unwrap()
  }

  #[test]
  fn test_templates_assemble_to_the_same_config() {
    let from_toml =
      assemble(toml::from_str(get_template("toml").unwrap()).unwrap());
    let from_json =
      assemble(serde_json::from_str(get_template("JSON").unwrap()).unwrap());

    assert_eq!(from_toml, from_json);
    assert_eq!(
      from_toml.to_generator_json().unwrap(),
      from_json.to_generator_json().unwrap()
    );

    let roots: Vec<_> = from_toml
      .theme_config()
      .sidebar
      .sections()
      .map(|(root, _)| root)
      .collect();
    assert_eq!(roots, ["/guide/", "/about/"]);
  }

  #[test]
  fn test_unsupported_format() {
    let err = get_template("yaml").unwrap_err();
    assert_eq!(err.to_string(), "Unsupported config format: yaml");
  }
}
