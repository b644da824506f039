use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  de::{self, MapAccess, SeqAccess, Visitor, value::MapAccessDeserializer},
};

use crate::error::ConfigError;

/// A sidebar group as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SidebarGroupLiteral {
  #[serde(default)]
  pub title: String,

  #[serde(default)]
  pub children: Vec<PageRefLiteral>,
}

/// A page reference as written in a config file: a bare path, or a sequence
/// that should hold exactly `[path, title]`.
///
/// Neither the arity nor the element types of the sequence are checked
/// while parsing, so that a bad pair is reported with its location when the
/// sidebar is built instead of as a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRefLiteral {
  Bare(String),
  Sequence(Vec<serde_json::Value>),
}

/// One item of a sidebar section as written in a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarItemLiteral {
  Page(PageRefLiteral),
  Group(SidebarGroupLiteral),
}

/// Visitor for the string/sequence/map shapes a sidebar item can take.
struct ItemVisitor {
  allow_group: bool,
}

impl<'de> Visitor<'de> for ItemVisitor {
  type Value = SidebarItemLiteral;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    if self.allow_group {
      formatter.write_str(
        "a page path, a [path, title] pair, or a map with 'title' and \
         'children'",
      )
    } else {
      formatter.write_str("a page path or a [path, title] pair")
    }
  }

  fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
  where
    E: de::Error,
  {
    Ok(SidebarItemLiteral::Page(PageRefLiteral::Bare(value.to_string())))
  }

  fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
  where
    A: SeqAccess<'de>,
  {
    let mut parts = Vec::with_capacity(seq.size_hint().unwrap_or(2));
    while let Some(part) = seq.next_element::<serde_json::Value>()? {
      parts.push(part);
    }
    Ok(SidebarItemLiteral::Page(PageRefLiteral::Sequence(parts)))
  }

  fn visit_map<M>(self, map: M) -> Result<Self::Value, M::Error>
  where
    M: MapAccess<'de>,
  {
    if !self.allow_group {
      return Err(de::Error::invalid_type(de::Unexpected::Map, &self));
    }
    SidebarGroupLiteral::deserialize(MapAccessDeserializer::new(map))
      .map(SidebarItemLiteral::Group)
  }
}

impl<'de> Deserialize<'de> for SidebarItemLiteral {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    deserializer.deserialize_any(ItemVisitor { allow_group: true })
  }
}

impl<'de> Deserialize<'de> for PageRefLiteral {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    match deserializer.deserialize_any(ItemVisitor { allow_group: false })? {
      SidebarItemLiteral::Page(page) => Ok(page),
      SidebarItemLiteral::Group(_) => {
        Err(de::Error::custom("sidebar groups cannot appear as children"))
      },
    }
  }
}

/// A reference to a page in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageRef {
  /// The page's own title is used.
  Bare(String),

  /// `(path, title)`, the title overriding the page's own.
  Titled(String, String),
}

impl PageRef {
  #[must_use]
  pub fn path(&self) -> &str {
    match self {
      Self::Bare(path) | Self::Titled(path, _) => path,
    }
  }

  /// Explicit display title, if one was given.
  #[must_use]
  pub fn title(&self) -> Option<&str> {
    match self {
      Self::Bare(_) => None,
      Self::Titled(_, title) => Some(title),
    }
  }

  fn from_literal(
    literal: PageRefLiteral,
    location: &str,
  ) -> Result<Self, ConfigError> {
    let malformed = |reason: String| {
      ConfigError::MalformedSidebarGroup {
        location: location.to_string(),
        reason,
      }
    };

    let page = match literal {
      PageRefLiteral::Bare(path) => Self::Bare(path),
      PageRefLiteral::Sequence(parts) => {
        let arity = parts.len();
        let pair: [serde_json::Value; 2] = parts.try_into().map_err(|_| {
          malformed(format!(
            "page pair must be exactly [path, title], found {arity} \
             element(s)"
          ))
        })?;
        match pair {
          [
            serde_json::Value::String(path),
            serde_json::Value::String(title),
          ] => Self::Titled(path, title),
          _ => {
            return Err(malformed(
              "page pair elements must both be strings".to_string(),
            ));
          },
        }
      },
    };

    if page.path().trim().is_empty() {
      return Err(malformed("page path is empty".to_string()));
    }

    Ok(page)
  }
}

/// Reduce a page path to the page it names: `.md`/`.html` suffixes are
/// dropped and a `README`/`index` file collapses to its directory.
#[must_use]
pub fn normalize_page_path(path: &str) -> String {
  let path = path.split(['#', '?']).next().unwrap_or_default();
  let path = path
    .strip_suffix(".md")
    .or_else(|| path.strip_suffix(".html"))
    .unwrap_or(path);

  match path.rsplit_once('/') {
    Some((dir, "README" | "index")) => format!("{dir}/"),
    _ => path.to_string(),
  }
}

/// A titled, ordered cluster of page links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarGroup {
  pub title:    String,
  pub children: Vec<PageRef>,
}

/// One item of a sidebar section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SidebarItem {
  Page(PageRef),
  Group(SidebarGroup),
}

/// Tracks normalized page paths within one group so duplicates are caught.
struct PageSet<'a> {
  section: &'a str,
  group:   String,
  seen:    HashSet<String>,
}

impl<'a> PageSet<'a> {
  fn new(section: &'a str, group: impl Into<String>) -> Self {
    Self {
      section,
      group: group.into(),
      seen: HashSet::new(),
    }
  }

  fn insert(&mut self, page: &PageRef) -> Result<(), ConfigError> {
    if self.seen.insert(normalize_page_path(page.path())) {
      Ok(())
    } else {
      Err(ConfigError::DuplicatePageRef {
        section: self.section.to_string(),
        group:   self.group.clone(),
        path:    page.path().to_string(),
      })
    }
  }
}

/// The validated sidebar: section root to ordered items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SidebarTree {
  sections: IndexMap<String, Vec<SidebarItem>>,
}

impl SidebarTree {
  /// Validate literal sections into a [`SidebarTree`].
  ///
  /// # Errors
  ///
  /// - [`ConfigError::InvalidSectionRoot`] if a root does not begin and end
  ///   with `/`
  /// - [`ConfigError::OverlappingSectionRoots`] if one root is a prefix of
  ///   another
  /// - [`ConfigError::MalformedSidebarGroup`] for an untitled group, an empty
  ///   page path, or a page pair that is not exactly `[path, title]`
  /// - [`ConfigError::DuplicatePageRef`] if a group (or the bare pages of a
  ///   section) names the same page twice
  pub fn build(
    literals: IndexMap<String, Vec<SidebarItemLiteral>>,
  ) -> Result<Self, ConfigError> {
    let mut sections = IndexMap::with_capacity(literals.len());

    for (root, items) in literals {
      if !root.starts_with('/') || !root.ends_with('/') {
        return Err(ConfigError::InvalidSectionRoot(root));
      }

      let items = Self::build_section(&root, items)?;
      log::debug!("Sidebar section {root}: {} item(s)", items.len());
      sections.insert(root, items);
    }

    for outer in sections.keys() {
      if let Some(inner) = sections
        .keys()
        .find(|inner| *inner != outer && inner.starts_with(outer.as_str()))
      {
        return Err(ConfigError::OverlappingSectionRoots {
          outer: outer.clone(),
          inner: inner.clone(),
        });
      }
    }

    Ok(Self { sections })
  }

  fn build_section(
    root: &str,
    items: Vec<SidebarItemLiteral>,
  ) -> Result<Vec<SidebarItem>, ConfigError> {
    let mut bare_pages = PageSet::new(root, "section pages");

    items
      .into_iter()
      .enumerate()
      .map(|(idx, item)| {
        let location = format!("sidebar[\"{root}\"][{idx}]");
        match item {
          SidebarItemLiteral::Page(literal) => {
            let page = PageRef::from_literal(literal, &location)?;
            bare_pages.insert(&page)?;
            Ok(SidebarItem::Page(page))
          },
          SidebarItemLiteral::Group(group) => {
            Self::build_group(root, group, &location).map(SidebarItem::Group)
          },
        }
      })
      .collect()
  }

  fn build_group(
    root: &str,
    literal: SidebarGroupLiteral,
    location: &str,
  ) -> Result<SidebarGroup, ConfigError> {
    if literal.title.trim().is_empty() {
      return Err(ConfigError::MalformedSidebarGroup {
        location: location.to_string(),
        reason:   "group has no title".to_string(),
      });
    }

    let mut pages = PageSet::new(root, format!("group '{}'", literal.title));
    let children = literal
      .children
      .into_iter()
      .enumerate()
      .map(|(idx, child)| {
        let page =
          PageRef::from_literal(child, &format!("{location}.children[{idx}]"))?;
        pages.insert(&page)?;
        Ok(page)
      })
      .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(SidebarGroup {
      title: literal.title,
      children,
    })
  }

  /// Sections in declaration order.
  pub fn sections(&self) -> impl Iterator<Item = (&str, &[SidebarItem])> {
    self
      .sections
      .iter()
      .map(|(root, items)| (root.as_str(), items.as_slice()))
  }

  /// Items of the section rooted exactly at `root`.
  #[must_use]
  pub fn get(&self, root: &str) -> Option<&[SidebarItem]> {
    self.sections.get(root).map(Vec::as_slice)
  }

  /// The section serving `page_path`, i.e. the one whose root prefixes it.
  /// `/books` resolves to the `/books/` section as well.
  #[must_use]
  pub fn section_for(&self, page_path: &str) -> Option<(&str, &[SidebarItem])> {
    self.sections().find(|(root, _)| {
      page_path.starts_with(root) || page_path == root.trim_end_matches('/')
    })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.sections.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }

  /// Total number of page references across all sections.
  #[must_use]
  pub fn page_count(&self) -> usize {
    self
      .sections
      .values()
      .flatten()
      .map(|item| {
        match item {
          SidebarItem::Page(_) => 1,
          SidebarItem::Group(group) => group.children.len(),
        }
      })
      .sum()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use serde_json::json;

  use super::*;

  fn literals(value: serde_json::Value) -> IndexMap<String, Vec<SidebarItemLiteral>> {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_fitness_section_keeps_two_groups_in_order() {
    let tree = SidebarTree::build(literals(json!({
      "/fitness/": [
        { "title": "健身", "children": [["/fitness/keep/", "相关知识"]] },
        { "title": "营养学知识", "children": [["/fitness/nutriology/", "相关知识"]] }
      ]
    })))
    .unwrap();

    let items = tree.get("/fitness/").unwrap();
    let titles: Vec<_> = items
      .iter()
      .map(|item| {
        match item {
          SidebarItem::Group(g) => g.title.as_str(),
          SidebarItem::Page(_) => panic!("expected only groups"),
        }
      })
      .collect();
    assert_eq!(titles, ["健身", "营养学知识"]);
  }

  #[test]
  fn test_bare_and_titled_children() {
    let tree = SidebarTree::build(literals(json!({
      "/front-end/": [
        { "title": "Vue", "children": [["/front-end/vue/", "介绍"], "/front-end/vue/basic"] }
      ]
    })))
    .unwrap();

    let SidebarItem::Group(group) = &tree.get("/front-end/").unwrap()[0] else {
      panic!("expected a group");
    };
    assert_eq!(group.children[0].title(), Some("介绍"));
    assert_eq!(group.children[1].title(), None);
    assert_eq!(group.children[1].path(), "/front-end/vue/basic");
  }

  #[test]
  fn test_section_level_page_before_group() {
    let tree = SidebarTree::build(literals(json!({
      "/books/": [
        ["/books/", "介绍"],
        { "title": "深入理解 ES6", "children": ["/books/understanding-es6/01-Block-Bindings"] }
      ]
    })))
    .unwrap();

    let items = tree.get("/books/").unwrap();
    assert!(matches!(&items[0], SidebarItem::Page(PageRef::Titled(p, _)) if p == "/books/"));
    assert!(matches!(&items[1], SidebarItem::Group(_)));
    assert_eq!(tree.page_count(), 2);
  }

  #[test]
  fn test_pair_arity_is_checked() {
    for bad in [json!(["/a/"]), json!(["/a/", "A", "extra"]), json!([])] {
      let err = SidebarTree::build(literals(json!({
        "/a/": [{ "title": "A", "children": [bad] }]
      })))
      .unwrap_err();
      assert!(matches!(err, ConfigError::MalformedSidebarGroup { .. }));
      assert!(err.to_string().contains("sidebar[\"/a/\"][0].children[0]"));
    }
  }

  #[test]
  fn test_pair_with_non_string_elements_is_malformed() {
    for bad in [json!(["/a/", "A", 3]), json!(["/a/", 3]), json!([null])] {
      let parsed = literals(json!({
        "/a/": [{ "title": "A", "children": [bad.clone()] }]
      }));
      let err = SidebarTree::build(parsed).unwrap_err();
      assert!(
        matches!(err, ConfigError::MalformedSidebarGroup { ref location, .. }
          if location == "sidebar[\"/a/\"][0].children[0]"),
        "{bad}: {err}"
      );
    }
  }

  #[test]
  fn test_duplicate_page_in_group_is_rejected() {
    let err = SidebarTree::build(literals(json!({
      "/front-end/": [{
        "title": "JavaScript",
        "children": ["/front-end/js/basic", "/front-end/js/basic.md"]
      }]
    })))
    .unwrap_err();

    assert!(matches!(
      err,
      ConfigError::DuplicatePageRef { ref path, .. } if path == "/front-end/js/basic.md"
    ));
  }

  #[test]
  fn test_same_page_in_different_groups_is_allowed() {
    let tree = SidebarTree::build(literals(json!({
      "/x/": [
        { "title": "One", "children": ["/x/page"] },
        { "title": "Two", "children": ["/x/page"] }
      ]
    })));
    assert!(tree.is_ok());
  }

  #[test]
  fn test_duplicate_bare_pages_in_section_are_rejected() {
    let err = SidebarTree::build(literals(json!({
      "/books/": ["/books/", ["/books/README.md", "介绍"]]
    })))
    .unwrap_err();
    assert!(err.to_string().contains("section pages"));
  }

  #[test]
  fn test_untitled_group_is_rejected() {
    let err = SidebarTree::build(literals(json!({
      "/x/": [{ "children": ["/x/a"] }]
    })))
    .unwrap_err();
    assert!(err.to_string().contains("no title"));
  }

  #[test]
  fn test_section_roots_are_validated() {
    let err = SidebarTree::build(literals(json!({ "anime/": [] }))).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSectionRoot(_)));

    let err = SidebarTree::build(literals(json!({
      "/guide/advanced/": [],
      "/guide/": []
    })))
    .unwrap_err();
    assert!(matches!(
      err,
      ConfigError::OverlappingSectionRoots { ref outer, ref inner }
        if outer == "/guide/" && inner == "/guide/advanced/"
    ));
  }

  #[test]
  fn test_group_as_child_fails_to_parse() {
    let result = serde_json::from_value::<
      IndexMap<String, Vec<SidebarItemLiteral>>,
    >(json!({
      "/x/": [{ "title": "Outer", "children": [{ "title": "Inner" }] }]
    }));
    assert!(result.is_err());
  }

  #[test]
  fn test_section_for() {
    let tree = SidebarTree::build(literals(json!({
      "/algorithm/": [{ "title": "数据结构", "children": [["/algorithm/", "介绍"]] }],
      "/anime/": [{ "title": "动漫", "children": [["/anime/", "宅说"]] }]
    })))
    .unwrap();

    assert_eq!(tree.section_for("/anime/2019.html").unwrap().0, "/anime/");
    assert_eq!(tree.section_for("/algorithm").unwrap().0, "/algorithm/");
    assert!(tree.section_for("/books/").is_none());
  }

  #[test]
  fn test_normalize_page_path() {
    assert_eq!(normalize_page_path("/vue/README.md"), "/vue/");
    assert_eq!(normalize_page_path("/vue/index.html"), "/vue/");
    assert_eq!(normalize_page_path("/js/basic.md"), "/js/basic");
    assert_eq!(normalize_page_path("/js/basic#scope"), "/js/basic");
    assert_eq!(normalize_page_path("/js/"), "/js/");
  }

  #[test]
  fn test_serializes_to_generator_shape() {
    let input = json!({
      "/daily-record/": [
        { "title": "科技趣闻", "children": [["/daily-record/", "每日一文"]] }
      ],
      "/books/": [["/books/", "介绍"], "/books/notes"]
    });
    let tree = SidebarTree::build(literals(input.clone())).unwrap();
    assert_eq!(serde_json::to_value(&tree).unwrap(), input);
  }
}
