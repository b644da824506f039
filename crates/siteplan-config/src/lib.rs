//! Typed navigation, sidebar and site configuration for a static
//! documentation site.
//!
//! Config files are read into literals ([`SiteConfigLiteral`]), layered and
//! overridden, then validated once into an immutable [`SiteConfig`] whose
//! serialized form is the generator's config object.
pub mod config;
pub mod error;
pub mod head;
pub mod markdown;
pub mod nav;
pub mod sidebar;
pub mod templates;
pub mod theme;

pub use config::{SiteConfig, SiteConfigLiteral};
pub use error::ConfigError;
pub use nav::{NavEntry, NavModel};
pub use sidebar::{PageRef, SidebarGroup, SidebarItem, SidebarTree};
