//! Proc-macros for the siteplan configuration literals.
//!
//! `#[derive(Configurable)]` generates three inherent items on a config
//! struct:
//!
//! - `apply_override(&mut self, key, value)` for dotted `KEY=VALUE` overrides
//! - `merge_fields(&mut self, other)` for layering config files
//! - `override_keys()` listing every key `apply_override` accepts
//!
//! Field attributes (`#[config(...)]`):
//!
//! - `key = "name"`: the override key, usually the exported camelCase name
//! - `nested`: the field is itself `Configurable` (plain or `Option<T>`)
//! - `allow_empty`: an empty value resets an `Option` field to `None`
//!
//! Fields without a `#[config]` attribute cannot be overridden but still take
//! part in merging.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
  Attribute,
  Data,
  DeriveInput,
  Fields,
  GenericArgument,
  PathArguments,
  Type,
  parse_macro_input,
};

#[derive(Default)]
struct FieldConfig {
  key:         Option<String>,
  nested:      bool,
  allow_empty: bool,
  overridable: bool,
}

impl FieldConfig {
  fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
    let mut config = Self::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("config")) {
      config.overridable = true;
      attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
          let lit: syn::LitStr = meta.value()?.parse()?;
          config.key = Some(lit.value());
          Ok(())
        } else if meta.path.is_ident("nested") {
          config.nested = true;
          Ok(())
        } else if meta.path.is_ident("allow_empty") {
          config.allow_empty = true;
          Ok(())
        } else {
          Err(meta.error("unsupported config attribute"))
        }
      })?;
    }

    Ok(config)
  }
}

/// Shape of a field type, as far as merging and overriding care.
enum FieldKind<'a> {
  Option(&'a Type),
  Vec,
  Map,
  Plain,
}

/// Last path segment of a type, e.g. `IndexMap` for `indexmap::IndexMap<..>`.
fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
  match ty {
    Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
    _ => None,
  }
}

fn classify(ty: &Type) -> FieldKind<'_> {
  let Some(segment) = last_segment(ty) else {
    return FieldKind::Plain;
  };

  match segment.ident.to_string().as_str() {
    "Option" => {
      if let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
      {
        FieldKind::Option(inner)
      } else {
        FieldKind::Plain
      }
    },
    "Vec" => FieldKind::Vec,
    "IndexMap" | "HashMap" | "BTreeMap" => FieldKind::Map,
    _ => FieldKind::Plain,
  }
}

fn is_ident(ty: &Type, name: &str) -> bool {
  last_segment(ty).is_some_and(|s| s.ident == name)
}

/// Derive macro for configuration literal structs.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);
  expand(&input)
    .unwrap_or_else(syn::Error::into_compile_error)
    .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) =
    input.generics.split_for_impl();

  let fields = match &input.data {
    Data::Struct(data) => {
      match &data.fields {
        Fields::Named(named) => &named.named,
        _ => {
          return Err(syn::Error::new_spanned(
            input,
            "Configurable requires named fields",
          ));
        },
      }
    },
    _ => {
      return Err(syn::Error::new_spanned(
        input,
        "Configurable can only be derived for structs",
      ));
    },
  };

  let mut override_arms = Vec::new();
  let mut key_pushes = Vec::new();
  let mut merge_steps = Vec::new();

  for field in fields {
    let config = FieldConfig::from_attrs(&field.attrs)?;
    let ident = field.ident.as_ref().ok_or_else(|| {
      syn::Error::new_spanned(field, "Configurable requires named fields")
    })?;
    let key = config.key.clone().unwrap_or_else(|| ident.to_string());
    let kind = classify(&field.ty);

    merge_steps.push(merge_step(ident, &kind, config.nested));

    if !config.overridable {
      continue;
    }

    if config.nested {
      override_arms.push(nested_override(ident, &key, &kind));
      key_pushes.push(nested_keys(&field.ty, &key, &kind));
    } else if matches!(kind, FieldKind::Vec | FieldKind::Map) {
      return Err(syn::Error::new_spanned(
        field,
        "collection fields cannot be overridden by key; drop #[config]",
      ));
    } else {
      override_arms.push(value_override(ident, &key, &field.ty, &kind, &config));
      key_pushes.push(quote! { keys.push(#key.to_string()); });
    }
  }

  Ok(quote! {
    impl #impl_generics #name #ty_generics #where_clause {
      /// Apply a single `KEY=VALUE` override. Nested sections use dotted keys.
      ///
      /// # Errors
      ///
      /// Returns [`crate::error::ConfigError::Override`] if the key is unknown
      /// or the value cannot be parsed for the field.
      pub fn apply_override(
        &mut self,
        key: &str,
        value: &str,
      ) -> ::std::result::Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        #(#override_arms)*

        Err(ConfigError::Override {
          key:    key.to_string(),
          reason: "unknown configuration key".to_string(),
        })
      }

      /// Merge `other` into `self`, with `other` taking precedence.
      pub fn merge_fields(&mut self, other: Self) {
        #(#merge_steps)*
      }

      /// Every key accepted by `apply_override`, in declaration order.
      #[must_use]
      pub fn override_keys() -> ::std::vec::Vec<::std::string::String> {
        let mut keys = ::std::vec::Vec::new();
        #(#key_pushes)*
        keys
      }
    }
  })
}

fn merge_step(
  ident: &syn::Ident,
  kind: &FieldKind<'_>,
  nested: bool,
) -> proc_macro2::TokenStream {
  match (kind, nested) {
    (FieldKind::Option(_), true) => {
      quote! {
        match (self.#ident.as_mut(), other.#ident) {
          (Some(mine), Some(theirs)) => mine.merge_fields(theirs),
          (None, Some(theirs)) => self.#ident = Some(theirs),
          _ => {},
        }
      }
    },
    (_, true) => quote! { self.#ident.merge_fields(other.#ident); },
    (FieldKind::Option(_), false) => {
      quote! {
        if other.#ident.is_some() {
          self.#ident = other.#ident;
        }
      }
    },
    (FieldKind::Vec | FieldKind::Map, false) => {
      quote! { self.#ident.extend(other.#ident); }
    },
    (FieldKind::Plain, false) => quote! { self.#ident = other.#ident; },
  }
}

fn nested_override(
  ident: &syn::Ident,
  key: &str,
  kind: &FieldKind<'_>,
) -> proc_macro2::TokenStream {
  let prefix = format!("{key}.");
  let target = if matches!(kind, FieldKind::Option(_)) {
    quote! { self.#ident.get_or_insert_with(Default::default) }
  } else {
    quote! { self.#ident }
  };

  quote! {
    if let Some(subkey) = key.strip_prefix(#prefix) {
      return #target
        .apply_override(subkey, value)
        .map_err(|e| e.within(#key));
    }
  }
}

fn nested_keys(
  ty: &Type,
  key: &str,
  kind: &FieldKind<'_>,
) -> proc_macro2::TokenStream {
  let inner = match kind {
    FieldKind::Option(inner) => *inner,
    _ => ty,
  };

  quote! {
    keys.extend(
      <#inner>::override_keys()
        .into_iter()
        .map(|sub| format!("{}.{}", #key, sub)),
    );
  }
}

fn value_override(
  ident: &syn::Ident,
  key: &str,
  ty: &Type,
  kind: &FieldKind<'_>,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  let assignment = match kind {
    FieldKind::Option(inner) => {
      let parsed = parse_value(inner);
      if config.allow_empty {
        quote! {
          self.#ident = if value.is_empty() { None } else { Some(#parsed) };
        }
      } else {
        quote! { self.#ident = Some(#parsed); }
      }
    },
    _ => {
      let parsed = parse_value(ty);
      quote! { self.#ident = #parsed; }
    },
  };

  quote! {
    if key == #key {
      #assignment
      return Ok(());
    }
  }
}

/// Expression converting the `value: &str` in scope into `ty`.
fn parse_value(ty: &Type) -> proc_macro2::TokenStream {
  if is_ident(ty, "String") {
    quote! { value.to_string() }
  } else if is_ident(ty, "bool") {
    quote! {
      match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        _ => {
          return Err(ConfigError::Override {
            key:    key.to_string(),
            reason: format!(
              "invalid boolean '{value}', expected true/false, yes/no or 1/0"
            ),
          });
        },
      }
    }
  } else {
    quote! {
      value.parse::<#ty>().map_err(|e| ConfigError::Override {
        key:    key.to_string(),
        reason: format!("invalid value '{value}': {e}"),
      })?
    }
  }
}
