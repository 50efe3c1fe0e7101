#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the PBX workspace.
//!
//! Consumers depend on this crate together with `thiserror`, since the generated code
//! derives `thiserror::Error`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns an enum with named-field variants into a workspace error type.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `kind()` returning the variant name, for structured log fields.
/// * `<Name>Ext` trait adding `.context(...)` to `Result<T, Name>`.
/// * For variants holding only `source` and `context`: `From<Source>` and
///   `.context(...)` on `Result<T, Source>`. Variants that carry extra fields
///   (module names, event types) must be built explicitly.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A private `format_context` helper for `#[error(...)]` strings, so declare one
///   error enum per module.
///
/// # Requirements
///
/// * Tuple and unit variants are rejected.
/// * `context`, when present, must be `Option<Cow<'static, str>>`.
/// * A variant with a `source` field (or a `#[source]`/`#[from]` field) must also have `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[pbx_derive::pbx_error]
/// pub enum ConfigError {
///     #[error("Config error{}: {source}", format_context(.context))]
///     Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal config error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load() -> Result<Settings, ConfigError> {
///     builder.build().context("Failed to build config")?.try_deserialize().map_err(Into::into)
/// }
/// ```
#[proc_macro_attribute]
pub fn pbx_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
