//! Literal parsing helpers for `#[options(...)]` keys.

use syn::{Lit, LitStr};

/// Parses a literal from a struct attribute using `extractor`.
///
/// # Examples
///
/// ```ignore
/// # use syn::meta::ParseNestedMeta;
/// # use syn::{Lit, LitStr};
/// # fn demo(meta: &ParseNestedMeta) -> syn::Result<()> {
/// let s: LitStr = parse_lit(meta, "namespace", "string", |lit| match lit {
///     Lit::Str(s) => Some(s),
///     _ => None,
/// })?;
/// # Ok(())
/// # }
/// ```
fn parse_lit<T, F>(
    meta: &syn::meta::ParseNestedMeta,
    key: &str,
    expected: &str,
    extractor: F,
) -> Result<T, syn::Error>
where
    F: FnOnce(Lit) -> Option<T>,
{
    let literal = meta.value()?.parse::<Lit>()?;
    let span = literal.span();
    extractor(literal).ok_or_else(|| syn::Error::new(span, format!("{key} must be a {expected}")))
}

/// Parses a string literal value.
pub(crate) fn lit_str(meta: &syn::meta::ParseNestedMeta, key: &str) -> Result<LitStr, syn::Error> {
    parse_lit(meta, key, "string", |lit| match lit {
        Lit::Str(s) => Some(s),
        _ => None,
    })
}

/// Parses a boolean literal value.
pub(crate) fn lit_bool(meta: &syn::meta::ParseNestedMeta, key: &str) -> Result<bool, syn::Error> {
    parse_lit(meta, key, "boolean", |lit| match lit {
        Lit::Bool(b) => Some(b.value),
        _ => None,
    })
}

/// Value of a key that accepts either a name or `false`.
pub(crate) enum NameOrDisabled {
    Name(LitStr),
    Disabled,
}

/// Parses `key = "name"` or `key = false`.
///
/// `key = true` is accepted and keeps the generated default name.
pub(crate) fn lit_name_or_disabled(
    meta: &syn::meta::ParseNestedMeta,
    key: &str,
) -> Result<Option<NameOrDisabled>, syn::Error> {
    parse_lit(meta, key, "string or boolean", |lit| match lit {
        Lit::Str(s) => Some(Some(NameOrDisabled::Name(s))),
        Lit::Bool(b) if b.value => Some(None),
        Lit::Bool(_) => Some(Some(NameOrDisabled::Disabled)),
        _ => None,
    })
}
