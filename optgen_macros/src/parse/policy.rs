//! Generation policy parsed from struct-level `#[options(...)]` attributes.
//!
//! The policy is resolved once per declaration and then threaded, read-only,
//! through every pipeline stage.

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Ident, LitStr, Meta, Token, parenthesized};

use super::ATTR;
use super::literals::{NameOrDisabled, lit_bool, lit_name_or_disabled, lit_str};

/// How the generated `apply` reports failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum ErrorMode {
    /// Options return `Result` and `apply` stops at the first error.
    #[default]
    Fallible,
    /// Options cannot fail and the option trait is sealed.
    Infallible,
}

impl ErrorMode {
    pub(crate) fn parse(s: &str, span: Span) -> Result<Self, syn::Error> {
        match s {
            "fallible" => Ok(Self::Fallible),
            "infallible" => Ok(Self::Infallible),
            _ => Err(syn::Error::new(
                span,
                format!("unknown errors mode '{s}'; expected \"fallible\" or \"infallible\""),
            )),
        }
    }
}

/// One entry of the `imports` alias table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AliasEntry {
    pub path: syn::Path,
    pub alias: Option<Ident>,
}

impl AliasEntry {
    /// Name under which the namespace is referenced by field types.
    pub(crate) fn local_name(&self) -> Option<String> {
        self.alias.as_ref().map_or_else(
            || self.path.segments.last().map(|seg| seg.ident.to_string()),
            |alias| Some(alias.to_string()),
        )
    }
}

/// Raw struct attribute values before defaults are applied.
#[derive(Default)]
pub(crate) struct StructAttrs {
    /// The struct carries at least one `#[options]` attribute.
    pub selected: bool,
    pub inline: bool,
    pub namespace: Option<LitStr>,
    pub prefix: Option<LitStr>,
    pub suffix: Option<LitStr>,
    pub option_trait: Option<LitStr>,
    pub apply: Option<LitStr>,
    pub new: Option<NameOrDisabled>,
    pub public: bool,
    pub errors: Option<ErrorMode>,
    pub error: Option<LitStr>,
    pub quote_default_strings: Option<bool>,
    pub cmp: Option<bool>,
    pub stringer: Option<bool>,
    pub cfg: Option<LitStr>,
    pub imports: Option<LitStr>,
    pub crate_path: Option<LitStr>,
}

impl StructAttrs {
    /// Extracts `#[options(...)]` metadata applied to a struct.
    ///
    /// Unknown keys are discarded so callers keep compiling when new keys
    /// appear, at the cost of allowing silent typos.
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTR)) {
            out.selected = true;
            match &attr.meta {
                Meta::Path(_) => {}
                Meta::List(_) => attr.parse_nested_meta(|meta| out.apply_key(&meta))?,
                Meta::NameValue(nv) => {
                    return Err(syn::Error::new_spanned(
                        nv,
                        "struct-level options use #[options(key = value, ...)]",
                    ));
                }
            }
        }
        Ok(out)
    }

    fn apply_key(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        let Some(ident) = meta.path.get_ident().map(ToString::to_string) else {
            return discard_unknown(meta);
        };
        match ident.as_str() {
            "inline" => self.inline = true,
            "namespace" => self.namespace = Some(lit_str(meta, "namespace")?),
            "prefix" => self.prefix = Some(lit_str(meta, "prefix")?),
            "suffix" => self.suffix = Some(lit_str(meta, "suffix")?),
            "option_trait" => self.option_trait = Some(lit_str(meta, "option_trait")?),
            "apply" => self.apply = Some(lit_str(meta, "apply")?),
            "new" => self.new = lit_name_or_disabled(meta, "new")?,
            "public" => self.public = lit_bool(meta, "public")?,
            "errors" => {
                let mode = lit_str(meta, "errors")?;
                self.errors = Some(ErrorMode::parse(&mode.value(), mode.span())?);
            }
            "error" => self.error = Some(lit_str(meta, "error")?),
            "quote_default_strings" => {
                self.quote_default_strings = Some(lit_bool(meta, "quote_default_strings")?);
            }
            "cmp" => self.cmp = Some(lit_bool(meta, "cmp")?),
            "stringer" => self.stringer = Some(lit_bool(meta, "stringer")?),
            "cfg" => self.cfg = Some(lit_str(meta, "cfg")?),
            "imports" => self.imports = Some(lit_str(meta, "imports")?),
            "crate" => self.crate_path = Some(lit_str(meta, "crate")?),
            _ => discard_unknown(meta)?,
        }
        Ok(())
    }
}

/// Consumes an unrecognised key-value or list without recording it.
fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<proc_macro2::TokenStream>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

/// Immutable per-declaration generation settings.
#[derive(Clone, Debug)]
pub(crate) struct GenerationPolicy {
    pub namespace: Ident,
    pub prefix: String,
    pub suffix: String,
    pub option_trait: Ident,
    pub apply_fn: Ident,
    /// `None` when the build function is disabled.
    pub build_fn: Option<Ident>,
    pub public_build: bool,
    pub error_mode: ErrorMode,
    pub error_type: Option<syn::Type>,
    pub quote_default_strings: bool,
    pub emit_equality: bool,
    pub emit_stringer: bool,
    pub cfg: Option<Meta>,
    pub imports: Vec<AliasEntry>,
    pub crate_path: Option<syn::Path>,
}

impl GenerationPolicy {
    /// Applies defaults derived from the struct name to `attrs`.
    pub(crate) fn from_attrs(ident: &Ident, attrs: StructAttrs) -> syn::Result<Self> {
        let struct_name = ident.to_string();
        let snake = struct_name.to_snake_case();
        let camel = struct_name.to_upper_camel_case();

        let namespace = ident_or(attrs.namespace.as_ref(), || format!("{camel}Options"))?;
        let option_trait = ident_or(attrs.option_trait.as_ref(), || format!("{camel}Option"))?;
        let apply_fn = ident_or(attrs.apply.as_ref(), || format!("apply_{snake}_options"))?;
        let build_fn = match attrs.new {
            Some(NameOrDisabled::Disabled) => None,
            Some(NameOrDisabled::Name(name)) => Some(parse_ident(&name)?),
            None => Some(Ident::new(&format!("new_{snake}"), Span::call_site())),
        };
        let error_type = attrs
            .error
            .map(|lit| lit.parse::<syn::Type>())
            .transpose()?;
        let cfg = attrs.cfg.map(|lit| lit.parse::<Meta>()).transpose()?;
        let imports = attrs
            .imports
            .as_ref()
            .map(parse_alias_table)
            .transpose()?
            .unwrap_or_default();
        let crate_path = attrs
            .crate_path
            .map(|lit| lit.parse::<syn::Path>())
            .transpose()?;

        let prefix = attrs
            .prefix
            .as_ref()
            .map(affix)
            .transpose()?
            .unwrap_or(camel);
        let suffix = attrs
            .suffix
            .as_ref()
            .map(affix)
            .transpose()?
            .unwrap_or_else(|| "Option".to_owned());

        Ok(Self {
            namespace,
            prefix,
            suffix,
            option_trait,
            apply_fn,
            build_fn,
            public_build: attrs.public,
            error_mode: attrs.errors.unwrap_or_default(),
            error_type,
            quote_default_strings: attrs.quote_default_strings.unwrap_or(true),
            emit_equality: attrs.cmp.unwrap_or(true),
            emit_stringer: attrs.stringer.unwrap_or(true),
            cfg,
            imports,
            crate_path,
        })
    }
}

fn ident_or(lit: Option<&LitStr>, fallback: impl FnOnce() -> String) -> syn::Result<Ident> {
    lit.map_or_else(
        || Ok(Ident::new(&fallback(), Span::call_site())),
        parse_ident,
    )
}

fn parse_ident(lit: &LitStr) -> syn::Result<Ident> {
    lit.parse::<Ident>()
        .map_err(|_| syn::Error::new(lit.span(), format!("`{}` is not a valid identifier", lit.value())))
}

/// Prefixes and suffixes are glued onto identifiers, so only identifier
/// characters are accepted and a digit may not lead. Either may be empty.
fn affix(lit: &LitStr) -> syn::Result<String> {
    let value = lit.value();
    let leading_digit = value.starts_with(|c: char| c.is_ascii_digit());
    if !leading_digit && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(value)
    } else {
        Err(syn::Error::new(
            lit.span(),
            format!("`{value}` is not a valid identifier fragment"),
        ))
    }
}

/// Parses `"std::time, url, time2 = std::time"` into alias entries.
pub(crate) fn parse_alias_table(lit: &LitStr) -> syn::Result<Vec<AliasEntry>> {
    lit.value()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = |_| syn::Error::new(lit.span(), format!("invalid import entry `{entry}`"));
            match entry.split_once('=') {
                Some((alias, path)) => Ok(AliasEntry {
                    path: syn::parse_str(path.trim()).map_err(invalid)?,
                    alias: Some(syn::parse_str(alias.trim()).map_err(invalid)?),
                }),
                None => Ok(AliasEntry {
                    path: syn::parse_str(entry).map_err(invalid)?,
                    alias: None,
                }),
            }
        })
        .collect()
}
