//! Field annotation interpreter.
//!
//! A field opts into non-default behaviour with `#[options = "name,default"]`.
//! The string is split on its first comma:
//!
//! - `name` empty keeps the field-derived constructor name;
//! - `-` skips the field entirely;
//! - a leading `*` stores the value through `Option` (presence semantics);
//! - a trailing `...` makes the constructor variadic;
//! - anything left is the new constructor name.
//!
//! Markers compose, so `*timeout` renames a presence-tracked field and
//! `*names...` is a renamed, optional, variadic field. The default (second
//! component) is kept verbatim and rendered later by the synthesis engine.

use proc_macro2::Span;
use syn::{Expr, ExprLit, Lit, Meta};

use super::FieldDeclaration;
use crate::error::{GenerateError, GenerateResult};

const SKIP: &str = "-";
const POINTER_MARKER: char = '*';
const VARIADIC_MARKER: &str = "...";

/// Parsed field annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Directive {
    /// No option is generated; the field keeps its zero value.
    Skip,
    /// Generate an option with the given adjustments.
    Generate(OptionSpec),
}

impl Directive {
    /// The generation settings, or defaults for skipped fields.
    pub(crate) fn spec(&self) -> OptionSpec {
        match self {
            Self::Skip => OptionSpec::default(),
            Self::Generate(spec) => spec.clone(),
        }
    }
}

/// Composable adjustments for a generated option.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct OptionSpec {
    pub rename: Option<String>,
    pub default: Option<String>,
    pub variadic: bool,
    pub pointer: bool,
}

/// Interprets the `#[options]` attributes collected for `field`.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedAnnotation`](crate::error::ErrorKind) when
/// the attribute is not `#[options = "..."]`, appears more than once, or the
/// string violates the grammar.
pub(crate) fn interpret(field: &FieldDeclaration) -> GenerateResult<Directive> {
    let name = field.name();
    let mut annotations = field.annotations.iter();
    let Some(attr) = annotations.next() else {
        return Ok(Directive::Generate(OptionSpec::default()));
    };
    if let Some(extra) = annotations.next() {
        return Err(GenerateError::malformed(
            name,
            "only one #[options = \"...\"] annotation is allowed per field",
            span_of(extra),
        ));
    }
    let Meta::NameValue(nv) = &attr.meta else {
        return Err(GenerateError::malformed(
            name,
            "expected #[options = \"name,default\"]",
            span_of(attr),
        ));
    };
    let Expr::Lit(ExprLit {
        lit: Lit::Str(text),
        ..
    }) = &nv.value
    else {
        return Err(GenerateError::malformed(
            name,
            "annotation value must be a string literal",
            span_of(attr),
        ));
    };
    parse_annotation(&text.value(), &name, text.span())
}

fn span_of(attr: &syn::Attribute) -> Span {
    syn::spanned::Spanned::span(attr)
}

/// Parses the raw annotation text for the field called `field`.
pub(crate) fn parse_annotation(raw: &str, field: &str, span: Span) -> GenerateResult<Directive> {
    let (name, tail) = match raw.split_once(',') {
        Some((head, rest)) => (head.trim(), Some(rest)),
        None => (raw.trim(), None),
    };
    let default = tail
        .filter(|text| !text.trim().is_empty())
        .map(ToOwned::to_owned);

    if name == SKIP {
        if default.is_some() {
            return Err(GenerateError::malformed(
                field,
                "a skipped field cannot carry a default",
                span,
            ));
        }
        return Ok(Directive::Skip);
    }

    let (pointer, without_pointer) = match name.strip_prefix(POINTER_MARKER) {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    let (variadic, bare) = match without_pointer.strip_suffix(VARIADIC_MARKER) {
        Some(rest) => (true, rest),
        None => (false, without_pointer),
    };

    let rename = if bare.is_empty() {
        None
    } else if is_identifier(bare) {
        Some(bare.to_owned())
    } else {
        return Err(GenerateError::malformed(
            field,
            format!("`{bare}` is not a valid option name"),
            span,
        ));
    };

    Ok(Directive::Generate(OptionSpec {
        rename,
        default,
        variadic,
        pointer,
    }))
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && candidate != "_"
}
