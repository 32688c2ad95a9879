//! Rendering of annotation defaults into field initialisers.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{Expr, ExprLit, ExprPath, ExprUnary, Lit, LitStr, Type, UnOp};

use super::wrap_some;
use crate::error::{GenerateError, GenerateResult};
use crate::parse::{GenerationPolicy, is_string_like};
use crate::shape::{ClassifiedField, FieldShape};

/// Expression initialising `field` in the generated build function.
///
/// Skipped fields and fields without a default start from
/// `Default::default()`; pointer-to-record fields start as `None`; inline
/// records are built from the defaults of their own leaves.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedAnnotation`](crate::error::ErrorKind) when a
/// default is not a literal, negated literal or path, and
/// [`ErrorKind::UnsupportedFieldShape`](crate::error::ErrorKind) when an
/// opaque field has neither a default nor an `Option` wrapper.
pub(crate) fn initializer(
    field: &ClassifiedField,
    policy: &GenerationPolicy,
) -> GenerateResult<TokenStream> {
    let fallback = quote! { ::core::default::Default::default() };
    match &field.shape {
        FieldShape::InlineRecord { record, leaves } if !field.is_skipped() => {
            let inits = leaves
                .iter()
                .map(|leaf| {
                    let ident = &leaf.decl.ident;
                    let value = initializer(leaf, policy)?;
                    Ok(quote! { #ident: #value })
                })
                .collect::<GenerateResult<Vec<_>>>()?;
            Ok(quote! { #record { #( #inits, )* } })
        }
        FieldShape::PointerToInlineRecord { .. } => Ok(quote! { ::core::option::Option::None }),
        _ => match field.default_literal() {
            None if field.lacks_zero_value() => Err(GenerateError::unsupported(
                field.decl.name(),
                format!(
                    "`{}` has no default for the build function; wrap it in `Option` or \
                     give it a default (`new = false` omits the build function)",
                    field.decl.ty.to_token_stream()
                ),
                field.decl.ty.span(),
            )),
            None => Ok(fallback),
            Some(text) => render(field, text, policy),
        },
    }
}

fn render(field: &ClassifiedField, text: &str, policy: &GenerationPolicy) -> GenerateResult<TokenStream> {
    match &field.shape {
        FieldShape::PointerToScalar { inner, boxed } => {
            Ok(wrap_some(&scalar(field, inner, text, policy)?, *boxed))
        }
        FieldShape::SliceVariadic { elem } => sequence(field, elem, text, policy),
        FieldShape::PointerToSliceVariadic { elem, boxed } => {
            Ok(wrap_some(&sequence(field, elem, text, policy)?, *boxed))
        }
        _ => scalar(field, &field.decl.ty, text, policy),
    }
}

fn sequence(
    field: &ClassifiedField,
    elem: &Type,
    text: &str,
    policy: &GenerationPolicy,
) -> GenerateResult<TokenStream> {
    let items = text
        .split(',')
        .map(|item| scalar(field, elem, item, policy))
        .collect::<GenerateResult<Vec<_>>>()?;
    Ok(quote! { ::std::vec![ #( #items ),* ] })
}

/// Renders one default value for a slot of type `ty`.
fn scalar(
    field: &ClassifiedField,
    ty: &Type,
    text: &str,
    policy: &GenerationPolicy,
) -> GenerateResult<TokenStream> {
    let text_slot = is_string_like(ty);
    if text_slot && policy.quote_default_strings {
        let lit = LitStr::new(text, field.decl.ident.span());
        return Ok(quote! { ::core::convert::Into::into(#lit) });
    }
    let trimmed = text.trim();
    let expr = parse_default(field, trimmed)?;
    if !is_literal_token(&expr) {
        return Err(GenerateError::malformed(
            field.decl.name(),
            format!("default `{trimmed}` must be a literal, a negated literal or a path"),
            field.decl.ident.span(),
        ));
    }
    Ok(if text_slot {
        quote! { ::core::convert::Into::into(#expr) }
    } else {
        quote! { #expr }
    })
}

fn parse_default(field: &ClassifiedField, text: &str) -> GenerateResult<Expr> {
    syn::parse_str::<Expr>(text).map_err(|err| {
        GenerateError::malformed(
            field.decl.name(),
            format!("default `{text}` does not parse: {err}"),
            field.decl.ident.span(),
        )
    })
}

fn is_literal_token(expr: &Expr) -> bool {
    match expr {
        Expr::Lit(_) | Expr::Path(ExprPath { qself: None, .. }) => true,
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => matches!(expr.as_ref(), Expr::Lit(ExprLit { lit: Lit::Int(_) | Lit::Float(_), .. })),
        _ => false,
    }
}
