//! Fixtures shared by the unit tests of the generation pipeline.

use anyhow::{Result, anyhow};
use syn::{Attribute, Ident};

use crate::parse::{FieldDeclaration, GenerationPolicy, InlineRecords, StructAttrs};
use crate::shape::{ClassifiedField, classify_fields};

/// Builds a field declaration from a parsed named field, keeping only its
/// `#[options]` attributes as annotations.
pub(crate) fn declaration(field: syn::Field) -> Result<FieldDeclaration> {
    let ident = field.ident.ok_or_else(|| anyhow!("named field expected"))?;
    let docs = Vec::new();
    let annotations = field
        .attrs
        .into_iter()
        .filter(|attr| attr.path().is_ident("options"))
        .collect();
    Ok(FieldDeclaration {
        ident,
        ty: field.ty,
        docs,
        annotations,
    })
}

pub(crate) fn declarations(fields: Vec<syn::Field>) -> Result<Vec<FieldDeclaration>> {
    fields.into_iter().map(declaration).collect()
}

/// Classifies `fields` against `records`.
pub(crate) fn classified(
    fields: Vec<syn::Field>,
    records: &InlineRecords,
) -> Result<Vec<ClassifiedField>> {
    classify_fields(&declarations(fields)?, records).map_err(|err| anyhow!("{err}"))
}

/// Resolves the policy of a struct named `name` carrying `attrs`.
pub(crate) fn policy(name: &str, attrs: &[Attribute]) -> Result<GenerationPolicy> {
    let ident = Ident::new(name, proc_macro2::Span::call_site());
    let parsed = StructAttrs::parse(attrs).map_err(|err| anyhow!("{err}"))?;
    GenerationPolicy::from_attrs(&ident, parsed).map_err(|err| anyhow!("{err}"))
}
