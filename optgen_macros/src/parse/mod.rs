//! Declaration discovery for the `generate` attribute.
//!
//! Walks the top-level items of an inline module, collects the structs that
//! request option generation together with the inline records they may
//! embed, and strips every `#[options]` attribute so the re-emitted module
//! compiles without a helper attribute registration.

use std::collections::BTreeMap;

use syn::{Attribute, Fields, Item, ItemMod, ItemStruct, Type, Visibility};

mod annotation;
mod literals;
mod policy;
#[cfg(test)]
mod tests;
mod type_utils;

pub(crate) use annotation::{Directive, OptionSpec, interpret};
pub(crate) use policy::{AliasEntry, ErrorMode, GenerationPolicy, StructAttrs};
#[cfg(test)]
pub(crate) use policy::parse_alias_table;
pub(crate) use type_utils::{
    box_inner, is_string_like, option_inner, single_ident, smart_pointer_inner, vec_inner,
};

/// Attribute namespace recognised on structs and fields.
pub(crate) const ATTR: &str = "options";

/// One field of a declaration, in source order.
#[derive(Clone, Debug)]
pub(crate) struct FieldDeclaration {
    pub ident: syn::Ident,
    pub ty: Type,
    /// Leading `///` documentation lines.
    pub docs: Vec<String>,
    /// Every `#[options...]` attribute found on the field.
    pub annotations: Vec<Attribute>,
}

impl FieldDeclaration {
    pub(crate) fn name(&self) -> String {
        self.ident.to_string()
    }
}

/// A struct selected for option generation.
pub(crate) struct TypeDeclaration {
    pub ident: syn::Ident,
    pub vis: Visibility,
    pub policy: GenerationPolicy,
    pub fields: Vec<FieldDeclaration>,
}

/// Structs marked `#[options(inline)]`, keyed by name.
#[derive(Default)]
pub(crate) struct InlineRecords {
    records: BTreeMap<String, Vec<FieldDeclaration>>,
}

impl InlineRecords {
    pub(crate) fn insert(&mut self, name: String, fields: Vec<FieldDeclaration>) {
        self.records.insert(name, fields);
    }

    /// Returns the leaf fields of the record named by `ty`, if any.
    pub(crate) fn lookup(&self, ty: &Type) -> Option<(&str, &[FieldDeclaration])> {
        let ident = single_ident(ty)?;
        self.records
            .get_key_value(&ident.to_string())
            .map(|(name, fields)| (name.as_str(), fields.as_slice()))
    }
}

/// Everything discovered in one annotated module.
#[derive(Default)]
pub(crate) struct Declarations {
    pub targets: Vec<TypeDeclaration>,
    pub inline: InlineRecords,
}

/// Collects declarations from `module`, stripping `#[options]` attributes in
/// place.
///
/// # Errors
///
/// Returns an error when the module is not inline, when a target struct is
/// generic or lacks named fields, or when a struct-level attribute is
/// malformed.
pub(crate) fn discover(module: &mut ItemMod) -> syn::Result<Declarations> {
    let Some((_, items)) = module.content.as_mut() else {
        return Err(syn::Error::new_spanned(
            &module.ident,
            "#[optgen::generate] requires an inline module body",
        ));
    };

    let mut found = Declarations::default();
    let mut errors: Option<syn::Error> = None;
    for item in items.iter_mut() {
        let Item::Struct(item_struct) = item else {
            continue;
        };
        if let Err(err) = discover_struct(item_struct, &mut found) {
            match errors.as_mut() {
                Some(combined) => combined.combine(err),
                None => errors = Some(err),
            }
        }
    }
    errors.map_or(Ok(found), Err)
}

/// Records `item` in `found` when it is selected, stripping its `#[options]`
/// attributes either way.
fn discover_struct(item: &mut ItemStruct, found: &mut Declarations) -> syn::Result<()> {
    let parsed = StructAttrs::parse(&item.attrs);
    strip_options_attrs(&mut item.attrs);
    let collected = collect_fields(item);
    let attrs = parsed?;
    if !attrs.selected {
        return Ok(());
    }
    let fields = collected?;
    if attrs.inline {
        found.inline.insert(item.ident.to_string(), fields);
        return Ok(());
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "option generation does not support generic structs",
        ));
    }
    let policy = GenerationPolicy::from_attrs(&item.ident, attrs)?;
    found.targets.push(TypeDeclaration {
        ident: item.ident.clone(),
        vis: item.vis.clone(),
        policy,
        fields,
    });
    Ok(())
}

/// Extracts the named fields of `item`, removing their `#[options]`
/// attributes from the emitted struct.
fn collect_fields(item: &mut ItemStruct) -> syn::Result<Vec<FieldDeclaration>> {
    if matches!(item.fields, Fields::Unit) {
        return Ok(Vec::new());
    }
    let Fields::Named(named) = &mut item.fields else {
        return Err(syn::Error::new_spanned(
            &item.ident,
            "option generation requires named fields",
        ));
    };

    let mut out = Vec::with_capacity(named.named.len());
    for field in &mut named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let (annotations, others): (Vec<_>, Vec<_>) = field
            .attrs
            .drain(..)
            .partition(|attr| attr.path().is_ident(ATTR));
        field.attrs = others;
        out.push(FieldDeclaration {
            ident,
            ty: field.ty.clone(),
            docs: doc_lines(&field.attrs),
            annotations,
        });
    }
    Ok(out)
}

fn strip_options_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident(ATTR));
}

/// Reads the text of `#[doc = "..."]` attributes.
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(text),
                    ..
                }) => Some(text.value().trim().to_owned()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
