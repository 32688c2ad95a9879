//! Option synthesis.
//!
//! Produces one [`OptionDefinition`] per non-skipped field: the option
//! struct holding the constructor arguments, the namespace constructor and
//! the setter that writes the single field it was synthesised for.

use std::collections::BTreeMap;

use heck::{ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Ident, Type};

use crate::crate_path::Runtime;
use crate::error::{ErrorKind, GenerateError, GenerateResult};
use crate::imports::Resolved;
use crate::parse::{ErrorMode, GenerationPolicy};
use crate::shape::{ClassifiedField, FieldShape, Param, leaf_binding};

mod defaults;

pub(crate) use defaults::initializer;

/// Everything needed to emit one option.
#[derive(Clone, Debug)]
pub(crate) struct OptionDefinition {
    /// Field written by the option.
    pub field: Ident,
    /// UpperCamelCase constructor name, e.g. `MyInt`.
    pub name: String,
    /// Option struct name: prefix + name + suffix.
    pub type_ident: Ident,
    /// Namespace constructor, e.g. `my_int`.
    pub ctor_ident: Ident,
    /// Constructor arguments with canonicalised types.
    pub params: Vec<Param>,
    /// The arguments render as `{leaf:value ...}`.
    pub grouped: bool,
    pub docs: Vec<String>,
    /// Expression assigned to the field by `apply`.
    value: TokenStream,
}

impl OptionDefinition {
    /// Arguments that cannot be compared for equality.
    pub(crate) fn has_opaque_params(&self) -> bool {
        self.params.iter().any(|param| param.opaque)
    }

    /// The option struct holding the constructor arguments.
    pub(crate) fn option_struct(&self, derives: &TokenStream) -> TokenStream {
        let Self {
            type_ident, field, ..
        } = self;
        let doc = format!("Option setting `{field}`.");
        let fields = self.params.iter().map(|param| {
            let ident = &param.ident;
            let ty = &param.stored;
            quote! { #ident: #ty }
        });
        quote! {
            #[doc = #doc]
            #derives
            pub struct #type_ident {
                #( #fields, )*
            }
        }
    }

    /// Implementation of the option trait for the option struct.
    pub(crate) fn apply_impl(
        &self,
        config: &Ident,
        policy: &GenerationPolicy,
        error_ty: &TokenStream,
    ) -> TokenStream {
        let Self {
            type_ident,
            field,
            value,
            ..
        } = self;
        let option_trait = &policy.option_trait;
        match policy.error_mode {
            ErrorMode::Fallible => quote! {
                impl #option_trait for #type_ident {
                    fn apply(
                        &self,
                        target: &mut #config,
                    ) -> ::core::result::Result<(), #error_ty> {
                        target.#field = #value;
                        ::core::result::Result::Ok(())
                    }
                }
            },
            ErrorMode::Infallible => quote! {
                impl #option_trait for #type_ident {
                    fn apply(&self, target: &mut #config) {
                        target.#field = #value;
                    }
                }
            },
        }
    }

    /// Associated function on the namespace struct building this option.
    pub(crate) fn constructor(&self) -> TokenStream {
        let Self {
            type_ident,
            ctor_ident,
            docs,
            ..
        } = self;
        let args = self.params.iter().map(|param| {
            let ident = &param.ident;
            match &param.variadic {
                Some(elem) => quote! { #ident: impl ::core::iter::IntoIterator<Item = #elem> },
                None => {
                    let ty = &param.stored;
                    quote! { #ident: #ty }
                }
            }
        });
        let inits = self.params.iter().map(|param| {
            let ident = &param.ident;
            if param.variadic.is_some() {
                quote! { #ident: ::core::iter::Iterator::collect(::core::iter::IntoIterator::into_iter(#ident)) }
            } else {
                quote! { #ident }
            }
        });
        let doc_attrs = docs.iter().map(|line| quote! { #[doc = #line] });
        quote! {
            #( #doc_attrs )*
            #[must_use]
            pub fn #ctor_ident( #( #args ),* ) -> #type_ident {
                #type_ident { #( #inits, )* }
            }
        }
    }
}

/// Synthesises the option definitions of a declaration in field order.
///
/// # Errors
///
/// Returns [`ErrorKind::DuplicateOptionName`] when two fields resolve to the
/// same constructor or option type name, when an option type would clash
/// with the option trait or namespace, or when two inline-record leaves map
/// to the same constructor argument.
pub(crate) fn synthesize(
    fields: &[ClassifiedField],
    policy: &GenerationPolicy,
    resolved: &Resolved,
) -> GenerateResult<Vec<OptionDefinition>> {
    let mut seen = NameRegistry::new(policy);
    fields
        .iter()
        .filter(|field| !field.is_skipped())
        .map(|field| {
            let definition = synthesize_one(field, policy, resolved);
            seen.register(&definition, field)?;
            Ok(definition)
        })
        .collect()
}

fn synthesize_one(
    field: &ClassifiedField,
    policy: &GenerationPolicy,
    resolved: &Resolved,
) -> OptionDefinition {
    let spec = field.directive.spec();
    let base = spec
        .rename
        .unwrap_or_else(|| field.decl.ident.unraw().to_string());
    let name = base.to_upper_camel_case();
    let type_ident = format_ident!("{}{}{}", policy.prefix, name, policy.suffix);
    let ctor_ident = safe_ident(&name.to_snake_case());
    let params = field
        .params()
        .into_iter()
        .map(|mut param| {
            param.stored = resolved.rewrite(&param.stored);
            param.variadic = param.variadic.map(|elem| resolved.rewrite(&elem));
            param
        })
        .collect();
    let grouped = matches!(
        field.shape,
        FieldShape::InlineRecord { .. } | FieldShape::PointerToInlineRecord { .. }
    );
    OptionDefinition {
        field: field.decl.ident.clone(),
        name,
        type_ident,
        ctor_ident,
        params,
        grouped,
        docs: field.decl.docs.clone(),
        value: setter_value(&field.decl.ident, &field.shape, None),
    }
}

/// Builds an identifier, falling back to a raw identifier for keywords.
///
/// Path keywords cannot be raw and get a trailing underscore instead.
fn safe_ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| match name {
        "self" | "super" | "crate" => format_ident!("{name}_"),
        _ => Ident::new_raw(name, Span::call_site()),
    })
}

/// Expression producing the new field value from the stored arguments.
///
/// `param` names the stored argument for non-record shapes; record shapes
/// rebuild the record from their leaves, whose names depend on `prefix`.
fn setter_value(param: &Ident, shape: &FieldShape, prefix: Option<&str>) -> TokenStream {
    let cloned = quote! { ::core::clone::Clone::clone(&self.#param) };
    match shape {
        FieldShape::Scalar
        | FieldShape::SliceVariadic { .. }
        | FieldShape::OpaqueCallable
        | FieldShape::OpaqueDynamic
        | FieldShape::QualifiedExternal { .. } => cloned,
        FieldShape::PointerToScalar { boxed, .. }
        | FieldShape::PointerToSliceVariadic { boxed, .. } => wrap_some(&cloned, *boxed),
        FieldShape::InlineRecord { record, leaves } => record_literal(record, leaves, prefix),
        FieldShape::PointerToInlineRecord {
            record,
            leaves,
            boxed,
        } => wrap_some(&record_literal(record, leaves, prefix), *boxed),
    }
}

fn record_literal(record: &Ident, leaves: &[ClassifiedField], prefix: Option<&str>) -> TokenStream {
    let fields = leaves.iter().map(|leaf| {
        let field = &leaf.decl.ident;
        if leaf.is_skipped() {
            return quote! { #field: ::core::default::Default::default() };
        }
        let (ident, label) = leaf_binding(prefix, leaf);
        let value = setter_value(&ident, &leaf.shape, Some(&label));
        quote! { #field: #value }
    });
    quote! { #record { #( #fields, )* } }
}

pub(crate) fn wrap_some(value: &TokenStream, boxed: bool) -> TokenStream {
    if boxed {
        quote! { ::core::option::Option::Some(::std::boxed::Box::new(#value)) }
    } else {
        quote! { ::core::option::Option::Some(#value) }
    }
}

/// Tracks generated names to detect collisions.
struct NameRegistry {
    reserved: BTreeMap<String, String>,
    constructors: BTreeMap<String, String>,
    types: BTreeMap<String, String>,
}

impl NameRegistry {
    fn new(policy: &GenerationPolicy) -> Self {
        let reserved = [&policy.option_trait, &policy.namespace]
            .into_iter()
            .map(|ident| (ident.to_string(), ident.to_string()))
            .collect();
        Self {
            reserved,
            constructors: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }

    fn register(
        &mut self,
        definition: &OptionDefinition,
        field: &ClassifiedField,
    ) -> GenerateResult<()> {
        let field_name = field.decl.name();
        let span = field.decl.ident.span();
        let type_name = definition.type_ident.to_string();
        if let Some(clash) = self.reserved.get(&type_name) {
            return Err(GenerateError::new(
                ErrorKind::DuplicateOptionName,
                field_name,
                format!("option type `{type_name}` clashes with `{clash}`"),
                span,
            ));
        }
        let mut arguments = BTreeMap::new();
        for param in &definition.params {
            if let Some(previous) = arguments.insert(param.ident.to_string(), &param.label) {
                return Err(GenerateError::new(
                    ErrorKind::DuplicateOptionName,
                    field_name,
                    format!(
                        "leaves `{previous}` and `{}` both bind the argument `{}`",
                        param.label, param.ident
                    ),
                    span,
                ));
            }
        }
        let keys = [
            (&mut self.constructors, definition.name.to_snake_case()),
            (&mut self.types, type_name),
        ];
        for (registry, key) in keys {
            if let Some(previous) = registry.get(&key) {
                return Err(GenerateError::new(
                    ErrorKind::DuplicateOptionName,
                    field_name,
                    format!("option `{key}` is already generated for field `{previous}`"),
                    span,
                ));
            }
            registry.insert(key, field_name.clone());
        }
        Ok(())
    }
}

/// Type spelled for the option trait's error in fallible mode.
pub(crate) fn error_type(policy: &GenerationPolicy, runtime: &Runtime) -> TokenStream {
    policy.error_type.as_ref().map_or_else(
        || runtime.option_error(),
        |ty: &Type| quote! { #ty },
    )
}
