//! Emission of generated code into the annotated module.
//!
//! Every declaration becomes an [`EmissionUnit`]. Units are placed in their
//! own public submodule of one hidden `__optgen` module, which carries the
//! merged imports of all units, and their items are re-exported into the
//! annotated module with the visibility of the target struct.

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Meta, Visibility};

use crate::assemble::Target;
use crate::crate_path::Runtime;
use crate::error::{ErrorKind, GenerateResult};
use crate::imports::{ImportSet, resolve};
use crate::parse::{InlineRecords, TypeDeclaration};
use crate::shape::classify_fields;
use crate::synth::{error_type, initializer, synthesize};
use crate::traits::{derives, display_impl};

/// Name of the hidden module holding generated code.
const HIDDEN_MODULE: &str = "__optgen";

/// Generated code for one declaration.
pub(crate) struct EmissionUnit {
    config: Ident,
    module: Ident,
    vis: Visibility,
    cfg: Option<Meta>,
    imports: ImportSet,
    body: TokenStream,
    exports: Vec<Ident>,
    build: Option<BuildExport>,
}

struct BuildExport {
    ident: Ident,
    public: bool,
}

impl EmissionUnit {
    #[cfg(test)]
    pub(crate) fn exports(&self) -> &[Ident] {
        &self.exports
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> &TokenStream {
        &self.body
    }

    #[cfg(test)]
    pub(crate) const fn imports(&self) -> &ImportSet {
        &self.imports
    }
}

/// Runs the pipeline for one declaration.
///
/// # Errors
///
/// Propagates the first classification, resolution, synthesis or default
/// rendering failure of the declaration.
pub(crate) fn generate_unit(
    decl: &TypeDeclaration,
    inline: &InlineRecords,
) -> GenerateResult<EmissionUnit> {
    let policy = &decl.policy;
    let config = &decl.ident;
    let fields = classify_fields(&decl.fields, inline)?;
    let resolved = resolve(&fields, &policy.imports)?;
    let definitions = synthesize(&fields, policy, &resolved)?;
    let inits = if policy.build_fn.is_some() {
        fields
            .iter()
            .map(|field| {
                let ident = &field.decl.ident;
                let value = initializer(field, policy)?;
                Ok(quote! { #ident: #value })
            })
            .collect::<GenerateResult<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let runtime = Runtime::resolve(policy.crate_path.as_ref());
    let error_ty = error_type(policy, &runtime);
    let target = Target {
        config,
        policy,
        error_ty: &error_ty,
        runtime: &runtime,
    };

    let option_trait = target.option_trait();
    let namespace = target.namespace(&definitions);
    let options = definitions.iter().map(|definition| {
        let structure = definition.option_struct(&derives(definition, policy));
        let apply = definition.apply_impl(config, policy, &error_ty);
        let seal = target.seal(definition);
        let display = display_impl(definition, policy, &runtime);
        quote! {
            #structure
            #apply
            #seal
            #display
        }
    });
    let apply_fn = target.apply_fn();
    let build_fn = target.build_fn(&inits);

    let mut exports = vec![
        policy.option_trait.clone(),
        policy.namespace.clone(),
        policy.apply_fn.clone(),
    ];
    exports.extend(definitions.iter().map(|definition| definition.type_ident.clone()));

    Ok(EmissionUnit {
        config: config.clone(),
        module: format_ident!("__{}", config.to_string().to_snake_case()),
        vis: decl.vis.clone(),
        cfg: policy.cfg.clone(),
        imports: resolved.imports,
        body: quote! {
            #option_trait
            #namespace
            #( #options )*
            #apply_fn
            #build_fn
        },
        exports,
        build: policy.build_fn.clone().map(|ident| BuildExport {
            ident,
            public: policy.public_build,
        }),
    })
}

/// Emits the hidden module for `units` followed by their re-exports and the
/// diagnostics of failed declarations.
///
/// A unit whose imports clash with those of an earlier unit is reported and
/// emits nothing.
pub(crate) fn emit(units: &[EmissionUnit], failures: &[syn::Error]) -> TokenStream {
    let mut imports = ImportSet::default();
    let mut errors: Vec<TokenStream> = failures.iter().map(syn::Error::to_compile_error).collect();
    let mut accepted = Vec::with_capacity(units.len());
    for unit in units {
        match imports.merge(&unit.imports) {
            Ok(()) => accepted.push(unit),
            Err(clash) => {
                let message = format!(
                    "{} in `{}`: {}",
                    ErrorKind::UnresolvedNamespace,
                    unit.config,
                    clash.detail()
                );
                errors.push(syn::Error::new(unit.config.span(), message).to_compile_error());
            }
        }
    }
    if accepted.is_empty() {
        return quote! { #( #errors )* };
    }

    let hidden = Ident::new(HIDDEN_MODULE, proc_macro2::Span::call_site());
    let import_items = imports.iter();
    let modules = accepted.iter().copied().map(|unit| {
        let EmissionUnit {
            module, cfg, body, ..
        } = unit;
        let cfg_attr = cfg_attr(cfg.as_ref());
        quote! {
            #cfg_attr
            pub mod #module {
                #[allow(unused_imports)]
                use super::*;
                #body
            }
        }
    });
    let reexports = accepted.iter().copied().map(|unit| reexport(&hidden, unit));

    quote! {
        #[doc(hidden)]
        mod #hidden {
            #[allow(unused_imports)]
            use super::*;
            #( #import_items )*
            #( #modules )*
        }
        #( #reexports )*
        #( #errors )*
    }
}

fn cfg_attr(cfg: Option<&Meta>) -> TokenStream {
    cfg.map_or_else(TokenStream::new, |meta| quote! { #[cfg(#meta)] })
}

fn reexport(hidden: &Ident, unit: &EmissionUnit) -> TokenStream {
    let EmissionUnit {
        module,
        vis,
        cfg,
        exports,
        build,
        ..
    } = unit;
    let cfg_attr = cfg_attr(cfg.as_ref());
    let build_use = build.as_ref().map(|BuildExport { ident, public }| {
        let build_vis = if *public { quote! { #vis } } else { TokenStream::new() };
        quote! {
            #cfg_attr
            #[allow(unused_imports)]
            #build_vis use self::#hidden::#module::#ident;
        }
    });
    quote! {
        #cfg_attr
        #[allow(unused_imports)]
        #vis use self::#hidden::#module::{ #( #exports ),* };
        #build_use
    }
}
