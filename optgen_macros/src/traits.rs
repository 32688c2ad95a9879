//! Equality and `Display` support for option structs.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::crate_path::Runtime;
use crate::parse::GenerationPolicy;
use crate::shape::{Param, Render};
use crate::synth::OptionDefinition;

/// Derive list for an option struct.
///
/// Equality is derived only when enabled and every argument is comparable.
pub(crate) fn derives(definition: &OptionDefinition, policy: &GenerationPolicy) -> TokenStream {
    if policy.emit_equality && !definition.has_opaque_params() {
        quote! { #[derive(Clone, PartialEq)] }
    } else {
        quote! { #[derive(Clone)] }
    }
}

/// `Display` implementation rendering `Name: args`, or nothing when disabled.
pub(crate) fn display_impl(
    definition: &OptionDefinition,
    policy: &GenerationPolicy,
    runtime: &Runtime,
) -> TokenStream {
    if !policy.emit_stringer {
        return TokenStream::new();
    }
    let type_ident = &definition.type_ident;
    let head = format!("{}: ", definition.name);
    let body = if definition.grouped {
        grouped(&definition.params, runtime)
    } else {
        let writes = definition.params.iter().map(|param| {
            let value = field_access(param);
            let rendered = render(&param.render, &value, runtime);
            quote! { #rendered?; }
        });
        quote! { #( #writes )* }
    };
    quote! {
        impl ::core::fmt::Display for #type_ident {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(#head)?;
                #body
                ::core::result::Result::Ok(())
            }
        }
    }
}

/// `{a:1 b:[2]}` in leaf order.
fn grouped(params: &[Param], runtime: &Runtime) -> TokenStream {
    let entries = params.iter().enumerate().map(|(index, param)| {
        let key = if index == 0 {
            format!("{}:", param.label)
        } else {
            format!(" {}:", param.label)
        };
        let value = field_access(param);
        let rendered = render(&param.render, &value, runtime);
        quote! {
            f.write_str(#key)?;
            #rendered?;
        }
    });
    quote! {
        f.write_str("{")?;
        #( #entries )*
        f.write_str("}")?;
    }
}

fn field_access(param: &Param) -> TokenStream {
    let ident = &param.ident;
    quote! { &self.#ident }
}

/// Expression writing `value` (a reference) to `f`, yielding `fmt::Result`.
fn render(mode: &Render, value: &TokenStream, runtime: &Runtime) -> TokenStream {
    match mode {
        Render::Text => quote! { ::core::write!(f, "{}", #value) },
        Render::Debug => quote! { ::core::write!(f, "{:?}", #value) },
        Render::Callable => quote! { f.write_str("<func>") },
        Render::Dynamic => quote! { f.write_str("<dynamic>") },
        Render::List(item) => {
            let element = format_ident!("item");
            let each = render(item, &quote! { #element }, runtime);
            let list = runtime.list_renderer();
            quote! { #list(f, #value, |#element, f| #each) }
        }
    }
}
