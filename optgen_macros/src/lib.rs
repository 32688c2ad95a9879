//! Procedural macros for `optgen`.
//!
//! The [`macro@generate`] attribute is applied to an inline module. Structs
//! in the module carrying `#[options]` or `#[options(...)]` receive a
//! functional-options API: one option type per field, a namespace of
//! constructors, an option trait, an apply function and a build function
//! that seeds field defaults. Structs marked `#[options(inline)]` are not
//! targets themselves; fields of their type are set through a single option
//! taking every leaf field as an argument.
//!
//! Fields opt out of, or adjust, generation with `#[options = "name,default"]`.
//! See the `optgen` crate for the full attribute reference.

use proc_macro::TokenStream;
use syn::{Item, ItemMod, parse_macro_input};

mod assemble;
mod crate_path;
mod emit;
mod error;
mod imports;
mod parse;
mod shape;
mod synth;
#[cfg(test)]
mod test_support;
mod traits;

/// Generates functional options for the structs of an inline module.
///
/// ```rust,ignore
/// #[optgen::generate]
/// mod settings {
///     #[options]
///     pub struct Config {
///         retries: u32,
///         #[options = ",localhost"]
///         host: String,
///     }
/// }
///
/// use settings::{ConfigOptions, new_config};
/// let config = new_config(&[&ConfigOptions::retries(3)])?;
/// ```
#[proc_macro_attribute]
pub fn generate(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut module = parse_macro_input!(item as ItemMod);
    if !attr.is_empty() {
        let err = syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[optgen::generate] takes no arguments; configure structs with #[options(...)]",
        );
        return TokenStream::from(err.to_compile_error());
    }
    match expand(&mut module) {
        Ok(()) => TokenStream::from(quote::quote! { #module }),
        Err(err) => {
            let diagnostic = err.to_compile_error();
            TokenStream::from(quote::quote! { #module #diagnostic })
        }
    }
}

/// Appends the generated code to `module`.
///
/// Declarations that fail generation are reported individually and emit
/// nothing; the remaining declarations are generated as usual.
fn expand(module: &mut ItemMod) -> syn::Result<()> {
    let found = parse::discover(module)?;
    let mut units = Vec::with_capacity(found.targets.len());
    let mut failures = Vec::new();
    for decl in &found.targets {
        match emit::generate_unit(decl, &found.inline) {
            Ok(unit) => units.push(unit),
            Err(err) => failures.push(syn::Error::from(err)),
        }
    }
    let generated = emit::emit(&units, &failures);
    if let Some((_, items)) = module.content.as_mut() {
        items.push(Item::Verbatim(generated));
    }
    Ok(())
}
