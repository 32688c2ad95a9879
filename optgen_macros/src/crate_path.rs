//! Paths to the runtime crate in generated code.
//!
//! Generated items reach `optgen` through a single root so that
//! `#[options(crate = "...")]` can redirect them to a renamed dependency.

use proc_macro2::TokenStream;
use quote::quote;

/// Root of the runtime crate as seen from generated code.
pub(crate) struct Runtime {
    root: TokenStream,
}

impl Runtime {
    /// Resolves the root from the parsed struct attribute.
    ///
    /// Defaults to `::optgen` when no override is present.
    ///
    /// ```rust,ignore
    /// let runtime = Runtime::resolve(None);
    /// assert_eq!(runtime.option_error().to_string(), ":: optgen :: OptionError");
    /// ```
    pub(crate) fn resolve(crate_path: Option<&syn::Path>) -> Self {
        let root = crate_path.map_or_else(|| quote! { ::optgen }, |path| quote! { #path });
        Self { root }
    }

    /// Error type of fallible options when the policy names none.
    pub(crate) fn option_error(&self) -> TokenStream {
        let root = &self.root;
        quote! { #root::OptionError }
    }

    /// `tracing`, re-exported so user crates need no direct dependency.
    pub(crate) fn tracing(&self) -> TokenStream {
        let root = &self.root;
        quote! { #root::__private::tracing }
    }

    pub(crate) fn list_renderer(&self) -> TokenStream {
        let root = &self.root;
        quote! { #root::render::list }
    }
}
