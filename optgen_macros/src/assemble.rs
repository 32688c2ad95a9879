//! Config assembly: the option trait, the namespace, and the apply and build
//! functions tying the generated options to the target struct.

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::crate_path::Runtime;
use crate::parse::{ErrorMode, GenerationPolicy};
use crate::synth::OptionDefinition;

/// Everything the assembler needs about one declaration.
pub(crate) struct Target<'a> {
    pub config: &'a Ident,
    pub policy: &'a GenerationPolicy,
    pub error_ty: &'a TokenStream,
    pub runtime: &'a Runtime,
}

impl Target<'_> {
    fn sealed_module(&self) -> Ident {
        format_ident!("__{}_sealed", self.config.to_string().to_snake_case())
    }

    /// The option trait, sealed in infallible mode.
    pub(crate) fn option_trait(&self) -> TokenStream {
        let Self {
            config, error_ty, ..
        } = self;
        let option_trait = &self.policy.option_trait;
        let doc = format!("An option that can be applied to [`{config}`].");
        match self.policy.error_mode {
            ErrorMode::Fallible => quote! {
                #[doc = #doc]
                pub trait #option_trait {
                    /// Applies the option to `target`.
                    ///
                    /// # Errors
                    ///
                    /// Returns an error when the option cannot be applied.
                    fn apply(&self, target: &mut #config) -> ::core::result::Result<(), #error_ty>;
                }
            },
            ErrorMode::Infallible => {
                let sealed = self.sealed_module();
                quote! {
                    #[doc(hidden)]
                    pub mod #sealed {
                        pub trait Sealed {}
                    }

                    #[doc = #doc]
                    pub trait #option_trait: #sealed::Sealed {
                        /// Applies the option to `target`.
                        fn apply(&self, target: &mut #config);
                    }
                }
            }
        }
    }

    /// Seals a generated option type, when the trait is sealed.
    pub(crate) fn seal(&self, definition: &OptionDefinition) -> TokenStream {
        if self.policy.error_mode == ErrorMode::Fallible {
            return TokenStream::new();
        }
        let sealed = self.sealed_module();
        let type_ident = &definition.type_ident;
        quote! { impl #sealed::Sealed for #type_ident {} }
    }

    /// Unit struct grouping the option constructors.
    pub(crate) fn namespace(&self, definitions: &[OptionDefinition]) -> TokenStream {
        let namespace = &self.policy.namespace;
        let config = self.config;
        let doc = format!("Constructors for the options of [`{config}`].");
        let constructors = definitions.iter().map(OptionDefinition::constructor);
        quote! {
            #[doc = #doc]
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #namespace;

            impl #namespace {
                #( #constructors )*
            }
        }
    }

    /// Applies a sequence of options in order.
    pub(crate) fn apply_fn(&self) -> TokenStream {
        let Self {
            config,
            error_ty,
            runtime,
            ..
        } = self;
        let apply_fn = &self.policy.apply_fn;
        let option_trait = &self.policy.option_trait;
        let config_name = config.to_string();
        let tracing = runtime.tracing();
        let doc = "Applies `options` to `target` in order.";
        match self.policy.error_mode {
            ErrorMode::Fallible => quote! {
                #[doc = #doc]
                ///
                /// # Errors
                ///
                /// Stops at the first failing option and returns its error.
                pub fn #apply_fn(
                    target: &mut #config,
                    options: &[&dyn #option_trait],
                ) -> ::core::result::Result<(), #error_ty> {
                    for (position, option) in options.iter().enumerate() {
                        if let ::core::result::Result::Err(err) = option.apply(target) {
                            #tracing::debug!(
                                config = #config_name,
                                position,
                                "option failed to apply"
                            );
                            return ::core::result::Result::Err(err);
                        }
                    }
                    ::core::result::Result::Ok(())
                }
            },
            ErrorMode::Infallible => quote! {
                #[doc = #doc]
                pub fn #apply_fn(target: &mut #config, options: &[&dyn #option_trait]) {
                    for option in options {
                        option.apply(target);
                    }
                }
            },
        }
    }

    /// Builds the target from field defaults and `options`.
    ///
    /// `inits` holds one `field: expr` initialiser per declared field.
    pub(crate) fn build_fn(&self, inits: &[TokenStream]) -> TokenStream {
        let Some(build_fn) = &self.policy.build_fn else {
            return TokenStream::new();
        };
        let Self {
            config, error_ty, ..
        } = self;
        let apply_fn = &self.policy.apply_fn;
        let option_trait = &self.policy.option_trait;
        let doc = format!("Builds a [`{config}`] from its defaults and `options`.");
        match self.policy.error_mode {
            ErrorMode::Fallible => quote! {
                #[doc = #doc]
                ///
                /// # Errors
                ///
                /// Returns the error of the first option that fails to apply.
                pub fn #build_fn(
                    options: &[&dyn #option_trait],
                ) -> ::core::result::Result<#config, #error_ty> {
                    let mut target = #config { #( #inits, )* };
                    #apply_fn(&mut target, options)?;
                    ::core::result::Result::Ok(target)
                }
            },
            ErrorMode::Infallible => quote! {
                #[doc = #doc]
                #[must_use]
                pub fn #build_fn(options: &[&dyn #option_trait]) -> #config {
                    let mut target = #config { #( #inits, )* };
                    #apply_fn(&mut target, options);
                    target
                }
            },
        }
    }
}
