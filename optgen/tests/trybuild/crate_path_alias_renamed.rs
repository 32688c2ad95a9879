//! Trybuild fixture verifying `#[options(crate = "...")]` works with a
//! genuine dependency rename via `use ... as`.

use optgen as my_opts;

#[my_opts::generate]
mod settings {
    use super::my_opts;

    /// Generated code references the runtime through `my_opts` only.
    #[options(crate = "my_opts", errors = "infallible", public = true)]
    pub struct AliasedConfig {
        pub value: String,
        #[options = "..."]
        pub counts: Vec<u32>,
    }

    #[options(crate = "my_opts", public = true)]
    pub struct FallibleAliased {
        pub count: u32,
    }

    /// Keeps the alias import used outside generated code.
    pub type Failure = my_opts::OptionError;
}

fn main() {
    use settings::{AliasedConfigOptions, FallibleAliasedOptions, new_aliased_config, new_fallible_aliased};

    let config = new_aliased_config(&[&AliasedConfigOptions::value("hello".to_owned())]);
    let _: settings::AliasedConfig = config;
    let result = new_fallible_aliased(&[&FallibleAliasedOptions::count(1)]);
    let _: Result<settings::FallibleAliased, settings::Failure> = result;
}
