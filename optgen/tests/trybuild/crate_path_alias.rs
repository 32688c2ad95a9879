//! Trybuild fixture verifying `#[options(crate = "optgen")]` is accepted.

#[optgen::generate]
mod settings {
    /// Uses the real crate name as a self-referential alias so no workspace
    /// reconfiguration is needed.
    #[options(crate = "optgen", public = true)]
    pub struct CratePathConfig {
        #[options = ",hello"]
        pub value: String,
        #[options = "..."]
        pub counts: Vec<u32>,
    }
}

fn main() {
    use settings::{CratePathConfigOptions, new_crate_path_config};

    let result = new_crate_path_config(&[&CratePathConfigOptions::counts([1, 2])]);
    let _: Result<settings::CratePathConfig, optgen::OptionError> = result;
}
