//! Functional options for configuration structs.
//!
//! Annotate an inline module with [`generate`] and mark the structs that
//! should receive options with `#[options]`. For a struct `Config` the macro
//! emits, next to the struct:
//!
//! - one option type per field (`ConfigMyIntOption`), carrying the
//!   constructor arguments and implementing the option trait;
//! - `ConfigOptions`, a namespace whose associated functions build options
//!   (`ConfigOptions::my_int(3)`);
//! - `ConfigOption`, the trait every option implements;
//! - `apply_config_options(&mut config, &[..])`, applying options in order;
//! - `new_config(&[..])`, building a `Config` from field defaults and then
//!   applying the options. It stays private to the module unless the struct
//!   sets `public = true`.
//!
//! ```rust
//! #[optgen::generate]
//! mod settings {
//!     #[options(public = true)]
//!     #[derive(Debug)]
//!     pub struct Config {
//!         pub(crate) retries: u32,
//!         #[options = ",localhost"]
//!         pub(crate) host: String,
//!         #[options = "-"]
//!         pub(crate) cache: Vec<u8>,
//!     }
//! }
//!
//! use settings::{ConfigOptions, new_config};
//!
//! let config = new_config(&[&ConfigOptions::retries(3)]).map_err(|e| e.to_string())?;
//! assert_eq!(config.retries, 3);
//! assert_eq!(config.host, "localhost");
//! assert_eq!(ConfigOptions::retries(3).to_string(), "Retries: 3");
//! # Ok::<(), String>(())
//! ```
//!
//! # Field annotations
//!
//! `#[options = "name,default"]` is split on its first comma. The name part
//! may be empty (keep the field name), `-` (no option for the field), or a
//! new constructor name. A leading `*` on the name makes an `Option<T>` field
//! settable from a plain `T`; a trailing `...` makes a `Vec<T>` field take any
//! iterator of `T`. The default initialises the field in the build function.
//!
//! # Struct attributes
//!
//! `#[options(key = value, ...)]` adjusts generation per struct: `namespace`,
//! `prefix`, `suffix`, `option_trait`, `apply`, `new` (a name, or `false` to
//! omit the build function), `public`, `errors` (`"fallible"` or
//! `"infallible"`), `error`, `quote_default_strings`, `cmp`, `stringer`,
//! `cfg`, `imports` and `crate`. Unknown keys are ignored.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

pub use optgen_macros::generate;

pub mod render;

/// Error returned by fallible options unless `#[options(error = "...")]`
/// names another type.
pub type OptionError = Box<dyn Error + Send + Sync + 'static>;

/// Type-erased value accepted by fields declared as `Dynamic`.
///
/// Options for such fields take the value as-is; they never take part in
/// equality and render as `<dynamic>`.
pub type Dynamic = Arc<dyn Any + Send + Sync>;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
