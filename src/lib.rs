pub mod errors;
pub mod context;
pub mod config;
pub mod engine;
pub mod pattern;
pub mod sanitize;
pub mod strings;
pub mod template;
pub mod value;

pub use config::TemplateConfig;
pub use engine::Engine;
pub use errors::{BoxError, FilterError, Result};
pub use pattern::Pattern;
pub use sanitize::SanitizedOptions;
pub use strings::Needle;
pub use template::{BuiltinMode, Template};
pub use value::{FilterValue, RawValue};
