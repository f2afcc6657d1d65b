//! Reform Configuration
//!
//! TOML-based configuration for the reform engine. Minimal config should
//! just work - the only required option is the output `tag` template.
//!
//! # Parsing
//!
//! ```
//! let config: reform_config::ReformerInstanceConfig =
//!     toml::from_str("tag = \"reformed.${tag}\"").unwrap();
//! config.validate().unwrap();
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! tag = "reformed.${tag}"
//! remove_keys = "message"
//! renew_record = false
//! renew_time_key = "produced_at"
//! enable_expressions = true
//! auto_typecast = false
//!
//! [record]
//! hostname = "${hostname}"
//! input_tag = "${tag}"
//! last_part = "${tag_parts[-1]}"
//! ```

mod error;
mod reformer;
mod value;

pub use error::{ConfigError, Result};
pub use reformer::ReformerInstanceConfig;
pub use value::{parse_value, template_value};
