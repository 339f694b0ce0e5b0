//! Core types for the filter.
//!
//! - **Errors**: the build/serve error taxonomy with thiserror derives
//! - **Config**: server, upstream and rule configuration plus loading

mod config;
mod errors;

pub use config::{
    parse_bool, parse_headers, split_csv, split_shell_words, Config, ConfigOverrides, RuleConfig,
    UpstreamConfig,
};
pub use errors::{Error, Result};
