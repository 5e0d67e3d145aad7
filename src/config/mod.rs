//! Configuration builders for telelog.
//!
//! [`ConfigBuilder`] wires formatters, filters and handlers together by id and
//! realises them into a [`Pipeline`](crate::pipeline::Pipeline).

mod build;
mod types;

pub use types::{ConfigBuilder, ConfigError, FormatterBuilder, LoggerConfigBuilder};
