//! Builder for [`StreamHandler`].
//!
//! Allows configuration of stream based handlers writing to `stdout` or
//! `stderr`. The builder exposes basic tuning for channel capacity.
//! `new` defaults to `stderr`, matching the usual logging convention.

use std::num::NonZeroUsize;

use super::{
    CommonBuilder, HandlerBuildError, HandlerBuilderTrait,
    common::common_setters,
};
use crate::{
    formatter::SharedFormatter,
    stream_handler::{DEFAULT_CHANNEL_CAPACITY, StreamHandler},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamTarget {
    Stdout,
    Stderr,
}

/// Builder for constructing [`StreamHandler`] instances.
#[derive(Clone, Debug)]
pub struct StreamHandlerBuilder {
    target: StreamTarget,
    common: CommonBuilder,
}

impl Default for StreamHandlerBuilder {
    fn default() -> Self {
        Self::stderr()
    }
}

impl StreamHandlerBuilder {
    /// Create a builder targeting `stderr`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder targeting `stdout`.
    pub fn stdout() -> Self {
        Self {
            target: StreamTarget::Stdout,
            common: CommonBuilder::default(),
        }
    }

    /// Create a builder targeting `stderr`.
    pub fn stderr() -> Self {
        Self {
            target: StreamTarget::Stderr,
            common: CommonBuilder::default(),
        }
    }

    /// Set the bounded channel capacity.
    ///
    /// # Validation
    ///
    /// The capacity must be greater than zero; invalid values cause `build`
    /// to error.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.common.capacity = NonZeroUsize::new(capacity);
        self.common.capacity_set = true;
        self
    }

    /// Whether the handler writes to standard output.
    pub fn is_stdout(&self) -> bool {
        self.target == StreamTarget::Stdout
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.common.is_capacity_valid()
    }
}

common_setters!(StreamHandlerBuilder);

impl HandlerBuilderTrait for StreamHandlerBuilder {
    type Handler = StreamHandler;

    fn build_inner(&self, formatter: SharedFormatter) -> Result<Self::Handler, HandlerBuildError> {
        self.validate()?;
        let capacity = self
            .common
            .capacity
            .map_or(DEFAULT_CHANNEL_CAPACITY, NonZeroUsize::get);
        let handler = match self.target {
            StreamTarget::Stdout => {
                StreamHandler::with_capacity(std::io::stdout(), formatter, capacity)
            }
            StreamTarget::Stderr => {
                StreamHandler::with_capacity(std::io::stderr(), formatter, capacity)
            }
        };
        Ok(handler)
    }

    fn common(&self) -> &CommonBuilder {
        &self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    #[test]
    fn zero_capacity_is_rejected() {
        let err = StreamHandlerBuilder::stdout()
            .with_capacity(0)
            .build_inner(SharedFormatter::default())
            .expect_err("zero capacity must fail");
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn common_options_are_recorded() {
        let builder = StreamHandlerBuilder::stdout()
            .with_level(LogLevel::Debug)
            .with_formatter("console")
            .with_filters(["stdout_no_errors"]);
        assert!(builder.is_stdout());
        assert_eq!(builder.common().level(), Some(LogLevel::Debug));
        assert_eq!(
            builder.common().formatter_id().map(|id| id.as_str()),
            Some("console")
        );
        assert_eq!(builder.common().filter_ids(), ["stdout_no_errors"]);
    }

    #[test]
    fn default_targets_stderr() {
        assert!(!StreamHandlerBuilder::new().is_stdout());
        let handler = StreamHandlerBuilder::new()
            .build_inner(SharedFormatter::default())
            .expect("build");
        handler.close();
    }
}
