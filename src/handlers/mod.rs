//! Handler builders and associated traits.
//!
//! Provides a minimal builder API for constructing handlers in a
//! type‑safe manner. Each builder implements [`HandlerBuilderTrait`]
//! which returns a shared [`LogHandler`] ready for registration
//! with a logger. Formatters are resolved by the configuration layer and
//! handed to the builder, so builders only carry a [`FormatterId`].

use std::{io, sync::Arc};

use thiserror::Error;

use crate::{formatter::SharedFormatter, handler::LogHandler};

mod common;
mod formatter_id;
pub mod stream_builder;
pub mod telegram_builder;

pub use common::CommonBuilder;
pub use formatter_id::FormatterId;
pub use stream_builder::StreamHandlerBuilder;
pub use telegram_builder::TelegramHandlerBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst creating the handler.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by all handler builders.
///
/// `build_inner` returns the concrete handler; [`build`](Self::build) erases
/// it so the caller can register it without knowing the concrete type.
pub trait HandlerBuilderTrait: Send + Sync {
    /// Concrete handler produced by this builder.
    type Handler: LogHandler + 'static;

    /// Build the handler instance with an already resolved formatter.
    fn build_inner(&self, formatter: SharedFormatter) -> Result<Self::Handler, HandlerBuildError>;

    /// Options shared by every builder: level, formatter and filters.
    fn common(&self) -> &CommonBuilder;

    /// Build the handler and return it as a trait object.
    fn build(&self, formatter: SharedFormatter) -> Result<Arc<dyn LogHandler>, HandlerBuildError> {
        self.build_inner(formatter)
            .map(|handler| Arc::new(handler) as Arc<dyn LogHandler>)
    }
}

/// Concrete handler builder variants.
///
/// `HandlerBuilder` is a concrete enum rather than a trait object to make
/// cloning straightforward.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum HandlerBuilder {
    /// Build a [`StreamHandler`](crate::stream_handler::StreamHandler).
    Stream(StreamHandlerBuilder),
    /// Build a [`TelegramHandler`](crate::telegram_handler::TelegramHandler).
    Telegram(TelegramHandlerBuilder),
}

impl HandlerBuilder {
    pub(crate) fn common(&self) -> &CommonBuilder {
        match self {
            Self::Stream(b) => b.common(),
            Self::Telegram(b) => b.common(),
        }
    }

    pub(crate) fn build(
        &self,
        formatter: SharedFormatter,
    ) -> Result<Arc<dyn LogHandler>, HandlerBuildError> {
        match self {
            Self::Stream(b) => b.build(formatter),
            Self::Telegram(b) => b.build(formatter),
        }
    }
}

impl From<StreamHandlerBuilder> for HandlerBuilder {
    fn from(value: StreamHandlerBuilder) -> Self {
        Self::Stream(value)
    }
}

impl From<TelegramHandlerBuilder> for HandlerBuilder {
    fn from(value: TelegramHandlerBuilder) -> Self {
        Self::Telegram(value)
    }
}
