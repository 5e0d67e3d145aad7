//! Filtering components for log records.
//!
//! Provides the [`LogFilter`] trait along with the builders used by the
//! configuration layer to construct filters by id.

use std::sync::Arc;

use thiserror::Error;

use crate::log_record::LogRecord;

/// Trait implemented by all log filters.
///
/// Filters are `Send + Sync` so they can be shared across threads.
pub trait LogFilter: Send + Sync {
    /// Return `true` if `record` should be processed.
    fn should_log(&self, record: &LogRecord) -> bool;
}

pub mod level_filter;

pub use level_filter::{LevelSpec, MaxLevelFilter, MaxLevelFilterBuilder};

/// Errors that may occur while building a filter.
#[derive(Debug, Error)]
pub enum FilterBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid filter configuration: {0}")]
    InvalidConfig(String),
}

/// Trait implemented by all filter builders.
pub trait FilterBuilderTrait: Send + Sync {
    type Filter: LogFilter + 'static;

    fn build_inner(&self) -> Result<Self::Filter, FilterBuildError>;

    fn build(&self) -> Result<Arc<dyn LogFilter>, FilterBuildError> {
        Ok(Arc::new(self.build_inner()?))
    }
}

/// Concrete filter builder variants.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum FilterBuilder {
    /// Build a [`MaxLevelFilter`].
    MaxLevel(MaxLevelFilterBuilder),
}

impl FilterBuilder {
    pub fn build(&self) -> Result<Arc<dyn LogFilter>, FilterBuildError> {
        match self {
            Self::MaxLevel(b) => <MaxLevelFilterBuilder as FilterBuilderTrait>::build(b),
        }
    }
}

impl From<MaxLevelFilterBuilder> for FilterBuilder {
    fn from(value: MaxLevelFilterBuilder) -> Self {
        Self::MaxLevel(value)
    }
}
