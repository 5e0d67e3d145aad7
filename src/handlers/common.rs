//! Shared builder options.
//!
//! Stores fields common to every handler builder: the binding level, the
//! formatter identifier and the ids of filters applied to the binding.

use std::num::NonZeroUsize;

use crate::level::LogLevel;

use super::{FormatterId, HandlerBuildError};

#[derive(Clone, Debug, Default)]
pub struct CommonBuilder {
    pub(crate) level: Option<LogLevel>,
    pub(crate) formatter_id: Option<FormatterId>,
    pub(crate) filter_ids: Vec<String>,
    pub(crate) capacity: Option<NonZeroUsize>,
    pub(crate) capacity_set: bool,
}

impl CommonBuilder {
    /// Minimum level a record needs to reach the handler.
    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    /// Formatter the handler renders records with.
    pub fn formatter_id(&self) -> Option<&FormatterId> {
        self.formatter_id.as_ref()
    }

    /// Filters applied to the handler binding, in declaration order.
    pub fn filter_ids(&self) -> &[String] {
        &self.filter_ids
    }

    pub(crate) fn ensure_non_zero(field: &str, value: Option<u64>) -> Result<(), HandlerBuildError> {
        match value {
            Some(0) => Err(HandlerBuildError::InvalidConfig(format!(
                "{field} must be greater than zero",
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn is_capacity_valid(&self) -> Result<(), HandlerBuildError> {
        if self.capacity.is_none() && self.capacity_set {
            Err(HandlerBuildError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Generates the setters every builder shares on top of [`CommonBuilder`].
macro_rules! common_setters {
    ($builder:ty) => {
        impl $builder {
            /// Set the minimum level for records reaching this handler.
            pub fn with_level(mut self, level: $crate::level::LogLevel) -> Self {
                self.common.level = Some(level);
                self
            }

            /// Set the formatter identifier.
            pub fn with_formatter(mut self, formatter_id: impl Into<$crate::handlers::FormatterId>) -> Self {
                self.common.formatter_id = Some(formatter_id.into());
                self
            }

            /// Set filters by identifier, replacing any existing filters.
            pub fn with_filters<I, S>(mut self, filter_ids: I) -> Self
            where
                I: IntoIterator<Item = S>,
                S: Into<String>,
            {
                self.common.filter_ids = filter_ids.into_iter().map(Into::into).collect();
                self
            }
        }
    };
}

pub(crate) use common_setters;
