//! Builder and implementation for a ceiling-based level filter.
//!
//! [`MaxLevelFilter`] is the complement of ordinary level gating: it admits
//! records at or *below* a ceiling, which lets a console handler keep
//! error-level records for a separate sink.

use crate::{filters::LogFilter, level::LogLevel, log_record::LogRecord};

/// Name of the level below every real level.
const NOTSET: &str = "NOTSET";

/// Ceiling as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelSpec {
    /// A named level such as `"WARNING"`.
    Name(String),
    /// A raw numeric level; values between the named levels are allowed.
    Numeric(u8),
    /// An already parsed level.
    Level(LogLevel),
}

impl LevelSpec {
    /// Resolve to a numeric ceiling. `NOTSET` resolves to 0 and unknown names
    /// resolve to `WARNING`.
    pub fn resolve(&self) -> u8 {
        match self {
            Self::Name(name) if name.trim().eq_ignore_ascii_case(NOTSET) => 0,
            Self::Name(name) => LogLevel::parse_or_warning(name).as_u8(),
            Self::Numeric(value) => *value,
            Self::Level(level) => level.as_u8(),
        }
    }
}

impl From<LogLevel> for LevelSpec {
    fn from(value: LogLevel) -> Self {
        Self::Level(value)
    }
}

impl From<u8> for LevelSpec {
    fn from(value: u8) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for LevelSpec {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for LevelSpec {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

/// Admits records whose level is at or below `max_level`.
///
/// `name` is kept for configuration and display only; it never restricts
/// which loggers the filter admits.
#[derive(Clone, Debug)]
pub struct MaxLevelFilter {
    name: String,
    max_level: u8,
}

impl MaxLevelFilter {
    /// Create an unscoped filter with the given ceiling.
    pub fn new(max_level: impl Into<LevelSpec>) -> Self {
        Self::scoped("", max_level)
    }

    /// Create a filter carrying logger `name`.
    pub fn scoped(name: impl Into<String>, max_level: impl Into<LevelSpec>) -> Self {
        Self {
            name: name.into(),
            max_level: max_level.into().resolve(),
        }
    }

    /// Resolved numeric ceiling.
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Configured name; empty when none was given.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for MaxLevelFilter {
    fn default() -> Self {
        Self::new(LogLevel::Warn)
    }
}

impl LogFilter for MaxLevelFilter {
    fn should_log(&self, record: &LogRecord) -> bool {
        record.level.as_u8() <= self.max_level
    }
}

/// Builder for [`MaxLevelFilter`].
#[derive(Clone, Debug, Default)]
pub struct MaxLevelFilterBuilder {
    name: Option<String>,
    max_level: Option<LevelSpec>,
}

impl MaxLevelFilterBuilder {
    /// Create a new `MaxLevelFilterBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum level allowed.
    pub fn with_max_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.max_level = Some(level.into());
        self
    }

    /// Set the filter's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl super::FilterBuilderTrait for MaxLevelFilterBuilder {
    type Filter = MaxLevelFilter;

    fn build_inner(&self) -> Result<Self::Filter, super::FilterBuildError> {
        let max_level = self.max_level.clone().unwrap_or(LevelSpec::Level(LogLevel::Warn));
        Ok(MaxLevelFilter::scoped(
            self.name.clone().unwrap_or_default(),
            max_level,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterBuilderTrait;
    use rstest::rstest;

    fn record(logger: &str, level: LogLevel) -> LogRecord {
        LogRecord::new(logger, level, "msg")
    }

    #[rstest]
    #[case(LogLevel::Debug, true)]
    #[case(LogLevel::Info, true)]
    #[case(LogLevel::Warn, true)]
    #[case(LogLevel::Error, false)]
    #[case(LogLevel::Critical, false)]
    fn warning_ceiling_by_name(#[case] level: LogLevel, #[case] expected: bool) {
        let filter = MaxLevelFilter::new("WARNING");
        assert_eq!(filter.should_log(&record("core", level)), expected);
    }

    #[test]
    fn unknown_name_falls_back_to_warning() {
        let filter = MaxLevelFilter::new("NOTALEVEL");
        assert_eq!(filter.max_level(), LogLevel::Warn.as_u8());
        assert!(filter.should_log(&record("core", LogLevel::Warn)));
        assert!(!filter.should_log(&record("core", LogLevel::Error)));
    }

    #[rstest]
    #[case("NOTSET")]
    #[case(" notset ")]
    fn notset_ceiling_admits_nothing(#[case] name: &str) {
        let filter = MaxLevelFilter::new(name);
        assert_eq!(filter.max_level(), 0);
        assert!(!filter.should_log(&record("core", LogLevel::Trace)));
    }

    #[rstest]
    #[case(35, LogLevel::Warn, true)]
    #[case(35, LogLevel::Error, false)]
    #[case(40, LogLevel::Error, true)]
    fn numeric_ceiling_is_inclusive(
        #[case] ceiling: u8,
        #[case] level: LogLevel,
        #[case] expected: bool,
    ) {
        let filter = MaxLevelFilter::new(ceiling);
        assert_eq!(filter.should_log(&record("core", level)), expected);
    }

    #[rstest]
    #[case("jobs")]
    #[case("jobs.sync")]
    #[case("jobsworth")]
    #[case("web")]
    #[case("root")]
    fn name_does_not_restrict_loggers(#[case] logger: &str) {
        let filter = MaxLevelFilter::scoped("jobs", "WARNING");
        assert_eq!(filter.name(), "jobs");
        assert!(filter.should_log(&record(logger, LogLevel::Info)));
        assert!(!filter.should_log(&record(logger, LogLevel::Error)));
    }

    #[test]
    fn builder_defaults_to_warning() {
        let filter = MaxLevelFilterBuilder::new()
            .build()
            .expect("build should succeed");
        assert!(filter.should_log(&record("core", LogLevel::Warn)));
        assert!(!filter.should_log(&record("core", LogLevel::Error)));
    }

    #[test]
    fn builder_applies_name_and_level() {
        let filter = MaxLevelFilterBuilder::new()
            .with_name("jobs")
            .with_max_level(LogLevel::Info)
            .build_inner()
            .expect("build should succeed");
        assert_eq!(filter.max_level(), 20);
        assert_eq!(filter.name(), "jobs");
        assert!(filter.should_log(&record("web", LogLevel::Info)));
        assert!(!filter.should_log(&record("web", LogLevel::Warn)));
    }
}
