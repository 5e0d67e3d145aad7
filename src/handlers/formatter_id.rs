//! Identifier for registered formatters.
//!
//! Distinguishes the built-in formatter from ids registered through
//! [`ConfigBuilder::with_formatter`](crate::config::ConfigBuilder::with_formatter)
//! so lookups do not scatter string comparisons.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FormatterId {
    /// The built-in [`DefaultFormatter`](crate::formatter::DefaultFormatter).
    Default,
    /// A formatter registered with the configuration.
    Custom(String),
}

impl FormatterId {
    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Custom(id) => id.as_str(),
        }
    }
}

impl fmt::Display for FormatterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FormatterId {
    fn from(id: String) -> Self {
        match id.as_str() {
            "default" => Self::Default,
            _ => Self::Custom(id),
        }
    }
}

impl From<&str> for FormatterId {
    fn from(id: &str) -> Self {
        Self::from(id.to_owned())
    }
}
