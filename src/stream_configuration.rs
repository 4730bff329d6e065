//! Configuration types for lazystream
//!
//! The only knob a pipeline carries is its error policy. [`Policy`] is the
//! closed runtime tag for it and can live in an application's own config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error-handling policy of a stream chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Fail fast on the first error
    #[default]
    Break,
    /// Drop failing items silently
    Ignore,
    /// Drop failing items and report their errors with the result
    Settle,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::Break => "break",
            Policy::Ignore => "ignore",
            Policy::Settle => "settle",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error policy: {0}")]
pub struct ParsePolicyError(pub String);

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "break" => Ok(Policy::Break),
            "ignore" => Ok(Policy::Ignore),
            "settle" => Ok(Policy::Settle),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
