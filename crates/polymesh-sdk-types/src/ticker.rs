//! Asset tickers.

use crate::error::{TypeError, TypeResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum number of characters in a ticker.
pub const MAX_TICKER_LENGTH: usize = 12;

/// An asset ticker.
///
/// Tickers are between 1 and 12 characters long, upper case, and may only
/// contain ASCII alphanumerics and the characters `_`, `-`, `.` and `/`.
///
/// # Example
///
/// ```rust
/// use polymesh_sdk_types::Ticker;
///
/// let ticker = Ticker::new("ACME").unwrap();
/// assert_eq!(ticker.as_str(), "ACME");
/// assert!(Ticker::new("acme").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticker(String);

impl Ticker {
    /// Validates and creates a ticker.
    pub fn new(value: impl Into<String>) -> TypeResult<Self> {
        let value = value.into();

        if value.is_empty() {
            return Err(TypeError::InvalidTicker("ticker cannot be empty".into()));
        }
        if value.len() > MAX_TICKER_LENGTH {
            return Err(TypeError::InvalidTicker(format!(
                "ticker length {} exceeds the maximum of {MAX_TICKER_LENGTH}",
                value.len()
            )));
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/')))
        {
            return Err(TypeError::InvalidTicker(format!(
                "ticker contains invalid character '{c}'"
            )));
        }
        if value.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(TypeError::InvalidTicker(
                "ticker cannot contain lower case letters".into(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the ticker as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticker({})", self.0)
    }
}

impl FromStr for Ticker {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Ticker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ticker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}
