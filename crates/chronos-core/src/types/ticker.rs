//! 종목 티커.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ChronosError;

/// 정규화된 종목 티커 (앞뒤 공백 제거, 대문자).
///
/// ```
/// use chronos_core::Ticker;
///
/// let t: Ticker = " aapl ".parse().unwrap();
/// assert_eq!(t.as_str(), "AAPL");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// 원시 입력을 정규화합니다. 빈 문자열이거나 공백을 포함하면 에러를 반환합니다.
    pub fn parse(raw: &str) -> Result<Self, ChronosError> {
        let normalized = normalize_ticker(raw);
        if normalized.is_empty() {
            return Err(ChronosError::Validation("ticker must not be empty".into()));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(ChronosError::Validation(format!(
                "ticker must not contain whitespace: {normalized}"
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// 티커 문자열을 정규화합니다 (trim + uppercase).
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl FromStr for Ticker {
    type Err = ChronosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ChronosError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
