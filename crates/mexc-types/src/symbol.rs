//! Currency pairs (BTCUSDT wire format)

use crate::error::MexcError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quote currencies recognised when splitting a wire symbol
const KNOWN_QUOTES: [&str; 4] = ["USDT", "USDC", "BTC", "ETH"];

/// A base/quote currency pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Base currency code (e.g. "BTC")
    pub base: String,
    /// Quote currency code (e.g. "USDT")
    pub quote: String,
}

impl CurrencyPair {
    /// Create a new pair; codes are upper-cased
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// Symbol as used on the wire (e.g. "BTCUSDT")
    pub fn symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Parse a wire symbol such as "BTCUSDT"
    ///
    /// Only symbols ending in a known quote currency can be split.
    pub fn from_symbol(symbol: &str) -> Result<Self, MexcError> {
        let upper = symbol.to_uppercase();
        KNOWN_QUOTES
            .iter()
            .find_map(|quote| {
                upper
                    .strip_suffix(quote)
                    .filter(|base| !base.is_empty())
                    .map(|base| Self::new(base, *quote))
            })
            .ok_or_else(|| MexcError::UnsupportedSymbol(symbol.to_string()))
    }
}

impl FromStr for CurrencyPair {
    type Err = MexcError;

    /// Accepts "BTC/USDT" as well as the wire form "BTCUSDT"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(base, quote))
            }
            Some(_) => Err(MexcError::UnsupportedSymbol(s.to_string())),
            None => Self::from_symbol(s),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
