//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information, as shown on pricing plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Returns `true` for negative amounts, which plans never carry.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Format for display: `$499` for whole amounts, `$19.99` otherwise.
    #[must_use]
    pub fn display(&self) -> String {
        let symbol = self.currency_code.symbol();
        if self.amount.fract().is_zero() {
            format!("{symbol}{}", self.amount.trunc())
        } else {
            format!("{symbol}{:.2}", self.amount)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// All supported codes, in the order the dashboard lists them.
    pub const ALL: [Self; 5] = [Self::USD, Self::EUR, Self::GBP, Self::CAD, Self::AUD];

    /// Currency symbol used when rendering prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// The three-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Parse a code case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_amount() {
        let price = Price::new(Decimal::new(499, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "$499");
    }

    #[test]
    fn test_display_fractional_amount() {
        let price = Price::new(Decimal::new(1999, 2), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£19.99");
    }

    #[test]
    fn test_negative() {
        assert!(Price::new(Decimal::new(-1, 0), CurrencyCode::USD).is_negative());
        assert!(!Price::default().is_negative());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(CurrencyCode::from_code("eur"), Some(CurrencyCode::EUR));
        assert_eq!(CurrencyCode::from_code("XYZ"), None);
    }
}
