// Pricing module - Yahoo Finance chart client and the quote model

pub mod yahoo;

use rust_decimal::Decimal;

pub use yahoo::YahooClient;

/// Latest value and day change for one labelled instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub label: String,
    pub value: Option<Decimal>,
    pub change_percent: Option<Decimal>,
}

impl Quote {
    /// Build a quote from the latest price and the previous close.
    ///
    /// The change is unknown when either side is missing or the previous
    /// close is zero.
    pub fn from_close(
        label: &str,
        value: Option<Decimal>,
        previous_close: Option<Decimal>,
    ) -> Self {
        let change_percent = match (value, previous_close) {
            (Some(price), Some(prev)) if !prev.is_zero() => price
                .checked_sub(prev)
                .and_then(|diff| diff.checked_div(prev))
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED)),
            _ => None,
        };

        Self {
            label: label.to_string(),
            value,
            change_percent,
        }
    }
}
