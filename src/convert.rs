use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::ForexError;
use crate::rates::RateTable;

/// Fractional digits shown in the printed result
pub const RESULT_DP: u32 = 3;

/// Currency code as given on the command line, upper-cased.
///
/// Whether the provider knows the code is only checked when it is looked up in a [`RateTable`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CurrencyCode(s.trim().to_uppercase()))
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionRequest {
    pub amount: Decimal,
    pub base: CurrencyCode,
    pub target: CurrencyCode,
    /// Use historical rates for this day instead of the latest ones
    pub date: Option<Date>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversionResult {
    /// Unrounded amount in `currency`
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl ConversionResult {
    /// Amount rounded half-to-even to [`RESULT_DP`] places
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(RESULT_DP, RoundingStrategy::MidpointNearestEven)
    }
}

impl fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Precision on Decimal pads (or truncates), so round first
        let rounded = self.rounded();
        // Negative amounts that round to zero keep their sign
        let sign = if rounded.is_zero() && self.amount.is_sign_negative() {
            "-"
        } else {
            ""
        };
        write!(
            f,
            "{sign}{:.prec$} {}",
            if sign.is_empty() { rounded } else { rounded.abs() },
            self.currency,
            prec = RESULT_DP as usize
        )
    }
}

/// Convert `request.amount` from the base to the target currency.
///
/// Both rates are relative to the provider's anchor currency, so the cross rate is their ratio.
pub fn convert(
    table: &RateTable,
    request: &ConversionRequest,
) -> Result<ConversionResult, ForexError> {
    let target_rate = table.rate(&request.target)?;
    let base_rate = table.rate(&request.base)?;
    if base_rate.is_zero() {
        return Err(ForexError::ZeroRate(request.base.clone()));
    }

    let amount = request
        .amount
        .checked_mul(target_rate)
        .and_then(|scaled| scaled.checked_div(base_rate))
        .ok_or_else(|| ForexError::Overflow {
            amount: request.amount,
            base: request.base.clone(),
            target: request.target.clone(),
        })?;

    debug!(
        base = %request.base,
        target = %request.target,
        %base_rate,
        %target_rate,
        %amount,
        "converted"
    );
    Ok(ConversionResult {
        amount,
        currency: request.target.clone(),
    })
}
