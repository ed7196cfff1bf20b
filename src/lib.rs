pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod rates;

use clap::Parser;
use jiff::civil::Date;
use rust_decimal::Decimal;
use tracing::debug;

pub use config::Config;
pub use convert::{ConversionRequest, ConversionResult, CurrencyCode, convert};
pub use error::{FetchError, ForexError};
pub use rates::{OpenExchangeRates, RateSource, RateTable};

/// Convert between two currencies using data from openexchangerates.org
#[derive(Parser, Debug)]
#[command(
    name = "forex",
    version,
    allow_negative_numbers = true,
    after_help = "Requires an API key for openexchangerates.org, provided as the environment variable OER_APP_ID."
)]
pub struct Cli {
    /// Amount to convert
    pub amount: Decimal,
    /// 3-letter base currency to convert from, e.g. GBP
    #[arg(value_name = "BASE_CURR")]
    pub base_curr: CurrencyCode,
    /// 3-letter currency to convert to, e.g. USD
    #[arg(value_name = "NEW_CURR")]
    pub new_curr: CurrencyCode,

    /// Date to use for historical rates (format: YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<Date>,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<&Cli> for ConversionRequest {
    fn from(args: &Cli) -> Self {
        ConversionRequest {
            amount: args.amount,
            base: args.base_curr.clone(),
            target: args.new_curr.clone(),
            date: args.date,
        }
    }
}

/// Strict `YYYY-MM-DD`, so a typo never silently selects some other day.
pub fn parse_date(input: &str) -> Result<Date, String> {
    Date::strptime("%Y-%m-%d", input)
        .map_err(|_| format!("invalid date '{input}': must be in format YYYY-MM-DD"))
}

/// Configure from `lookup`, fetch from openexchangerates.org, and convert.
///
/// Configuration is resolved first: without a credential no request is made.
pub fn run<F>(request: &ConversionRequest, lookup: F) -> Result<ConversionResult, ForexError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    debug!(?config, "configured");
    convert_with(request, &OpenExchangeRates::new(config))
}

pub fn convert_with(
    request: &ConversionRequest,
    source: &impl RateSource,
) -> Result<ConversionResult, ForexError> {
    let table = source.fetch(request.date)?;
    convert(&table, request)
}
