use thiserror::Error;

use crate::convert::CurrencyCode;

/// Failure while retrieving a rate table from the provider.
///
/// `url` is the endpoint without its query string, so the credential never ends up in a message.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{source} for {url}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("HTTP {status} ({reason}) for {url}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("malformed rate data from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ForexError {
    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid currency: {0}")]
    UnknownCurrency(CurrencyCode),

    #[error("rate for {0} is zero")]
    ZeroRate(CurrencyCode),

    #[error("converting {amount} {base} to {target} overflowed")]
    Overflow {
        amount: rust_decimal::Decimal,
        base: CurrencyCode,
        target: CurrencyCode,
    },
}
