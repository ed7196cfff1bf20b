use std::collections::HashMap;

use jiff::Timestamp;
use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};
use ureq::Agent;

use crate::config::Config;
use crate::convert::CurrencyCode;
use crate::{FetchError, ForexError};

/// Something that can produce a rate table, either the latest one or one for a past date.
pub trait RateSource {
    fn fetch(&self, date: Option<Date>) -> Result<RateTable, FetchError>;
}

/// Exchange rates relative to a single anchor currency chosen by the provider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RateTable {
    anchor: Option<String>,
    published: Option<Timestamp>,
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    pub fn new(rates: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        RateTable {
            rates: rates.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Decode a provider response body. A body without a `rates` object is an error.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let resp: RatesResponse = serde_json::from_str(body)?;
        Ok(RateTable {
            anchor: resp.base,
            published: resp
                .timestamp
                .and_then(|secs| Timestamp::from_second(secs).ok()),
            rates: resp
                .rates
                .into_iter()
                .map(|(code, rate)| (code, rate.0))
                .collect(),
        })
    }

    pub fn rate(&self, code: &CurrencyCode) -> Result<Decimal, ForexError> {
        self.rates
            .get(code.as_str())
            .copied()
            .ok_or_else(|| ForexError::UnknownCurrency(code.clone()))
    }

    /// Currency every rate is expressed against, when the provider reports it
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// When the provider published these rates
    pub fn published(&self) -> Option<Timestamp> {
        self.published
    }
}

#[derive(Deserialize)]
struct RatesResponse {
    base: Option<String>,
    timestamp: Option<i64>,
    rates: HashMap<String, Rate>,
}

/// Rate parsed from the JSON number text, never through a float
#[derive(Deserialize)]
struct Rate(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

/// Error body returned by openexchangerates.org alongside a non-2xx status
#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
    description: Option<String>,
}

/// Blocking client for the openexchangerates.org API.
pub struct OpenExchangeRates {
    agent: Agent,
    config: Config,
}

impl OpenExchangeRates {
    pub fn new(config: Config) -> Self {
        // Status codes are inspected below rather than surfaced as transport errors
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        OpenExchangeRates { agent, config }
    }

    /// Endpoint for the latest rates, or the historical rates of `date`. Excludes the credential.
    pub fn endpoint(&self, date: Option<Date>) -> String {
        let base = &self.config.base_url;
        match date {
            None => format!("{base}/latest.json"),
            Some(date) => format!("{base}/historical/{date}.json"),
        }
    }
}

impl RateSource for OpenExchangeRates {
    fn fetch(&self, date: Option<Date>) -> Result<RateTable, FetchError> {
        let url = self.endpoint(date);
        debug!(%url, "requesting rates");

        let mut resp = self
            .agent
            .get(url.as_str())
            .query("app_id", self.config.app_id.as_str())
            .call()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        let body = resp
            .body_mut()
            .read_to_string()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|err| err.description.or(err.message))
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
                reason,
            });
        }

        let table = RateTable::from_json(&body).map_err(|source| FetchError::Decode {
            url: url.clone(),
            source,
        })?;
        info!(
            %url,
            anchor = table.anchor().unwrap_or("unknown"),
            published = ?table.published(),
            currencies = table.rates.len(),
            "received rates"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use std::str::FromStr;

    const LATEST: &str = r#"{
        "disclaimer": "Usage subject to terms: https://openexchangerates.org/terms",
        "license": "https://openexchangerates.org/license",
        "timestamp": 1672617600,
        "base": "USD",
        "rates": {
            "GBP": 0.827392846127361549,
            "JPY": 131.11,
            "USD": 1
        }
    }"#;

    fn client(base_url: &str) -> OpenExchangeRates {
        OpenExchangeRates::new(Config {
            app_id: "secret".to_string(),
            base_url: base_url.to_string(),
        })
    }

    #[test]
    fn test_decode_keeps_full_precision() {
        let table = RateTable::from_json(LATEST).unwrap();
        assert_eq!(
            table.rate(&"gbp".parse().unwrap()).unwrap(),
            Decimal::from_str("0.827392846127361549").unwrap()
        );
        assert_eq!(
            table.rate(&"JPY".parse().unwrap()).unwrap(),
            Decimal::new(13111, 2)
        );
        assert_eq!(table.anchor(), Some("USD"));
        assert_eq!(
            table.published(),
            Some(Timestamp::from_second(1672617600).unwrap())
        );
    }

    #[test]
    fn test_decode_without_metadata() {
        let table = RateTable::from_json(r#"{"rates": {"EUR": 0.9}}"#).unwrap();
        assert_eq!(table.anchor(), None);
        assert_eq!(table.published(), None);
        assert_eq!(
            table.rate(&"EUR".parse().unwrap()).unwrap(),
            Decimal::new(9, 1)
        );
    }

    #[test]
    fn test_decode_rejects_missing_rates() {
        let err = RateTable::from_json(r#"{"base": "USD", "timestamp": 1672531200}"#)
            .unwrap_err();
        assert!(err.to_string().contains("rates"), "{err}");
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(RateTable::from_json("<html>Not Found</html>").is_err());
        assert!(RateTable::from_json(r#"{"rates": {"GBP": "a lot"}}"#).is_err());
    }

    #[test]
    fn test_unknown_currency() {
        let table = RateTable::from_json(LATEST).unwrap();
        assert!(matches!(
            table.rate(&"XYZ".parse().unwrap()),
            Err(ForexError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn test_endpoints() {
        let oer = client(crate::config::DEFAULT_BASE_URL);
        assert_eq!(
            oer.endpoint(None),
            "http://openexchangerates.org/api/latest.json"
        );
        assert_eq!(
            oer.endpoint(Some(date(2023, 1, 1))),
            "http://openexchangerates.org/api/historical/2023-01-01.json"
        );
    }
}
