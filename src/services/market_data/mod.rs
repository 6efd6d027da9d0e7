pub mod cache;
pub mod errors;
pub mod freeforex;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;
use typeshare::typeshare;

use errors::FetchError;

/// Number of decimal places every published rate is rounded to.
pub const RATE_DECIMALS: u32 = 5;

/// A single observation of an instrument's rate.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub rate: Decimal,
    pub observed_at: DateTime<Local>,
}

impl Quote {
    /// Builds a quote from the raw provider values: a float rate and an epoch
    /// timestamp in seconds.
    pub fn from_raw(rate: f64, timestamp: i64) -> Result<Quote, FetchError> {
        let rate = Decimal::try_from(rate)
            .map_err(|_| FetchError::Schema(format!("rate {} is not a finite number", rate)))?
            .round_dp(RATE_DECIMALS);
        let observed_at = Local
            .timestamp_opt(timestamp, 0)
            .single()
            .ok_or_else(|| FetchError::Schema(format!("timestamp {} is out of range", timestamp)))?;
        Ok(Quote { rate, observed_at })
    }
}

/// Anything that can produce the live quote for a provider instrument code.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, code: &str) -> Result<Quote, FetchError>;
}


#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_rate_to_five_decimals() {
        let quote = Quote::from_raw(1.0842376, 1_700_000_000).unwrap();
        assert_eq!(quote.rate, dec!(1.08424));
    }

    #[test]
    fn converts_epoch_to_local_time() {
        let quote = Quote::from_raw(151.2, 1_700_000_000).unwrap();
        assert_eq!(quote.observed_at.timestamp(), 1_700_000_000);
        assert_eq!(
            quote.observed_at,
            Local.timestamp_opt(1_700_000_000, 0).unwrap()
        );
    }

    #[test]
    fn rejects_non_finite_rate() {
        let result = Quote::from_raw(f64::NAN, 1_700_000_000);
        assert!(matches!(result, Err(FetchError::Schema(_))));
    }

    #[test]
    fn rejects_out_of_range_timestamp() {
        let result = Quote::from_raw(1.1, i64::MAX);
        assert!(matches!(result, Err(FetchError::Schema(_))));
    }
}
