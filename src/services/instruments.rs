use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use typeshare::typeshare;

#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instrument {
    pub label: String,
    pub code: String,
    /// Shown instead of an error when fallbacks are enabled and the fetch fails.
    pub fallback_rate: Option<Decimal>,
}

impl Instrument {
    pub fn new(label: &str, code: &str, fallback_rate: Option<Decimal>) -> Instrument {
        Instrument {
            label: label.to_string(),
            code: code.to_string(),
            fallback_rate,
        }
    }

    /// Matches either the provider code or the display label, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.code.eq_ignore_ascii_case(query) || self.label.eq_ignore_ascii_case(query)
    }
}

pub fn default_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new("EUR/USD", "EURUSD", Some(dec!(1.08500))),
        Instrument::new("USD/JPY", "USDJPY", Some(dec!(149.500))),
        Instrument::new("GBP/USD", "GBPUSD", Some(dec!(1.26500))),
        Instrument::new("XAU/USD (Gold)", "XAUUSD", Some(dec!(2350.00))),
        Instrument::new("USD/CHF", "USDCHF", Some(dec!(0.88000))),
        Instrument::new("AUD/USD", "AUDUSD", Some(dec!(0.65500))),
    ]
}

pub fn find_instrument<'a>(instruments: &'a [Instrument], query: &str) -> Option<&'a Instrument> {
    instruments.iter().find(|instrument| instrument.matches(query))
}
