use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::Serialize;
use typeshare::typeshare;

use super::{history::History, instruments::Instrument, market_data::Quote};

/// Outcome of the most recent poll, as the presentation layer should show it.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum PollStatus {
    /// Nothing polled yet for the selected instrument.
    Pending,
    Live { quote: Quote },
    /// The fetch failed and the instrument's static fallback rate is shown instead.
    Degraded { fallback_rate: Decimal, reason: String },
    Failed { reason: String },
}

/// Per-session dashboard state. Owned by whoever presents it and handed to
/// the poller by value on every tick.
#[derive(Debug, Clone)]
pub struct Session {
    pub selected: Instrument,
    pub history: History,
    pub status: PollStatus,
    pub last_polled_at: Option<DateTime<Local>>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub instrument: Instrument,
    pub status: PollStatus,
    pub last_polled_at: Option<DateTime<Local>>,
    pub change: Option<Decimal>,
    pub history: Vec<Quote>,
}

impl Session {
    pub fn new(selected: Instrument, history_cap: usize) -> Session {
        Session {
            selected,
            history: History::new(history_cap),
            status: PollStatus::Pending,
            last_polled_at: None,
        }
    }

    /// Switches the selected instrument. The shared history is kept so that
    /// switching back shows the quotes collected earlier.
    pub fn select(&mut self, instrument: Instrument) {
        if self.selected.code != instrument.code {
            self.selected = instrument;
            self.status = PollStatus::Pending;
            self.last_polled_at = None;
        }
    }

    /// History of the selected instrument, oldest first.
    pub fn visible_history(&self) -> Vec<Quote> {
        self.history.for_instrument(&self.selected.code)
    }

    /// Difference between the last two visible quotes.
    pub fn change(&self) -> Option<Decimal> {
        let history = self.visible_history();
        match history.as_slice() {
            [.., previous, last] => Some(last.rate - previous.rate),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            instrument: self.selected.clone(),
            status: self.status.clone(),
            last_polled_at: self.last_polled_at,
            change: self.change(),
            history: self.visible_history(),
        }
    }
}
