use std::collections::VecDeque;

use super::market_data::Quote;

/// Lower and upper bound accepted for the history cap.
pub const MIN_HISTORY_CAP: usize = 1;
pub const MAX_HISTORY_CAP: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub instrument: String,
    pub quote: Quote,
}

/// Quotes in arrival order, shared by all instruments, never longer than `cap`.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    cap: usize,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new(cap: usize) -> History {
        let cap = cap.clamp(MIN_HISTORY_CAP, MAX_HISTORY_CAP);
        History {
            cap,
            entries: VecDeque::with_capacity(cap),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, instrument: &str, quote: &Quote) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.instrument == instrument && entry.quote == *quote)
    }

    /// The quotes observed for one instrument, oldest first.
    pub fn for_instrument(&self, instrument: &str) -> Vec<Quote> {
        self.entries
            .iter()
            .filter(|entry| entry.instrument == instrument)
            .map(|entry| entry.quote.clone())
            .collect()
    }
}

/// Appends `quote` for `instrument`, skipping exact duplicates and evicting the
/// oldest entries once the cap is exceeded.
pub fn append_to_history(mut history: History, instrument: &str, quote: Quote) -> History {
    if history.contains(instrument, &quote) {
        return history;
    }

    history.entries.push_back(HistoryEntry {
        instrument: instrument.to_string(),
        quote,
    });
    while history.entries.len() > history.cap {
        history.entries.pop_front();
    }
    history
}
