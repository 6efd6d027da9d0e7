use itertools::Itertools;
use tabled::{Table, Tabled};

use crate::{cli::shared::format_rate, services::config::PollerConfig};

#[derive(Debug, Tabled)]
struct StringifiedInstrument {
    label: String,
    code: String,
    fallback: String,
}

pub fn instruments(config: &PollerConfig) {
    let rows = config
        .instruments
        .iter()
        .map(|instrument| StringifiedInstrument {
            label: instrument.label.clone(),
            code: instrument.code.clone(),
            fallback: instrument
                .fallback_rate
                .map(format_rate)
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect_vec();

    println!("{}", Table::new(&rows));
    if !config.fallback_enabled {
        println!("Fallback rates are only shown when FALLBACK_ENABLED is set.");
    }
}
