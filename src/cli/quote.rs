use spinners_rs::{Spinner, Spinners};
use tabled::{Table, Tabled};

use crate::{
    cli::shared::{format_rate, resolve_instrument, status_banner},
    services::{
        config::PollerConfig,
        poller::Poller,
        session::{PollStatus, Session},
    },
};

#[derive(Debug, Tabled)]
struct StringifiedLiveQuote {
    instrument: String,
    code: String,
    rate: String,
    observed_at: String,
}

pub async fn quote(config: &PollerConfig, query: &str) -> anyhow::Result<()> {
    let instrument = resolve_instrument(config, query)?;

    let mut sp = Spinner::new(Spinners::Point, "Fetching live rate");
    sp.start();
    let poller = Poller::from_config(config)?;
    let session = poller
        .poll(Session::new(instrument, config.history_cap))
        .await;
    sp.stop();
    println!();

    if let PollStatus::Live { quote } = &session.status {
        let row = StringifiedLiveQuote {
            instrument: session.selected.label.clone(),
            code: session.selected.code.clone(),
            rate: format_rate(quote.rate),
            observed_at: quote.observed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        println!("{}", Table::new([row]));
    }
    println!(
        "{}",
        status_banner(
            &session.status,
            session.last_polled_at.as_ref(),
            poller.refresh_interval().as_secs()
        )
    );
    Ok(())
}
