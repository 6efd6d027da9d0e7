use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Local;
use itertools::Itertools;
use owo_colors::{OwoColorize, Style};
use tabled::{Table, Tabled};
use tracing::info;

use crate::{
    cli::shared::{
        choose_instrument, format_change, format_rate, format_time, resolve_instrument,
        status_banner,
    },
    services::{
        config::PollerConfig,
        poller::{run_polling_loop, Poller, Presenter},
        session::{PollStatus, Session},
    },
};

const RECENT_ROWS: usize = 10;

#[derive(Debug, Tabled)]
struct StringifiedQuote {
    time: String,
    rate: String,
}

struct TerminalPresenter {
    session: Option<Session>,
    refresh_secs: u64,
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn checkout(&mut self) -> anyhow::Result<Session> {
        self.session
            .take()
            .ok_or_else(|| anyhow!("Session already handed to the poller"))
    }

    async fn present(&mut self, session: Session) -> anyhow::Result<()> {
        render(&session, self.refresh_secs);
        self.session = Some(session);
        Ok(())
    }
}

fn render(session: &Session, refresh_secs: u64) {
    let headline_style = Style::new().black().on_white().bold();

    let displayed_rate = match &session.status {
        PollStatus::Live { quote } => format_rate(quote.rate),
        PollStatus::Degraded { fallback_rate, .. } => {
            format!("{} (fallback)", format_rate(*fallback_rate))
        }
        PollStatus::Pending | PollStatus::Failed { .. } => "-".to_string(),
    };

    println!("\n");
    println!(
        "{} | Current rate: {} | Change: {} | Refreshed: {}",
        session.selected.label.style(headline_style),
        displayed_rate,
        format_change(session.change()),
        format_time(&Local::now())
    );
    println!(
        "{}",
        status_banner(&session.status, session.last_polled_at.as_ref(), refresh_secs)
    );

    let recent = session
        .visible_history()
        .iter()
        .rev()
        .take(RECENT_ROWS)
        .map(|quote| StringifiedQuote {
            time: quote.observed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            rate: format_rate(quote.rate),
        })
        .collect_vec();

    if session.history.is_empty() {
        println!("No quotes collected yet.");
    } else if !recent.is_empty() {
        println!("{}", Table::new(&recent));
        println!(
            "Stored quotes: {}/{}",
            session.history.len(),
            session.history.cap()
        );
    }
}

pub async fn watch(
    config: &PollerConfig,
    instrument: Option<String>,
    ticks: Option<u64>,
) -> anyhow::Result<()> {
    let instrument = match instrument {
        Some(query) => resolve_instrument(config, &query)?,
        None => choose_instrument(&config.instruments)?,
    };
    info!("Watching {} ({})", instrument.label, instrument.code);

    let poller = Poller::from_config(config)?;
    let mut presenter = TerminalPresenter {
        session: Some(Session::new(instrument, config.history_cap)),
        refresh_secs: poller.refresh_interval().as_secs(),
    };

    tokio::select! {
        res = run_polling_loop(&poller, &mut presenter, ticks) => res?,
        _ = tokio::signal::ctrl_c() => info!("Stopped watching"),
    }
    Ok(())
}
