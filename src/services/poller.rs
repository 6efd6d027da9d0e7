use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Local;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use super::{
    config::PollerConfig,
    history::append_to_history,
    instruments::Instrument,
    market_data::{
        cache::CachedSource, errors::FetchError, freeforex::FreeForexClient, Quote, RateSource,
    },
    session::{PollStatus, Session},
};

/// Presentation side of the polling loop. It owns the session between ticks.
#[async_trait]
pub trait Presenter: Send {
    /// Hands the current session to the poller.
    async fn checkout(&mut self) -> anyhow::Result<Session>;

    /// Takes back the updated session and shows it.
    async fn present(&mut self, session: Session) -> anyhow::Result<()>;
}

pub struct Poller {
    /// Used by the polling loop, never cached.
    live: Arc<dyn RateSource>,
    /// Used for on-demand fetches; the quote cache when enabled.
    on_demand: Arc<dyn RateSource>,
    fallback_enabled: bool,
    refresh_interval: Duration,
}

impl Poller {
    pub fn new(live: Arc<dyn RateSource>, config: &PollerConfig) -> Poller {
        let on_demand: Arc<dyn RateSource> = if config.cache_quotes {
            Arc::new(CachedSource::new(live.clone(), config.refresh_interval))
        } else {
            live.clone()
        };
        Poller {
            live,
            on_demand,
            fallback_enabled: config.fallback_enabled,
            refresh_interval: config.refresh_interval,
        }
    }

    pub fn from_config(config: &PollerConfig) -> anyhow::Result<Poller> {
        let client: Arc<dyn RateSource> = Arc::new(FreeForexClient::new(
            &config.base_url,
            config.request_timeout,
            config.require_success_code,
        )?);
        Ok(Poller::new(client, config))
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// One-off fetch outside the session, going through the cache when enabled.
    pub async fn fetch(&self, code: &str) -> Result<Quote, FetchError> {
        self.on_demand.fetch(code).await
    }

    /// Fetches the selected instrument from the provider and folds the result
    /// into the session. Only a successful fetch touches the history.
    pub async fn poll(&self, session: Session) -> Session {
        self.poll_from(self.live.as_ref(), session).await
    }

    /// Like [`Poller::poll`], but may be answered from the quote cache.
    pub async fn poll_on_demand(&self, session: Session) -> Session {
        self.poll_from(self.on_demand.as_ref(), session).await
    }

    async fn poll_from(&self, source: &dyn RateSource, mut session: Session) -> Session {
        let instrument = session.selected.clone();

        session.status = match source.fetch(&instrument.code).await {
            Ok(quote) => {
                session.history =
                    append_to_history(session.history, &instrument.code, quote.clone());
                PollStatus::Live { quote }
            }
            Err(err) => {
                warn!("Fetching {} failed: {}", instrument.code, err);
                self.failure_status(&instrument, err)
            }
        };
        session.last_polled_at = Some(Local::now());
        session
    }

    fn failure_status(&self, instrument: &Instrument, err: FetchError) -> PollStatus {
        match instrument.fallback_rate {
            Some(fallback_rate) if self.fallback_enabled => {
                info!(
                    "Showing fallback rate {} for {}",
                    fallback_rate, instrument.code
                );
                PollStatus::Degraded {
                    fallback_rate,
                    reason: err.to_string(),
                }
            }
            _ => PollStatus::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// Polls on every tick of the refresh interval, starting immediately.
///
/// Ticks never overlap: a slow fetch delays the following tick instead of
/// queueing extra ones. Runs until `max_ticks` polls are done, or forever.
pub async fn run_polling_loop<P: Presenter>(
    poller: &Poller,
    presenter: &mut P,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let mut ticker = interval(poller.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u64 = 0;
    loop {
        ticker.tick().await;

        let session = presenter.checkout().await?;
        let session = poller.poll(session).await;
        presenter.present(session).await?;

        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            return Ok(());
        }
    }
}
