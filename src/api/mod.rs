pub mod errors;
pub mod handlers;
pub mod routes;

use std::{mem, net::SocketAddr, sync::Arc};

use anyhow::anyhow;
use async_trait::async_trait;
use routes::create_router;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{error, info};

use crate::services::{
    config::PollerConfig,
    history::{append_to_history, History},
    instruments::Instrument,
    poller::{run_polling_loop, Poller, Presenter},
    session::{PollStatus, Session},
};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub poller: Arc<Poller>,
    pub instruments: Arc<Vec<Instrument>>,
}

impl AppState {
    pub fn new(config: &PollerConfig, poller: Poller) -> anyhow::Result<AppState> {
        let first = config
            .instruments
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("No instruments configured"))?;
        Ok(AppState {
            session: Arc::new(RwLock::new(Session::new(first, config.history_cap))),
            poller: Arc::new(poller),
            instruments: Arc::new(config.instruments.clone()),
        })
    }
}

/// Shares the session with the request handlers, which may switch the
/// selected instrument while a poll is in flight.
pub struct ApiPresenter {
    session: Arc<RwLock<Session>>,
}

impl ApiPresenter {
    pub fn new(session: Arc<RwLock<Session>>) -> ApiPresenter {
        ApiPresenter { session }
    }
}

#[async_trait]
impl Presenter for ApiPresenter {
    async fn checkout(&mut self) -> anyhow::Result<Session> {
        Ok(self.session.read().await.clone())
    }

    /// Applies only what the poll produced; anything the handlers stored
    /// while the poll was in flight stays.
    async fn present(&mut self, polled: Session) -> anyhow::Result<()> {
        let mut current = self.session.write().await;
        let polled_code = polled.selected.code;

        if let PollStatus::Live { quote } = &polled.status {
            let cap = polled.history.cap();
            let history = mem::replace(&mut current.history, History::new(cap));
            current.history = append_to_history(history, &polled_code, quote.clone());
        }
        // a switch made during the poll wins over the polled selection
        if current.selected.code == polled_code {
            current.status = polled.status;
            current.last_polled_at = polled.last_polled_at;
        }
        Ok(())
    }
}

pub async fn api(config: PollerConfig, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(&config, Poller::from_config(&config)?)?;

    let poller = state.poller.clone();
    let mut presenter = ApiPresenter::new(state.session.clone());
    tokio::spawn(async move {
        if let Err(err) = run_polling_loop(&poller, &mut presenter, None).await {
            error!("Polling loop stopped: {}", err);
        }
    });

    let router = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(&addr).await?;
    info!("Serving dashboard API on {}", addr);
    Ok(axum::serve(listener, router.into_make_service()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_data::{
        errors::FetchError,
        testing::{quote, ScriptedSource},
        Quote,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state(responses: Vec<Result<Quote, FetchError>>) -> AppState {
        let config = PollerConfig::default();
        let poller = Poller::new(Arc::new(ScriptedSource::new(responses)), &config);
        AppState::new(&config, poller).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn select(code: &str) -> Request<Body> {
        Request::post("/api/instrument")
            .header("content-type", "application/json")
            .body(Body::from(format!(r#"{{"code":"{}"}}"#, code)))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_instruments() {
        let router = create_router(test_state(vec![]));
        let (status, body) = send(
            router,
            Request::get("/api/instruments").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[0]["code"], "EURUSD");
    }

    #[tokio::test]
    async fn dashboard_starts_pending() {
        let router = create_router(test_state(vec![]));
        let (status, body) = send(
            router,
            Request::get("/api/dashboard").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["state"], "pending");
        assert_eq!(body["instrument"]["code"], "EURUSD");
        assert_eq!(body["refresh_interval_secs"], 30);
    }

    #[tokio::test]
    async fn selecting_instrument_polls_it() {
        let state = test_state(vec![Ok(quote(150.25, 1_700_000_000))]);
        let router = create_router(state.clone());

        let (status, body) = send(router, select("USDJPY")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["instrument"]["code"], "USDJPY");
        assert_eq!(body["status"]["state"], "live");
        assert_eq!(body["history"].as_array().unwrap().len(), 1);
        assert_eq!(state.session.read().await.selected.code, "USDJPY");
    }

    #[tokio::test]
    async fn selecting_unknown_instrument_is_not_found() {
        let router = create_router(test_state(vec![]));
        let (status, body) = send(router, select("BTCUSD")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "unknown_instrument");
    }

    #[tokio::test]
    async fn quote_errors_map_to_status_codes() {
        let state = test_state(vec![
            Err(FetchError::Transport("HTTP status 500".to_string())),
            Err(FetchError::NotFound("EURUSD".to_string())),
        ]);

        let (status, body) = send(
            create_router(state.clone()),
            Request::get("/api/quote/EURUSD").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "transport_error");

        let (status, _) = send(
            create_router(state),
            Request::get("/api/quote/EURUSD").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn presenter_keeps_switch_made_during_poll() {
        let state = test_state(vec![Ok(quote(1.0842, 1_700_000_000))]);
        let mut presenter = ApiPresenter::new(state.session.clone());

        let checked_out = presenter.checkout().await.unwrap();
        state
            .session
            .write()
            .await
            .select(state.instruments[3].clone());
        let polled = state.poller.poll(checked_out).await;
        presenter.present(polled).await.unwrap();

        let session = state.session.read().await;
        assert_eq!(session.selected.code, "XAUUSD");
        assert_eq!(session.status, PollStatus::Pending);
        assert_eq!(session.history.for_instrument("EURUSD").len(), 1);
    }

    #[tokio::test]
    async fn background_poll_keeps_quote_stored_by_switch() {
        let state = test_state(vec![
            Ok(quote(150.25, 1_700_000_000)),
            Ok(quote(1.0842, 1_700_000_000)),
        ]);
        let mut presenter = ApiPresenter::new(state.session.clone());

        let checked_out = presenter.checkout().await.unwrap();
        let (status, _) = send(create_router(state.clone()), select("USDJPY")).await;
        assert_eq!(status, StatusCode::OK);

        let polled = state.poller.poll(checked_out).await;
        presenter.present(polled).await.unwrap();

        let session = state.session.read().await;
        assert_eq!(session.selected.code, "USDJPY");
        assert_eq!(
            session.status,
            PollStatus::Live {
                quote: quote(150.25, 1_700_000_000)
            }
        );
        assert_eq!(
            session.history.for_instrument("USDJPY"),
            vec![quote(150.25, 1_700_000_000)]
        );
        assert_eq!(
            session.history.for_instrument("EURUSD"),
            vec![quote(1.0842, 1_700_000_000)]
        );
    }

    #[tokio::test]
    async fn failed_background_poll_leaves_history_alone() {
        let state = test_state(vec![Err(FetchError::Transport(
            "HTTP status 500".to_string(),
        ))]);
        state.session.write().await.history = append_to_history(
            History::new(10),
            "EURUSD",
            quote(1.08, 1_700_000_000),
        );
        let mut presenter = ApiPresenter::new(state.session.clone());

        let checked_out = presenter.checkout().await.unwrap();
        let polled = state.poller.poll(checked_out).await;
        presenter.present(polled).await.unwrap();

        let session = state.session.read().await;
        assert!(matches!(session.status, PollStatus::Failed { .. }));
        assert_eq!(session.history.len(), 1);
    }
}
