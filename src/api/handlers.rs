use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

use crate::services::{
    instruments::{find_instrument, Instrument},
    market_data::Quote,
    poller::Presenter,
    session::DashboardSnapshot,
};

use super::{errors::ErrorResponse, ApiPresenter, AppState};

#[typeshare]
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
    #[typeshare(serialized_as = "number")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SelectInstrumentRequest {
    pub code: String,
}

async fn dashboard_response(state: &AppState) -> DashboardResponse {
    DashboardResponse {
        snapshot: state.session.read().await.snapshot(),
        refresh_interval_secs: state.poller.refresh_interval().as_secs(),
    }
}

pub async fn instruments(State(state): State<AppState>) -> Json<Vec<Instrument>> {
    Json(state.instruments.as_ref().clone())
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(dashboard_response(&state).await)
}

/// Switches the dashboard to another instrument and polls it right away
/// instead of waiting for the next tick.
pub async fn select_instrument(
    State(state): State<AppState>,
    Json(payload): Json<SelectInstrumentRequest>,
) -> Result<Json<DashboardResponse>, ErrorResponse> {
    let instrument = find_instrument(&state.instruments, &payload.code)
        .cloned()
        .ok_or_else(|| ErrorResponse::unknown_instrument(&payload.code))?;

    state.session.write().await.select(instrument);

    let mut presenter = ApiPresenter::new(state.session.clone());
    let session = presenter.checkout().await.map_err(internal_error)?;
    let polled = state.poller.poll_on_demand(session).await;
    presenter.present(polled).await.map_err(internal_error)?;

    Ok(Json(dashboard_response(&state).await))
}

pub async fn live_quote(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Quote>, ErrorResponse> {
    let instrument = find_instrument(&state.instruments, &code)
        .ok_or_else(|| ErrorResponse::unknown_instrument(&code))?;
    let quote = state.poller.fetch(&instrument.code).await?;
    Ok(Json(quote))
}

fn internal_error(err: anyhow::Error) -> ErrorResponse {
    ErrorResponse::new(
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        &err.to_string(),
    )
}
