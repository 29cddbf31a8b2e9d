use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::domain::time::parse_datetime;
use crate::domain::{CourtId, MatchId, MatchOrderingStrategy, TournamentId};
use crate::errors::{TournamentError, TournamentResult};
use crate::reporting::AutoScheduleResponse;
use crate::scheduling::{ManualSlot, PlanningWindow};

#[derive(Deserialize)]
pub struct StrategyParams {
    pub strategy: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CalculateMatchOrderRequest {
    pub strategy: Option<String>,
    #[serde(default)]
    pub force_recalculate: bool,
}

#[derive(Deserialize)]
pub struct AutoScheduleParams {
    pub start_date: String,
    pub end_date: String,
    pub strategy: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleMatchParams {
    pub court_id: CourtId,
    pub start_time: String,
    pub end_time: Option<String>,
    pub is_time_limited: Option<bool>,
    pub time_limit_minutes: Option<u32>,
}

fn parse_strategy(raw: Option<&str>) -> TournamentResult<Option<MatchOrderingStrategy>> {
    raw.filter(|s| !s.trim().is_empty()).map(str::parse).transpose()
}

/// Empty body means no request options; anything else has to parse
fn parse_order_request(body: &[u8]) -> TournamentResult<CalculateMatchOrderRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CalculateMatchOrderRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| TournamentError::InvalidStrategy(format!("malformed request body ({})", e)))
}

pub async fn calculate_match_order(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
    Query(params): Query<StrategyParams>,
    body: Bytes,
) -> impl IntoResponse {
    let request = match parse_order_request(&body) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    // body wins over query; the configured default covers callers sending neither
    let strategy = match parse_strategy(request.strategy.as_deref().or(params.strategy.as_deref())) {
        Ok(strategy) => strategy.unwrap_or(state.service.config().scheduling.default_strategy),
        Err(e) => return error_response(e),
    };

    match state
        .service
        .calculate_match_order(tournament_id, strategy, request.force_recalculate)
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_match_order_info(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
) -> impl IntoResponse {
    match state.service.match_order_info(tournament_id) {
        Ok(info) => Json(info).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn auto_schedule(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
    Query(params): Query<AutoScheduleParams>,
) -> impl IntoResponse {
    let request = || -> TournamentResult<_> {
        let window = PlanningWindow {
            start: parse_datetime(&params.start_date)?,
            end: parse_datetime(&params.end_date)?,
        };
        let strategy = parse_strategy(params.strategy.as_deref())?;
        state.service.auto_schedule(tournament_id, strategy, window)
    };

    match request() {
        Ok(outcome) => Json(AutoScheduleResponse::from(&outcome)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn schedule_match(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<MatchId>,
    Query(params): Query<ScheduleMatchParams>,
) -> impl IntoResponse {
    let request = || -> TournamentResult<_> {
        let slot = ManualSlot {
            court_id: params.court_id,
            start: parse_datetime(&params.start_time)?,
            end: params
                .end_time
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(parse_datetime)
                .transpose()?,
            is_time_limited: params.is_time_limited,
            time_limit_minutes: params.time_limit_minutes,
        };
        state.service.schedule_match(match_id, &slot)
    };

    match request() {
        Ok(updated) => Json(updated).into_response(),
        Err(e) => error_response(e),
    }
}
