use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use serde_json::Value;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::parsers::parse_snapshot;
use crate::domain::TournamentId;

pub async fn put_snapshot(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let stored = parse_snapshot(body).and_then(|snapshot| state.service.put_snapshot(tournament_id, snapshot));
    match stored {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_snapshot(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
) -> impl IntoResponse {
    match state.service.snapshot(tournament_id) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}
