use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::domain::{GroupId, TournamentId};
use crate::reporting::StandingsResponse;

#[derive(Deserialize)]
pub struct RecalculateParams {
    pub group_id: Option<GroupId>,
}

pub async fn get_group_standings(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.service.group_standings(group_id) {
        Ok(standings) => Json(StandingsResponse::from(standings)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn recalculate_stats(
    State(state): State<Arc<AppState>>,
    Path(tournament_id): Path<TournamentId>,
    Query(params): Query<RecalculateParams>,
) -> impl IntoResponse {
    match state.service.recalculate(tournament_id, params.group_id) {
        Ok(result) => {
            let groups: Vec<StandingsResponse> = result.groups.into_iter().map(StandingsResponse::from).collect();
            Json(groups).into_response()
        }
        Err(e) => error_response(e),
    }
}
