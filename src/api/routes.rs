use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    scheduling::{auto_schedule, calculate_match_order, get_match_order_info, schedule_match},
    snapshots::{get_snapshot, put_snapshot},
    standings::{get_group_standings, recalculate_stats},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/staging/group/:id/standings", get(get_group_standings))
        .route("/staging/tournament/:id/stats/recalculate", post(recalculate_stats))
        .route("/staging/tournament/:id/calculate-match-order", post(calculate_match_order))
        .route("/staging/tournament/:id/match-order-info", get(get_match_order_info))
        .route("/staging/tournament/:id/auto-schedule", post(auto_schedule))
        .route("/staging/tournament/:id/snapshot", get(get_snapshot).put(put_snapshot))
        .route("/staging/match/:id/schedule", post(schedule_match))
        .with_state(state)
}
