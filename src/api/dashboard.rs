//! Dashboard overview endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::models::Record;
use crate::AppState;

const RECENT_LIMIT: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub certificate_count: usize,
    pub award_count: usize,
    pub expiring_soon_count: usize,
    pub recent: Vec<Record>,
}

/// GET /api/dashboard - Counts and the most recent records.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let now = state.clock.now();
    let window = state.config.expiry_window();
    let store = &state.store;

    success(DashboardSummary {
        certificate_count: store.certificates().len(),
        award_count: store.awards().len(),
        expiring_soon_count: store
            .certificates()
            .iter()
            .filter(|c| c.is_expiring_soon(now, window))
            .count(),
        recent: store.recent(RECENT_LIMIT),
    })
}
