//! Public certificate pages reached through share links.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{Certificate, PublicCertificate};
use crate::notify::LogOnlyNotifications;
use crate::view::open_detail;
use crate::AppState;

/// Where a visitor goes when a shared certificate does not exist.
const PUBLIC_HOME: &str = "/";

/// GET /api/share/:id - Read-only certificate view, no session required.
pub async fn get_shared_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PublicCertificate> {
    let certificate = open_detail::<Certificate, _>(&*state.store, &id, &LogOnlyNotifications)
        .map_err(|err| match err {
            AppError::NotFound { message, .. } => AppError::NotFound {
                message,
                redirect: Some(PUBLIC_HOME.to_string()),
            },
            other => other,
        })?;

    let recipient = state.auth.current().await?.map(|user| user.name);
    tracing::info!(id = certificate.id, "Shared certificate viewed");
    success(certificate.to_public(recipient, &state.config.share_base_url))
}
