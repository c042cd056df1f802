use axum::{extract::State, http::HeaderMap, Json};
use rota_core::rotation::RotationEntry;

use crate::error::AppError;
use crate::state::AppState;

/// GET /roster: everyone in the rotation, longest-waiting first.
///
/// Requires `Authorization: Bearer <slash-command token>`. Lets `rota roster`
/// read the table while this process holds the database lock.
pub async fn get_roster(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<RotationEntry>>, AppError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let entries = app.dispatcher.roster(token).await?;
    Ok(Json(entries))
}
