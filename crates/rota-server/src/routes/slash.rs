use axum::{extract::State, Form};

use crate::dispatch::{Reply, SlashRequest};
use crate::error::AppError;
use crate::state::AppState;

/// POST /: handle one slash-command invocation.
pub async fn handle_command(
    State(app): State<AppState>,
    Form(req): Form<SlashRequest>,
) -> Result<Reply, AppError> {
    app.dispatcher.dispatch(req).await
}
