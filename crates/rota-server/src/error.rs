use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rota_core::command::USAGE;
use rota_core::error::RotaError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 400 replies
// ---------------------------------------------------------------------------

/// Private sentinel carrying a user-facing 400 message through the
/// `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequest(String);

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequest {}

// ---------------------------------------------------------------------------
// AppError: unified error type for slash-command replies
// ---------------------------------------------------------------------------

/// Every failure a slash command can see. The body is always plain text so
/// the chat client shows it verbatim to the requester.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 reply with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequest(msg.into()).into())
    }

    /// The fixed usage text.
    pub fn usage() -> Self {
        Self::bad_request(USAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(b) = self.0.downcast_ref::<BadRequest>() {
            return (StatusCode::BAD_REQUEST, b.0.clone()).into_response();
        }
        if let Some(e) = self.0.downcast_ref::<RotaError>() {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
        tracing::error!("internal error: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", self.0)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
