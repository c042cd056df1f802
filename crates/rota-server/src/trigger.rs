//! Fire-and-acknowledge call into the selection service.
//!
//! The selection service reads the rotation table, decides who is next and
//! announces it on its own channel. We only learn whether it accepted the
//! trigger.

use async_trait::async_trait;
use rota_core::error::{Result, RotaError};

#[async_trait]
pub trait SelectionTrigger: Send + Sync {
    /// Human-readable name used in replies and logs.
    fn name(&self) -> &str;

    /// Ask the selection service to run. `Ok` means the request was accepted,
    /// not that anyone has been notified yet.
    async fn trigger(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpSelectionTrigger
// ---------------------------------------------------------------------------

pub struct HttpSelectionTrigger {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpSelectionTrigger {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SelectionTrigger for HttpSelectionTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    async fn trigger(&self) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "Records": [] }))
            .send()
            .await
            .map_err(|e| RotaError::TriggerFailed(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!(name = %self.name, %status, "selection trigger accepted");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(RotaError::TriggerRejected {
            status: status.as_u16(),
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// DisabledSelectionTrigger
// ---------------------------------------------------------------------------

/// Stand-in used when no selection URL is configured.
pub struct DisabledSelectionTrigger {
    name: String,
}

impl DisabledSelectionTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SelectionTrigger for DisabledSelectionTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    async fn trigger(&self) -> Result<()> {
        Err(RotaError::TriggerFailed(
            "no selection service configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_trigger_always_fails() {
        let t = DisabledSelectionTrigger::new("KnowledgeSharingNextUp");
        assert_eq!(t.name(), "KnowledgeSharingNextUp");
        let err = t.trigger().await.unwrap_err();
        assert!(matches!(err, RotaError::TriggerFailed(_)));
    }

    #[tokio::test]
    async fn http_trigger_posts_and_accepts_2xx() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = axum::Router::new().route(
            "/next",
            axum::routing::post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
                assert_eq!(body, serde_json::json!({ "Records": [] }));
                axum::http::StatusCode::ACCEPTED
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let t = HttpSelectionTrigger::new("next-up", format!("http://127.0.0.1:{port}/next"));
        t.trigger().await.unwrap();
    }

    #[tokio::test]
    async fn http_trigger_reports_rejection_status() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let app = axum::Router::new().route(
            "/next",
            axum::routing::post(|| async {
                (axum::http::StatusCode::FORBIDDEN, "denied")
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let t = HttpSelectionTrigger::new("next-up", format!("http://127.0.0.1:{port}/next"));
        match t.trigger().await.unwrap_err() {
            RotaError::TriggerRejected { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("expected TriggerRejected, got {other:?}"),
        }
    }
}
