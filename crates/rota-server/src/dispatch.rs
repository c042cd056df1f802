//! Authenticates slash commands and routes them to the verb handlers.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use rota_core::command::{parse_delivered_at, Command, Verb, USAGE};
use rota_core::error::RotaError;
use rota_core::rotation::{RotationEntry, RotationStore};
use rota_core::secret::SecretSource;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::error::AppError;
use crate::trigger::SelectionTrigger;

// ---------------------------------------------------------------------------
// Request / reply
// ---------------------------------------------------------------------------

/// Form fields posted by the chat platform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InChannel {
    pub response_type: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 200 with an `in_channel` message visible to the whole channel.
    InChannel(String),
    /// 200 with an empty body.
    Accepted,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::InChannel(text) => Json(InChannel {
                response_type: "in_channel",
                text,
            })
            .into_response(),
            Reply::Accepted => StatusCode::OK.into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// RotationDispatcher
// ---------------------------------------------------------------------------

pub struct RotationDispatcher {
    store: Arc<dyn RotationStore>,
    trigger: Arc<dyn SelectionTrigger>,
    secret_source: Arc<dyn SecretSource>,
    /// Unwrapped at most once per process; failures are not cached.
    secret: OnceCell<String>,
}

impl RotationDispatcher {
    pub fn new(
        store: Arc<dyn RotationStore>,
        trigger: Arc<dyn SelectionTrigger>,
        secret_source: Arc<dyn SecretSource>,
    ) -> Self {
        Self {
            store,
            trigger,
            secret_source,
            secret: OnceCell::new(),
        }
    }

    async fn secret(&self) -> Result<&str, AppError> {
        let secret = self
            .secret
            .get_or_try_init(|| async {
                let source = self.secret_source.clone();
                let secret = tokio::task::spawn_blocking(move || source.unwrap_secret())
                    .await
                    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
                tracing::info!("slash-command token unwrapped");
                Ok::<_, AppError>(secret)
            })
            .await?;
        Ok(secret.as_str())
    }

    /// Compare `token` against the unwrapped secret.
    async fn authenticate(&self, token: Option<&str>) -> Result<(), AppError> {
        let secret = self.secret().await.inspect_err(|e| {
            tracing::error!("token unavailable: {:#}", e.0);
        })?;
        if token != Some(secret) {
            return Err(RotaError::InvalidToken.into());
        }
        Ok(())
    }

    pub async fn dispatch(&self, req: SlashRequest) -> Result<Reply, AppError> {
        self.authenticate(req.token.as_deref())
            .await
            .inspect_err(|_| {
                tracing::warn!(user = ?req.user_name, "request token rejected");
            })?;

        let cmd = Command::parse(req.text.as_deref().unwrap_or(""));
        tracing::info!(
            command = ?req.command,
            channel = ?req.channel_name,
            user = ?req.user_name,
            verb = %cmd.verb,
            args = cmd.args.len(),
            "dispatching slash command"
        );

        match (&cmd.verb, cmd.args.len()) {
            (Verb::Log, 0..=2) => {
                let user = match cmd.arg(0) {
                    Some(user) => user.to_string(),
                    None => format!("@{}", req.user_name.as_deref().unwrap_or_default()),
                };
                self.log(user, cmd.arg(1)).await
            }
            (Verb::Remove, 1) => self.remove(cmd.args[0].clone()).await,
            (Verb::Next, 0) => self.next().await,
            _ => Err(AppError::usage()),
        }
    }

    /// Read-only view of the rotation table for operators.
    pub async fn roster(&self, token: Option<&str>) -> Result<Vec<RotationEntry>, AppError> {
        self.authenticate(token).await?;
        let store = self.store.clone();
        let entries = tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
        Ok(entries)
    }

    async fn log(&self, user: String, date: Option<&str>) -> Result<Reply, AppError> {
        let last_delivered = match date {
            Some(d) => parse_delivered_at(d)
                .map_err(|e| AppError::bad_request(format!("{e}\n{USAGE}")))?,
            None => Utc::now().timestamp_millis(),
        };

        let store = self.store.clone();
        let entry = RotationEntry::new(user, last_delivered);
        let result = {
            let entry = entry.clone();
            tokio::task::spawn_blocking(move || store.put(&entry))
                .await
                .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        };

        match result {
            Ok(()) => {
                tracing::info!(user = %entry.user, last_delivered, "recorded knowledge sharing");
                Ok(Reply::InChannel(format!(
                    "Thanks for sharing your knowledge, <{}>!",
                    entry.user
                )))
            }
            Err(e) => {
                tracing::error!(user = %entry.user, "store put failed: {e}");
                Err(AppError::bad_request(format!(
                    "Unable to record knowledge sharing. Error JSON:\n{}",
                    e.diagnostic()
                )))
            }
        }
    }

    async fn remove(&self, user: String) -> Result<Reply, AppError> {
        let store = self.store.clone();
        let result = {
            let user = user.clone();
            tokio::task::spawn_blocking(move || store.remove(&user))
                .await
                .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?
        };

        match result {
            Ok(()) => {
                tracing::info!(%user, "removed user from rotation");
                Ok(Reply::InChannel(format!(
                    "Cleared knowledge sharing records for user: {user}"
                )))
            }
            Err(e) => {
                tracing::error!(%user, "store remove failed: {e}");
                Err(AppError::bad_request(format!(
                    "Unable to delete item. Error JSON:\n{}",
                    e.diagnostic()
                )))
            }
        }
    }

    async fn next(&self) -> Result<Reply, AppError> {
        let name = self.trigger.name();
        tracing::info!(%name, "triggering selection service");
        match self.trigger.trigger().await {
            Ok(()) => Ok(Reply::Accepted),
            Err(e) => {
                tracing::error!(%name, "selection trigger failed: {e}");
                Err(AppError::bad_request(format!(
                    "Unable to call {name} function; Error JSON:\n{}",
                    e.diagnostic()
                )))
            }
        }
    }
}
