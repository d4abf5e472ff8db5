use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TelegramConfig;
use crate::platform::OutboundNotification;

/// Delivers notifications to a messaging provider
#[async_trait]
pub trait Messenger: Send + Sync {
    /// One delivery attempt. Errors are final; callers do not retry.
    async fn send(&self, notification: &OutboundNotification) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    /// Bot API accepts the keyboard as a JSON-encoded string field.
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API `sendMessage` over plain HTTPS
pub struct TelegramMessenger {
    client: reqwest::Client,
    endpoint: String,
}

impl TelegramMessenger {
    /// `bot_token` is passed in resolved, so env overrides stay with the caller.
    pub fn new(config: &TelegramConfig, bot_token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build Telegram HTTP client")?;
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_url.trim_end_matches('/'),
            bot_token
        );
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, notification: &OutboundNotification) -> Result<()> {
        let reply_markup = notification
            .markup
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to serialize reply markup")?;

        let request = SendMessageRequest {
            chat_id: notification.chat_id,
            text: &notification.text,
            parse_mode: notification.parse_mode.as_deref(),
            reply_markup,
        };

        debug!("Sending message to chat {}", notification.chat_id);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Telegram")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Telegram API error ({}): {}", status, error_body);
        }

        let body: ApiResponse = response
            .json()
            .await
            .context("Failed to parse Telegram response")?;
        if !body.ok {
            anyhow::bail!(
                "Telegram rejected message: {}",
                body.description.unwrap_or_default()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockTelegram {
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    async fn mock_send_message(
        State(state): State<Arc<MockTelegram>>,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, Json<serde_json::Value>) {
        let reject = body["chat_id"] == 0;
        state.bodies.lock().await.push(body);
        if reject {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"ok": false, "description": "chat not found"})),
            )
        } else {
            (
                StatusCode::OK,
                Json(serde_json::json!({"ok": true, "result": {}})),
            )
        }
    }

    async fn start_mock_telegram() -> (SocketAddr, Arc<MockTelegram>) {
        let state = Arc::new(MockTelegram::default());
        let app = Router::new()
            .route("/botTEST/sendMessage", post(mock_send_message))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, state)
    }

    fn test_config(addr: SocketAddr) -> TelegramConfig {
        TelegramConfig {
            bot_token: "TEST".to_string(),
            web_app_url: "https://example.app/".to_string(),
            api_url: format!("http://{}", addr),
            request_timeout_secs: 5,
        }
    }

    fn notification(chat_id: i64) -> OutboundNotification {
        let button = InlineKeyboardButton::web_app(
            "Open",
            WebAppInfo {
                url: reqwest::Url::parse("https://example.app/?startapp=fullscreen").unwrap(),
            },
        );
        OutboundNotification {
            chat_id,
            text: "*hi*".to_string(),
            parse_mode: Some("Markdown".to_string()),
            markup: Some(InlineKeyboardMarkup::new(vec![vec![button]])),
        }
    }

    #[tokio::test]
    async fn test_send_message_wire_format() {
        let (addr, state) = start_mock_telegram().await;
        let messenger = TelegramMessenger::new(&test_config(addr), "TEST").unwrap();

        messenger.send(&notification(42)).await.unwrap();

        let bodies = state.bodies.lock().await;
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["chat_id"], 42);
        assert_eq!(body["text"], "*hi*");
        assert_eq!(body["parse_mode"], "Markdown");

        let markup: serde_json::Value =
            serde_json::from_str(body["reply_markup"].as_str().unwrap()).unwrap();
        let rows = markup["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0]["text"], "Open");
        assert_eq!(
            rows[0][0]["web_app"]["url"],
            "https://example.app/?startapp=fullscreen"
        );
    }

    #[tokio::test]
    async fn test_send_message_rejected() {
        let (addr, state) = start_mock_telegram().await;
        let messenger = TelegramMessenger::new(&test_config(addr), "TEST").unwrap();

        let err = messenger.send(&notification(0)).await.unwrap_err();
        assert!(err.to_string().contains("Telegram API error"));
        assert_eq!(state.bodies.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_send_message_unreachable() {
        let config = TelegramConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            ..test_config("127.0.0.1:1".parse().unwrap())
        };
        let messenger = TelegramMessenger::new(&config, "TEST").unwrap();
        assert!(messenger.send(&notification(1)).await.is_err());
    }
}
