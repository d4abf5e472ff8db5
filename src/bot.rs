use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::platform::telegram::{Messenger, TelegramMessenger};
use crate::platform::{IncomingMessage, OutboundNotification, WebhookUpdate};

const WELCOME_TEXT: &str = "*Welcome to Your Amazing Bot!* \nGet ready to explore our bot!";
const START_BUTTON_TEXT: &str = "Start Now!";

/// Commands the webhook reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
}

impl Command {
    /// Exact match only: `/start@bot` or `/start now` are not commands.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "/start" => Some(Command::Start),
            _ => None,
        }
    }
}

/// What the handler did with one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Processed,
    Ignored,
    Failed,
}

impl Outcome {
    pub fn status(self) -> StatusCode {
        match self {
            Outcome::Processed | Outcome::Ignored => StatusCode::OK,
            Outcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Outcome::Processed => "Command processed",
            Outcome::Ignored => "No command processed",
            Outcome::Failed => "Error processing command",
        }
    }
}

/// Shared webhook state
pub struct AppState {
    messenger: Arc<dyn Messenger>,
    web_app_url: Url,
}

impl AppState {
    pub fn new(messenger: Arc<dyn Messenger>, web_app_url: Url) -> Self {
        Self {
            messenger,
            web_app_url,
        }
    }

    /// Builds the Telegram-backed state from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let telegram = config.telegram()?;
        let web_app_url = Url::parse(&telegram.web_app_url)
            .with_context(|| format!("Invalid web_app_url: {}", telegram.web_app_url))?;
        let messenger = TelegramMessenger::new(telegram, &telegram.effective_bot_token())?;
        Ok(Self::new(Arc::new(messenger), web_app_url))
    }
}

/// Web app link opened by the start button, with `startapp=fullscreen`
/// appended to whatever query the configured URL already has.
pub fn start_app_url(base: &Url) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("startapp", "fullscreen");
    url
}

pub fn welcome_notification(chat_id: i64, web_app_url: &Url) -> OutboundNotification {
    let button = InlineKeyboardButton::web_app(
        START_BUTTON_TEXT,
        WebAppInfo {
            url: start_app_url(web_app_url),
        },
    );
    OutboundNotification {
        chat_id,
        text: WELCOME_TEXT.to_string(),
        parse_mode: Some("Markdown".to_string()),
        markup: Some(InlineKeyboardMarkup::new(vec![vec![button]])),
    }
}

/// Single dispatch over the known commands. At most one outbound call.
pub async fn handle_message(state: &AppState, message: Option<IncomingMessage>) -> Outcome {
    let Some(message) = message else {
        return Outcome::Ignored;
    };

    match Command::parse(&message.text) {
        Some(Command::Start) => {
            let Some(chat_id) = message.chat_id else {
                error!("/start without a chat id; nothing to reply to");
                return Outcome::Failed;
            };
            info!("/start from chat {}", chat_id);
            let notification = welcome_notification(chat_id, &state.web_app_url);
            match state.messenger.send(&notification).await {
                Ok(()) => Outcome::Processed,
                Err(e) => {
                    error!("Failed to deliver welcome message: {:#}", e);
                    Outcome::Failed
                }
            }
        }
        None => {
            debug!("No command in message from chat {:?}", message.chat_id);
            Outcome::Ignored
        }
    }
}

async fn webhook(State(state): State<Arc<AppState>>, body: Bytes) -> (StatusCode, &'static str) {
    let update: WebhookUpdate = if body.is_empty() {
        WebhookUpdate::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(update) => update,
            Err(e) => {
                warn!("Rejected webhook body: {}", e);
                return (StatusCode::BAD_REQUEST, "Invalid update payload");
            }
        }
    };

    let outcome = handle_message(&state, update.into_incoming()).await;
    (outcome.status(), outcome.body())
}

async fn health() -> &'static str {
    "OK"
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/bot", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the webhook until the process is stopped
pub async fn run(state: Arc<AppState>, listen: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("Failed to bind to {listen}"))?;

    info!("Webhook listening on {}", listen);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use tokio::sync::Mutex;
    use tower::util::ServiceExt;

    /// Records every notification; fails each send when `fail` is set.
    #[derive(Default)]
    struct RecordingMessenger {
        sent: Mutex<Vec<OutboundNotification>>,
        fail: bool,
    }

    #[async_trait]
    impl Messenger for RecordingMessenger {
        async fn send(&self, notification: &OutboundNotification) -> Result<()> {
            self.sent.lock().await.push(notification.clone());
            if self.fail {
                anyhow::bail!("provider down");
            }
            Ok(())
        }
    }

    fn app(fail: bool) -> (Router, Arc<RecordingMessenger>) {
        let messenger = Arc::new(RecordingMessenger {
            sent: Mutex::new(Vec::new()),
            fail,
        });
        let state = AppState::new(
            messenger.clone(),
            Url::parse("https://your-web-app-url.app/").unwrap(),
        );
        (router(Arc::new(state)), messenger)
    }

    async fn post_update(router: Router, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/bot")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_start_sends_welcome_once() {
        let (router, messenger) = app(false);
        let (status, body) =
            post_update(router, r#"{"message":{"text":"/start","chat":{"id":7}}}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Command processed");

        let sent = messenger.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, 7);
        assert_eq!(sent[0].text, WELCOME_TEXT);
        assert_eq!(sent[0].parse_mode.as_deref(), Some("Markdown"));

        let markup = serde_json::to_value(sent[0].markup.as_ref().unwrap()).unwrap();
        let rows = markup["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].as_array().unwrap().len(), 1);
        assert_eq!(rows[0][0]["text"], START_BUTTON_TEXT);
    }

    #[tokio::test]
    async fn test_other_text_sends_nothing() {
        for body in [
            r#"{"message":{"text":"hello","chat":{"id":7}}}"#,
            r#"{"message":{"text":"/start now","chat":{"id":7}}}"#,
            r#"{"message":{"chat":{"id":7}}}"#,
            r#"{"message":{"text":"hello","chat":{}}}"#,
            r#"{"message":{"text":5,"chat":{"id":7}}}"#,
            r#"{"message":"hello"}"#,
            r#"{"update_id":3}"#,
            "",
        ] {
            let (router, messenger) = app(false);
            let (status, text) = post_update(router, body).await;
            assert_eq!(status, StatusCode::OK, "body: {body}");
            assert_eq!(text, "No command processed");
            assert!(messenger.sent.lock().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_start_without_chat_is_500_without_send() {
        for body in [
            r#"{"message":{"text":"/start"}}"#,
            r#"{"message":{"text":"/start","chat":{}}}"#,
        ] {
            let (router, messenger) = app(false);
            let (status, text) = post_update(router, body).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body: {body}");
            assert_eq!(text, "Error processing command");
            assert!(messenger.sent.lock().await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_send_failure_is_500_without_retry() {
        let (router, messenger) = app(true);
        let (status, body) =
            post_update(router, r#"{"message":{"text":"/start","chat":{"id":7}}}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error processing command");
        assert_eq!(messenger.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let (router, messenger) = app(false);
        let (status, _) = post_update(router, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(messenger.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(false);
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_start_app_url() {
        let base = Url::parse("https://your-web-app-url.app/").unwrap();
        assert_eq!(
            start_app_url(&base).as_str(),
            "https://your-web-app-url.app/?startapp=fullscreen"
        );

        let with_query = Url::parse("https://app.example/path?lang=en").unwrap();
        assert_eq!(
            start_app_url(&with_query).as_str(),
            "https://app.example/path?lang=en&startapp=fullscreen"
        );
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/START"), None);
        assert_eq!(Command::parse(" /start"), None);
    }
}
