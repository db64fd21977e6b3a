use reqwest::Client;
use serde_json::json;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fire-and-forget Telegram delivery of cycle summaries. Disabled unless
/// both TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID are set; delivery failure
/// is logged and never affects the analysis that produced the message.
pub struct TelegramNotifier {
    client: Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn from_env() -> Self {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").ok();
        let chat_id = env::var("TELEGRAM_CHAT_ID").ok();
        let enabled = bot_token.is_some() && chat_id.is_some();

        if enabled {
            info!("Telegram notifier initialized");
        } else {
            warn!("Telegram notifier disabled - missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID");
        }

        Self {
            client: Client::new(),
            bot_token,
            chat_id,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Send a plain-text message. Errors are reported via the log only.
    pub async fn send(&self, message: &str) {
        if !self.enabled {
            return;
        }
        let (Some(bot_token), Some(chat_id)) = (self.bot_token.as_ref(), self.chat_id.as_ref())
        else {
            return;
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", bot_token);
        let payload = json!({
            "chat_id": chat_id,
            "text": message,
            "disable_web_page_preview": true,
        });

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Telegram notification sent");
            }
            Ok(response) => {
                let body = response.text().await.unwrap_or_else(|_| "unknown".to_string());
                error!("Telegram rejected notification: {}", body);
            }
            Err(e) => {
                error!("Failed to send Telegram notification: {}", e);
            }
        }
    }
}

/// Detach delivery from the refresh cycle entirely.
pub fn send_detached(notifier: Arc<TelegramNotifier>, message: String) {
    if !notifier.is_enabled() {
        return;
    }
    tokio::spawn(async move {
        notifier.send(&message).await;
    });
}

/// Summary line in the original dashboard's wording.
pub fn summary_message(symbol: &str, recommendation: &str, timestamp: &str) -> String {
    format!(
        "{} Decay Bias: Strategy - {} @ {}",
        symbol, recommendation, timestamp
    )
}
