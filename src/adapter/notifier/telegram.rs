//! Telegram notification delivery.
//!
//! Sends toast-style messages to a chat. Delivery runs on a background
//! worker so `notify` never blocks an orchestrator.
//!
//! Requires the `telegram` feature to be enabled.

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::port::{Event, Notifier};

/// Configuration for the Telegram notifier.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for notifications.
    pub chat_id: i64,
    /// Send per-action success/failure alerts.
    pub notify_actions: bool,
    /// Send discovery summaries.
    pub notify_discovery: bool,
}

impl TelegramConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`. Returns `None`
    /// if either is missing or invalid.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|s| s.parse().ok())?;

        Some(Self {
            bot_token,
            chat_id,
            notify_actions: true,
            notify_discovery: false,
        })
    }
}

/// Telegram notifier that sends messages to a chat.
pub struct TelegramNotifier {
    sender: mpsc::UnboundedSender<Event>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier and spawn the background worker.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(telegram_worker(config, receiver));
        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

fn format_message(event: &Event, config: &TelegramConfig) -> Option<String> {
    match event {
        Event::ActionCompleted { .. } | Event::ActionFailed { .. } if !config.notify_actions => {
            None
        }
        Event::ActionFailed { action, reason } => {
            Some(format!("{} failed: {reason}", action.label()))
        }
        Event::DiscoveryCompleted {
            discovered,
            skipped,
        } if config.notify_discovery => {
            Some(format!("Pools discovered: {discovered} ({skipped} skipped)"))
        }
        other => other.toast(),
    }
}

/// Background worker that sends Telegram messages.
async fn telegram_worker(config: TelegramConfig, mut receiver: mpsc::UnboundedReceiver<Event>) {
    let bot = Bot::new(&config.bot_token);
    let chat_id = ChatId(config.chat_id);

    info!(chat_id = config.chat_id, "Telegram notifier started");

    while let Some(event) = receiver.recv().await {
        if let Some(text) = format_message(&event, &config) {
            if let Err(e) = bot.send_message(chat_id, &text).await {
                error!(error = %e, "Failed to send Telegram message");
            }
        }
    }

    warn!("Telegram notifier worker shutting down");
}
