//! Delivery channel: sends workflow replies through the Telegram Bot API.
//!
//! Sends are retried on transient failures with exponential back-off and
//! jitter. A send that still fails is logged and skipped; it never fails the
//! update that produced it.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQuery, FileId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId,
};
use teloxide::RequestError;
use tracing::{debug, error, warn};

use crate::config::DeliveryConfig;

use super::event::{Keyboard, MessageHandle, Reply};

/// Outgoing side of the bot
pub struct TelegramDelivery {
    bot: Bot,
    config: DeliveryConfig,
}

impl TelegramDelivery {
    pub fn new(bot: Bot, config: DeliveryConfig) -> Self {
        Self { bot, config }
    }

    /// Send every reply in order. `query` is the button press being answered, if any.
    pub async fn deliver(&self, chat_id: ChatId, query: Option<&CallbackQuery>, replies: Vec<Reply>) {
        for reply in replies {
            match reply {
                Reply::Text { text, keyboard } => {
                    self.send_text(chat_id, &text, keyboard.as_ref()).await;
                }
                Reply::Photo {
                    photo_ref,
                    caption,
                    keyboard,
                } => {
                    self.send_photo(chat_id, &photo_ref, &caption, keyboard.as_ref())
                        .await;
                }
                Reply::DeleteMessage(handle) => self.delete_message(chat_id, handle).await,
                Reply::AnswerCallback { text } => match query {
                    Some(query) => self.answer_callback(query, text).await,
                    None => warn!(chat_id = %chat_id, "Callback answer without a callback query"),
                },
            }
        }
    }

    pub async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Option<MessageHandle> {
        let markup = keyboard.map(create_inline_keyboard);
        let bot = &self.bot;
        let markup = markup.as_ref();

        let sent = self
            .with_retry("send_message", move || async move {
                let mut request = bot.send_message(chat_id, text);
                if let Some(markup) = markup {
                    request = request.reply_markup(markup.clone());
                }
                request.await
            })
            .await;

        match sent {
            Ok(message) => Some(MessageHandle(message.id.0)),
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send message");
                None
            }
        }
    }

    pub async fn send_photo(
        &self,
        chat_id: ChatId,
        photo_ref: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Option<MessageHandle> {
        let markup = keyboard.map(create_inline_keyboard);
        let bot = &self.bot;
        let markup = markup.as_ref();

        let sent = self
            .with_retry("send_photo", move || async move {
                let photo = InputFile::file_id(FileId(photo_ref.to_string()));
                let mut request = bot.send_photo(chat_id, photo).caption(caption);
                if let Some(markup) = markup {
                    request = request.reply_markup(markup.clone());
                }
                request.await
            })
            .await;

        match sent {
            Ok(message) => Some(MessageHandle(message.id.0)),
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to send photo");
                None
            }
        }
    }

    /// Best effort, failures are only logged
    pub async fn delete_message(&self, chat_id: ChatId, handle: MessageHandle) {
        if let Err(e) = self.bot.delete_message(chat_id, MessageId(handle.0)).await {
            debug!(chat_id = %chat_id, message_id = handle.0, error = %e, "Failed to delete message");
        }
    }

    pub async fn answer_callback(&self, query: &CallbackQuery, text: Option<String>) {
        let mut request = self.bot.answer_callback_query(query.id.clone());
        if let Some(text) = text {
            request = request.text(text);
        }
        if let Err(e) = request.await {
            error!(user_id = %query.from.id, error = %e, "Failed to answer callback query");
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut send: F) -> Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && attempt < self.config.max_retries => {
                    let backoff = with_jitter(retry_delay(&self.config, attempt));
                    let delay = honor_retry_after(&e, backoff);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Telegram request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Network hiccups and rate limiting are worth another try; API errors are not
fn is_retryable(error: &RequestError) -> bool {
    matches!(
        error,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}

/// Flood control names its own wait; never retry earlier than that
fn honor_retry_after(error: &RequestError, backoff: Duration) -> Duration {
    match error {
        RequestError::RetryAfter(wait) => backoff.max(wait.duration()),
        _ => backoff,
    }
}

/// Exponential back-off delay before retry number `attempt` (0-based), capped
pub fn retry_delay(config: &DeliveryConfig, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    let delay_ms = config
        .base_retry_delay_ms
        .saturating_mul(factor)
        .min(config.max_retry_delay_ms);
    Duration::from_millis(delay_ms)
}

/// Add up to a quarter of `delay` of random jitter
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = (delay.as_millis() / 4) as u64;
    if max_jitter_ms == 0 {
        return delay;
    }
    let jitter_ms = rand::thread_rng().gen_range(0..=max_jitter_ms);
    delay + Duration::from_millis(jitter_ms)
}

/// Create the inline keyboard markup for a workflow keyboard
pub fn create_inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    }))
}
