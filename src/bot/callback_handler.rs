//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::debug;

use super::delivery::TelegramDelivery;
use super::event::{EventKind, InboundEvent, MessageHandle};
use super::workflow::Workflow;

/// Translate a callback query into a button press event
pub fn callback_to_event(q: &CallbackQuery) -> InboundEvent {
    InboundEvent {
        user_id: q.from.id.0 as i64,
        language_code: q.from.language_code.clone(),
        kind: EventKind::ButtonPress {
            action_tag: q.data.clone().unwrap_or_default(),
            message: q.message.as_ref().map(|m| MessageHandle(m.id().0)),
        },
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    q: CallbackQuery,
    workflow: Arc<Workflow>,
    delivery: Arc<TelegramDelivery>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    // private chats share the user's id
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    let replies = workflow.handle_event(callback_to_event(&q)).await;
    delivery.deliver(chat_id, Some(&q), replies).await;

    Ok(())
}
