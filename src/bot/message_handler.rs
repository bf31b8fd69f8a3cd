//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::delivery::TelegramDelivery;
use super::event::{EventKind, InboundEvent};
use super::workflow::Workflow;

/// Translate a Telegram message into a workflow event.
///
/// Text and photos map directly; any other message kind becomes empty text,
/// which lands on the menu or re-prompts the current step.
pub fn message_to_event(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from.as_ref()?;

    let kind = match (msg.text(), msg.photo()) {
        (Some(text), _) => EventKind::Text(text.to_string()),
        (None, Some(sizes)) => match sizes.last() {
            // Telegram lists sizes smallest first
            Some(largest) => EventKind::Photo {
                photo_ref: largest.file.id.to_string(),
            },
            None => EventKind::Text(String::new()),
        },
        (None, None) => EventKind::Text(String::new()),
    };

    Some(InboundEvent {
        user_id: user.id.0 as i64,
        language_code: user.language_code.clone(),
        kind,
    })
}

/// Handle a text or photo message
pub async fn message_handler(
    msg: Message,
    workflow: Arc<Workflow>,
    delivery: Arc<TelegramDelivery>,
) -> Result<()> {
    let Some(event) = message_to_event(&msg) else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };
    debug!(user_id = event.user_id, "Received message");

    let replies = workflow.handle_event(event).await;
    delivery.deliver(msg.chat.id, None, replies).await;

    Ok(())
}
