//! Platform-neutral event and reply shapes exchanged between the workflow
//! engine and the Telegram glue.

use super::actions::Action;
use crate::models::UserId;

/// Identifier of a message already sent to a user's chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub i32);

/// An event received from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: UserId,
    /// Platform language code such as `ru` or `en-US`
    pub language_code: Option<String>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Text(String),
    /// Photo message by its platform file token; captions are not read
    Photo { photo_ref: String },
    /// Inline button press with its raw callback payload
    ButtonPress {
        action_tag: String,
        message: Option<MessageHandle>,
    },
}

impl InboundEvent {
    pub fn text(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            language_code: None,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn photo(user_id: UserId, photo_ref: impl Into<String>) -> Self {
        Self {
            user_id,
            language_code: None,
            kind: EventKind::Photo {
                photo_ref: photo_ref.into(),
            },
        }
    }

    pub fn button(user_id: UserId, action_tag: impl Into<String>) -> Self {
        Self {
            user_id,
            language_code: None,
            kind: EventKind::ButtonPress {
                action_tag: action_tag.into(),
                message: None,
            },
        }
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    pub fn with_message(mut self, handle: MessageHandle) -> Self {
        if let EventKind::ButtonPress { message, .. } = &mut self.kind {
            *message = Some(handle);
        }
        self
    }
}

/// One inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|button| vec![button]).collect(),
        }
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.rows.iter().flatten().map(|button| button.action)
    }
}

/// Outbound instruction for the delivery channel
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Photo {
        photo_ref: String,
        caption: String,
        keyboard: Option<Keyboard>,
    },
    DeleteMessage(MessageHandle),
    /// Acknowledges the button press being handled
    AnswerCallback { text: Option<String> },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn text_with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Reply::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    pub fn answer(text: Option<String>) -> Self {
        Reply::AnswerCallback { text }
    }
}
