//! Bot module for handling Telegram interactions
//!
//! The workflow engine never sees teloxide types: the handlers translate
//! updates into [`InboundEvent`]s and hand the resulting [`Reply`]s to the
//! delivery channel.
//!
//! - `actions`: callback payloads parsed into button actions
//! - `event`: platform-neutral inbound events and outbound replies
//! - `workflow`: the dispatcher and button handlers
//! - `dialogue_manager`: text and photo step handlers
//! - `ui_builder`: keyboards and message formatting
//! - `delivery`: Telegram sends with retry
//! - `message_handler` / `callback_handler`: teloxide endpoints

pub mod actions;
pub mod callback_handler;
pub mod delivery;
pub mod dialogue_manager;
pub mod event;
pub mod message_handler;
pub mod ui_builder;
pub mod workflow;

pub use actions::Action;
pub use callback_handler::callback_handler;
pub use delivery::TelegramDelivery;
pub use event::{Button, EventKind, InboundEvent, Keyboard, MessageHandle, Reply};
pub use message_handler::message_handler;
pub use workflow::Workflow;
