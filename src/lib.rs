//! # City Places Telegram Bot
//!
//! A Telegram bot for a single city's directory of hotels, cafés, restaurants
//! and shops. Administrators add and edit places through multi-step chat
//! workflows; every user can browse places, keep favorites and leave reviews
//! with a 1 to 5 rating.
//!
//! The durable per-user status in the database decides which workflow step a
//! message belongs to; the in-memory [`session::SessionRegistry`] only holds
//! the values collected along the way.

pub mod aggregate;
pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod models;
pub mod session;
