//! Telegram Bot API transport.
//!
//! Long-polling client over the Bot HTTP API plus the glue that turns raw
//! updates into classified inbound events and delivers replies back to the
//! chat.

pub mod api;
pub mod client;
pub mod poller;
pub mod transport;

pub use client::{TelegramClient, TelegramError};
pub use poller::UpdatePoller;
pub use transport::TelegramTransport;
