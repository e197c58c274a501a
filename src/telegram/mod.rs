//! Telegram integration — Bot API client, command parsing, and dispatch.
//!
//! This layer owns everything platform-specific: the long-polling HTTP
//! client, `/command` parsing, Markdown mention rendering, and the mapping
//! from game outcomes to reply text. The game registry underneath never
//! sees a Telegram type.

pub mod api;
pub mod commands;
pub mod dispatch;

pub use api::TelegramApi;
pub use dispatch::Dispatcher;
