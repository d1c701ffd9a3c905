//! Telegram update handlers.
//!
//! Handlers parse the update, check the chat allowlist and hand the command
//! to the core router.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;

pub use commands::parse_command;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    commands::handle_command(bot, msg, state).await
}
