use std::sync::Arc;

use teloxide::prelude::*;

use prbot_core::{domain::ChatId, router::Command, security::is_chat_allowed};

use crate::router::AppState;

/// A `/command` as typed in Telegram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    /// `@botname` suffix, if the command was addressed to a specific bot.
    pub mention: Option<String>,
    pub args: String,
}

/// Parse `/cmd@botname arg1 ...`. Returns `None` for anything that is not a command.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim_start_matches('/');
    let args = parts.next().unwrap_or("").trim().to_string();

    let (name, mention) = match first.split_once('@') {
        Some((name, mention)) => (name, Some(mention.to_string())),
        None => (first, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedCommand {
        name: name.to_lowercase(),
        mention,
        args,
    })
}

fn addressed_to_us(cmd: &ParsedCommand, bot_username: Option<&str>) -> bool {
    match (&cmd.mention, bot_username) {
        (Some(mention), Some(me)) => mention.eq_ignore_ascii_case(me),
        _ => true,
    }
}

pub(super) async fn handle_command(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(parsed) = msg.text().and_then(parse_command) else {
        return Ok(());
    };
    if !addressed_to_us(&parsed, state.bot_username.as_deref()) {
        return Ok(());
    }
    let Some(command) = Command::parse(&parsed.name) else {
        tracing::debug!(name = %parsed.name, "ignoring unknown command");
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    if !is_chat_allowed(chat_id, &state.cfg.telegram_allowed_chats) {
        tracing::warn!(chat_id = chat_id.0, "command from chat outside allowlist");
        let _ = bot
            .send_message(msg.chat.id, "Unauthorized. Contact the bot owner for access.")
            .await;
        return Ok(());
    }

    if let Err(e) = state
        .router
        .dispatch(chat_id, command, &parsed.args, state.messenger.as_ref())
        .await
    {
        tracing::error!(chat_id = chat_id.0, command = command.name(), "command failed: {e}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_command() {
        let cmd = parse_command("/open").unwrap();
        assert_eq!(cmd.name, "open");
        assert_eq!(cmd.mention, None);
        assert_eq!(cmd.args, "");
    }

    #[test]
    fn parses_mention_and_args() {
        let cmd = parse_command("  /Repos@PrBot  now please ").unwrap();
        assert_eq!(cmd.name, "repos");
        assert_eq!(cmd.mention.as_deref(), Some("PrBot"));
        assert_eq!(cmd.args, "now please");
    }

    #[test]
    fn ignores_non_commands() {
        assert!(parse_command("open").is_none());
        assert!(parse_command("/").is_none());
        assert!(parse_command("/@bot").is_none());
    }

    #[test]
    fn mention_must_match_our_username() {
        let ours = parse_command("/open@prbot").unwrap();
        let theirs = parse_command("/open@otherbot").unwrap();
        let bare = parse_command("/open").unwrap();

        assert!(addressed_to_us(&ours, Some("PRBot")));
        assert!(!addressed_to_us(&theirs, Some("prbot")));
        assert!(addressed_to_us(&bare, Some("prbot")));
        assert!(addressed_to_us(&theirs, None));
    }
}
