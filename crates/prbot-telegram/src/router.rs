use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use prbot_core::{
    config::BotConfig,
    messaging::port::MessagingPort,
    router::{Command, CommandRouter},
    scheduler::ReportScheduler,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<BotConfig>,
    pub router: CommandRouter,
    pub messenger: Arc<dyn MessagingPort>,
    pub bot_username: Option<String>,
}

pub async fn run_polling(cfg: Arc<BotConfig>, router: CommandRouter) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            tracing::info!("prbot started: @{}", me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            tracing::warn!("could not fetch bot identity: {e}");
            None
        }
    };
    tracing::info!(repos = %cfg.watched_repos.join(", "), "watching repositories");
    if cfg.telegram_allowed_chats.is_empty() {
        tracing::info!("no chat allowlist configured; answering every chat");
    }

    if let Err(e) = register_commands(&bot).await {
        tracing::warn!("failed to register bot commands: {e}");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(
        bot.clone(),
        cfg.telegram_message_limit,
    ));

    let scheduler = match &cfg.report_schedule {
        Some(schedule) => {
            let scheduler =
                ReportScheduler::new(schedule.clone(), router.clone(), messenger.clone())?;
            scheduler.start().await;
            Some(scheduler)
        }
        None => {
            tracing::info!("no scheduled report configured");
            None
        }
    };

    let state = Arc::new(AppState {
        cfg,
        router,
        messenger,
        bot_username,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }

    Ok(())
}

async fn register_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(bot_commands()).await?;
    Ok(())
}

fn bot_commands() -> Vec<BotCommand> {
    Command::ALL
        .iter()
        .map(|c| BotCommand::new(c.name(), c.description()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_every_command() {
        let cmds = bot_commands();
        let names: Vec<&str> = cmds.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(names, vec!["repos", "open", "help"]);
        assert!(cmds.iter().all(|c| !c.description.is_empty()));
    }
}
