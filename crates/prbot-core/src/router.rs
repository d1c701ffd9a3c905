//! Chat command routing.
//!
//! Commands are a closed set; each maps to a handler producing the messages
//! to post back into the invoking chat.

use std::sync::Arc;

use crate::{
    config::{resolve_github_access, EnvSource},
    domain::ChatId,
    formatting::split_message,
    messaging::{port::MessagingPort, types::OutgoingMessage},
    repos::WatchedRepos,
    report::{aggregate, AggregateOutcome},
    source::PullRequestSource,
    Result,
};

pub const AUTH_FAILED_MESSAGE: &str = "Could not authenticate with github.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Repos,
    Open,
    Help,
}

impl Command {
    /// Commands advertised to the chat platform, in display order.
    pub const ALL: [Command; 3] = [Command::Repos, Command::Open, Command::Help];

    /// Parse a command name (without `/` or `@bot` suffix), case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "repos" => Some(Self::Repos),
            "open" => Some(Self::Open),
            "help" | "start" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Repos => "repos",
            Self::Open => "open",
            Self::Help => "help",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Repos => "Tells you which repos are watched",
            Self::Open => "Lists the open PRs for the watched repos",
            Self::Help => "Shows what this bot can do",
        }
    }

    /// Text shown for `/help <command>`.
    pub fn long_description(self) -> &'static str {
        match self {
            Self::Repos => {
                "This will give a list of which repositories are polled for open pull requests. \
                 Currently this is a static list, though this is subject to change in future versions."
            }
            Self::Open => {
                "Queries github, finding open pull-requests on all repos that are watched.\n\
                 Use this to trigger a manual report."
            }
            Self::Help => "Lists every command. Pass a command name to see its details.",
        }
    }
}

#[derive(Clone)]
pub struct CommandRouter {
    repos: Arc<WatchedRepos>,
    env: Arc<dyn EnvSource>,
    source: Arc<dyn PullRequestSource>,
}

impl CommandRouter {
    pub fn new(
        repos: Arc<WatchedRepos>,
        env: Arc<dyn EnvSource>,
        source: Arc<dyn PullRequestSource>,
    ) -> Self {
        Self { repos, env, source }
    }

    /// Run `command`. `args` is the text after the command name; only `help`
    /// reads it.
    pub async fn handle(
        &self,
        chat_id: ChatId,
        command: Command,
        args: &str,
    ) -> Result<Vec<OutgoingMessage>> {
        match command {
            Command::Repos => Ok(self.repos_command(chat_id)),
            Command::Open => self.open_command(chat_id).await,
            Command::Help => Ok(help_command(chat_id, args)),
        }
    }

    /// Handle `command` and send every resulting message through `messenger`.
    ///
    /// Messages longer than the messenger limit are split at line boundaries.
    pub async fn dispatch(
        &self,
        chat_id: ChatId,
        command: Command,
        args: &str,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        tracing::info!(chat_id = chat_id.0, command = command.name(), "handling command");

        let limit = messenger.capabilities().max_message_len;
        for msg in self.handle(chat_id, command, args).await? {
            for chunk in split_message(&msg.text, limit) {
                messenger.send_text(msg.chat_id, &chunk).await?;
            }
        }
        Ok(())
    }

    fn repos_command(&self, chat_id: ChatId) -> Vec<OutgoingMessage> {
        let text = format!(
            "I am watching the following repos: {}",
            self.repos.join(", ")
        );
        vec![OutgoingMessage::new(chat_id, text)]
    }

    async fn open_command(&self, chat_id: ChatId) -> Result<Vec<OutgoingMessage>> {
        let access = match resolve_github_access(self.env.as_ref()) {
            Ok(v) => v,
            Err(missing) => {
                tracing::warn!(?missing, "open command missing configuration");
                return Ok(missing
                    .into_iter()
                    .map(|name| {
                        OutgoingMessage::new(chat_id, format!("Please set a value for `{name}`"))
                    })
                    .collect());
            }
        };

        let outcome = aggregate(
            &self.repos,
            &access.organization,
            &access.credentials,
            self.source.as_ref(),
        )
        .await?;

        let text = match outcome {
            AggregateOutcome::Report(report) => report,
            AggregateOutcome::AuthenticationFailed => AUTH_FAILED_MESSAGE.to_string(),
        };
        Ok(vec![OutgoingMessage::new(chat_id, text)])
    }
}

fn help_command(chat_id: ChatId, args: &str) -> Vec<OutgoingMessage> {
    let topic = args.split_whitespace().next().and_then(Command::parse);
    if let Some(command) = topic {
        let text = format!(
            "/{} - {}\n\n{}",
            command.name(),
            command.description(),
            command.long_description()
        );
        return vec![OutgoingMessage::new(chat_id, text)];
    }

    let mut lines = vec![
        "PullRequest Bot".to_string(),
        "This bot will give a daily report of open PRs on watched repos.".to_string(),
        String::new(),
    ];
    lines.extend(
        Command::ALL
            .iter()
            .map(|c| format!("/{} - {}", c.name(), c.description())),
    );
    vec![OutgoingMessage::new(chat_id, lines.join("\n"))]
}
