use std::{collections::HashMap, env, path::Path};

use crate::{
    domain::{ChatId, GithubCredentials},
    errors::Error,
    repos::WatchedRepos,
    Result,
};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Env vars the `open` command needs, in the order they are reported when missing.
pub const GH_USER: &str = "GH_USER";
pub const GH_ORG: &str = "GH_ORG";
pub const GH_TOKEN: &str = "GH_TOKEN";
pub const GITHUB_ENV_VARS: [&str; 3] = [GH_USER, GH_ORG, GH_TOKEN];

/// Read-only view over environment variables.
///
/// Production code uses [`ProcessEnv`]; tests plug in a plain map.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Scheduled `open` report target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSchedule {
    pub cron: String,
    pub chat_id: ChatId,
}

/// Startup configuration. Built once and shared behind an `Arc`.
///
/// GitHub credentials are deliberately not part of this: they are read on
/// every `open` invocation via [`resolve_github_access`].
#[derive(Clone, Debug)]
pub struct BotConfig {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_allowed_chats: Vec<i64>,
    pub telegram_message_limit: usize,

    // GitHub
    pub watched_repos: WatchedRepos,
    pub github_api_url: String,

    // Scheduled report
    pub report_schedule: Option<ReportSchedule>,
}

impl BotConfig {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_env(&ProcessEnv)
    }

    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let telegram_bot_token = env_str(env, "TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let telegram_allowed_chats = parse_csv_i64(env_str(env, "TELEGRAM_ALLOWED_CHATS"));
        let telegram_message_limit = env_usize(env, "TELEGRAM_MESSAGE_LIMIT")
            .filter(|&n| n > 0)
            .unwrap_or(TELEGRAM_MAX_MESSAGE_LEN)
            .min(TELEGRAM_MAX_MESSAGE_LEN);

        let watched_repos = match parse_csv(env_str(env, "WATCHED_REPOS")) {
            Some(names) => WatchedRepos::new(names)?,
            None => WatchedRepos::default(),
        };

        let github_api_url = env_str(env, "GH_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());

        let report_schedule = parse_report_schedule(env)?;

        Ok(Self {
            telegram_bot_token,
            telegram_allowed_chats,
            telegram_message_limit,
            watched_repos,
            github_api_url,
            report_schedule,
        })
    }
}

/// Organization plus credentials needed by the `open` command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GithubAccess {
    pub organization: String,
    pub credentials: GithubCredentials,
}

/// Resolve GitHub access from the environment, or return the names of every
/// missing variable.
pub fn resolve_github_access(
    env: &dyn EnvSource,
) -> std::result::Result<GithubAccess, Vec<&'static str>> {
    let values = GITHUB_ENV_VARS.map(|key| env_str(env, key).and_then(non_empty));

    let missing: Vec<&'static str> = GITHUB_ENV_VARS
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_none())
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let [Some(account), Some(organization), Some(token)] = values else {
        return Err(GITHUB_ENV_VARS.to_vec());
    };
    Ok(GithubAccess {
        organization,
        credentials: GithubCredentials { account, token },
    })
}

fn parse_report_schedule(env: &dyn EnvSource) -> Result<Option<ReportSchedule>> {
    let cron = env_str(env, "REPORT_CRON").and_then(non_empty);
    let chat = env_str(env, "REPORT_CHAT_ID").and_then(non_empty);

    match (cron, chat) {
        (Some(cron), Some(chat)) => {
            let chat_id = chat.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("REPORT_CHAT_ID must be a numeric chat id, got {chat}"))
            })?;
            Ok(Some(ReportSchedule {
                cron: cron.trim().to_string(),
                chat_id: ChatId(chat_id),
            }))
        }
        (None, None) => Ok(None),
        _ => {
            tracing::warn!("REPORT_CRON and REPORT_CHAT_ID must both be set; scheduled report disabled");
            Ok(None)
        }
    }
}

fn env_str(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key)
}

fn env_usize(env: &dyn EnvSource, key: &str) -> Option<usize> {
    env_str(env, key).and_then(|s| s.trim().parse::<usize>().ok())
}

/// Load `path` into the process environment. Variables that are already set
/// win; a missing file is not an error.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded env file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(dotenvy::Error::Io(e)) => Err(Error::Io(e)),
        Err(e) => Err(Error::Config(format!("invalid {}: {e}", path.display()))),
    }
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn parse_csv(v: Option<String>) -> Option<Vec<String>> {
    let out = v?
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
