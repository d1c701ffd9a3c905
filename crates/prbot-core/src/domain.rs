/// Chat id (numeric, Telegram-style).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// One open pull request as reported by the code host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub repository: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub assignee: Option<String>,
    pub url: String,
}

/// Credentials for the code host, resolved per `open` invocation.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubCredentials {
    pub account: String,
    pub token: String,
}

impl std::fmt::Debug for GithubCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubCredentials")
            .field("account", &self.account)
            .field("token", &"<redacted>")
            .finish()
    }
}
