use async_trait::async_trait;

use crate::domain::{GithubCredentials, PullRequestRecord};

/// Failure reported by a pull request source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The code host rejected the credentials.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Anything else: transport, unexpected status, malformed payload.
    #[error("{message}")]
    Failed { message: String },
}

/// Port for the code-hosting API.
///
/// Implementations follow pagination themselves and return every open pull
/// request of `organization/repository`, in any order.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn open_pull_requests(
        &self,
        organization: &str,
        repository: &str,
        credentials: &GithubCredentials,
    ) -> Result<Vec<PullRequestRecord>, SourceError>;
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    /// Canned per-repository responses; records every queried repository.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        responses: HashMap<String, Result<Vec<PullRequestRecord>, SourceError>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        pub(crate) fn with(
            mut self,
            repository: &str,
            response: Result<Vec<PullRequestRecord>, SourceError>,
        ) -> Self {
            self.responses.insert(repository.to_string(), response);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PullRequestSource for FakeSource {
        async fn open_pull_requests(
            &self,
            organization: &str,
            repository: &str,
            _credentials: &GithubCredentials,
        ) -> Result<Vec<PullRequestRecord>, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{organization}/{repository}"));
            self.responses
                .get(repository)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    pub(crate) fn pr(repository: &str, number: u64, assignee: Option<&str>) -> PullRequestRecord {
        PullRequestRecord {
            repository: repository.to_string(),
            number,
            title: format!("PR {number}"),
            author: "alice".to_string(),
            assignee: assignee.map(str::to_string),
            url: format!("https://github.com/acme/{repository}/pull/{number}"),
        }
    }
}
