//! Wire types for the GitHub pull request listing.

use prbot_core::domain::PullRequestRecord;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRepo {
    pub(crate) name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBase {
    pub(crate) repo: Option<ApiRepo>,
}

/// One item of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) user: Option<ApiUser>,
    pub(crate) assignee: Option<ApiUser>,
    pub(crate) html_url: Option<String>,
    pub(crate) base: Option<ApiBase>,
}

impl ApiPullRequest {
    /// Convert to a record, naming the repository after the PR's base repo
    /// and falling back to the repository that was queried.
    pub(crate) fn into_record(self, queried_repo: &str) -> PullRequestRecord {
        let repository = self
            .base
            .and_then(|b| b.repo)
            .and_then(|r| r.name)
            .unwrap_or_else(|| queried_repo.to_string());

        PullRequestRecord {
            repository,
            number: self.number,
            title: self.title.unwrap_or_default(),
            author: self.user.and_then(|u| u.login).unwrap_or_default(),
            assignee: self.assignee.and_then(|u| u.login),
            url: self.html_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ApiPullRequest;

    #[test]
    fn deserializes_and_converts_full_payload() {
        let pr: ApiPullRequest = serde_json::from_value(json!({
            "number": 42,
            "title": "Add tests",
            "state": "open",
            "user": { "login": "octocat", "id": 1 },
            "assignee": { "login": "hubot" },
            "html_url": "https://github.com/acme/api/pull/42",
            "base": { "ref": "main", "repo": { "name": "api", "full_name": "acme/api" } }
        }))
        .expect("payload should deserialize");

        let record = pr.into_record("ignored");
        assert_eq!(record.repository, "api");
        assert_eq!(record.number, 42);
        assert_eq!(record.title, "Add tests");
        assert_eq!(record.author, "octocat");
        assert_eq!(record.assignee.as_deref(), Some("hubot"));
        assert_eq!(record.url, "https://github.com/acme/api/pull/42");
    }

    #[test]
    fn null_assignee_and_missing_base_fall_back() {
        let pr: ApiPullRequest = serde_json::from_value(json!({
            "number": 3,
            "title": "WIP",
            "user": { "login": "octocat" },
            "assignee": null,
            "html_url": "u"
        }))
        .expect("payload should deserialize");

        let record = pr.into_record("web");
        assert_eq!(record.repository, "web");
        assert_eq!(record.assignee, None);
    }
}
