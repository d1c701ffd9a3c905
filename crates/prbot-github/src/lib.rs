//! GitHub adapter (octocrab).
//!
//! Implements the `prbot-core` pull request source over the GitHub REST API.

use async_trait::async_trait;
use http::Uri;
use octocrab::{Octocrab, Page};

use prbot_core::{
    domain::{GithubCredentials, PullRequestRecord},
    errors::Error,
    source::{PullRequestSource, SourceError},
    Result,
};

mod error_mapping;
mod models;

use error_mapping::map_octocrab_error;
use models::ApiPullRequest;

const PER_PAGE: &str = "100";

/// Lists open pull requests with octocrab.
///
/// A client is built per call because credentials are resolved per command
/// invocation.
#[derive(Clone, Debug)]
pub struct OctocrabSource {
    api_base: Uri,
}

impl OctocrabSource {
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = api_base
            .parse::<Uri>()
            .map_err(|e| Error::Config(format!("invalid GitHub API url {api_base}: {e}")))?;
        Ok(Self { api_base })
    }

    fn client(&self, credentials: &GithubCredentials) -> std::result::Result<Octocrab, SourceError> {
        Octocrab::builder()
            .basic_auth(credentials.account.clone(), credentials.token.clone())
            .base_uri(self.api_base.clone())
            .map_err(|e| SourceError::Failed {
                message: format!("build client failed: {e}"),
            })?
            .build()
            .map_err(|e| map_octocrab_error("build client", &e))
    }
}

#[async_trait]
impl PullRequestSource for OctocrabSource {
    async fn open_pull_requests(
        &self,
        organization: &str,
        repository: &str,
        credentials: &GithubCredentials,
    ) -> std::result::Result<Vec<PullRequestRecord>, SourceError> {
        let client = self.client(credentials)?;
        let route = format!("/repos/{organization}/{repository}/pulls");
        let query = [("state", "open"), ("per_page", PER_PAGE)];

        let first: Page<ApiPullRequest> = client
            .get(route, Some(&query))
            .await
            .map_err(|e| map_octocrab_error("list pulls", &e))?;

        let prs = client
            .all_pages(first)
            .await
            .map_err(|e| map_octocrab_error("list pulls", &e))?;

        tracing::debug!(%organization, %repository, count = prs.len(), "listed open pull requests");

        Ok(prs
            .into_iter()
            .map(|pr| pr.into_record(repository))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PULLS_PATH: &str = "/repos/acme/api/pulls";

    fn creds() -> GithubCredentials {
        GithubCredentials {
            account: "bot".to_string(),
            token: "secret".to_string(),
        }
    }

    fn pr_json(number: u64, assignee: Option<&str>) -> serde_json::Value {
        json!({
            "number": number,
            "title": format!("PR {number}"),
            "state": "open",
            "user": { "login": "octocat" },
            "assignee": assignee.map(|login| json!({ "login": login })),
            "html_url": format!("https://github.com/acme/api/pull/{number}"),
            "base": { "repo": { "name": "api" } }
        })
    }

    #[tokio::test]
    async fn follows_pagination_and_sends_basic_auth() {
        let server = MockServer::start().await;
        let next_url = format!(
            "{}{PULLS_PATH}?state=open&per_page=100&page=2",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([pr_json(1, None)])))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .and(query_param("state", "open"))
            .and(query_param("per_page", "100"))
            .and(header("authorization", "Basic Ym90OnNlY3JldA=="))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([pr_json(7, Some("hubot")), pr_json(3, None)]))
                    .insert_header("Link", format!("<{next_url}>; rel=\"next\"").as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source = OctocrabSource::new(&server.uri()).unwrap();
        let prs = source
            .open_pull_requests("acme", "api", &creds())
            .await
            .unwrap();

        let numbers: Vec<u64> = prs.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![7, 3, 1]);
        assert_eq!(prs[0].assignee.as_deref(), Some("hubot"));
        assert_eq!(prs[1].author, "octocat");
        assert!(prs.iter().all(|p| p.repository == "api"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let source = OctocrabSource::new(&server.uri()).unwrap();
        let err = source
            .open_pull_requests("acme", "api", &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unauthorized { ref message } if message.contains("Bad credentials")));
    }

    #[tokio::test]
    async fn forbidden_403_maps_to_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "Resource not accessible by personal access token",
                "documentation_url": "https://docs.github.com/rest/pulls/pulls#list-pull-requests"
            })))
            .mount(&server)
            .await;

        let source = OctocrabSource::new(&server.uri()).unwrap();
        let err = source
            .open_pull_requests("acme", "api", &creds())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Unauthorized { ref message } if message.contains("Resource not accessible")
        ));
    }

    #[tokio::test]
    async fn rate_limited_403_is_not_an_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "API rate limit exceeded for user ID 1.",
                "documentation_url": "https://docs.github.com/rest/overview/rate-limits-for-the-rest-api"
            })))
            .mount(&server)
            .await;

        let source = OctocrabSource::new(&server.uri()).unwrap();
        let err = source
            .open_pull_requests("acme", "api", &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Failed { .. }));
    }

    #[tokio::test]
    async fn not_found_is_a_plain_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PULLS_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let source = OctocrabSource::new(&server.uri()).unwrap();
        let err = source
            .open_pull_requests("acme", "api", &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Failed { ref message } if message.contains("404")));
    }

    #[test]
    fn rejects_unparseable_api_base() {
        assert!(OctocrabSource::new("not a url").is_err());
    }
}
