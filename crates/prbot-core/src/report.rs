//! Open pull request aggregation and report rendering.

use crate::{
    domain::{GithubCredentials, PullRequestRecord},
    errors::Error,
    repos::WatchedRepos,
    source::{PullRequestSource, SourceError},
    Result,
};

pub const REPORT_HEADER: &str = "The following PRs are open:";
pub const NO_PULL_REQUESTS: &str = "No pull requests found";

/// Result of a successful aggregation round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregateOutcome {
    Report(String),
    /// The code host rejected the credentials. Nothing was rendered.
    AuthenticationFailed,
}

/// Query every watched repository in order and render one report.
///
/// Records are ordered repository-major (list order) and number-minor. The
/// first authentication failure aborts the whole run; any other source
/// failure surfaces as [`Error::External`].
pub async fn aggregate(
    repos: &WatchedRepos,
    organization: &str,
    credentials: &GithubCredentials,
    source: &dyn PullRequestSource,
) -> Result<AggregateOutcome> {
    let mut prs: Vec<PullRequestRecord> = Vec::new();

    for repo in repos.iter() {
        let mut repo_prs = match source
            .open_pull_requests(organization, repo, credentials)
            .await
        {
            Ok(v) => v,
            Err(SourceError::Unauthorized { message }) => {
                tracing::warn!(%organization, %repo, "github rejected credentials: {message}");
                return Ok(AggregateOutcome::AuthenticationFailed);
            }
            Err(SourceError::Failed { message }) => {
                return Err(Error::External(format!(
                    "listing pull requests for {organization}/{repo} failed: {message}"
                )));
            }
        };

        tracing::debug!(%organization, %repo, count = repo_prs.len(), "fetched open pull requests");
        repo_prs.sort_by_key(|pr| pr.number);
        prs.extend(repo_prs);
    }

    Ok(AggregateOutcome::Report(render_report(&prs)))
}

pub fn render_report(prs: &[PullRequestRecord]) -> String {
    if prs.is_empty() {
        return NO_PULL_REQUESTS.to_string();
    }

    let mut lines = Vec::with_capacity(prs.len() + 1);
    lines.push(REPORT_HEADER.to_string());
    lines.extend(prs.iter().map(render_line));
    lines.join("\n")
}

pub fn render_line(pr: &PullRequestRecord) -> String {
    let mut line = format!(
        "• {}/{}: *{}* by {}",
        pr.repository, pr.number, pr.title, pr.author
    );
    if let Some(assignee) = &pr.assignee {
        line.push_str(&format!(", assigned to {assignee}"));
    }
    line.push_str(&format!(": {}", pr.url));
    line
}
