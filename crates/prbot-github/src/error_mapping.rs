//! Maps octocrab failures onto the source port's error type.

use http::StatusCode;
use prbot_core::source::SourceError;

/// 401, or 403 that is not a rate limit, means the credentials were rejected.
fn is_auth_failure(source: &octocrab::GitHubError) -> bool {
    match source.status_code {
        StatusCode::UNAUTHORIZED => true,
        StatusCode::FORBIDDEN => !is_rate_limit_error(source),
        _ => false,
    }
}

fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"))
}

pub(crate) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> SourceError {
    if let octocrab::Error::GitHub { source, .. } = error {
        let message = format!(
            "{operation} failed: GitHub returned {status} {message}",
            status = source.status_code,
            message = source.message
        );
        return if is_auth_failure(source) {
            SourceError::Unauthorized { message }
        } else {
            SourceError::Failed { message }
        };
    }

    SourceError::Failed {
        message: format!("{operation} failed: {error}"),
    }
}
