use std::collections::HashSet;

use crate::{errors::Error, Result};

pub const DEFAULT_WATCHED_REPOS: &[&str] = &["bootstrap-cfn", "bootstrap-salt", "template-deploy"];

/// Ordered, non-empty list of repository names the bot reports on.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchedRepos {
    names: Vec<String>,
}

impl WatchedRepos {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::Config(
                "at least one watched repository is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(Error::Config("repository name cannot be empty".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!(
                    "repository {name} is listed more than once"
                )));
            }
        }

        Ok(Self { names })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn join(&self, sep: &str) -> String {
        self.names.join(sep)
    }
}

impl Default for WatchedRepos {
    fn default() -> Self {
        Self {
            names: DEFAULT_WATCHED_REPOS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_list_order() {
        let repos = WatchedRepos::new(["b", "a", "c"]).unwrap();
        assert_eq!(repos.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(repos.join(", "), "b, a, c");
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(WatchedRepos::new(Vec::<String>::new()).is_err());
        assert!(WatchedRepos::new(["a", "b", "a"]).is_err());
        assert!(WatchedRepos::new(["a", " "]).is_err());
    }

    #[test]
    fn default_matches_known_repos() {
        let repos = WatchedRepos::default();
        assert_eq!(repos.iter().count(), 3);
        assert_eq!(
            repos.join(", "),
            "bootstrap-cfn, bootstrap-salt, template-deploy"
        );
    }
}
