use std::{collections::BTreeSet, fmt};

use miette::Diagnostic;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::{commit::Commit, config::Jira};

/// A Jira key like `ABC-123` mentioned in a commit message, always upper case.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct IssueReference(String);

impl IssueReference {
    pub(crate) fn key(&self) -> &str {
        &self.0
    }

    /// The project part of the key, before the last `-`.
    pub(crate) fn project(&self) -> &str {
        self.0.rsplit_once('-').map_or(&self.0, |(project, _)| project)
    }

    /// Link to the issue in the Jira instance at `base_url`.
    pub(crate) fn url(&self, base_url: &str) -> String {
        format!("{}/browse/{}", base_url.trim_end_matches('/'), self.key())
    }
}

impl fmt::Display for IssueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Finds issue references in commit messages.
#[derive(Clone, Debug)]
pub(crate) struct IssuePattern {
    regex: Regex,
    /// Upper-cased project keys to keep. Empty keeps everything.
    projects: Vec<String>,
}

impl IssuePattern {
    /// Three to five letters, a dash, then two to six digits.
    const DEFAULT: &'static str = r"\b[A-Za-z]{3,5}-\d{2,6}\b";

    pub(crate) fn new(pattern: Option<&str>, projects: &[String]) -> Result<Self, Error> {
        let pattern = pattern.unwrap_or(Self::DEFAULT);
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            regex,
            projects: projects
                .iter()
                .map(|project| project.trim().to_uppercase())
                .collect(),
        })
    }

    pub(crate) fn from_config(jira: Option<&Jira>) -> Result<Self, Error> {
        match jira {
            Some(jira) => Self::new(jira.pattern.as_deref(), &jira.projects),
            None => Self::new(None, &[]),
        }
    }

    /// Every distinct reference in `message`.
    pub(crate) fn extract(&self, message: &str) -> BTreeSet<IssueReference> {
        self.regex
            .find_iter(message)
            .map(|found| IssueReference(found.as_str().to_uppercase()))
            .filter(|reference| self.is_wanted(reference))
            .collect()
    }

    /// Every distinct reference across all of `commits`.
    pub(crate) fn extract_all<'a>(
        &self,
        commits: impl IntoIterator<Item = &'a Commit>,
    ) -> BTreeSet<IssueReference> {
        commits
            .into_iter()
            .flat_map(|commit| self.extract(&commit.message))
            .collect()
    }

    fn is_wanted(&self, reference: &IssueReference) -> bool {
        self.projects.is_empty()
            || self
                .projects
                .iter()
                .any(|project| project == reference.project())
    }
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Invalid issue pattern {pattern:?}: {source}")]
    #[diagnostic(
        code(issues::invalid_pattern),
        help("`jira.pattern` must be a valid regular expression"),
        url("https://docs.rs/regex/latest/regex/#syntax")
    )]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
