use std::{fmt, str::FromStr};

use miette::Diagnostic;
use thiserror::Error;

/// The number Azure DevOps assigns to a single run of a pipeline, like `1.4.2` or `20240102.3`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct BuildNumber(String);

impl BuildNumber {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is in the `major.minor.patch` form most pipelines are configured with.
    ///
    /// Other formats are legal in Azure DevOps, so this is only used to warn about likely typos.
    pub(crate) fn is_semantic(&self) -> bool {
        let parts: Vec<&str> = self.0.split('.').collect();
        parts.len() == 3
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    }
}

impl FromStr for BuildNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Empty);
        }
        if let Some(invalid) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(Error::InvalidCharacter {
                build_number: trimmed.to_string(),
                invalid,
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for BuildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Build number is empty")]
    #[diagnostic(
        code(build_number::empty),
        help("Pass two build numbers, like `commit-report 1.0.1 1.0.2`")
    )]
    Empty,
    #[error("Build number {build_number:?} contains the invalid character {invalid:?}")]
    #[diagnostic(
        code(build_number::invalid_character),
        help("Build numbers cannot contain whitespace or control characters")
    )]
    InvalidCharacter { build_number: String, invalid: char },
}
