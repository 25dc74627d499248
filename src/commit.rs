use std::fmt;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// A single commit in the range between two builds, in the order the source host returned it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Commit {
    /// The full SHA
    pub(crate) sha: String,
    pub(crate) author: String,
    pub(crate) date: OffsetDateTime,
    pub(crate) message: String,
}

impl Commit {
    const SHORT_SHA_LEN: usize = 7;

    pub(crate) fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }

    /// The first line of the message.
    pub(crate) fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim_end()
    }
}

/// `sha | author | date | summary`, one line per commit.
impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.format(&Rfc3339).map_err(|_| fmt::Error)?;
        write!(
            f,
            "{} | {} | {date} | {}",
            self.sha,
            self.author,
            self.summary()
        )
    }
}

/// Abbreviate a SHA the way git does by default.
pub(crate) fn short_sha(sha: &str) -> &str {
    sha.get(..Commit::SHORT_SHA_LEN).unwrap_or(sha)
}
