use std::{
    collections::BTreeSet,
    fmt::Write,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::{Captures, Regex};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime,
};

use crate::{
    build_number::BuildNumber,
    commit::{short_sha, Commit},
    config,
    integrations::{azure_devops::Revision, github::compare_url},
    issues::IssueReference,
};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One end of the comparison.
#[derive(Clone, Debug)]
pub(crate) struct Endpoint {
    pub(crate) build_number: BuildNumber,
    pub(crate) revision: Revision,
}

/// Everything that goes into the Markdown file.
#[derive(Debug)]
pub(crate) struct Report<'a> {
    pub(crate) github: &'a config::GitHub,
    /// Base URL of the Jira instance issue references link to
    pub(crate) jira_url: Option<&'a str>,
    pub(crate) from: Endpoint,
    pub(crate) to: Endpoint,
    /// In the order GitHub returned them
    pub(crate) commits: Vec<Commit>,
    pub(crate) issues: BTreeSet<IssueReference>,
    pub(crate) generated_at: OffsetDateTime,
}

impl Report<'_> {
    pub(crate) fn compare_url(&self) -> String {
        compare_url(self.github, &self.from.revision.sha, &self.to.revision.sha)
    }

    pub(crate) fn to_markdown(&self) -> String {
        let timestamp = self
            .generated_at
            .format(TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| self.generated_at.to_string());
        let repo_url = self.github.repo_url();
        let compare_url = self.compare_url();

        let mut out = String::new();
        // Writing to a String never fails.
        let _ = writeln!(out, "# Commit Report - {timestamp}\n");
        let _ = writeln!(
            out,
            "**Builds:** {} → {}\n",
            endpoint_markdown(&self.from, &repo_url),
            endpoint_markdown(&self.to, &repo_url),
        );
        let _ = writeln!(out, "**GitHub Compare URL:** [{compare_url}]({compare_url})\n");

        out.push_str("## GitHub Commits\n\n");
        if self.commits.is_empty() {
            out.push_str("No commits found.\n");
        }
        for commit in &self.commits {
            let date = commit
                .date
                .format(&Rfc3339)
                .unwrap_or_else(|_| commit.date.to_string());
            let _ = writeln!(
                out,
                "- [{short}]({repo_url}/commit/{sha}) | {author} | {date} | {summary}",
                short = commit.short_sha(),
                sha = commit.sha,
                author = commit.author,
                summary = link_pull_requests(commit.summary(), &repo_url),
            );
        }

        out.push_str("\n## Ticket References\n\n");
        if self.issues.is_empty() {
            out.push_str("No ticket references found.\n");
        }
        for issue in &self.issues {
            match self.jira_url {
                Some(jira_url) => {
                    let _ = writeln!(out, "- [{issue}]({})", issue.url(jira_url));
                }
                None => {
                    let _ = writeln!(out, "- {issue}");
                }
            }
        }

        let _ = writeln!(out, "\n_Report generated on {timestamp}_");
        out
    }
}

fn endpoint_markdown(endpoint: &Endpoint, repo_url: &str) -> String {
    let sha = &endpoint.revision.sha;
    format!(
        "`{}` ([{}]({repo_url}/commit/{sha}))",
        endpoint.build_number,
        short_sha(sha)
    )
}

/// Turn `#123` into a link to pull request 123.
fn link_pull_requests(summary: &str, repo_url: &str) -> String {
    static PULL_REQUEST: OnceLock<Regex> = OnceLock::new();
    let pattern = PULL_REQUEST.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // Constant pattern
        let pattern = Regex::new(r"#(\d+)").unwrap();
        pattern
    });
    pattern
        .replace_all(summary, |caps: &Captures| {
            format!("[#{number}]({repo_url}/pull/{number})", number = &caps[1])
        })
        .into_owned()
}

/// `{config stem}_{from}_{to}_commit_report.md`, next to wherever the tool is run.
pub(crate) fn default_output_path(
    config_path: &Path,
    from: &BuildNumber,
    to: &BuildNumber,
) -> PathBuf {
    let stem = config_path
        .file_stem()
        .map_or_else(|| "commit-report".into(), |stem| stem.to_string_lossy());
    PathBuf::from(format!("{stem}_{from}_{to}_commit_report.md"))
}

/// The local time if it can be determined, otherwise UTC.
pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
