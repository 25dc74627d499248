use log::{debug, info, warn};
use miette::Diagnostic;
use reqwest::Client;
use serde::Deserialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use super::{handle_response, ApiRequestError};
use crate::{
    commit::{short_sha, Commit},
    config,
};

const SERVICE: &str = "GitHub";
const PER_PAGE: usize = 100;

#[derive(Deserialize)]
struct Comparison {
    status: Option<String>,
    #[serde(default)]
    total_commits: usize,
    #[serde(default)]
    commits: Vec<ResponseCommit>,
}

#[derive(Deserialize)]
struct ResponseCommit {
    sha: Option<String>,
    commit: Option<CommitDetail>,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: Option<String>,
    author: Option<Signature>,
}

#[derive(Deserialize)]
struct Signature {
    name: Option<String>,
    date: Option<String>,
}

impl TryFrom<ResponseCommit> for Commit {
    /// The name of the missing or unparseable field
    type Error = &'static str;

    fn try_from(response: ResponseCommit) -> Result<Self, Self::Error> {
        let sha = response.sha.ok_or("sha")?;
        let detail = response.commit.ok_or("commit")?;
        let message = detail.message.ok_or("commit.message")?;
        let author = detail.author.ok_or("commit.author")?;
        let name = author.name.ok_or("commit.author.name")?;
        let date = author
            .date
            .as_deref()
            .and_then(|date| OffsetDateTime::parse(date, &Rfc3339).ok())
            .ok_or("commit.author.date")?;
        Ok(Commit {
            sha,
            author: name,
            date,
            message,
        })
    }
}

/// The page on github.com showing the same comparison as [`commits_between`].
pub(crate) fn compare_url(config: &config::GitHub, base: &str, head: &str) -> String {
    format!("{}/compare/{base}...{head}", config.repo_url())
}

/// All commits reachable from `head` but not from `base`, oldest first.
///
/// The range includes `head` itself and never `base`, whose changes already shipped in the older
/// build.
pub(crate) async fn commits_between(
    client: &Client,
    config: &config::GitHub,
    token: Option<&str>,
    base: &str,
    head: &str,
) -> Result<Vec<Commit>, Error> {
    let url = format!(
        "{api}/repos/{owner}/{repo}/compare/{base}...{head}",
        api = config.api_url.trim_end_matches('/'),
        owner = config.owner,
        repo = config.repo,
    );
    info!(
        "Fetching commits between {} and {} from GitHub repo {}/{}",
        short_sha(base),
        short_sha(head),
        config.owner,
        config.repo
    );

    let mut commits = Vec::new();
    let mut seen = 0;
    for page in 1.. {
        let comparison = fetch_page(client, &url, token, page).await?;
        if page == 1 && comparison.status.as_deref() == Some("behind") {
            warn!(
                "{} is behind {}, the builds may be in the wrong order",
                short_sha(head),
                short_sha(base)
            );
        }
        let fetched = comparison.commits.len();
        seen += fetched;
        for response in comparison.commits {
            let sha = response.sha.clone().unwrap_or_default();
            match Commit::try_from(response) {
                Ok(commit) if commit.sha == base => {
                    debug!("Dropping base commit {} from the range", commit.short_sha());
                }
                Ok(commit) => {
                    info!("- {commit}");
                    commits.push(commit);
                }
                Err(field) => warn!("Skipping malformed commit {sha}: missing field {field}"),
            }
        }
        if fetched < PER_PAGE || seen >= comparison.total_commits {
            break;
        }
    }
    info!("Found {} commits", commits.len());
    Ok(commits)
}

async fn fetch_page(
    client: &Client,
    url: &str,
    token: Option<&str>,
    page: usize,
) -> Result<Comparison, Error> {
    debug!("GET {url} page {page}");
    let mut request = client
        .get(url)
        .header("Accept", "application/vnd.github+json")
        .query(&[("per_page", PER_PAGE), ("page", page)]);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    let activity = format!("comparing commits (page {page})");
    let response = handle_response(request.send().await, SERVICE, activity.clone()).await?;
    response
        .json()
        .await
        .map_err(|source| Error::ApiResponse { source, activity })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ApiRequest(#[from] ApiRequestError),
    #[error("Trouble decoding the response from GitHub while {activity}: {source}")]
    #[diagnostic(
        code(github::api_response),
        help("Check that `github.api_url` points at the GitHub REST API.")
    )]
    ApiResponse {
        source: reqwest::Error,
        activity: String,
    },
}
