use base64::{prelude::BASE64_STANDARD as base64, Engine};
use itertools::Itertools;
use log::{debug, info};
use miette::Diagnostic;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{handle_response, ApiRequestError};
use crate::{build_number::BuildNumber, config};

const SERVICE: &str = "Azure DevOps";
const API_VERSION: &str = "7.2-preview.7";

/// The source a build ran against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Revision {
    pub(crate) build_id: u64,
    /// The commit SHA the build checked out
    pub(crate) sha: String,
}

/// `count` is also sent but only ever restates `value.len()`.
#[derive(Deserialize)]
struct BuildList {
    #[serde(default)]
    value: Vec<Build>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Build {
    id: u64,
    result: Option<String>,
    source_version: Option<String>,
}

impl Build {
    fn succeeded(&self) -> bool {
        self.result.as_deref() == Some("succeeded")
    }
}

/// Find the commit that the succeeded build numbered `build_number` was built from.
pub(crate) async fn resolve_build(
    client: &Client,
    config: &config::AzureDevOps,
    token: &str,
    build_number: &BuildNumber,
) -> Result<Revision, Error> {
    let url = format!(
        "{base}/{organization}/{project}/_apis/build/builds",
        base = config.url.trim_end_matches('/'),
        organization = config.organization,
        project = config.project,
    );
    let mut query = vec![
        ("buildNumber", build_number.as_str().to_string()),
        ("api-version", API_VERSION.to_string()),
    ];
    if let Some(definition) = config.definition {
        query.push(("definitions", definition.to_string()));
    }
    if let Some(branch) = config.branch_ref() {
        query.push(("branchName", branch));
    }

    info!(
        "Fetching build {build_number} from Azure DevOps {}/{}",
        config.organization, config.project
    );
    debug!("GET {url} {query:?}");
    let activity = format!("fetching build {build_number}");
    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .header("Authorization", authorization(token))
        .query(&query)
        .send()
        .await;
    let response = handle_response(response, SERVICE, activity.clone()).await?;
    // Azure DevOps answers unauthenticated requests with a sign-in page instead of a 401.
    if response.status() == StatusCode::NON_AUTHORITATIVE_INFORMATION {
        return Err(ApiRequestError::Unauthorized {
            service: SERVICE,
            activity,
            status: response.status().as_u16(),
        }
        .into());
    }
    let builds: BuildList = response
        .json()
        .await
        .map_err(|source| Error::ApiResponse { source, activity })?;

    let revision = pick_revision(builds, build_number)?;
    info!(
        "Build {build_number} (id {}) → commit {}",
        revision.build_id, revision.sha
    );
    Ok(revision)
}

fn authorization(token: &str) -> String {
    format!("Basic {}", base64.encode(format!(":{token}")))
}

fn pick_revision(mut builds: BuildList, build_number: &BuildNumber) -> Result<Revision, Error> {
    if builds.value.is_empty() {
        return Err(Error::UnknownBuild {
            build_number: build_number.to_string(),
        });
    }
    let Some(position) = builds.value.iter().position(Build::succeeded) else {
        let results = builds
            .value
            .iter()
            .map(|build| build.result.as_deref().unwrap_or("in progress"))
            .join(", ");
        return Err(Error::NotSucceeded {
            build_number: build_number.to_string(),
            results,
        });
    };
    let build = builds.value.swap_remove(position);
    let sha = build
        .source_version
        .filter(|sha| !sha.is_empty())
        .ok_or_else(|| Error::MissingSourceVersion {
            build_number: build_number.to_string(),
        })?;
    Ok(Revision {
        build_id: build.id,
        sha,
    })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ApiRequest(#[from] ApiRequestError),
    #[error("Trouble decoding the response from Azure DevOps while {activity}: {source}")]
    #[diagnostic(
        code(azure_devops::api_response),
        help("Check that `azure.url`, `azure.organization` and `azure.project` point at an Azure DevOps project.")
    )]
    ApiResponse {
        source: reqwest::Error,
        activity: String,
    },
    #[error("No build numbered {build_number} was found")]
    #[diagnostic(
        code(azure_devops::unknown_build),
        help("Check the build number, and that `azure.definition` and `azure.branch` match the pipeline that produced it.")
    )]
    UnknownBuild { build_number: String },
    #[error("No build numbered {build_number} succeeded (found: {results})")]
    #[diagnostic(
        code(azure_devops::not_succeeded),
        help("Only succeeded builds can be compared. Pick a build number that passed.")
    )]
    NotSucceeded {
        build_number: String,
        results: String,
    },
    #[error("Build {build_number} has no source version")]
    #[diagnostic(
        code(azure_devops::missing_source_version),
        help("The build must have been triggered from a GitHub repository so that it records the commit it built.")
    )]
    MissingSourceVersion { build_number: String },
}
