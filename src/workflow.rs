use std::path::PathBuf;

use log::{info, warn};
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    build_number::BuildNumber,
    config::Config,
    dry_run::DryRun,
    fs,
    integrations::{self, azure_devops, github, ApiRequestError},
    issues,
    issues::IssuePattern,
    report::{self, Endpoint, Report},
};

/// Everything needed for one run, already resolved from the CLI, environment and config file.
#[derive(Debug)]
pub(crate) struct Inputs {
    pub(crate) config: Config,
    pub(crate) from: BuildNumber,
    pub(crate) to: BuildNumber,
    pub(crate) azure_token: String,
    pub(crate) github_token: Option<String>,
    pub(crate) output: PathBuf,
}

/// Resolve both builds, collect the commits between them, and write the report.
///
/// Nothing is written unless every earlier step succeeds.
pub(crate) async fn run(inputs: Inputs, dry_run: DryRun<'_>) -> Result<(), Error> {
    let Inputs {
        config,
        from,
        to,
        azure_token,
        github_token,
        output,
    } = inputs;

    for build_number in [&from, &to] {
        if !build_number.is_semantic() {
            warn!("Build number {build_number} doesn't match the expected format (x.y.z)");
        }
    }
    info!("Comparing commits between builds {from} and {to}");

    let pattern = IssuePattern::from_config(config.jira.as_ref())?;
    let client = integrations::client()?;

    let from_revision =
        azure_devops::resolve_build(&client, &config.azure, &azure_token, &from).await?;
    let to_revision = azure_devops::resolve_build(&client, &config.azure, &azure_token, &to).await?;

    let commits = github::commits_between(
        &client,
        &config.github,
        github_token.as_deref(),
        &from_revision.sha,
        &to_revision.sha,
    )
    .await?;
    if commits.is_empty() {
        warn!("No commits found between builds {from} and {to}");
    }

    let issues = pattern.extract_all(&commits);
    info!("Found {} unique ticket references", issues.len());
    let jira_url = config.jira.as_ref().and_then(|jira| jira.url.as_deref());
    for issue in &issues {
        match jira_url {
            Some(jira_url) => info!("- {issue}: {}", issue.url(jira_url)),
            None => info!("- {issue}"),
        }
    }

    let report = Report {
        github: &config.github,
        jira_url,
        from: Endpoint {
            build_number: from,
            revision: from_revision,
        },
        to: Endpoint {
            build_number: to,
            revision: to_revision,
        },
        commits,
        issues,
        generated_at: report::now(),
    };
    info!("GitHub compare URL: {}", report.compare_url());

    fs::write(dry_run, &output, &report.to_markdown())?;
    if dry_run.is_none() {
        info!("Markdown file created: {}", output.display());
    }
    Ok(())
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    AzureDevOps(#[from] azure_devops::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    GitHub(#[from] github::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    ApiRequest(#[from] ApiRequestError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Issues(#[from] issues::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
}
