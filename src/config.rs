use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;

use crate::fs;

/// Everything loaded from the config file, before CLI overrides.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// The two build numbers to compare, if not passed on the command line
    #[serde(default)]
    pub(crate) builds: Vec<String>,
    /// Where to write the report, if not passed on the command line
    pub(crate) output: Option<PathBuf>,
    pub(crate) azure: AzureDevOps,
    pub(crate) github: GitHub,
    /// Optional configuration for linking issue references to Jira
    pub(crate) jira: Option<Jira>,
}

impl Config {
    pub(crate) const DEFAULT_PATH: &'static str = "commit-report.toml";

    /// Load a config from `path`. Files ending in `.json` are parsed as JSON, everything else as
    /// TOML.
    ///
    /// ## Errors
    /// 1. The file can't be read
    /// 2. The contents don't parse into a `Config`
    pub(crate) fn load(path: &Path) -> Result<Self, Error> {
        let source_code = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&source_code).map_err(|source| Error::Json {
                path: path.into(),
                source,
            })
        } else {
            Self::from_toml(&source_code, &path.display().to_string())
        }
    }

    fn from_toml(source_code: &str, name: &str) -> Result<Self, Error> {
        ::toml::from_str(source_code).map_err(|err| Error::Toml {
            message: err.message().to_string(),
            span: err.span().map(SourceSpan::from),
            source_code: NamedSource::new(name, source_code.to_string()),
        })
    }
}

/// Where to find builds in Azure DevOps.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AzureDevOps {
    pub(crate) organization: String,
    pub(crate) project: String,
    /// The ID of the pipeline definition to restrict builds to
    pub(crate) definition: Option<u32>,
    /// The branch builds must have run against, like `main` or `refs/heads/main`
    pub(crate) branch: Option<String>,
    /// A personal access token. Prefer the `AZURE_DEVOPS_PAT` environment variable.
    pub(crate) token: Option<String>,
    #[serde(default = "AzureDevOps::default_url")]
    pub(crate) url: String,
}

impl AzureDevOps {
    fn default_url() -> String {
        String::from("https://dev.azure.com")
    }

    /// The full ref name for `branch`, as Azure DevOps reports it.
    pub(crate) fn branch_ref(&self) -> Option<String> {
        self.branch.as_deref().map(|branch| {
            if branch.starts_with("refs/") {
                branch.to_string()
            } else {
                format!("refs/heads/{branch}")
            }
        })
    }
}

/// Details needed to read commits from GitHub.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GitHub {
    /// The user or organization that owns the `repo`.
    pub(crate) owner: String,
    /// The name of the repository in GitHub that the pipeline builds
    pub(crate) repo: String,
    /// A token with read access to `repo`. Prefer the `GITHUB_TOKEN` environment variable.
    pub(crate) token: Option<String>,
    #[serde(default = "GitHub::default_api_url")]
    pub(crate) api_url: String,
    /// Base for links in the report
    #[serde(default = "GitHub::default_web_url")]
    pub(crate) web_url: String,
}

impl GitHub {
    fn default_api_url() -> String {
        String::from("https://api.github.com")
    }

    fn default_web_url() -> String {
        String::from("https://github.com")
    }

    /// The web URL of the repository, used as the base of every link in the report.
    pub(crate) fn repo_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.web_url.trim_end_matches('/'),
            self.owner,
            self.repo
        )
    }
}

/// How to find and link Jira issues.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Jira {
    /// The URL to your Atlassian instance running Jira
    pub(crate) url: Option<String>,
    /// Only keep references to these project keys
    #[serde(default)]
    pub(crate) projects: Vec<String>,
    /// A regex to use instead of the default issue key pattern
    pub(crate) pattern: Option<String>,
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error("Invalid config file: {message}")]
    #[diagnostic(
        code(config::toml),
        help("Check the TOML is valid and only uses the `azure`, `github`, `jira`, `builds` and `output` keys.")
    )]
    Toml {
        message: String,
        #[source_code]
        source_code: NamedSource,
        #[label("{message}")]
        span: Option<SourceSpan>,
    },
    #[error("Invalid config file {path}: {source}")]
    #[diagnostic(
        code(config::json),
        help("Check the JSON is valid and only uses the `azure`, `github`, `jira`, `builds` and `output` keys.")
    )]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
