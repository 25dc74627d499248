//! Resolving the credentials needed to talk to Azure DevOps and GitHub.
//!
//! Values are looked up in order: command line / environment, then the config file, then (for
//! Azure DevOps only) an interactive prompt. Nothing is ever persisted.

use std::io::IsTerminal;

use log::debug;
use miette::Diagnostic;

use crate::{prompt, prompt::get_input};

pub(crate) fn get_or_prompt_for_azure_token(
    from_cli: Option<String>,
    from_config: Option<&str>,
) -> Result<String, Error> {
    if let Some(token) = first_non_empty(from_cli, from_config) {
        return Ok(token);
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::MissingToken {
            service: "Azure DevOps",
            env_var: "AZURE_DEVOPS_PAT",
        });
    }
    get_input("No Azure DevOps token found, generate a personal access token with Build (Read) scope and input it here")
        .map_err(Error::from)
}

/// GitHub allows unauthenticated reads of public repositories, so a missing token is not an error.
pub(crate) fn get_github_token(
    from_cli: Option<String>,
    from_config: Option<&str>,
) -> Option<String> {
    let token = first_non_empty(from_cli, from_config);
    if token.is_none() {
        debug!("No GitHub token found, requests will be unauthenticated");
    }
    token
}

fn first_non_empty(from_cli: Option<String>, from_config: Option<&str>) -> Option<String> {
    from_cli
        .filter(|token| !token.trim().is_empty())
        .or_else(|| {
            from_config
                .filter(|token| !token.trim().is_empty())
                .map(String::from)
        })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("No {service} token was provided")]
    #[diagnostic(
        code(app_config::missing_token),
        help("Set the {env_var} environment variable, or add a `token` to the config file.")
    )]
    MissingToken {
        service: &'static str,
        env_var: &'static str,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] prompt::Error),
}
