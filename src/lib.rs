use std::{io::stdout, path::PathBuf};

use clap::{arg, command, value_parser, ArgAction, ArgMatches, Command};
use env_logger::Env;
use miette::{Diagnostic, IntoDiagnostic, Result};

use crate::{build_number::BuildNumber, config::Config, workflow::Inputs};

mod app_config;
mod build_number;
mod commit;
mod config;
mod dry_run;
mod fs;
mod integrations;
mod issues;
mod prompt;
mod report;
mod workflow;

/// Parse the command line, then generate (or preview) the report.
///
/// ## Errors
/// Any failure along the way is returned as a diagnostic and no report is written.
pub fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let inputs = resolve_inputs(&matches)?;
    let mut dry_run_stdout = if matches.get_flag("dry-run") {
        let stdout: Box<dyn std::io::Write> = Box::new(stdout());
        Some(stdout)
    } else {
        None
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    runtime.block_on(workflow::run(inputs, &mut dry_run_stdout))?;
    Ok(())
}

fn build_cli() -> Command {
    command!()
        .arg(
            arg!([FROM_BUILD] "The older build number to compare from")
                .value_parser(value_parser!(String))
                .requires("TO_BUILD"),
        )
        .arg(
            arg!([TO_BUILD] "The newer build number to compare to")
                .value_parser(value_parser!(String)),
        )
        .arg(
            arg!(-c --config <PATH> "The config file to load, `.json` files are parsed as JSON")
                .value_parser(value_parser!(PathBuf))
                .default_value(Config::DEFAULT_PATH),
        )
        .arg(
            arg!(-o --output <PATH> "Where to write the Markdown report")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--"azure-token" <TOKEN> "Azure DevOps personal access token")
                .env("AZURE_DEVOPS_PAT")
                .hide_env_values(true),
        )
        .arg(
            arg!(--"github-token" <TOKEN> "GitHub token with read access to the repository")
                .env("GITHUB_TOKEN")
                .hide_env_values(true),
        )
        .arg(
            arg!(--"azure-url" <URL> "Override the Azure DevOps base URL")
                .env("AZURE_DEVOPS_URL"),
        )
        .arg(
            arg!(--"github-api-url" <URL> "Override the GitHub API base URL")
                .env("GITHUB_API_URL"),
        )
        .arg(
            arg!(--"dry-run" "Print the report to stdout instead of writing it")
                .action(ArgAction::SetTrue),
        )
        .arg(arg!(-v --verbose "Log every request").action(ArgAction::SetTrue))
}

/// `RUST_LOG` always wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn resolve_inputs(matches: &ArgMatches) -> Result<Inputs> {
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(Config::DEFAULT_PATH));
    let mut config = Config::load(&config_path)?;
    if let Some(url) = matches.get_one::<String>("azure-url") {
        config.azure.url = url.clone();
    }
    if let Some(url) = matches.get_one::<String>("github-api-url") {
        config.github.api_url = url.clone();
    }

    let (from, to) = build_numbers(matches, &config)?;

    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| report::default_output_path(&config_path, &from, &to));

    let azure_token = app_config::get_or_prompt_for_azure_token(
        matches.get_one::<String>("azure-token").cloned(),
        config.azure.token.as_deref(),
    )?;
    let github_token = app_config::get_github_token(
        matches.get_one::<String>("github-token").cloned(),
        config.github.token.as_deref(),
    );

    Ok(Inputs {
        config,
        from,
        to,
        azure_token,
        github_token,
        output,
    })
}

/// From the command line if given, otherwise from the config file.
fn build_numbers(matches: &ArgMatches, config: &Config) -> Result<(BuildNumber, BuildNumber)> {
    let from_cli = matches
        .get_one::<String>("FROM_BUILD")
        .zip(matches.get_one::<String>("TO_BUILD"));
    let (from, to) = match (from_cli, config.builds.as_slice()) {
        (Some((from, to)), _) => (from.as_str(), to.as_str()),
        (None, [from, to]) => (from.as_str(), to.as_str()),
        (None, builds) => return Err(BuildCountError { found: builds.len() }.into()),
    };
    Ok((from.parse()?, to.parse()?))
}

#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("Exactly two build numbers are required, but {found} were configured")]
#[diagnostic(
    code(builds),
    help("Pass two build numbers on the command line, or set `builds = [\"1.0.1\", \"1.0.2\"]` in the config file.")
)]
struct BuildCountError {
    found: usize,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(builds: &[&str]) -> Config {
        let toml = format!(
            "builds = {builds:?}\n[azure]\norganization = \"acme\"\nproject = \"widgets\"\n[github]\nowner = \"acme\"\nrepo = \"widgets\"\n"
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Config::DEFAULT_PATH);
        std::fs::write(&path, toml).unwrap();
        Config::load(&path).unwrap()
    }

    fn parse(args: &[&str], config: &Config) -> Result<(BuildNumber, BuildNumber)> {
        let matches = build_cli()
            .try_get_matches_from(["commit-report"].iter().chain(args))
            .unwrap();
        build_numbers(&matches, config)
    }

    #[test]
    fn command_line_builds_win() {
        let (from, to) = parse(&["2.0.0", "2.1.0"], &config(&["1.0.1", "1.0.2"])).unwrap();
        assert_eq!((from.as_str(), to.as_str()), ("2.0.0", "2.1.0"));
    }

    #[test]
    fn config_builds_are_the_fallback() {
        let (from, to) = parse(&[], &config(&["1.0.1", "1.0.2"])).unwrap();
        assert_eq!((from.as_str(), to.as_str()), ("1.0.1", "1.0.2"));
    }

    #[test]
    fn exactly_two_builds_are_required() {
        assert!(parse(&[], &config(&[])).is_err());
        assert!(parse(&[], &config(&["1.0.1", "1.0.2", "1.0.3"])).is_err());
    }

    #[test]
    fn invalid_build_number_is_an_error() {
        assert!(parse(&[], &config(&["1.0.1", ""])).is_err());
    }

    #[test]
    fn one_positional_build_is_rejected() {
        let result = build_cli().try_get_matches_from(["commit-report", "1.0.1"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }
}
