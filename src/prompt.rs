use inquire::{InquireError, Password};
use miette::Diagnostic;

/// Ask for a secret value without echoing it.
pub(crate) fn get_input(prompt: &str) -> Result<String, Error> {
    Password::new(prompt)
        .with_display_toggle_enabled()
        .without_confirmation()
        .prompt()
        .map_err(Error)
}

#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("Failed to get user input")]
#[diagnostic(
    code(prompt),
    help("A value was required but none was provided. Try running again, or pass it with a flag or environment variable.")
)]
pub(crate) struct Error(#[from] InquireError);
