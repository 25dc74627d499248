use std::time::Duration;

use miette::Diagnostic;
use reqwest::{Client, Response, StatusCode};

pub(crate) mod azure_devops;
pub(crate) mod github;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Covers the whole request, including reading the body of a large comparison page.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One client is shared by every request in a run.
pub(crate) fn client() -> Result<Client, ApiRequestError> {
    client_with_timeout(REQUEST_TIMEOUT)
}

fn client_with_timeout(timeout: Duration) -> Result<Client, ApiRequestError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|source| ApiRequestError::Transport {
            service: "HTTP client",
            activity: "initializing".to_string(),
            err: source.to_string(),
        })
}

/// Turn transport failures and non-success statuses into [`ApiRequestError`]s.
pub(crate) async fn handle_response(
    response: Result<Response, reqwest::Error>,
    service: &'static str,
    activity: String,
) -> Result<Response, ApiRequestError> {
    let response = response.map_err(|source| ApiRequestError::Transport {
        service,
        activity: activity.clone(),
        err: if source.is_timeout() {
            "the request timed out".to_string()
        } else {
            source.to_string()
        },
    })?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiRequestError::Unauthorized {
            service,
            activity,
            status: status.as_u16(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiRequestError::Status {
            service,
            activity,
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum ApiRequestError {
    #[error("Trouble communicating with {service} while {activity}: {err}")]
    #[diagnostic(
        code(integrations::transport),
        help("There was a problem reaching {service}, check your network connection and the configured URL.")
    )]
    Transport {
        service: &'static str,
        activity: String,
        err: String,
    },
    #[error("{service} rejected the credentials while {activity} (HTTP {status})")]
    #[diagnostic(
        code(integrations::unauthorized),
        help("Check that the {service} token is valid, has not expired, and has read access.")
    )]
    Unauthorized {
        service: &'static str,
        activity: String,
        status: u16,
    },
    #[error("{service} responded with HTTP {status} while {activity}: {body}")]
    #[diagnostic(code(integrations::status))]
    Status {
        service: &'static str,
        activity: String,
        status: u16,
        body: String,
    },
}
