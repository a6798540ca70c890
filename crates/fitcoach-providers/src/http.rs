//! Shared plumbing: client construction and error mapping.

use fitcoach_core::provider::ProviderError;

/// Response bodies quoted in errors are cut to this many characters.
const ERROR_BODY_LIMIT: usize = 512;

pub(crate) fn build_client(provider: &'static str) -> Result<reqwest::Client, ProviderError> {
    // No request timeout: generation can take as long as the provider needs.
    reqwest::Client::builder()
        .user_agent(concat!("fitcoach/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Transport {
            provider,
            message: format!("failed to build HTTP client: {e}"),
        })
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn transport(provider: &'static str, err: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider,
        message: err.to_string(),
    }
}

pub(crate) fn invalid(provider: &'static str, message: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
        provider,
        message: message.into(),
    }
}

/// Pass a successful response through; turn anything else into
/// [`ProviderError::Status`] carrying (a prefix of) the body.
pub(crate) async fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
    tracing::warn!(provider, status = status.as_u16(), "provider request failed");
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://x/v1/", "/chat"), "http://x/v1/chat");
        assert_eq!(join_url("http://x/v1", "chat"), "http://x/v1/chat");
    }
}
