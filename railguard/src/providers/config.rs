//! HTTP client configuration shared by network providers.

use crate::error::LlmError;

/// Shared HTTP client configuration.
///
/// No retry policy: a failed request surfaces to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// User agent string.
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Some(120),
            user_agent: Some(concat!("railguard/", env!("CARGO_PKG_VERSION")).to_owned()),
        }
    }
}

impl HttpClientConfig {
    /// Build a reqwest client with this configuration.
    ///
    /// # Errors
    ///
    /// Returns an internal [`LlmError`] if the TLS backend or resolver
    /// cannot be initialised.
    pub fn build_client(&self) -> Result<reqwest::Client, LlmError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, Some(120));
        assert!(
            config
                .user_agent
                .as_deref()
                .is_some_and(|ua| ua.starts_with("railguard/"))
        );
    }

    #[test]
    fn test_build_client_without_timeout() {
        let config = HttpClientConfig {
            timeout_secs: None,
            user_agent: None,
        };
        assert!(config.build_client().is_ok());
    }
}
