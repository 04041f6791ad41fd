//! AWS Secrets Manager variable provider.

use super::provider::{TemplateVariables, VariableProvider, parse_variables};
use crate::config::SECRETS_MANAGER;
use crate::error::{RenderError, RenderResult};
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
#[cfg(test)]
use std::sync::Mutex;

/// Retrieves the raw string payload of a secret.
///
/// Separated from the provider so payload handling can be tested without a
/// network round trip.
pub trait SecretFetcher: Send + Sync {
    fn get_secret_string(&self, secret_id: &str) -> RenderResult<String>;
}

/// Fetches secrets with the AWS SDK using the default credential chain.
///
/// The chain covers environment variables, shared profiles (including SSO
/// profiles and `credential_process`), web identity and instance metadata.
///
/// The SDK is async; each fetch drives it to completion on a private
/// current-thread runtime so the rest of the program stays synchronous.
pub struct AwsSecretFetcher {
    region: String,
}

impl AwsSecretFetcher {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

impl SecretFetcher for AwsSecretFetcher {
    fn get_secret_string(&self, secret_id: &str) -> RenderResult<String> {
        let fetch_error = |message: String| RenderError::SecretFetch {
            secret_id: secret_id.to_string(),
            message,
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| fetch_error(format!("Failed to load AWS configuration: {}", e)))?;

        runtime.block_on(async {
            let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(Region::new(self.region.clone()))
                .load()
                .await;
            let client = Client::new(&config);

            let response = client
                .get_secret_value()
                .secret_id(secret_id)
                .send()
                .await
                .map_err(|e| fetch_error(format!("{}", DisplayErrorContext(&e))))?;

            let secret = response.secret_string().ok_or_else(|| {
                RenderError::SecretPayload(
                    "secret has no string value (it may be binary)".to_string(),
                )
            })?;

            Ok::<String, RenderError>(secret.to_string())
        })
    }
}

/// AWS Secrets Manager provider.
///
/// The secret's string value must be a JSON object; its top-level keys become
/// the template variables.
pub struct SecretsManagerProvider {
    secret_id: String,
    fetcher: Box<dyn SecretFetcher>,
}

impl SecretsManagerProvider {
    /// Create a provider backed by the AWS SDK for the given region.
    pub fn new(secret_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self::with_fetcher(secret_id, Box::new(AwsSecretFetcher::new(region)))
    }

    /// Create a provider with a custom fetcher
    pub fn with_fetcher(secret_id: impl Into<String>, fetcher: Box<dyn SecretFetcher>) -> Self {
        Self {
            secret_id: secret_id.into(),
            fetcher,
        }
    }
}

impl VariableProvider for SecretsManagerProvider {
    fn get_type(&self) -> &str {
        SECRETS_MANAGER
    }

    fn fetch(&self) -> RenderResult<TemplateVariables> {
        let payload = self.fetcher.get_secret_string(&self.secret_id)?;
        parse_variables(&payload)
    }
}

/// Mock fetcher for testing (returns a canned payload and records requests)
#[cfg(test)]
pub struct MockSecretFetcher {
    response: Result<String, String>,
    requests: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSecretFetcher {
    /// Respond to every request with this payload
    pub fn with_payload(payload: &str) -> Self {
        Self {
            response: Ok(payload.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request with this message
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Secret identifiers requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SecretFetcher for MockSecretFetcher {
    fn get_secret_string(&self, secret_id: &str) -> RenderResult<String> {
        self.requests.lock().unwrap().push(secret_id.to_string());
        self.response
            .clone()
            .map_err(|message| RenderError::SecretFetch {
                secret_id: secret_id.to_string(),
                message,
            })
    }
}

#[cfg(test)]
impl SecretFetcher for std::sync::Arc<MockSecretFetcher> {
    fn get_secret_string(&self, secret_id: &str) -> RenderResult<String> {
        self.as_ref().get_secret_string(secret_id)
    }
}
