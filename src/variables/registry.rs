//! Provider registry for template variable sources.
//!
//! Maps each [`VariableSource`] to the provider that can fetch it.

use super::provider::VariableProvider;
use super::secrets_manager::SecretsManagerProvider;
use crate::config::VariableSource;
#[cfg(test)]
use super::provider::TemplateVariables;
#[cfg(test)]
use crate::error::RenderResult;
#[cfg(test)]
use std::sync::Mutex;

/// Trait for building the provider that serves a variable source
pub trait ProviderRegistry: Send + Sync {
    /// Get the provider for a source
    fn provider_for(&self, source: &VariableSource) -> Box<dyn VariableProvider>;
}

/// Registry of the built-in providers, talking to the real services
pub struct DefaultProviderRegistry;

impl ProviderRegistry for DefaultProviderRegistry {
    fn provider_for(&self, source: &VariableSource) -> Box<dyn VariableProvider> {
        match source {
            VariableSource::SecretsManager { secret_id, region } => {
                Box::new(SecretsManagerProvider::new(secret_id.clone(), region.clone()))
            }
        }
    }
}

/// Mock registry for testing: every source is served from a fixed result
#[cfg(test)]
pub struct MockProviderRegistry {
    response: Result<TemplateVariables, String>,
    requested: Mutex<Vec<VariableSource>>,
}

#[cfg(test)]
impl MockProviderRegistry {
    /// Serve these variables
    pub fn with_variables(variables: TemplateVariables) -> Self {
        Self {
            response: Ok(variables),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Serve the variables parsed from a JSON payload, exactly as a secret would
    pub fn with_payload(payload: &str) -> Self {
        Self {
            response: super::provider::parse_variables(payload).map_err(|e| e.to_string()),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Sources a provider was requested for
    pub fn requested(&self) -> Vec<VariableSource> {
        self.requested.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProviderRegistry for MockProviderRegistry {
    fn provider_for(&self, source: &VariableSource) -> Box<dyn VariableProvider> {
        self.requested.lock().unwrap().push(source.clone());
        Box::new(MockVariableProvider {
            response: self.response.clone(),
        })
    }
}

#[cfg(test)]
struct MockVariableProvider {
    response: Result<TemplateVariables, String>,
}

#[cfg(test)]
impl VariableProvider for MockVariableProvider {
    fn get_type(&self) -> &str {
        "mock"
    }

    fn fetch(&self) -> RenderResult<TemplateVariables> {
        self.response
            .clone()
            .map_err(crate::error::RenderError::SecretPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_serves_secrets_manager() {
        let registry = DefaultProviderRegistry;
        let source = VariableSource::SecretsManager {
            secret_id: "myapp/config".to_string(),
            region: "us-east-1".to_string(),
        };

        let provider = registry.provider_for(&source);
        assert_eq!(provider.get_type(), "secretsmanager");
    }

    #[test]
    fn test_mock_registry_records_requests() {
        let registry = MockProviderRegistry::with_payload(r#"{"app":"demo"}"#);
        let source = VariableSource::SecretsManager {
            secret_id: "myapp/config".to_string(),
            region: "us-east-1".to_string(),
        };

        let vars = registry.provider_for(&source).fetch().unwrap();

        assert_eq!(vars["app"], "demo");
        assert_eq!(registry.requested(), vec![source]);
    }
}
