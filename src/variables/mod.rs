//! Template variable sources.
//!
//! A source produces the key-value mapping a template is rendered against.
//! AWS Secrets Manager is the only source; new ones plug in as another
//! [`provider::VariableProvider`] behind the registry.

pub mod provider;
mod registry;
mod secrets_manager;

pub use provider::TemplateVariables;
pub use registry::{DefaultProviderRegistry, ProviderRegistry};
#[cfg(test)]
pub use registry::MockProviderRegistry;
