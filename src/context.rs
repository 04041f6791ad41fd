use crate::traits::{Output, TerminalOutput};
use crate::variables::{DefaultProviderRegistry, ProviderRegistry};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub output: Arc<dyn Output>,
    pub providers: Arc<dyn ProviderRegistry>,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new() -> Self {
        Self {
            output: Arc::new(TerminalOutput),
            providers: Arc::new(DefaultProviderRegistry),
        }
    }

    /// Create a test context with specific mock implementations
    #[cfg(test)]
    pub fn test_with(output: Arc<dyn Output>, providers: Arc<dyn ProviderRegistry>) -> Self {
        Self { output, providers }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
