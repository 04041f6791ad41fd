use std::fmt;
use std::path::PathBuf;

/// Error types for a render run.
///
/// Every variant is terminal: the first one raised stops the run and is
/// reported verbatim by the binary before it exits non-zero.
#[derive(Debug)]
pub enum RenderError {
    /// A command-line input failed validation
    InvalidArgument(String),

    /// The secret store could not be reached, authenticated against, or queried
    SecretFetch { secret_id: String, message: String },

    /// The secret payload was missing, not JSON, or not a JSON object
    SecretPayload(String),

    /// The template source could not be parsed
    TemplateParse { template: String, message: String },

    /// The template referenced a variable that is not defined
    MissingVariable {
        template: String,
        variable: String,
        message: String,
    },

    /// Any other failure while executing the template
    TemplateRender { template: String, message: String },

    /// Reading the template or creating/writing the output failed
    FileSystem {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidArgument(msg) => write!(f, "{}", msg),
            RenderError::SecretFetch { secret_id, message } => {
                write!(f, "Failed to get secret value for '{}': {}", secret_id, message)
            }
            RenderError::SecretPayload(msg) => {
                write!(f, "Failed to parse secret JSON: {}", msg)
            }
            RenderError::TemplateParse { template, message } => {
                write!(f, "Failed to parse template file {}: {}", template, message)
            }
            RenderError::MissingVariable {
                template,
                variable,
                message,
            } => {
                write!(
                    f,
                    "Template execution failed - missing key in template variables: '{}' is not defined in {} ({})",
                    variable, template, message
                )
            }
            RenderError::TemplateRender { template, message } => {
                write!(f, "Failed to execute template {}: {}", template, message)
            }
            RenderError::FileSystem {
                action,
                path,
                source,
            } => {
                write!(f, "Failed to {} {}: {}", action, path.display(), source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::SecretPayload(err.to_string())
    }
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_is_reported_verbatim() {
        let err = RenderError::InvalidArgument("templateFile argument is required".to_string());
        assert_eq!(err.to_string(), "templateFile argument is required");
    }

    #[test]
    fn test_missing_variable_names_the_key() {
        let err = RenderError::MissingVariable {
            template: "config.yaml.hbs".to_string(),
            variable: "missing".to_string(),
            message: "strict mode".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("'missing' is not defined"));
        assert!(text.contains("config.yaml.hbs"));
    }

    #[test]
    fn test_file_system_error_exposes_source() {
        use std::error::Error;

        let err = RenderError::FileSystem {
            action: "create output file",
            path: PathBuf::from("/nope/out.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert!(err.to_string().starts_with("Failed to create output file /nope/out.yaml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_json_error_converts_to_payload_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: RenderError = json_err.into();
        assert!(matches!(err, RenderError::SecretPayload(_)));
        assert!(err.to_string().starts_with("Failed to parse secret JSON"));
    }
}
