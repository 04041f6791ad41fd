//! Validated invocation configuration.
//!
//! Command-line flags are checked once here and turned into an immutable
//! [`InvocationConfig`] that the rest of the run borrows.

use crate::Cli;
use crate::error::{RenderError, RenderResult};
use std::path::PathBuf;

/// Selector value for AWS Secrets Manager
pub const SECRETS_MANAGER: &str = "secretsmanager";

/// Where template variables come from, together with the data needed to fetch them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableSource {
    /// A JSON object stored as the string value of an AWS Secrets Manager secret
    SecretsManager { secret_id: String, region: String },
}

impl VariableSource {
    /// Selector name as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            VariableSource::SecretsManager { .. } => SECRETS_MANAGER,
        }
    }
}

/// How the rendered output reaches the destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Create or truncate the destination and stream into it
    #[default]
    Truncate,
    /// Stream into a sibling temporary file and rename it on success
    Atomic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationConfig {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub source: VariableSource,
    pub write_mode: WriteMode,
}

impl InvocationConfig {
    /// Validate raw command-line input.
    ///
    /// Checks run in a fixed order and the first failure is returned, so the
    /// reported message always names the earliest missing input.
    pub fn resolve(cli: &Cli) -> RenderResult<Self> {
        if cli.template_file.is_empty() {
            return Err(invalid("templateFile argument is required"));
        }

        if cli.output_file.is_empty() {
            return Err(invalid("outputFile argument is required"));
        }

        let source = match cli.var_source.as_str() {
            SECRETS_MANAGER => {
                if cli.secret_arn.is_empty() {
                    return Err(invalid(
                        "secretArn is required when varSource is secretsmanager",
                    ));
                }
                if cli.region.is_empty() {
                    return Err(invalid("region is required when varSource is secretsmanager"));
                }
                VariableSource::SecretsManager {
                    secret_id: cli.secret_arn.clone(),
                    region: cli.region.clone(),
                }
            }
            _ => return Err(invalid("varSource must be 'secretsmanager'")),
        };

        let write_mode = if cli.atomic_write {
            WriteMode::Atomic
        } else {
            WriteMode::Truncate
        };

        Ok(Self {
            template_path: PathBuf::from(&cli.template_file),
            output_path: PathBuf::from(&cli.output_file),
            source,
            write_mode,
        })
    }
}

fn invalid(message: &str) -> RenderError {
    RenderError::InvalidArgument(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["secret-render"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn resolve_err(args: &[&str]) -> String {
        InvocationConfig::resolve(&parse(args)).unwrap_err().to_string()
    }

    const FULL: &[&str] = &[
        "--templateFile",
        "app.yaml.hbs",
        "--outputFile",
        "app.yaml",
        "--varSource",
        "secretsmanager",
        "--secretArn",
        "myapp/config",
        "--region",
        "eu-west-1",
    ];

    #[test]
    fn test_resolve_complete_arguments() {
        let config = InvocationConfig::resolve(&parse(FULL)).unwrap();

        assert_eq!(config.template_path, PathBuf::from("app.yaml.hbs"));
        assert_eq!(config.output_path, PathBuf::from("app.yaml"));
        assert_eq!(
            config.source,
            VariableSource::SecretsManager {
                secret_id: "myapp/config".to_string(),
                region: "eu-west-1".to_string(),
            }
        );
        assert_eq!(config.source.name(), "secretsmanager");
        assert_eq!(config.write_mode, WriteMode::Truncate);
    }

    #[test]
    fn test_resolve_atomic_write() {
        let mut args = FULL.to_vec();
        args.push("--atomicWrite");
        let config = InvocationConfig::resolve(&parse(&args)).unwrap();
        assert_eq!(config.write_mode, WriteMode::Atomic);
    }

    #[test]
    fn test_template_file_required() {
        assert_eq!(
            resolve_err(&["--outputFile", "out.yaml"]),
            "templateFile argument is required"
        );
    }

    #[test]
    fn test_output_file_required() {
        assert_eq!(
            resolve_err(&["--templateFile", "in.hbs", "--varSource", "secretsmanager"]),
            "outputFile argument is required"
        );
    }

    #[test]
    fn test_var_source_defaults_to_none_and_is_rejected() {
        let cli = parse(&["--templateFile", "in.hbs", "--outputFile", "out.yaml"]);
        assert_eq!(cli.var_source, "none");
        assert_eq!(
            InvocationConfig::resolve(&cli).unwrap_err().to_string(),
            "varSource must be 'secretsmanager'"
        );
    }

    #[test]
    fn test_unknown_var_source_rejected() {
        assert_eq!(
            resolve_err(&[
                "--templateFile",
                "in.hbs",
                "--outputFile",
                "out.yaml",
                "--varSource",
                "ssm",
                "--secretArn",
                "x",
                "--region",
                "us-east-1",
            ]),
            "varSource must be 'secretsmanager'"
        );
    }

    #[test]
    fn test_secret_arn_required_for_secrets_manager() {
        assert_eq!(
            resolve_err(&[
                "--templateFile",
                "in.hbs",
                "--outputFile",
                "out.yaml",
                "--varSource",
                "secretsmanager",
                "--region",
                "us-east-1",
            ]),
            "secretArn is required when varSource is secretsmanager"
        );
    }

    #[test]
    fn test_region_required_for_secrets_manager() {
        assert_eq!(
            resolve_err(&[
                "--templateFile",
                "in.hbs",
                "--outputFile",
                "out.yaml",
                "--varSource",
                "secretsmanager",
                "--secretArn",
                "myapp/config",
            ]),
            "region is required when varSource is secretsmanager"
        );
    }

    #[test]
    fn test_validation_errors_are_invalid_argument() {
        let err = InvocationConfig::resolve(&parse(&[])).unwrap_err();
        assert!(matches!(err, RenderError::InvalidArgument(_)));
    }
}
