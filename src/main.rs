mod commands;
mod config;
mod context;
mod error;
mod output;
mod template;
mod traits;
mod variables;
mod writer;

use anyhow::Result;
use clap::Parser;
use commands::RenderCommand;
use context::Context;

const TEMPLATE_SYNTAX_HELP: &str = "\
Templates use Handlebars syntax. Top-level secret keys are referenced by name:
  {{app}}                           (Go-style {{.app}} is not accepted)
  {{db.host}}                       nested value
  {{#if tls}}...{{else}}...{{/if}}  conditional
  {{#each hosts}}{{this}}{{/each}}  iteration
Every referenced variable, including in conditions, must be defined in the secret.";

#[derive(Parser, Debug)]
#[command(name = "secret-render")]
#[command(about = "Render a template with variables fetched from AWS Secrets Manager", long_about = None)]
#[command(version)]
#[command(after_help = TEMPLATE_SYNTAX_HELP)]
pub struct Cli {
    /// The template file to use
    #[arg(long = "templateFile", env = "SECRET_RENDER_TEMPLATE_FILE", default_value = "")]
    pub template_file: String,

    /// The output file to write
    #[arg(long = "outputFile", env = "SECRET_RENDER_OUTPUT_FILE", default_value = "")]
    pub output_file: String,

    /// Source of template variables (secretsmanager)
    #[arg(long = "varSource", env = "SECRET_RENDER_VAR_SOURCE", default_value = "none")]
    pub var_source: String,

    /// ARN or alias of the AWS Secrets Manager secret
    #[arg(long = "secretArn", env = "SECRET_RENDER_SECRET_ARN", default_value = "")]
    pub secret_arn: String,

    /// AWS region for the service
    #[arg(long = "region", env = "SECRET_RENDER_REGION", default_value = "")]
    pub region: String,

    /// Render into a temporary file and move it over the output only on success
    #[arg(long = "atomicWrite", env = "SECRET_RENDER_ATOMIC_WRITE")]
    pub atomic_write: bool,
}

fn run(ctx: &Context, cli: &Cli) -> Result<()> {
    RenderCommand::run(ctx, cli)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let ctx = Context::new();

    if let Err(err) = run(&ctx, &cli) {
        ctx.output.error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
