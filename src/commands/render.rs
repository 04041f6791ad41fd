use crate::Cli;
use crate::config::{InvocationConfig, VariableSource, WriteMode};
use crate::context::Context;
use crate::error::{RenderError, RenderResult};
use crate::template::TemplateRenderer;
use crate::writer::OutputWriter;

/// Handles a render run - validates flags, fetches variables and writes the rendered template
pub struct RenderCommand;

impl RenderCommand {
    /// Validate command-line input and execute.
    ///
    /// Nothing touches the filesystem or the network until validation passes.
    pub fn run(ctx: &Context, cli: &Cli) -> RenderResult<()> {
        let config = InvocationConfig::resolve(cli)?;
        Self::execute(ctx, &config)
    }

    /// Execute the render pipeline for a validated configuration
    pub fn execute(ctx: &Context, config: &InvocationConfig) -> RenderResult<()> {
        ctx.output.section("Render Template");
        Self::report_config(ctx, config);

        // Parse before fetching so a broken template never costs a round trip
        let renderer = TemplateRenderer::from_file(&config.template_path)?;
        ctx.output
            .dimmed(&format!("Parsed template {}", renderer.name()));

        let provider = ctx.providers.provider_for(&config.source);
        ctx.output.dimmed(&format!(
            "Fetching template variables from {}...",
            provider.get_type()
        ));
        let variables = provider.fetch()?;
        ctx.output
            .dimmed(&format!("Loaded {} template variable(s)", variables.len()));

        let writer = OutputWriter::new(&config.output_path, config.write_mode);
        if let Err(err) = writer.write_with(|out| renderer.render_to(&variables, out)) {
            if Self::may_have_partial_output(config, &err) {
                ctx.output.warning(&format!(
                    "{} may contain partial output",
                    config.output_path.display()
                ));
            }
            return Err(err);
        }

        ctx.output.blank();
        ctx.output.success(&format!(
            "Successfully rendered template to {}",
            config.output_path.display()
        ));

        Ok(())
    }

    /// Whether a failed write could have left an opened and truncated output
    /// behind. A failure to create the file never touched what was there.
    fn may_have_partial_output(config: &InvocationConfig, err: &RenderError) -> bool {
        if config.write_mode != WriteMode::Truncate || !config.output_path.exists() {
            return false;
        }

        !matches!(
            err,
            RenderError::FileSystem {
                action: "create output file",
                ..
            }
        )
    }

    /// Echo the resolved configuration. Never prints variable values.
    fn report_config(ctx: &Context, config: &InvocationConfig) {
        ctx.output
            .key_value("Template File", &config.template_path.display().to_string());
        ctx.output
            .key_value("Output File", &config.output_path.display().to_string());
        ctx.output.key_value("Variable Source", config.source.name());

        match &config.source {
            VariableSource::SecretsManager { secret_id, region } => {
                ctx.output.key_value("Secret ARN", secret_id);
                ctx.output.key_value("AWS Region", region);
            }
        }

        if config.write_mode == WriteMode::Atomic {
            ctx.output.key_value("Write Mode", "atomic");
        }
    }
}
