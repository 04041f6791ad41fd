use crate::error::{RenderError, RenderResult};
use crate::variables::TemplateVariables;
use handlebars::{
    Handlebars, Helper, HelperResult, JsonTruthy, Output, PathAndJson, RenderContext,
    RenderError as HandlebarsError, RenderErrorReason, Renderable,
};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Renders a single template using Handlebars in strict mode.
///
/// Referencing a variable that is not in the mapping fails the render instead
/// of producing an empty string. This covers `if`/`unless` conditions and
/// helper arguments too, which Handlebars' own strict mode lets through as
/// falsy. Output is not HTML-escaped.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
    name: String,
}

impl TemplateRenderer {
    /// Read and parse a template file.
    ///
    /// The template is registered under its path, which is what error
    /// messages refer to.
    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::FileSystem {
            action: "read template file",
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_source(&path.display().to_string(), &source)
    }

    /// Parse template source registered under `name`
    pub fn from_source(name: &str, source: &str) -> RenderResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("if", Box::new(if_helper));
        handlebars.register_helper("unless", Box::new(unless_helper));
        handlebars.register_helper("eq", Box::new(eq_helper));
        handlebars.register_helper("contains", Box::new(contains_helper));

        handlebars
            .register_template_string(name, source)
            .map_err(|e| RenderError::TemplateParse {
                template: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            handlebars,
            name: name.to_string(),
        })
    }

    /// Name the template is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template, streaming into `out`
    pub fn render_to(&self, variables: &TemplateVariables, out: &mut dyn Write) -> RenderResult<()> {
        self.handlebars
            .render_to_write(&self.name, variables, out)
            .map_err(|e| self.render_error(e))
    }

    /// Render the template into a string
    #[cfg(test)]
    pub fn render(&self, variables: &TemplateVariables) -> RenderResult<String> {
        self.handlebars
            .render(&self.name, variables)
            .map_err(|e| self.render_error(e))
    }

    fn render_error(&self, err: HandlebarsError) -> RenderError {
        if let RenderErrorReason::MissingVariable(path) = err.reason() {
            return RenderError::MissingVariable {
                template: self.name.clone(),
                variable: path.clone().unwrap_or_else(|| "<unknown>".to_string()),
                message: err.to_string(),
            };
        }

        RenderError::TemplateRender {
            template: self.name.clone(),
            message: err.to_string(),
        }
    }
}

/// Get a helper argument, failing when it names a variable that is not defined
fn required_param<'a, 'rc>(
    h: &'a Helper<'rc>,
    index: usize,
    helper: &'static str,
) -> Result<&'a PathAndJson<'rc>, HandlebarsError> {
    let param = h
        .param(index)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, index))?;

    if param.is_value_missing() {
        return Err(RenderErrorReason::MissingVariable(param.relative_path().cloned()).into());
    }

    Ok(param)
}

fn condition(h: &Helper, helper: &'static str) -> Result<bool, HandlebarsError> {
    let value = required_param(h, 0, helper)?.value();
    let include_zero = h
        .hash_get("includeZero")
        .and_then(|v| v.value().as_bool())
        .unwrap_or(false);

    Ok(value.is_truthy(include_zero))
}

/// `if` block that treats an undefined condition as an error
fn if_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    hb: &'reg Handlebars<'reg>,
    ctx: &'rc handlebars::Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let template = if condition(h, "if")? {
        h.template()
    } else {
        h.inverse()
    };

    if let Some(t) = template {
        t.render(hb, ctx, rc, out)?;
    }

    Ok(())
}

/// `unless` block that treats an undefined condition as an error
fn unless_helper<'reg, 'rc>(
    h: &Helper<'rc>,
    hb: &'reg Handlebars<'reg>,
    ctx: &'rc handlebars::Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    let template = if condition(h, "unless")? {
        h.inverse()
    } else {
        h.template()
    };

    if let Some(t) = template {
        t.render(hb, ctx, rc, out)?;
    }

    Ok(())
}

/// Helper function for equality comparison
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let left = required_param(h, 0, "eq")?.value();
    let right = required_param(h, 1, "eq")?.value();

    if left == right {
        out.write("true")?;
    }

    Ok(())
}

/// Helper function to check if an array contains a value
fn contains_helper(
    h: &Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let array = required_param(h, 0, "contains")?.value().as_array();
    let search = required_param(h, 1, "contains")?.value();

    if let Some(arr) = array {
        if arr.iter().any(|item| item == search) {
            out.write("true")?;
        }
    }

    Ok(())
}
