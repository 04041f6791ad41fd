pub mod renderer;

pub use renderer::TemplateRenderer;
