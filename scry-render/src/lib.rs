// scry-render - value classification and recursive pretty rendering
// Categories are matched by an ordered rule table; rendering respects
// depth, item, and string-length limits from the configuration.

pub mod classify;
pub mod config;
pub mod render;

pub use classify::{classify, Category, Rule, RULES};
pub use config::RenderConfig;
pub use render::{Renderer, Seen};

use scry_value::Value;

/// Render a value with the given configuration.
pub fn render_value(value: &Value, config: &RenderConfig) -> String {
    Renderer::new(config).render(value)
}

/// Render a value with the default configuration.
pub fn render_with_defaults(value: &Value) -> String {
    render_value(value, &RenderConfig::default())
}
