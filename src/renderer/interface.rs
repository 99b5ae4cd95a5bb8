use crate::{error::Result, value::Value};
use std::path::Path;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given data.
    ///
    /// # Arguments
    /// * `template` - Template source to render
    /// * `data` - Value the template is executed against
    ///
    /// # Returns
    /// * `Result<String>` - Rendered text
    fn render(&self, template: &str, data: &Value) -> Result<String>;

    /// Renders a template file with the given data.
    ///
    /// # Arguments
    /// * `template_path` - Path of the template file
    /// * `data` - Value the template is executed against
    ///
    /// # Returns
    /// * `Result<String>` - Rendered text
    fn render_path(&self, template_path: &Path, data: &Value) -> Result<String>;

    /// Compiles a template without executing it.
    ///
    /// # Arguments
    /// * `template` - Template source to check
    ///
    /// # Returns
    /// * `Result<()>` - Ok if the template compiles
    fn validate(&self, template: &str) -> Result<()>;
}
