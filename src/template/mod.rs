//! Template compilation and execution for gotter
//!
//! Parsing and evaluation of the template language are delegated to gtmpl.
//! This module registers the function library with it and wraps it with:
//! - `guard`: nesting limits checked before parsing
//! - `bridge`: value conversion, function adapters and the print family
//! - `format`: Go-style `%v` and `printf` formatting
//! - `exec`: execution with observer events and typed errors

pub(crate) mod bridge;
pub mod exec;
mod format;
mod guard;

use crate::{
    constants::{stack::SHALLOW_DEPTH, INLINE_TEMPLATE_NAME},
    error::{Error, Result},
    ext::{with_stack_for, PathExt},
    ioutils::read_template,
    renderer::FunctionLibrary,
    value::Value,
};
use log::debug;
use std::{fmt, io, mem, path::Path, sync::Arc};

pub use exec::{execute, execute_observed};

/// A compiled template.
///
/// Immutable once built; the function library it was compiled against is
/// shared.
pub struct Template {
    name: String,
    source: String,
    inner: gtmpl::Template,
    /// Deepest parenthesis or block nesting in the source.
    nesting: usize,
    library: Arc<FunctionLibrary>,
}

impl Template {
    /// The name given at parse time; the path for file templates.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source text the template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn library(&self) -> &FunctionLibrary {
        &self.library
    }

    /// Executes the template, writing the output to `writer`.
    pub fn execute<W: io::Write + ?Sized>(&self, data: &Value, writer: &mut W) -> Result<()> {
        execute(self, data, writer)
    }

    /// Executes the template and collects the output into a string.
    pub fn render(&self, data: &Value) -> Result<String> {
        let mut out = Vec::new();
        self.execute(data, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("nesting", &self.nesting)
            .finish_non_exhaustive()
    }
}

impl Drop for Template {
    // Deeply nested parse trees are dropped recursively by the engine.
    fn drop(&mut self) {
        if self.nesting > SHALLOW_DEPTH {
            let inner = mem::take(&mut self.inner);
            with_stack_for(self.nesting, || drop(inner));
        }
    }
}

/// Compiles `text` into a template called `name`.
///
/// # Arguments
/// * `name` - Name used in error messages
/// * `text` - Template source
/// * `library` - Functions the template may call, in addition to the built-ins
///
/// # Returns
/// * `Result<Template>` - The compiled template or a parse error
pub fn parse(name: &str, text: &str, library: Arc<FunctionLibrary>) -> Result<Template> {
    let nesting = guard::check_nesting(name, text)?;
    let mut inner = gtmpl::Template::default();
    for (func_name, function) in library.iter() {
        inner.add_func(func_name, function.adapter);
    }
    for (func_name, func) in bridge::FORMATTERS {
        inner.add_func(func_name, func);
    }
    with_stack_for(nesting, || inner.parse(text)).map_err(|err| Error::Parse {
        name: name.to_string(),
        message: err.to_string(),
    })?;
    debug!("Parsed template {name:?} (nesting {nesting})");
    Ok(Template {
        name: name.to_string(),
        source: text.to_string(),
        inner,
        nesting,
        library,
    })
}

/// Compiles inline text under the empty name.
pub fn parse_inline(text: &str, library: Arc<FunctionLibrary>) -> Result<Template> {
    parse(INLINE_TEMPLATE_NAME, text, library)
}

/// Reads and compiles a template file. The template is named after the path.
///
/// The file must exist, must not be a directory and must not be empty; these
/// are checked in that order before the contents are read.
pub fn parse_file(path: &Path, library: Arc<FunctionLibrary>) -> Result<Template> {
    path.check_template_file()?;
    let text = read_template(path)?;
    parse(&path.to_string_lossy(), &text, library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileError;
    use std::fs;
    use tempfile::TempDir;
    use test_log::test;

    fn standard() -> Arc<FunctionLibrary> {
        Arc::new(FunctionLibrary::standard())
    }

    #[test]
    fn keeps_name_and_source() {
        let tmpl = parse("greeting", "hi {{ . }}", standard()).unwrap();
        assert_eq!(tmpl.name(), "greeting");
        assert_eq!(tmpl.source(), "hi {{ . }}");
        assert!(tmpl.library().contains("upper"));
    }

    #[test]
    fn defined_templates_are_callable() {
        let tmpl = parse("main", r#"{{define "row"}}<{{ . }}>{{end}}{{ template "row" . }}"#, standard()).unwrap();
        assert_eq!(tmpl.render(&Value::from("x")).unwrap(), "<x>");
    }

    #[test]
    fn unknown_functions_fail_to_parse() {
        assert!(matches!(
            parse("t", "{{ nope . }}", standard()),
            Err(Error::Parse { ref name, .. }) if name == "t"
        ));
        assert!(matches!(
            parse("t", "{{ upper . }}", Arc::new(FunctionLibrary::empty())),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn deep_expressions_are_rejected() {
        let text = format!("{{{{ {}1{} }}}}", "(".repeat(10_000), ")".repeat(10_000));
        let err = parse("deep", &text, standard()).unwrap_err();
        assert_eq!(err.to_string(), "template: deep: max expression depth exceeded");
    }

    #[test]
    fn parse_file_names_template_after_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.tmpl");
        fs::write(&path, "{{ upper . }}").unwrap();
        let tmpl = parse_file(&path, standard()).unwrap();
        assert_eq!(tmpl.name(), path.display().to_string());
        assert_eq!(tmpl.render(&Value::from("x")).unwrap(), "X");
    }

    #[test]
    fn parse_file_checks_preconditions() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.tmpl");
        assert!(matches!(
            parse_file(&missing, standard()),
            Err(Error::File(FileError::NotFound { .. }))
        ));
        assert!(matches!(
            parse_file(dir.path(), standard()),
            Err(Error::File(FileError::IsDirectory { .. }))
        ));
        let empty = dir.path().join("empty.tmpl");
        fs::write(&empty, "").unwrap();
        assert!(matches!(
            parse_file(&empty, standard()),
            Err(Error::File(FileError::Empty { .. }))
        ));
    }
}
