use super::{
    funcs::FunctionLibrary,
    interface::TemplateRenderer,
    observer::{NoopObserver, Observer},
};
use crate::{
    constants::INLINE_TEMPLATE_NAME,
    error::Result,
    template::{self, Template},
    value::Value,
};
use std::{io, path::Path, sync::Arc};

/// Template engine binding a function library and an observer.
///
/// The engine keeps no state between calls; cloning it is cheap and clones
/// share the same library.
#[derive(Clone)]
pub struct Engine {
    /// Functions every template compiled by this engine may call
    library: Arc<FunctionLibrary>,
    /// Receives parse, execute and function events
    observer: Arc<dyn Observer>,
}

impl Engine {
    /// Creates an engine with the standard function library and no observer.
    pub fn new() -> Self {
        Self::with_library(FunctionLibrary::standard())
    }

    pub fn with_library(library: FunctionLibrary) -> Self {
        Self { library: Arc::new(library), observer: Arc::new(NoopObserver) }
    }

    /// Replaces the observer notified by this engine.
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn library(&self) -> &Arc<FunctionLibrary> {
        &self.library
    }

    /// Compiles `text` under `name`.
    pub fn parse(&self, name: &str, text: &str) -> Result<Template> {
        self.observer.parse_started(name);
        template::parse(name, text, Arc::clone(&self.library)).inspect_err(|err| {
            self.observer.parse_failed(name, text, err);
        })
    }

    /// Compiles a template file, named after its path.
    pub fn parse_file(&self, path: &Path) -> Result<Template> {
        let name = path.display().to_string();
        self.observer.parse_started(&name);
        template::parse_file(path, Arc::clone(&self.library)).inspect_err(|err| {
            self.observer.parse_failed(&name, "", err);
        })
    }

    /// Executes a compiled template, writing the output to `writer`.
    pub fn execute<W: io::Write + ?Sized>(
        &self,
        template: &Template,
        data: &Value,
        writer: &mut W,
    ) -> Result<()> {
        template::execute_observed(template, data, writer, &self.observer)
    }

    fn render_template(&self, template: &Template, data: &Value) -> Result<String> {
        let mut out = Vec::new();
        self.execute(template, data, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for Engine {
    fn render(&self, template: &str, data: &Value) -> Result<String> {
        let template = self.parse(INLINE_TEMPLATE_NAME, template)?;
        self.render_template(&template, data)
    }

    fn render_path(&self, template_path: &Path, data: &Value) -> Result<String> {
        let template = self.parse_file(template_path)?;
        self.render_template(&template, data)
    }

    fn validate(&self, template: &str) -> Result<()> {
        self.parse(INLINE_TEMPLATE_NAME, template).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;
    use test_log::test;

    #[test]
    fn renders_inline_text() {
        let engine = Engine::new();
        let data = Value::from_json_str(r#"{"name": "world"}"#).unwrap();
        assert_eq!(engine.render("Hello {{ .name | title }}!", &data).unwrap(), "Hello World!");
    }

    #[test]
    fn empty_library_keeps_builtins() {
        let engine = Engine::with_library(FunctionLibrary::empty());
        assert_eq!(engine.render("{{ print 1 2 }}", &Value::Null).unwrap(), "1 2");
        assert!(matches!(engine.validate("{{ upper . }}"), Err(Error::Parse { .. })));
    }

    #[derive(Clone, Default)]
    struct Events(Arc<Mutex<Vec<String>>>);

    impl Observer for Events {
        fn parse_failed(&self, _name: &str, text: &str, _err: &Error) {
            self.0.lock().unwrap().push(format!("parse_failed {text}"));
        }
    }

    #[test]
    fn observer_does_not_change_results() {
        let events = Events::default();
        let engine = Engine::new().with_observer(events.clone());
        assert!(engine.validate("{{ nope }}").is_err());
        assert_eq!(engine.render("ok", &Value::Null).unwrap(), "ok");
        assert_eq!(*events.0.lock().unwrap(), vec!["parse_failed {{ nope }}".to_string()]);
    }
}
