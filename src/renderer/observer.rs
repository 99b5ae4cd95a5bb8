use crate::{error::Error, value::Value};
use log::{debug, trace, warn};

/// Hooks called while templates are parsed and executed.
///
/// Every method has an empty default, so an implementation only overrides
/// the events it cares about. Observers cannot change the outcome of a call.
pub trait Observer: Send + Sync {
    fn parse_started(&self, _name: &str) {}

    /// A template failed to compile. `text` is the complete source.
    fn parse_failed(&self, _name: &str, _text: &str, _err: &Error) {}

    fn execute_started(&self, _name: &str) {}

    /// Execution failed. Receives the data and the template source so the
    /// failure can be reproduced.
    fn execute_failed(&self, _name: &str, _data: &Value, _text: &str, _err: &Error) {}

    /// A library function is about to be called with `args`.
    fn function_called(&self, _name: &str, _args: &[&Value]) {}

    fn function_failed(&self, _name: &str, _err: &Error) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Observer that reports events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn parse_started(&self, name: &str) {
        debug!("Parsing template {name:?}");
    }

    fn parse_failed(&self, name: &str, text: &str, err: &Error) {
        warn!("Failed to parse template {name:?}: {err}");
        trace!("Template source: {text}");
    }

    fn execute_started(&self, name: &str) {
        debug!("Executing template {name:?}");
    }

    fn execute_failed(&self, name: &str, data: &Value, text: &str, err: &Error) {
        warn!("Failed to execute template {name:?}: {err}");
        trace!("Template source: {text}");
        trace!("Template data: {data}");
    }

    fn function_called(&self, name: &str, args: &[&Value]) {
        trace!("Calling {name} with {} argument(s)", args.len());
    }

    fn function_failed(&self, name: &str, err: &Error) {
        debug!("Function {name} failed: {err}");
    }
}
