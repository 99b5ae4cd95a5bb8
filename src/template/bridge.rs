//! Glue between gotter's values and functions and the gtmpl engine.
//!
//! gtmpl functions are plain `fn` pointers, so the observer and the first
//! typed function failure of an execution travel through a thread-local call
//! scope rather than through the engine.

use super::format;
use crate::{
    error::Error,
    ext::ensure_stack,
    renderer::{
        funcs::{CallError, FuncResult},
        observer::Observer,
    },
    value::{Number, Value},
};
use gtmpl::{Func, FuncError, Value as GoValue};
use log::trace;
use std::{cell::RefCell, collections::HashMap, sync::Arc};

/// Converts a value into the engine's representation. Maps and objects both
/// become field bags so a missing key is an execution error.
pub(crate) fn to_go(value: &Value) -> GoValue {
    ensure_stack(|| match value {
        Value::Null => GoValue::Nil,
        Value::Bool(b) => GoValue::Bool(*b),
        Value::Number(Number::Int(i)) => GoValue::from(*i),
        Value::Number(Number::Float(f)) => GoValue::from(*f),
        Value::String(s) => GoValue::String(s.clone()),
        Value::List(items) => GoValue::Array(items.iter().map(to_go).collect()),
        Value::Map(entries) | Value::Object(entries) => GoValue::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), to_go(value)))
                .collect::<HashMap<_, _>>(),
        ),
    })
}

/// Converts an engine value back. Functions and "no value" become null.
pub(crate) fn from_go(value: &GoValue) -> Value {
    ensure_stack(|| match value {
        GoValue::Bool(b) => Value::Bool(*b),
        GoValue::String(s) => Value::String(s.clone()),
        GoValue::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        GoValue::Array(items) => Value::List(items.iter().map(from_go).collect()),
        GoValue::Map(entries) | GoValue::Object(entries) => Value::Map(
            entries.iter().map(|(key, value)| (key.clone(), from_go(value))).collect(),
        ),
        _ => Value::Null,
    })
}

struct CallScope {
    observer: Arc<dyn Observer>,
    failure: Option<Error>,
}

thread_local! {
    static SCOPES: RefCell<Vec<CallScope>> = const { RefCell::new(Vec::new()) };
}

struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| scopes.borrow_mut().pop());
    }
}

/// Runs `f` with `observer` receiving function events. Returns the result of
/// `f` and the first function failure raised while it ran.
pub(crate) fn scoped<R>(observer: &Arc<dyn Observer>, f: impl FnOnce() -> R) -> (R, Option<Error>) {
    SCOPES.with(|scopes| {
        scopes
            .borrow_mut()
            .push(CallScope { observer: Arc::clone(observer), failure: None })
    });
    let guard = ScopeGuard;
    let result = f();
    let failure =
        SCOPES.with(|scopes| scopes.borrow_mut().last_mut().and_then(|scope| scope.failure.take()));
    drop(guard);
    (result, failure)
}

fn current_observer() -> Option<Arc<dyn Observer>> {
    SCOPES.with(|scopes| scopes.borrow().last().map(|scope| Arc::clone(&scope.observer)))
}

fn record_failure(name: &str, err: Error) {
    if let Some(observer) = current_observer() {
        observer.function_failed(name, &err);
    }
    SCOPES.with(|scopes| {
        if let Some(scope) = scopes.borrow_mut().last_mut() {
            scope.failure.get_or_insert(err);
        }
    });
}

pub(crate) fn func_error(message: impl Into<String>) -> FuncError {
    anyhow::anyhow!(message.into()).into()
}

/// Calls a library function on engine values.
pub(crate) fn invoke(
    name: &'static str,
    arity: usize,
    call: fn(&[&Value]) -> FuncResult,
    args: &[GoValue],
) -> Result<GoValue, FuncError> {
    let args: Vec<Value> = args.iter().map(from_go).collect();
    let refs: Vec<&Value> = args.iter().collect();
    if let Some(observer) = current_observer() {
        observer.function_called(name, &refs);
    }
    if refs.len() != arity {
        return Err(func_error(format!(
            "wrong number of args for {name}: want {arity} got {}",
            refs.len()
        )));
    }
    match call(&refs) {
        Ok(value) => Ok(to_go(&value)),
        Err(CallError::Argument(message)) => {
            Err(func_error(format!("error calling {name}: {message}")))
        }
        Err(CallError::Func(err)) => {
            let message = format!("error calling {name}: {err}");
            trace!("{message}");
            record_failure(name, Error::from_func(name, err));
            Err(func_error(message))
        }
    }
}

/// Replacements for the engine's print family, rendering with Go's `%v`
/// rules (maps with sorted keys).
pub(crate) const FORMATTERS: [(&str, Func); 3] =
    [("print", go_print), ("printf", go_printf), ("println", go_println)];

fn with_values(args: &[GoValue], render: impl FnOnce(&[&Value]) -> String) -> GoValue {
    let values: Vec<Value> = args.iter().map(from_go).collect();
    let refs: Vec<&Value> = values.iter().collect();
    GoValue::String(render(&refs))
}

fn go_print(args: &[GoValue]) -> Result<GoValue, FuncError> {
    Ok(with_values(args, format::sprint))
}

fn go_println(args: &[GoValue]) -> Result<GoValue, FuncError> {
    Ok(with_values(args, format::sprintln))
}

fn go_printf(args: &[GoValue]) -> Result<GoValue, FuncError> {
    match args.split_first() {
        Some((GoValue::String(format), rest)) => {
            Ok(with_values(rest, |values| format::sprintf(format, values)))
        }
        Some(_) => Err(func_error("error calling printf: format must be a string")),
        None => Err(func_error("wrong number of args for printf: want at least 1 got 0")),
    }
}
