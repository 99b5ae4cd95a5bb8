//! Runs a compiled template against a data value.

use super::{bridge, Template};
use crate::{
    error::{Error, Result},
    ext::with_stack_for,
    renderer::observer::{NoopObserver, Observer},
    value::Value,
};
use gtmpl::Context;
use log::trace;
use std::{io, sync::Arc};

/// Executes `template` against `data`, writing the output to `writer`.
///
/// Text written before a failure stays in the writer.
pub fn execute<W: io::Write + ?Sized>(template: &Template, data: &Value, writer: &mut W) -> Result<()> {
    let observer: Arc<dyn Observer> = Arc::new(NoopObserver);
    execute_observed(template, data, writer, &observer)
}

/// Like [`execute`], reporting progress and failures to `observer`.
pub fn execute_observed<W: io::Write + ?Sized>(
    template: &Template,
    data: &Value,
    writer: &mut W,
    observer: &Arc<dyn Observer>,
) -> Result<()> {
    observer.execute_started(template.name());
    if template.source().is_empty() {
        return Ok(());
    }
    let depth = data.depth().saturating_add(template.nesting);
    trace!("Executing {:?} with data depth {}", template.name(), data.depth());

    let mut sink = Sink { inner: writer, failure: None };
    let (outcome, failure) = bridge::scoped(observer, || {
        with_stack_for(depth, || {
            let context = Context::from(bridge::to_go(data));
            template.inner.execute(&mut sink, &context).map_err(|err| err.to_string())
        })
    });

    let result = match (outcome, sink.failure, failure) {
        (Ok(()), _, _) => Ok(()),
        (Err(_), Some(io_err), _) => Err(Error::Sink(io_err)),
        (Err(_), None, Some(func_err)) => Err(func_err),
        (Err(message), None, None) => {
            Err(Error::Execution { name: template.name().to_string(), message })
        }
    };
    if let Err(err) = &result {
        observer.execute_failed(template.name(), data, template.source(), err);
    }
    result
}

/// Forwards output to the caller's writer, keeping the first write error so
/// it can be reported as [`Error::Sink`] rather than as an engine message.
struct Sink<'w, W: io::Write + ?Sized> {
    inner: &'w mut W,
    failure: Option<io::Error>,
}

impl<W: io::Write + ?Sized> io::Write for Sink<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(|err| self.fail(err))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf).map_err(|err| self.fail(err))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|err| self.fail(err))
    }
}

impl<W: io::Write + ?Sized> Sink<'_, W> {
    fn fail(&mut self, err: io::Error) -> io::Error {
        let copy = io::Error::new(err.kind(), err.to_string());
        self.failure.get_or_insert(err);
        copy
    }
}
