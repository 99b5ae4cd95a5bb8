//! Rendering front end: the function library, the engine that binds it to
//! templates, and the observer hooks.

mod engine;
pub mod funcs;
mod interface;
pub mod observer;

pub use engine::Engine;
pub use funcs::{FunctionLibrary, FuncResult};
pub use interface::TemplateRenderer;
pub use observer::{LogObserver, NoopObserver, Observer};
