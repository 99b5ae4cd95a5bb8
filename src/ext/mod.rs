/// Extension traits and helpers for built-in Rust types.
///
/// Each extension lives in its own file:
/// - `path.rs` - Extensions for `std::path::Path`
/// - `stack.rs` - Stack growth for deep recursion
pub mod path;
pub mod stack;

pub use path::PathExt;
pub use stack::{ensure_stack, with_stack_for};
