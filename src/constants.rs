//! Constants used throughout gotter

/// Text rendered for a null value by `print` and `printf`
pub const NIL_TEXT: &str = "<nil>";

/// Name given to inline templates that have no file path
pub const INLINE_TEMPLATE_NAME: &str = "";

/// Deepest nesting of parenthesised pipelines a template may use
pub const MAX_EXPRESSION_DEPTH: usize = 10_000;

/// Largest width or precision `printf` accepts
pub const MAX_FORMAT_WIDTH: usize = 1_000_000;

/// Template action delimiters
pub mod delimiters {
    pub const LEFT: &str = "{{";
    pub const RIGHT: &str = "}}";
    pub const LEFT_COMMENT: &str = "/*";
    pub const RIGHT_COMMENT: &str = "*/";
}

/// Stack sizing for recursion over nested data and templates
pub mod stack {
    /// Remaining stack below which a recursive step switches to a new segment
    pub const RED_ZONE: usize = 64 * 1024;
    /// Size of each new stack segment
    pub const SEGMENT: usize = 1024 * 1024;
    /// Nesting up to which the engine runs on the caller's stack
    pub const SHALLOW_DEPTH: usize = 256;
    /// Stack reserved per nesting level beyond [`SHALLOW_DEPTH`]
    pub const PER_LEVEL: usize = 4 * 1024;
}

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Exit codes
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
