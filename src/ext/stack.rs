//! Stack management for recursion over arbitrarily deep data.

use crate::constants::stack::{PER_LEVEL, RED_ZONE, SEGMENT, SHALLOW_DEPTH};

/// Runs one step of a recursive walk, moving to a fresh stack segment when
/// the current one is close to exhausted.
pub fn ensure_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// Runs `f` on a stack large enough for `depth` levels of recursion in code
/// we do not control (cloning, dropping and walking inside the engine).
pub fn with_stack_for<R>(depth: usize, f: impl FnOnce() -> R) -> R {
    if depth <= SHALLOW_DEPTH {
        return f();
    }
    let size = SEGMENT.saturating_add(depth.saturating_mul(PER_LEVEL));
    stacker::grow(size, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_down(n: usize) -> usize {
        if n == 0 {
            0
        } else {
            ensure_stack(|| 1 + count_down(n - 1))
        }
    }

    #[test]
    fn deep_recursion_does_not_overflow() {
        assert_eq!(count_down(200_000), 200_000);
    }

    #[test]
    fn sized_stack_runs_closure() {
        assert_eq!(with_stack_for(1, || 7), 7);
        assert_eq!(with_stack_for(SHALLOW_DEPTH * 4, || 8), 8);
    }
}
