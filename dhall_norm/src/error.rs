/// Message produced when a reduction rule encounters a shape that no
/// well-typed input can produce. Reaching it means the type checker upstream
/// (or this crate) has a bug; the evaluator makes no attempt to recover.
pub(crate) const INTERNAL_INCONSISTENCY: &str = "\
Internal error: compiler bug

Explanation: the normalizer received an expression that no well-typed program
can produce. You didn't do anything wrong; please open a bug report including
the input that triggered this message.";

/// Aborts evaluation with the internal-inconsistency message and a short
/// description of the impossible shape that was encountered.
macro_rules! internal_error {
    ($($arg:tt)*) => {
        panic!(
            "{}\n\nContext: {}",
            crate::error::INTERNAL_INCONSISTENCY,
            format_args!($($arg)*)
        )
    };
}

pub(crate) use internal_error;
