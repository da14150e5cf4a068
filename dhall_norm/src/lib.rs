//! Normalization-by-evaluation core for the Dhall configuration language.
//!
//! The crate is the reduction machine of an interpreter pipeline: the parser
//! hands it abstract syntax that the type checker has already validated, and
//! it evaluates that syntax into a semantic value domain, decides judgmental
//! equality of values without rebuilding expressions, and quotes values back
//! into β-normal syntactic form.
//!
//! The pieces compose into two public operations:
//!
//! * [`normalize`] — reduce an expression to its β-normal form;
//! * [`judgmentally_equal`] — decide the language's definitional equality,
//!   including η at function type, canonically sorted record fields, and
//!   bitwise-equal `NaN`s.
//!
//! Evaluation is strict, single-threaded and purely functional: values and
//! environments are immutable trees shared through `Rc`, and a given input
//! always reduces to the same output. Ill-typed input is the caller's bug;
//! when a reduction rule meets a shape no well-typed program can produce,
//! the core aborts with a fixed internal-error message rather than guess.

mod error;

pub mod semantics;
pub mod syntax;

use semantics::{Env, Names};
use syntax::SubExpr;

pub use semantics::{conv, eval, quote, Val, ValKind};
pub use syntax::{alpha_normalize, denote, renote, shallow_denote, Expr};

/// Reduces an expression to β-normal form: strip source notes, evaluate in
/// the empty environment, and quote the resulting value back to syntax.
pub fn normalize(e: &SubExpr) -> SubExpr {
    let stripped = denote(e);
    let val = eval(&Env::new(), &stripped);
    renote(&quote(&Names::new(), &val))
}

/// Decides judgmental equality of two expressions by evaluating both and
/// comparing the resulting values under the empty environment.
pub fn judgmentally_equal(a: &SubExpr, b: &SubExpr) -> bool {
    let env = Env::new();
    let va = eval(&env, &denote(a));
    let vb = eval(&env, &denote(b));
    conv(&env, &va, &vb)
}
