mod conv;
mod env;
mod eval;
mod quote;
mod value;

pub use conv::conv;
pub use env::{Env, Names};
pub use eval::eval;
pub(crate) use eval::apply_builtin;
pub use quote::quote;
pub use value::{BuiltinClosure, Closure, TextLit, Val, ValKind};
