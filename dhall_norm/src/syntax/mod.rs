mod alpha;
mod ast;

pub use alpha::alpha_normalize;
pub use ast::*;
