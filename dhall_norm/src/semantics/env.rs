use std::rc::Rc;

use crate::semantics::Val;
use crate::syntax::{Label, V};

/// The evaluation environment: a snoc-list of binder frames, innermost last.
/// Frames are shared through `Rc`; environments only ever grow, old frames
/// are never mutated.
#[derive(Debug, Clone)]
pub struct Env(Rc<EnvNode>);

#[derive(Debug)]
enum EnvNode {
    Empty,
    /// A binder whose value is abstract: conversion and quoting descend under
    /// binders by skipping, so that the bound variable evaluates to a rigid
    /// variable instead of a concrete value.
    Skip(Env, Label),
    /// A binder with a known value (a `let` or an application).
    Extend(Env, Label, Val),
}

impl Env {
    pub fn new() -> Env {
        Env(Rc::new(EnvNode::Empty))
    }

    pub fn skip(&self, x: Label) -> Env {
        Env(Rc::new(EnvNode::Skip(self.clone(), x)))
    }

    pub fn extend(&self, x: Label, v: Val) -> Env {
        Env(Rc::new(EnvNode::Extend(self.clone(), x, v)))
    }

    /// Number of frames bound to `x`, counting both `Skip` and `Extend`.
    /// Fresh rigid variables are numbered with this count so that they never
    /// shadow an existing binder of the same name.
    pub fn count(&self, x: &Label) -> usize {
        let mut node = self;
        let mut n = 0;
        loop {
            match &*node.0 {
                EnvNode::Empty => return n,
                EnvNode::Skip(rest, y) => {
                    if y == x {
                        n += 1;
                    }
                    node = rest;
                }
                EnvNode::Extend(rest, y, _) => {
                    if y == x {
                        n += 1;
                    }
                    node = rest;
                }
            }
        }
    }

    /// Resolves a variable reference to a value.
    ///
    /// Walks the frames from the innermost out, counting only frames that
    /// share the variable's name. An `Extend` hit yields the stored value; a
    /// `Skip` hit yields a rigid variable whose level is the number of
    /// same-named frames underneath it. Falling off the end means the input
    /// was ill-scoped; the reference is tolerated and marked with a negative
    /// level so it survives quoting unchanged.
    pub fn lookup(&self, var: &V) -> Val {
        let V(x, k) = var;
        let mut k = *k;
        let mut node = self;
        loop {
            match &*node.0 {
                EnvNode::Extend(rest, y, v) => {
                    if y == x {
                        if k == 0 {
                            return v.clone();
                        }
                        k -= 1;
                    }
                    node = rest;
                }
                EnvNode::Skip(rest, y) => {
                    if y == x {
                        if k == 0 {
                            return Val::rigid_var(
                                x.clone(),
                                rest.count(x) as isize,
                            );
                        }
                        k -= 1;
                    }
                    node = rest;
                }
                EnvNode::Empty => {
                    return Val::rigid_var(x.clone(), -(k as isize) - 1);
                }
            }
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

/// The name-only mirror of `Env` used by quoting: it tracks which binders are
/// in scope so rigid-variable levels can be turned back into indices.
#[derive(Debug, Clone)]
pub struct Names(Rc<NamesNode>);

#[derive(Debug)]
enum NamesNode {
    Empty,
    Bind(Names, Label),
}

impl Names {
    pub fn new() -> Names {
        Names(Rc::new(NamesNode::Empty))
    }

    pub fn bind(&self, x: Label) -> Names {
        Names(Rc::new(NamesNode::Bind(self.clone(), x)))
    }

    pub fn count(&self, x: &Label) -> usize {
        let mut node = self;
        let mut n = 0;
        loop {
            match &*node.0 {
                NamesNode::Empty => return n,
                NamesNode::Bind(rest, y) => {
                    if y == x {
                        n += 1;
                    }
                    node = rest;
                }
            }
        }
    }
}

impl Default for Names {
    fn default() -> Self {
        Names::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::ValKind;
    use crate::syntax::Natural;

    fn rigid(v: &Val) -> (String, isize) {
        match v.kind() {
            ValKind::Var(x, level) => (x.to_string(), *level),
            k => panic!("expected a rigid variable, got {:?}", k),
        }
    }

    #[test]
    fn lookup_counts_same_named_frames_only() {
        let env = Env::new()
            .skip("x".into())
            .skip("y".into())
            .skip("x".into());
        assert_eq!(rigid(&env.lookup(&V("x".into(), 0))), ("x".into(), 1));
        assert_eq!(rigid(&env.lookup(&V("x".into(), 1))), ("x".into(), 0));
        assert_eq!(rigid(&env.lookup(&V("y".into(), 0))), ("y".into(), 0));
        assert_eq!(env.count(&"x".into()), 2);
        assert_eq!(env.count(&"y".into()), 1);
    }

    #[test]
    fn lookup_resolves_extend_frames_to_values() {
        let five = ValKind::NaturalLit(Natural::from(5u32)).into_val();
        let env = Env::new().extend("x".into(), five).skip("x".into());
        assert_eq!(rigid(&env.lookup(&V("x".into(), 0))), ("x".into(), 1));
        match env.lookup(&V("x".into(), 1)).kind() {
            ValKind::NaturalLit(n) => assert_eq!(*n, Natural::from(5u32)),
            k => panic!("expected a literal, got {:?}", k),
        }
    }

    #[test]
    fn ill_scoped_references_get_negative_levels() {
        let env = Env::new().skip("x".into());
        assert_eq!(rigid(&env.lookup(&V("z".into(), 0))), ("z".into(), -1));
        assert_eq!(rigid(&env.lookup(&V("x".into(), 2))), ("x".into(), -2));
    }
}
