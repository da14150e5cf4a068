//! Expression builders shared by the integration tests. The parser is not
//! part of this crate, so tests assemble abstract syntax directly.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use dhall_norm::syntax::*;

pub fn nat(n: u64) -> SubExpr {
    Expr::natural_lit(Natural::from(n))
}

pub fn int(n: i64) -> SubExpr {
    rc(Expr::IntegerLit(Integer::from(n)))
}

pub fn dbl(x: f64) -> SubExpr {
    rc(Expr::DoubleLit(x.into()))
}

pub fn bool_lit(b: bool) -> SubExpr {
    rc(Expr::BoolLit(b))
}

pub fn text(s: &str) -> SubExpr {
    rc(Expr::TextLit(s.to_owned().into()))
}

/// `"head${e₁}s₁${e₂}s₂…"`
pub fn text_interp(head: &str, tail: Vec<(SubExpr, &str)>) -> SubExpr {
    rc(Expr::TextLit(InterpolatedText::new(
        head.to_owned(),
        tail.into_iter().map(|(e, s)| (e, s.to_owned())).collect(),
    )))
}

pub fn var(x: &str) -> SubExpr {
    Expr::var(x)
}

pub fn var_at(x: &str, n: usize) -> SubExpr {
    rc(Expr::Var(V(x.into(), n)))
}

pub fn builtin(b: Builtin) -> SubExpr {
    Expr::builtin(b)
}

pub fn app(f: SubExpr, a: SubExpr) -> SubExpr {
    Expr::app(f, a)
}

pub fn apps(f: SubExpr, args: Vec<SubExpr>) -> SubExpr {
    args.into_iter().fold(f, app)
}

pub fn lam(x: &str, t: SubExpr, b: SubExpr) -> SubExpr {
    Expr::lam(x, t, b)
}

pub fn pi(x: &str, t: SubExpr, b: SubExpr) -> SubExpr {
    Expr::pi(x, t, b)
}

pub fn let_(x: &str, a: SubExpr, b: SubExpr) -> SubExpr {
    rc(Expr::Let(x.into(), None, a, b))
}

pub fn annot(a: SubExpr, t: SubExpr) -> SubExpr {
    rc(Expr::Annot(a, t))
}

pub fn binop(o: BinOp, l: SubExpr, r: SubExpr) -> SubExpr {
    Expr::binop(o, l, r)
}

pub fn if_(c: SubExpr, t: SubExpr, f: SubExpr) -> SubExpr {
    rc(Expr::BoolIf(c, t, f))
}

pub fn list(xs: Vec<SubExpr>) -> SubExpr {
    Expr::ne_list_lit(xs)
}

/// `[] : List t`
pub fn empty_list(t: SubExpr) -> SubExpr {
    rc(Expr::EmptyListLit(app(builtin(Builtin::List), t)))
}

pub fn some(x: SubExpr) -> SubExpr {
    Expr::some_lit(x)
}

/// `None t`
pub fn none_of(t: SubExpr) -> SubExpr {
    app(builtin(Builtin::OptionalNone), t)
}

pub fn record_lit(kvs: Vec<(&str, SubExpr)>) -> SubExpr {
    rc(Expr::RecordLit(labeled(kvs)))
}

pub fn record_ty(kts: Vec<(&str, SubExpr)>) -> SubExpr {
    rc(Expr::RecordType(labeled(kts)))
}

pub fn union_ty(kts: Vec<(&str, Option<SubExpr>)>) -> SubExpr {
    rc(Expr::UnionType(
        kts.into_iter().map(|(k, t)| (k.into(), t)).collect(),
    ))
}

pub fn merge(handlers: SubExpr, scrutinee: SubExpr) -> SubExpr {
    rc(Expr::Merge(handlers, scrutinee, None))
}

pub fn to_map(r: SubExpr) -> SubExpr {
    rc(Expr::ToMap(r, None))
}

pub fn to_map_annot(r: SubExpr, t: SubExpr) -> SubExpr {
    rc(Expr::ToMap(r, Some(t)))
}

pub fn field(e: SubExpr, k: &str) -> SubExpr {
    rc(Expr::Field(e, k.into()))
}

pub fn project(e: SubExpr, ks: Vec<&str>) -> SubExpr {
    let ks: BTreeSet<Label> = ks.into_iter().map(Label::from).collect();
    rc(Expr::Projection(e, ks))
}

fn labeled<T>(kvs: Vec<(&str, T)>) -> BTreeMap<Label, T> {
    kvs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
