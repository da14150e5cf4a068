use std::collections::BTreeMap;

use crate::error::internal_error;
use crate::semantics::{Names, TextLit, Val, ValKind};
use crate::syntax::{
    rc, BinOp, Builtin, Expr, InterpolatedText, InterpolatedTextContents,
    Label, SubExpr, V,
};

/// Reifies a value back into a β-normal expression. `names` lists the binders
/// in scope, innermost last; the free variables of the result are exactly the
/// rigid variables introduced at those positions.
pub fn quote(names: &Names, v: &Val) -> SubExpr {
    use ValKind::*;
    rc(match v.kind() {
        Const(c) => Expr::Const(*c),
        Var(x, level) => {
            let n = names.count(x) as isize;
            let idx = n - 1 - level;
            if idx < 0 {
                internal_error!(
                    "rigid variable {} out of scope while quoting",
                    x
                )
            }
            Expr::Var(V(x.clone(), idx as usize))
        }

        Lam(t, cl) => {
            let x = cl.name().clone();
            let fresh = Val::rigid_var(x.clone(), names.count(&x) as isize);
            Expr::Lam(
                x.clone(),
                quote(names, t),
                quote(&names.bind(x), &cl.apply(fresh)),
            )
        }
        Pi(t, cl) => {
            let x = cl.name().clone();
            let fresh = Val::rigid_var(x.clone(), names.count(&x) as isize);
            Expr::Pi(
                x.clone(),
                quote(names, t),
                quote(&names.bind(x), &cl.apply(fresh)),
            )
        }

        AppliedBuiltin(bc) => {
            let mut e = rc(Expr::Builtin(bc.builtin()));
            for arg in bc.args() {
                e = rc(Expr::App(e, quote(names, arg)));
            }
            return e;
        }
        App(f, a) => Expr::App(quote(names, f), quote(names, a)),

        BoolLit(b) => Expr::BoolLit(*b),
        BoolAnd(l, r) => binop(BinOp::BoolAnd, names, l, r),
        BoolOr(l, r) => binop(BinOp::BoolOr, names, l, r),
        BoolEQ(l, r) => binop(BinOp::BoolEQ, names, l, r),
        BoolNE(l, r) => binop(BinOp::BoolNE, names, l, r),
        BoolIf(c, t, f) => Expr::BoolIf(
            quote(names, c),
            quote(names, t),
            quote(names, f),
        ),

        NaturalLit(n) => Expr::NaturalLit(n.clone()),
        NaturalPlus(l, r) => binop(BinOp::NaturalPlus, names, l, r),
        NaturalTimes(l, r) => binop(BinOp::NaturalTimes, names, l, r),
        IntegerLit(n) => Expr::IntegerLit(n.clone()),
        DoubleLit(d) => Expr::DoubleLit(*d),

        ValKind::TextLit(tl) => Expr::TextLit(quote_text(names, tl)),

        EmptyListLit(t) => Expr::EmptyListLit(rc(Expr::App(
            rc(Expr::Builtin(Builtin::List)),
            quote(names, t),
        ))),
        NEListLit(xs) => {
            Expr::NEListLit(xs.iter().map(|x| quote(names, x)).collect())
        }
        ListAppend(l, r) => binop(BinOp::ListAppend, names, l, r),
        EmptyOptionalLit(t) => Expr::App(
            rc(Expr::Builtin(Builtin::OptionalNone)),
            quote(names, t),
        ),
        NEOptionalLit(v) => Expr::SomeLit(quote(names, v)),

        RecordType(kts) => Expr::RecordType(
            kts.iter().map(|(k, t)| (k.clone(), quote(names, t))).collect(),
        ),
        RecordLit(kvs) => Expr::RecordLit(
            kvs.iter().map(|(k, v)| (k.clone(), quote(names, v))).collect(),
        ),
        UnionType(kts) => quote_union(names, kts),
        UnionConstructor(k, kts) => {
            Expr::Field(rc(quote_union(names, kts)), k.clone())
        }
        UnionLit(k, v, kts) => Expr::App(
            rc(Expr::Field(rc(quote_union(names, kts)), k.clone())),
            quote(names, v),
        ),

        Combine(l, r) => binop(BinOp::RecursiveRecordMerge, names, l, r),
        CombineTypes(l, r) => {
            binop(BinOp::RecursiveRecordTypeMerge, names, l, r)
        }
        Prefer(l, r) => binop(BinOp::RightBiasedRecordMerge, names, l, r),
        Merge(h, u, t) => Expr::Merge(
            quote(names, h),
            quote(names, u),
            t.as_ref().map(|t| quote(names, t)),
        ),
        ToMap(t, ty) => Expr::ToMap(
            quote(names, t),
            ty.as_ref().map(|ty| quote(names, ty)),
        ),
        Field(t, k) => Expr::Field(quote(names, t), k.clone()),
        Project(t, ks) => Expr::Projection(quote(names, t), ks.clone()),
        ProjectByType(t, ty) => {
            Expr::ProjectionByExpr(quote(names, t), quote(names, ty))
        }

        Assert(t) => Expr::Assert(quote(names, t)),
        Equivalence(l, r) => binop(BinOp::Equivalence, names, l, r),
    })
}

fn binop(op: BinOp, names: &Names, l: &Val, r: &Val) -> Expr {
    Expr::BinOp(op, quote(names, l), quote(names, r))
}

fn quote_union(names: &Names, kts: &BTreeMap<Label, Option<Val>>) -> Expr {
    Expr::UnionType(
        kts.iter()
            .map(|(k, t)| (k.clone(), t.as_ref().map(|t| quote(names, t))))
            .collect(),
    )
}

fn quote_text(names: &Names, tl: &TextLit) -> InterpolatedText<SubExpr> {
    use InterpolatedTextContents::{Expr as Interp, Text};
    let mut head = String::new();
    let mut tail: Vec<(SubExpr, String)> = Vec::new();
    for part in tl.iter() {
        match part {
            Text(s) => match tail.last_mut() {
                None => head.push_str(s),
                Some((_, suffix)) => suffix.push_str(s),
            },
            Interp(v) => tail.push((quote(names, v), String::new())),
        }
    }
    InterpolatedText::new(head, tail)
}
