use std::collections::BTreeMap;

use crate::semantics::{Env, Val, ValKind};
use crate::syntax::{InterpolatedTextContents, Label};

/// Decides judgmental equality of two values without rebuilding expressions.
///
/// The environment is only used for name counting: descending under a binder
/// extends it with a `Skip` so that the fresh rigid variable standing for the
/// bound one cannot collide with anything already in scope.
pub fn conv(env: &Env, l: &Val, r: &Val) -> bool {
    use ValKind::*;
    match (l.kind(), r.kind()) {
        (Const(c), Const(c2)) => c == c2,
        (Var(x, i), Var(x2, i2)) => x == x2 && i == i2,
        (BoolLit(b), BoolLit(b2)) => b == b2,
        (NaturalLit(n), NaturalLit(n2)) => n == n2,
        (IntegerLit(n), IntegerLit(n2)) => n == n2,
        // NaiveDouble equality is bitwise: NaN converts to NaN.
        (DoubleLit(d), DoubleLit(d2)) => d == d2,

        // Two syntactic functions are convertible iff their bodies are, after
        // instantiating both with the same rigid variable. A function against
        // an arbitrary head is η: apply the head to that variable.
        (Lam(_, cl), Lam(_, cl2)) => {
            let (v, env) = fresh(env, cl.name());
            conv(&env, &cl.apply(v.clone()), &cl2.apply(v))
        }
        (Lam(_, cl), _) => {
            let (v, env) = fresh(env, cl.name());
            conv(&env, &cl.apply(v.clone()), &r.app(v))
        }
        (_, Lam(_, cl)) => {
            let (v, env) = fresh(env, cl.name());
            conv(&env, &l.app(v.clone()), &cl.apply(v))
        }
        (Pi(a, b), Pi(a2, b2)) => {
            conv(env, a, a2) && {
                let (v, env) = fresh(env, b.name());
                conv(&env, &b.apply(v.clone()), &b2.apply(v))
            }
        }

        (AppliedBuiltin(bc), AppliedBuiltin(bc2)) => {
            bc.builtin() == bc2.builtin()
                && eq_list_by(env, bc.args(), bc2.args())
        }
        (App(f, a), App(f2, a2)) => conv(env, f, f2) && conv(env, a, a2),

        (BoolAnd(a, b), BoolAnd(a2, b2))
        | (BoolOr(a, b), BoolOr(a2, b2))
        | (BoolEQ(a, b), BoolEQ(a2, b2))
        | (BoolNE(a, b), BoolNE(a2, b2))
        | (NaturalPlus(a, b), NaturalPlus(a2, b2))
        | (NaturalTimes(a, b), NaturalTimes(a2, b2))
        | (ListAppend(a, b), ListAppend(a2, b2))
        | (Combine(a, b), Combine(a2, b2))
        | (CombineTypes(a, b), CombineTypes(a2, b2))
        | (Prefer(a, b), Prefer(a2, b2))
        | (Equivalence(a, b), Equivalence(a2, b2)) => {
            conv(env, a, a2) && conv(env, b, b2)
        }
        (BoolIf(c, t, f), BoolIf(c2, t2, f2)) => {
            conv(env, c, c2) && conv(env, t, t2) && conv(env, f, f2)
        }

        (TextLit(tl), TextLit(tl2)) => {
            use InterpolatedTextContents::{Expr, Text};
            tl.iter().count() == tl2.iter().count()
                && tl.iter().zip(tl2.iter()).all(|pair| match pair {
                    (Text(s), Text(s2)) => s == s2,
                    (Expr(v), Expr(v2)) => conv(env, v, v2),
                    _ => false,
                })
        }

        (EmptyListLit(t), EmptyListLit(t2)) => conv(env, t, t2),
        (NEListLit(xs), NEListLit(xs2)) => eq_list_by(env, xs, xs2),
        (EmptyOptionalLit(t), EmptyOptionalLit(t2)) => conv(env, t, t2),
        (NEOptionalLit(v), NEOptionalLit(v2)) => conv(env, v, v2),

        (RecordType(m), RecordType(m2)) | (RecordLit(m), RecordLit(m2)) => {
            eq_maps_by(m, m2, |v, v2| conv(env, v, v2))
        }
        (UnionType(m), UnionType(m2)) => {
            eq_maps_by(m, m2, |t, t2| eq_option_by(env, t, t2))
        }
        (UnionConstructor(k, m), UnionConstructor(k2, m2)) => {
            k == k2 && eq_maps_by(m, m2, |t, t2| eq_option_by(env, t, t2))
        }
        (UnionLit(k, v, m), UnionLit(k2, v2, m2)) => {
            k == k2
                && conv(env, v, v2)
                && eq_maps_by(m, m2, |t, t2| eq_option_by(env, t, t2))
        }

        // The type annotations on merge/toMap are determined by the other
        // arguments for well-typed input and do not affect equality.
        (Merge(h, u, _), Merge(h2, u2, _)) => {
            conv(env, h, h2) && conv(env, u, u2)
        }
        (ToMap(t, _), ToMap(t2, _)) => conv(env, t, t2),
        (Field(t, k), Field(t2, k2)) => k == k2 && conv(env, t, t2),
        (Project(t, ks), Project(t2, ks2)) => ks == ks2 && conv(env, t, t2),
        (ProjectByType(t, ty), ProjectByType(t2, ty2)) => {
            conv(env, t, t2) && conv(env, ty, ty2)
        }
        (Assert(t), Assert(t2)) => conv(env, t, t2),

        _ => false,
    }
}

/// A rigid variable standing for the binder named `x`, numbered past every
/// same-named frame already in scope, plus the extended environment to
/// compare the bodies under.
fn fresh(env: &Env, x: &Label) -> (Val, Env) {
    let v = Val::rigid_var(x.clone(), env.count(x) as isize);
    (v, env.skip(x.clone()))
}

fn eq_list_by(env: &Env, xs: &[Val], ys: &[Val]) -> bool {
    xs.len() == ys.len()
        && xs.iter().zip(ys.iter()).all(|(x, y)| conv(env, x, y))
}

fn eq_maps_by<T>(
    m1: &BTreeMap<Label, T>,
    m2: &BTreeMap<Label, T>,
    mut eq: impl FnMut(&T, &T) -> bool,
) -> bool {
    m1.len() == m2.len()
        && m1
            .iter()
            .zip(m2.iter())
            .all(|((k1, v1), (k2, v2))| k1 == k2 && eq(v1, v2))
}

fn eq_option_by(env: &Env, l: &Option<Val>, r: &Option<Val>) -> bool {
    match (l, r) {
        (None, None) => true,
        (Some(l), Some(r)) => conv(env, l, r),
        _ => false,
    }
}
