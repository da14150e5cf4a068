use std::collections::BTreeMap;
use std::collections::BTreeSet;

use itertools::{EitherOrBoth, Itertools};
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};

use crate::error::internal_error;
use crate::semantics::{
    conv, BuiltinClosure, Closure, Env, TextLit, Val, ValKind,
};
use crate::syntax::{
    BinOp, Builtin, Expr, InterpolatedText, InterpolatedTextContents, Label,
    Natural, SubExpr,
};

/// Evaluates an expression under an environment. Every case is
/// head-normalizing: the result has a value-level head constructor, and
/// subterms may still be stuck applications mentioning rigid variables.
pub fn eval(env: &Env, expr: &Expr) -> Val {
    match expr {
        Expr::Const(c) => ValKind::Const(*c).into_val(),
        Expr::Var(v) => env.lookup(v),
        Expr::Lam(x, t, b) => ValKind::Lam(
            eval(env, t),
            Closure::new(x.clone(), env, b.clone()),
        )
        .into_val(),
        Expr::Pi(x, t, b) => ValKind::Pi(
            eval(env, t),
            Closure::new(x.clone(), env, b.clone()),
        )
        .into_val(),
        Expr::App(f, a) => eval(env, f).app(eval(env, a)),
        Expr::Let(x, _, a, b) => {
            let va = eval(env, a);
            eval(&env.extend(x.clone(), va), b)
        }
        Expr::Annot(a, _) => eval(env, a),
        Expr::Assert(t) => ValKind::Assert(eval(env, t)).into_val(),
        Expr::Builtin(b) => {
            ValKind::AppliedBuiltin(BuiltinClosure::new(*b, env.clone()))
                .into_val()
        }
        Expr::BoolLit(b) => ValKind::BoolLit(*b).into_val(),
        Expr::BoolIf(c, t, f) => {
            vbool_if(env, eval(env, c), eval(env, t), eval(env, f))
        }
        Expr::NaturalLit(n) => ValKind::NaturalLit(n.clone()).into_val(),
        Expr::IntegerLit(n) => ValKind::IntegerLit(n.clone()).into_val(),
        Expr::DoubleLit(d) => ValKind::DoubleLit(*d).into_val(),
        Expr::TextLit(chunks) => eval_text(env, chunks),
        Expr::BinOp(o, l, r) => match o {
            // The import layer resolves alternatives; by the time the core
            // runs, the left branch is the resolved one.
            BinOp::ImportAlt => eval(env, l),
            BinOp::BoolOr => vbool_or(env, eval(env, l), eval(env, r)),
            BinOp::BoolAnd => vbool_and(env, eval(env, l), eval(env, r)),
            BinOp::BoolEQ => vbool_eq(env, eval(env, l), eval(env, r)),
            BinOp::BoolNE => vbool_ne(env, eval(env, l), eval(env, r)),
            BinOp::NaturalPlus => vnatural_plus(eval(env, l), eval(env, r)),
            BinOp::NaturalTimes => vnatural_times(eval(env, l), eval(env, r)),
            BinOp::TextAppend => {
                let chunks = vec![
                    InterpolatedTextContents::Expr(eval(env, l)),
                    InterpolatedTextContents::Expr(eval(env, r)),
                ];
                textlit_to_val(TextLit::new(chunks))
            }
            BinOp::ListAppend => vlist_append(eval(env, l), eval(env, r)),
            BinOp::RecursiveRecordMerge => {
                vcombine(eval(env, l), eval(env, r))
            }
            BinOp::RecursiveRecordTypeMerge => {
                vcombine_types(eval(env, l), eval(env, r))
            }
            BinOp::RightBiasedRecordMerge => {
                vprefer(env, eval(env, l), eval(env, r))
            }
            BinOp::Equivalence => {
                ValKind::Equivalence(eval(env, l), eval(env, r)).into_val()
            }
        },
        Expr::EmptyListLit(t) => match eval(env, t).kind() {
            ValKind::AppliedBuiltin(bc)
                if bc.builtin() == Builtin::List && bc.args().len() == 1 =>
            {
                ValKind::EmptyListLit(bc.args()[0].clone()).into_val()
            }
            _ => internal_error!("empty list annotated with a non-List type"),
        },
        Expr::NEListLit(xs) => {
            ValKind::NEListLit(xs.iter().map(|x| eval(env, x)).collect())
                .into_val()
        }
        Expr::SomeLit(x) => ValKind::NEOptionalLit(eval(env, x)).into_val(),
        Expr::RecordType(kts) => ValKind::RecordType(
            kts.iter().map(|(k, t)| (k.clone(), eval(env, t))).collect(),
        )
        .into_val(),
        Expr::RecordLit(kvs) => ValKind::RecordLit(
            kvs.iter().map(|(k, v)| (k.clone(), eval(env, v))).collect(),
        )
        .into_val(),
        Expr::UnionType(kts) => ValKind::UnionType(
            kts.iter()
                .map(|(k, t)| (k.clone(), t.as_ref().map(|t| eval(env, t))))
                .collect(),
        )
        .into_val(),
        Expr::Merge(r, u, t) => vmerge(
            eval(env, r),
            eval(env, u),
            t.as_ref().map(|t| eval(env, t)),
        ),
        Expr::ToMap(r, t) => {
            vtomap(eval(env, r), t.as_ref().map(|t| eval(env, t)))
        }
        Expr::Field(r, k) => vfield(eval(env, r), k),
        Expr::Projection(r, ks) => vproject(env, eval(env, r), ks.clone()),
        Expr::ProjectionByExpr(r, t) => {
            vproject_by_type(env, eval(env, r), eval(env, t))
        }
        // `T::r` is sugar for `(T.default ⫽ r) : T.Type`; the annotation
        // does not participate in reduction.
        Expr::Completion(t, r) => {
            let t = eval(env, t);
            vprefer(env, vfield(t, &Label::from("default")), eval(env, r))
        }
        Expr::Note(_, inner) => eval(env, inner),
        Expr::Embed(v) => match *v {},
    }
}

fn eval_text(env: &Env, chunks: &InterpolatedText<SubExpr>) -> Val {
    use InterpolatedTextContents::{Expr as Interp, Text};
    let mut elts = Vec::with_capacity(1 + 2 * chunks.tail().len());
    elts.push(Text(chunks.head().to_owned()));
    for (e, s) in chunks.tail() {
        elts.push(Interp(eval(env, e)));
        elts.push(Text(s.clone()));
    }
    textlit_to_val(TextLit::new(elts))
}

/// A literal made of a single interpolation and no text collapses to the
/// interpolated value.
fn textlit_to_val(tl: TextLit) -> Val {
    match tl.as_single_expr() {
        Some(v) => v.clone(),
        None => ValKind::TextLit(tl).into_val(),
    }
}

fn vbool_and(env: &Env, l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::BoolLit(true), _) => r.clone(),
        (_, ValKind::BoolLit(true)) => l.clone(),
        (ValKind::BoolLit(false), _) | (_, ValKind::BoolLit(false)) => {
            ValKind::BoolLit(false).into_val()
        }
        _ if conv(env, &l, &r) => l.clone(),
        _ => ValKind::BoolAnd(l.clone(), r.clone()).into_val(),
    }
}

fn vbool_or(env: &Env, l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::BoolLit(false), _) => r.clone(),
        (_, ValKind::BoolLit(false)) => l.clone(),
        (ValKind::BoolLit(true), _) | (_, ValKind::BoolLit(true)) => {
            ValKind::BoolLit(true).into_val()
        }
        _ if conv(env, &l, &r) => l.clone(),
        _ => ValKind::BoolOr(l.clone(), r.clone()).into_val(),
    }
}

fn vbool_eq(env: &Env, l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::BoolLit(true), _) => r.clone(),
        (_, ValKind::BoolLit(true)) => l.clone(),
        _ if conv(env, &l, &r) => ValKind::BoolLit(true).into_val(),
        _ => ValKind::BoolEQ(l.clone(), r.clone()).into_val(),
    }
}

fn vbool_ne(env: &Env, l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::BoolLit(false), _) => r.clone(),
        (_, ValKind::BoolLit(false)) => l.clone(),
        _ if conv(env, &l, &r) => ValKind::BoolLit(false).into_val(),
        _ => ValKind::BoolNE(l.clone(), r.clone()).into_val(),
    }
}

fn vbool_if(env: &Env, c: Val, t: Val, f: Val) -> Val {
    match (c.kind(), t.kind(), f.kind()) {
        (ValKind::BoolLit(true), _, _) => t.clone(),
        (ValKind::BoolLit(false), _, _) => f.clone(),
        (_, ValKind::BoolLit(true), ValKind::BoolLit(false)) => c.clone(),
        _ if conv(env, &t, &f) => t.clone(),
        _ => ValKind::BoolIf(c.clone(), t.clone(), f.clone()).into_val(),
    }
}

fn vnatural_plus(l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::NaturalLit(n), _) if n.is_zero() => r.clone(),
        (_, ValKind::NaturalLit(n)) if n.is_zero() => l.clone(),
        (ValKind::NaturalLit(m), ValKind::NaturalLit(n)) => {
            ValKind::NaturalLit(m + n).into_val()
        }
        _ => ValKind::NaturalPlus(l.clone(), r.clone()).into_val(),
    }
}

fn vnatural_times(l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::NaturalLit(n), _) if n.is_one() => r.clone(),
        (_, ValKind::NaturalLit(n)) if n.is_one() => l.clone(),
        (ValKind::NaturalLit(n), _) | (_, ValKind::NaturalLit(n))
            if n.is_zero() =>
        {
            ValKind::NaturalLit(Natural::zero()).into_val()
        }
        (ValKind::NaturalLit(m), ValKind::NaturalLit(n)) => {
            ValKind::NaturalLit(m * n).into_val()
        }
        _ => ValKind::NaturalTimes(l.clone(), r.clone()).into_val(),
    }
}

fn vlist_append(l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::EmptyListLit(_), _) => r.clone(),
        (_, ValKind::EmptyListLit(_)) => l.clone(),
        (ValKind::NEListLit(xs), ValKind::NEListLit(ys)) => {
            let mut elts = xs.clone();
            elts.extend(ys.iter().cloned());
            ValKind::NEListLit(elts).into_val()
        }
        _ => ValKind::ListAppend(l.clone(), r.clone()).into_val(),
    }
}

/// `∧`: recursive merge of record literals. Keys present on one side only
/// are carried over; keys present on both recurse, sticking as a `Combine`
/// node if the collision is not between two records.
fn vcombine(l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::RecordLit(m), _) if m.is_empty() => r.clone(),
        (_, ValKind::RecordLit(m)) if m.is_empty() => l.clone(),
        (ValKind::RecordLit(m1), ValKind::RecordLit(m2)) => {
            let merged = m1
                .iter()
                .merge_join_by(m2.iter(), |(k1, _), (k2, _)| k1.cmp(k2))
                .map(|both| match both {
                    EitherOrBoth::Left((k, v))
                    | EitherOrBoth::Right((k, v)) => (k.clone(), v.clone()),
                    EitherOrBoth::Both((k, v1), (_, v2)) => {
                        (k.clone(), vcombine(v1.clone(), v2.clone()))
                    }
                })
                .collect();
            ValKind::RecordLit(merged).into_val()
        }
        _ => ValKind::Combine(l.clone(), r.clone()).into_val(),
    }
}

/// `⩓`: the analogous recursive merge on record types.
fn vcombine_types(l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::RecordType(m), _) if m.is_empty() => r.clone(),
        (_, ValKind::RecordType(m)) if m.is_empty() => l.clone(),
        (ValKind::RecordType(m1), ValKind::RecordType(m2)) => {
            let merged = m1
                .iter()
                .merge_join_by(m2.iter(), |(k1, _), (k2, _)| k1.cmp(k2))
                .map(|both| match both {
                    EitherOrBoth::Left((k, v))
                    | EitherOrBoth::Right((k, v)) => (k.clone(), v.clone()),
                    EitherOrBoth::Both((k, v1), (_, v2)) => {
                        (k.clone(), vcombine_types(v1.clone(), v2.clone()))
                    }
                })
                .collect();
            ValKind::RecordType(merged).into_val()
        }
        _ => ValKind::CombineTypes(l.clone(), r.clone()).into_val(),
    }
}

/// `⫽`: right-biased union of record literals.
fn vprefer(env: &Env, l: Val, r: Val) -> Val {
    match (l.kind(), r.kind()) {
        (ValKind::RecordLit(m), _) if m.is_empty() => r.clone(),
        (_, ValKind::RecordLit(m)) if m.is_empty() => l.clone(),
        (ValKind::RecordLit(m1), ValKind::RecordLit(m2)) => {
            let mut merged = m1.clone();
            for (k, v) in m2 {
                merged.insert(k.clone(), v.clone());
            }
            ValKind::RecordLit(merged).into_val()
        }
        _ if conv(env, &l, &r) => l.clone(),
        _ => ValKind::Prefer(l.clone(), r.clone()).into_val(),
    }
}

fn vmerge(handlers: Val, scrutinee: Val, ty: Option<Val>) -> Val {
    match (handlers.kind(), scrutinee.kind()) {
        (ValKind::RecordLit(m), ValKind::UnionLit(k, v, _)) => {
            match m.get(k) {
                Some(handler) => handler.app(v.clone()),
                None => internal_error!("merge handler missing label {}", k),
            }
        }
        (ValKind::RecordLit(m), ValKind::UnionConstructor(k, kts)) => {
            match kts.get(k) {
                Some(None) => match m.get(k) {
                    Some(handler) => handler.clone(),
                    None => {
                        internal_error!("merge handler missing label {}", k)
                    }
                },
                _ => internal_error!(
                    "merge on an unapplied union constructor {}",
                    k
                ),
            }
        }
        (ValKind::RecordLit(m), ValKind::NEOptionalLit(v)) => {
            match m.get(&Label::from("Some")) {
                Some(handler) => handler.app(v.clone()),
                None => internal_error!("merge handler missing label Some"),
            }
        }
        (ValKind::RecordLit(m), ValKind::EmptyOptionalLit(_)) => {
            match m.get(&Label::from("None")) {
                Some(handler) => handler.clone(),
                None => internal_error!("merge handler missing label None"),
            }
        }
        _ => {
            ValKind::Merge(handlers.clone(), scrutinee.clone(), ty).into_val()
        }
    }
}

fn vtomap(record: Val, ty: Option<Val>) -> Val {
    match record.kind() {
        ValKind::RecordLit(m) if m.is_empty() => match &ty {
            Some(t) => match t.kind() {
                ValKind::AppliedBuiltin(bc)
                    if bc.builtin() == Builtin::List
                        && bc.args().len() == 1 =>
                {
                    ValKind::EmptyListLit(bc.args()[0].clone()).into_val()
                }
                _ => internal_error!(
                    "toMap of an empty record annotated with a non-List type"
                ),
            },
            None => {
                internal_error!("toMap of an empty record needs an annotation")
            }
        },
        ValKind::RecordLit(m) => {
            let rows = m
                .iter()
                .map(|(k, v)| {
                    let mut row = BTreeMap::new();
                    row.insert(
                        Label::from("mapKey"),
                        ValKind::TextLit(TextLit::from_text(
                            k.as_str().to_owned(),
                        ))
                        .into_val(),
                    );
                    row.insert(Label::from("mapValue"), v.clone());
                    ValKind::RecordLit(row).into_val()
                })
                .collect();
            ValKind::NEListLit(rows).into_val()
        }
        _ => ValKind::ToMap(record.clone(), ty).into_val(),
    }
}

/// Field selection, including the distribution rules through `Project`,
/// `Prefer`, `Combine` and union types.
fn vfield(v: Val, k: &Label) -> Val {
    match v.kind() {
        ValKind::RecordLit(m) => match m.get(k) {
            Some(x) => x.clone(),
            None => internal_error!("field {} missing from record", k),
        },
        ValKind::UnionType(kts) => {
            if kts.contains_key(k) {
                ValKind::UnionConstructor(k.clone(), kts.clone()).into_val()
            } else {
                internal_error!("alternative {} missing from union", k)
            }
        }
        ValKind::Project(inner, _) => vfield(inner.clone(), k),
        ValKind::Prefer(l, r) => {
            if let ValKind::RecordLit(m) = r.kind() {
                return match m.get(k) {
                    Some(x) => x.clone(),
                    None => vfield(l.clone(), k),
                };
            }
            if let ValKind::RecordLit(m) = l.kind() {
                return match m.get(k) {
                    Some(x) => {
                        // Keep only the contested field of the literal side:
                        // the stuck side may override it.
                        let single = singleton(k, x.clone());
                        ValKind::Field(
                            ValKind::Prefer(single, r.clone()).into_val(),
                            k.clone(),
                        )
                        .into_val()
                    }
                    None => vfield(r.clone(), k),
                };
            }
            ValKind::Field(v.clone(), k.clone()).into_val()
        }
        ValKind::Combine(l, r) => {
            if let ValKind::RecordLit(m) = r.kind() {
                return match m.get(k) {
                    Some(x) => {
                        let single = singleton(k, x.clone());
                        ValKind::Field(
                            ValKind::Combine(l.clone(), single).into_val(),
                            k.clone(),
                        )
                        .into_val()
                    }
                    None => vfield(l.clone(), k),
                };
            }
            if let ValKind::RecordLit(m) = l.kind() {
                return match m.get(k) {
                    Some(x) => {
                        let single = singleton(k, x.clone());
                        ValKind::Field(
                            ValKind::Combine(single, r.clone()).into_val(),
                            k.clone(),
                        )
                        .into_val()
                    }
                    None => vfield(r.clone(), k),
                };
            }
            ValKind::Field(v.clone(), k.clone()).into_val()
        }
        _ => ValKind::Field(v.clone(), k.clone()).into_val(),
    }
}

fn singleton(k: &Label, v: Val) -> Val {
    let mut m = BTreeMap::new();
    m.insert(k.clone(), v);
    ValKind::RecordLit(m).into_val()
}

/// Projection by a label set.
fn vproject(env: &Env, v: Val, ks: BTreeSet<Label>) -> Val {
    if ks.is_empty() {
        return ValKind::RecordLit(BTreeMap::new()).into_val();
    }
    match v.kind() {
        ValKind::RecordLit(m) => {
            let picked = m
                .iter()
                .filter(|(k, _)| ks.contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            ValKind::RecordLit(picked).into_val()
        }
        ValKind::Project(inner, _) => vproject(env, inner.clone(), ks),
        ValKind::Prefer(l, r) => {
            if let ValKind::RecordLit(m) = r.kind() {
                // Split the label set between the stuck side and the literal
                // side: `(l ⫽ lit).{s}` becomes `l.{s ∖ lit} ⫽ lit.{s ∩ lit}`.
                let (hit, miss): (BTreeSet<Label>, BTreeSet<Label>) =
                    ks.into_iter().partition(|k| m.contains_key(k));
                let picked = m
                    .iter()
                    .filter(|(k, _)| hit.contains(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                return vprefer(
                    env,
                    vproject(env, l.clone(), miss),
                    ValKind::RecordLit(picked).into_val(),
                );
            }
            ValKind::Project(v.clone(), ks).into_val()
        }
        _ => ValKind::Project(v.clone(), ks).into_val(),
    }
}

fn vproject_by_type(env: &Env, v: Val, t: Val) -> Val {
    match t.kind() {
        ValKind::RecordType(kts) => {
            vproject(env, v, kts.keys().cloned().collect())
        }
        _ => ValKind::ProjectByType(v, t.clone()).into_val(),
    }
}

/// Reduction rules for a saturated builtin application. `None` means no rule
/// fires and the application stays stuck as data.
pub(crate) fn apply_builtin(
    b: Builtin,
    args: &[Val],
    env: &Env,
) -> Option<Val> {
    use Builtin::*;
    use ValKind::*;
    Some(match (b, args) {
        (OptionalNone, [t]) => EmptyOptionalLit(t.clone()).into_val(),
        (NaturalIsZero, [n]) => match n.kind() {
            NaturalLit(n) => BoolLit(n.is_zero()).into_val(),
            _ => return None,
        },
        (NaturalEven, [n]) => match n.kind() {
            NaturalLit(n) => BoolLit(n.is_even()).into_val(),
            _ => return None,
        },
        (NaturalOdd, [n]) => match n.kind() {
            NaturalLit(n) => BoolLit(n.is_odd()).into_val(),
            _ => return None,
        },
        (NaturalToInteger, [n]) => match n.kind() {
            NaturalLit(n) => {
                IntegerLit(num_bigint::BigInt::from(n.clone())).into_val()
            }
            _ => return None,
        },
        (NaturalShow, [n]) => match n.kind() {
            NaturalLit(n) => text_val(n.to_string()),
            _ => return None,
        },
        (NaturalSubtract, [m, n]) => match (m.kind(), n.kind()) {
            (NaturalLit(m), NaturalLit(n)) => NaturalLit(if n > m {
                n - m
            } else {
                crate::syntax::Natural::zero()
            })
            .into_val(),
            (NaturalLit(z), _) if z.is_zero() => n.clone(),
            (_, NaturalLit(z)) if z.is_zero() => {
                NaturalLit(crate::syntax::Natural::zero()).into_val()
            }
            _ if conv(env, m, n) => NaturalLit(crate::syntax::Natural::zero()).into_val(),
            _ => return None,
        },
        (NaturalFold, [n, _, succ, zero]) => match n.kind() {
            NaturalLit(n) => {
                let mut acc = zero.clone();
                let mut i = crate::syntax::Natural::zero();
                while &i < n {
                    acc = succ.app(acc);
                    i += 1u32;
                }
                acc
            }
            _ => return None,
        },
        (NaturalBuild, [f]) => {
            if let Some(x) = fold_argument(f, NaturalFold, 1) {
                return Some(x);
            }
            f.app(Val::from_builtin(Natural))
                .app(natural_succ_closure())
                .app(NaturalLit(crate::syntax::Natural::zero()).into_val())
        }
        (ListFold, [_, xs, _, cons, nil]) => match xs.kind() {
            EmptyListLit(_) => nil.clone(),
            NEListLit(xs) => {
                let mut acc = nil.clone();
                for x in xs.iter().rev() {
                    acc = cons.app(x.clone()).app(acc);
                }
                acc
            }
            _ => return None,
        },
        (ListBuild, [a, f]) => {
            if let Some(x) = fold_argument(f, ListFold, 2) {
                return Some(x);
            }
            f.app(Val::from_builtin(List).app(a.clone()))
                .app(list_cons_closure(a.clone()))
                .app(EmptyListLit(a.clone()).into_val())
        }
        (ListLength, [_, xs]) => match xs.kind() {
            EmptyListLit(_) => NaturalLit(crate::syntax::Natural::zero()).into_val(),
            NEListLit(xs) => NaturalLit(crate::syntax::Natural::from(xs.len())).into_val(),
            _ => return None,
        },
        (ListHead, [a, xs]) => match xs.kind() {
            EmptyListLit(_) => EmptyOptionalLit(a.clone()).into_val(),
            NEListLit(xs) => NEOptionalLit(xs[0].clone()).into_val(),
            _ => return None,
        },
        (ListLast, [a, xs]) => match xs.kind() {
            EmptyListLit(_) => EmptyOptionalLit(a.clone()).into_val(),
            NEListLit(xs) => {
                NEOptionalLit(xs[xs.len() - 1].clone()).into_val()
            }
            _ => return None,
        },
        (ListIndexed, [a, xs]) => match xs.kind() {
            EmptyListLit(_) => {
                EmptyListLit(indexed_row_type(a.clone())).into_val()
            }
            NEListLit(xs) => {
                let rows = xs
                    .iter()
                    .enumerate()
                    .map(|(i, x)| {
                        let mut row = BTreeMap::new();
                        row.insert(
                            Label::from("index"),
                            NaturalLit(crate::syntax::Natural::from(i)).into_val(),
                        );
                        row.insert(Label::from("value"), x.clone());
                        RecordLit(row).into_val()
                    })
                    .collect();
                NEListLit(rows).into_val()
            }
            _ => return None,
        },
        (ListReverse, [_, xs]) => match xs.kind() {
            EmptyListLit(_) => xs.clone(),
            NEListLit(xs) => {
                NEListLit(xs.iter().rev().cloned().collect()).into_val()
            }
            _ => return None,
        },
        (OptionalFold, [_, opt, _, just, nothing]) => match opt.kind() {
            NEOptionalLit(v) => just.app(v.clone()),
            EmptyOptionalLit(_) => nothing.clone(),
            _ => return None,
        },
        (OptionalBuild, [a, f]) => {
            if let Some(x) = fold_argument(f, OptionalFold, 2) {
                return Some(x);
            }
            f.app(Val::from_builtin(Optional).app(a.clone()))
                .app(optional_some_closure(a.clone()))
                .app(EmptyOptionalLit(a.clone()).into_val())
        }
        (IntegerShow, [n]) => match n.kind() {
            IntegerLit(n) => {
                if n.is_negative() {
                    text_val(n.to_string())
                } else {
                    text_val(format!("+{}", n))
                }
            }
            _ => return None,
        },
        (IntegerToDouble, [n]) => match n.kind() {
            // Round-tripping through the decimal representation gives a
            // correctly rounded conversion; overflow saturates to the
            // appropriately signed infinity.
            IntegerLit(n) => match n.to_string().parse::<f64>() {
                Ok(d) => DoubleLit(d.into()).into_val(),
                Err(_) => internal_error!(
                    "decimal integer failed to parse as a double"
                ),
            },
            _ => return None,
        },
        (DoubleShow, [x]) => match x.kind() {
            DoubleLit(d) => text_val(double_show((*d).into())),
            _ => return None,
        },
        (TextShow, [t]) => match t.kind() {
            ValKind::TextLit(tl) => match tl.as_text() {
                Some(s) => text_val(text_show(&s)),
                None => return None,
            },
            _ => return None,
        },
        _ => return None,
    })
}

/// Build/fold fusion: a directly supplied `X/fold` partial application with
/// the given number of arguments cancels against the matching `X/build`,
/// short-circuiting to the fold's principal argument.
fn fold_argument(f: &Val, fold: Builtin, arity: usize) -> Option<Val> {
    match f.kind() {
        ValKind::AppliedBuiltin(bc)
            if bc.builtin() == fold && bc.args().len() == arity =>
        {
            Some(bc.args()[arity - 1].clone())
        }
        _ => None,
    }
}

fn text_val(s: String) -> Val {
    ValKind::TextLit(TextLit::from_text(s)).into_val()
}

/// `λ(x : Natural) → x + 1`
fn natural_succ_closure() -> Val {
    let body = Expr::binop(
        BinOp::NaturalPlus,
        Expr::var("x"),
        Expr::natural_lit(Natural::one()),
    );
    ValKind::Lam(
        Val::from_builtin(Builtin::Natural),
        Closure::new(Label::from("x"), &Env::new(), body),
    )
    .into_val()
}

/// `λ(x : A) → λ(xs : List A) → [x] # xs`, with the element type captured
/// through the closure environment.
fn list_cons_closure(a: Val) -> Val {
    let env = Env::new().extend(Label::from("A"), a.clone());
    let list_a = Expr::app(Expr::builtin(Builtin::List), Expr::var("A"));
    let body = Expr::lam(
        "xs",
        list_a,
        Expr::binop(
            BinOp::ListAppend,
            Expr::ne_list_lit(vec![Expr::var("x")]),
            Expr::var("xs"),
        ),
    );
    ValKind::Lam(a, Closure::new(Label::from("x"), &env, body)).into_val()
}

/// `λ(x : A) → Some x`
fn optional_some_closure(a: Val) -> Val {
    let body = Expr::some_lit(Expr::var("x"));
    ValKind::Lam(a, Closure::new(Label::from("x"), &Env::new(), body))
        .into_val()
}

/// `{ index : Natural, value : a }`, the element type of `List/indexed`.
fn indexed_row_type(a: Val) -> Val {
    let mut row = BTreeMap::new();
    row.insert(Label::from("index"), Val::from_builtin(Builtin::Natural));
    row.insert(Label::from("value"), a);
    ValKind::RecordType(row).into_val()
}

fn double_show(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_owned()
    } else if d.is_infinite() {
        if d > 0.0 {
            "Infinity".to_owned()
        } else {
            "-Infinity".to_owned()
        }
    } else {
        ryu::Buffer::new().format_finite(d).to_owned()
    }
}

/// Wraps a string in double quotes, escaping it so that the result parses
/// back to the same text.
fn text_show(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\u0024"),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) <= 0x1f => {
                out.push_str(&format!("\\u{:04X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
