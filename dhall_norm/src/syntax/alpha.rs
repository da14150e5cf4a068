use crate::syntax::ast::*;

/// α-normalization: every binder is renamed to the sentinel `_`, and every
/// variable reference is rewritten to index into its binder counted across
/// **all** binders in scope, not just same-named ones. α-equivalent
/// expressions become syntactically identical, so normal forms serialize
/// the same way regardless of the names the author picked.
pub fn alpha_normalize(e: &SubExpr) -> SubExpr {
    alpha(&mut Vec::new(), e)
}

/// `bound` holds the original names of the binders in scope, outermost first.
fn alpha(bound: &mut Vec<Label>, e: &SubExpr) -> SubExpr {
    use Expr::*;
    let sentinel = || Label::from("_");
    rc(match &**e {
        Var(V(x, k)) => {
            let mut k = *k;
            for (depth, name) in bound.iter().rev().enumerate() {
                if name == x {
                    if k == 0 {
                        return rc(Var(V(sentinel(), depth)));
                    }
                    k -= 1;
                }
            }
            // Free variable. Its index no longer needs to skip same-named
            // binders (they are all `_` now), but a free `_` must skip every
            // renamed binder to avoid being captured.
            if x == &sentinel() {
                Var(V(sentinel(), k + bound.len()))
            } else {
                Var(V(x.clone(), k))
            }
        }
        Lam(x, t, b) => {
            let t = alpha(bound, t);
            bound.push(x.clone());
            let b = alpha(bound, b);
            bound.pop();
            Lam(sentinel(), t, b)
        }
        Pi(x, t, b) => {
            let t = alpha(bound, t);
            bound.push(x.clone());
            let b = alpha(bound, b);
            bound.pop();
            Pi(sentinel(), t, b)
        }
        Let(x, t, a, b) => {
            let t = t.as_ref().map(|t| alpha(bound, t));
            let a = alpha(bound, a);
            bound.push(x.clone());
            let b = alpha(bound, b);
            bound.pop();
            Let(sentinel(), t, a, b)
        }

        Const(c) => Const(*c),
        App(f, a) => App(alpha(bound, f), alpha(bound, a)),
        Annot(a, t) => Annot(alpha(bound, a), alpha(bound, t)),
        Assert(a) => Assert(alpha(bound, a)),
        Builtin(b) => Builtin(*b),
        BinOp(o, l, r) => BinOp(*o, alpha(bound, l), alpha(bound, r)),
        BoolLit(b) => BoolLit(*b),
        BoolIf(c, t, f) => {
            BoolIf(alpha(bound, c), alpha(bound, t), alpha(bound, f))
        }
        NaturalLit(n) => NaturalLit(n.clone()),
        IntegerLit(n) => IntegerLit(n.clone()),
        DoubleLit(d) => DoubleLit(*d),
        TextLit(chunks) => TextLit(chunks.map_ref(|e| alpha(bound, e))),
        EmptyListLit(t) => EmptyListLit(alpha(bound, t)),
        NEListLit(xs) => {
            NEListLit(xs.iter().map(|x| alpha(bound, x)).collect())
        }
        SomeLit(x) => SomeLit(alpha(bound, x)),
        RecordType(kts) => RecordType(
            kts.iter()
                .map(|(k, t)| (k.clone(), alpha(bound, t)))
                .collect(),
        ),
        RecordLit(kvs) => RecordLit(
            kvs.iter()
                .map(|(k, v)| (k.clone(), alpha(bound, v)))
                .collect(),
        ),
        UnionType(kts) => UnionType(
            kts.iter()
                .map(|(k, t)| (k.clone(), t.as_ref().map(|t| alpha(bound, t))))
                .collect(),
        ),
        Merge(r, u, t) => Merge(
            alpha(bound, r),
            alpha(bound, u),
            t.as_ref().map(|t| alpha(bound, t)),
        ),
        ToMap(r, t) => {
            ToMap(alpha(bound, r), t.as_ref().map(|t| alpha(bound, t)))
        }
        Field(r, k) => Field(alpha(bound, r), k.clone()),
        Projection(r, ks) => Projection(alpha(bound, r), ks.clone()),
        ProjectionByExpr(r, t) => {
            ProjectionByExpr(alpha(bound, r), alpha(bound, t))
        }
        Completion(t, r) => Completion(alpha(bound, t), alpha(bound, r)),
        Note(span, inner) => Note(*span, alpha(bound, inner)),
        Embed(v) => match *v {},
    })
}
