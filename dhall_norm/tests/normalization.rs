use pretty_assertions::assert_eq;

use dhall_norm::syntax::{alpha_normalize, BinOp, Builtin};
use dhall_norm::{judgmentally_equal, normalize};

mod common;
use common::*;

use Builtin::{
    List, ListBuild, ListFold, ListHead, ListIndexed, ListLast, ListLength,
    ListReverse, Natural, NaturalBuild, NaturalEven, NaturalFold,
    NaturalIsZero, NaturalOdd, NaturalShow, NaturalSubtract,
    NaturalToInteger, OptionalBuild, OptionalFold,
};

#[test]
fn beta_reduction() {
    // (λ(x : Natural) → x + 1) 2 ⇥ 3
    let e = app(
        lam(
            "x",
            builtin(Natural),
            binop(BinOp::NaturalPlus, var("x"), nat(1)),
        ),
        nat(2),
    );
    assert_eq!(normalize(&e), nat(3));
}

#[test]
fn let_binding() {
    let e = let_("x", nat(5), binop(BinOp::NaturalPlus, var("x"), var("x")));
    assert_eq!(normalize(&e), nat(10));
}

#[test]
fn substitution_soundness() {
    // let x = e₁ in e₂  normalizes like  e₂[x ≔ e₁]
    let e1 = binop(BinOp::NaturalPlus, nat(1), nat(2));
    let bound = let_(
        "x",
        e1.clone(),
        binop(BinOp::NaturalTimes, var("x"), var("x")),
    );
    let substituted = binop(BinOp::NaturalTimes, e1.clone(), e1);
    assert_eq!(normalize(&bound), normalize(&substituted));
}

#[test]
fn annotations_are_dropped() {
    let e = annot(nat(4), builtin(Natural));
    assert_eq!(normalize(&e), nat(4));
}

#[test]
fn bool_operators() {
    let x = var("x");
    // True && x ⇥ x, x && False ⇥ False
    let e = binop(BinOp::BoolAnd, bool_lit(true), x.clone());
    assert_eq!(normalize(&e), x.clone());
    let e = binop(BinOp::BoolAnd, x.clone(), bool_lit(false));
    assert_eq!(normalize(&e), bool_lit(false));
    // x || False ⇥ x, True || x ⇥ True
    let e = binop(BinOp::BoolOr, x.clone(), bool_lit(false));
    assert_eq!(normalize(&e), x.clone());
    let e = binop(BinOp::BoolOr, bool_lit(true), x.clone());
    assert_eq!(normalize(&e), bool_lit(true));
    // x == x ⇥ True, x != x ⇥ False
    let e = binop(BinOp::BoolEQ, x.clone(), x.clone());
    assert_eq!(normalize(&e), bool_lit(true));
    let e = binop(BinOp::BoolNE, x.clone(), x.clone());
    assert_eq!(normalize(&e), bool_lit(false));
}

#[test]
fn if_then_else() {
    // if True then (λ(x : Bool) → x) False else True ⇥ False
    let e = if_(
        bool_lit(true),
        app(lam("x", builtin(Builtin::Bool), var("x")), bool_lit(false)),
        bool_lit(true),
    );
    assert_eq!(normalize(&e), bool_lit(false));

    // if c then True else False ⇥ c
    let e = if_(var("c"), bool_lit(true), bool_lit(false));
    assert_eq!(normalize(&e), var("c"));

    // if c then t else t ⇥ t
    let e = if_(var("c"), nat(7), nat(7));
    assert_eq!(normalize(&e), nat(7));
}

#[test]
fn natural_arithmetic() {
    let x = var("x");
    let e = binop(BinOp::NaturalPlus, x.clone(), nat(0));
    assert_eq!(normalize(&e), x.clone());
    let e = binop(BinOp::NaturalTimes, nat(1), x.clone());
    assert_eq!(normalize(&e), x.clone());
    let e = binop(BinOp::NaturalTimes, x.clone(), nat(0));
    assert_eq!(normalize(&e), nat(0));
    let e = binop(
        BinOp::NaturalPlus,
        nat(2),
        binop(BinOp::NaturalTimes, nat(3), nat(4)),
    );
    assert_eq!(normalize(&e), nat(14));
}

#[test]
fn natural_builtins() {
    assert_eq!(normalize(&app(builtin(NaturalIsZero), nat(0))), bool_lit(true));
    assert_eq!(
        normalize(&app(builtin(NaturalIsZero), nat(3))),
        bool_lit(false)
    );
    assert_eq!(normalize(&app(builtin(NaturalEven), nat(4))), bool_lit(true));
    assert_eq!(normalize(&app(builtin(NaturalOdd), nat(4))), bool_lit(false));
    assert_eq!(normalize(&app(builtin(NaturalToInteger), nat(7))), int(7));
    assert_eq!(normalize(&app(builtin(NaturalShow), nat(42))), text("42"));
}

#[test]
fn natural_fold() {
    // Natural/fold 3 Natural (λ(n : Natural) → n + 2) 1 ⇥ 7
    let succ = lam(
        "n",
        builtin(Natural),
        binop(BinOp::NaturalPlus, var("n"), nat(2)),
    );
    let e = apps(
        builtin(NaturalFold),
        vec![nat(3), builtin(Natural), succ, nat(1)],
    );
    assert_eq!(normalize(&e), nat(7));
}

#[test]
fn natural_subtract() {
    let sub = |a, b| apps(builtin(NaturalSubtract), vec![a, b]);
    // Natural/subtract 3 5 ⇥ 2 and Natural/subtract 5 3 ⇥ 0
    assert_eq!(normalize(&sub(nat(3), nat(5))), nat(2));
    assert_eq!(normalize(&sub(nat(5), nat(3))), nat(0));
    // identity and annihilation against stuck arguments
    assert_eq!(normalize(&sub(nat(0), var("x"))), var("x"));
    assert_eq!(normalize(&sub(var("x"), nat(0))), nat(0));
    assert_eq!(normalize(&sub(var("x"), var("x"))), nat(0));
    // the partial application re-quotes as itself, not as a lambda
    let partial = app(builtin(NaturalSubtract), nat(0));
    assert_eq!(normalize(&partial), partial);
}

#[test]
fn natural_build_fold_fusion() {
    // Natural/build (Natural/fold n) ⇥ n
    let e = app(builtin(NaturalBuild), app(builtin(NaturalFold), nat(3)));
    assert_eq!(normalize(&e), nat(3));
}

#[test]
fn natural_build_expansion() {
    // Natural/build (λ(natural : Type) → λ(succ : natural → natural) →
    //   λ(zero : natural) → succ (succ zero)) ⇥ 2
    let g = lam(
        "natural",
        rc_type(),
        lam(
            "succ",
            pi("_", var("natural"), var("natural")),
            lam("zero", var("natural"), app(var("succ"), app(var("succ"), var("zero")))),
        ),
    );
    let e = app(builtin(NaturalBuild), g);
    assert_eq!(normalize(&e), nat(2));
}

fn rc_type() -> dhall_norm::syntax::SubExpr {
    use dhall_norm::syntax::{rc, Const, Expr};
    rc(Expr::Const(Const::Type))
}

#[test]
fn integer_builtins() {
    use Builtin::{IntegerShow, IntegerToDouble};
    assert_eq!(normalize(&app(builtin(IntegerShow), int(3))), text("+3"));
    assert_eq!(normalize(&app(builtin(IntegerShow), int(0))), text("+0"));
    assert_eq!(normalize(&app(builtin(IntegerShow), int(-7))), text("-7"));
    assert_eq!(normalize(&app(builtin(IntegerToDouble), int(2))), dbl(2.0));
    assert_eq!(
        normalize(&app(builtin(IntegerToDouble), int(-5))),
        dbl(-5.0)
    );
}

#[test]
fn double_show() {
    use Builtin::DoubleShow;
    assert_eq!(normalize(&app(builtin(DoubleShow), dbl(3.25))), text("3.25"));
    assert_eq!(
        normalize(&app(builtin(DoubleShow), dbl(f64::NAN))),
        text("NaN")
    );
    assert_eq!(
        normalize(&app(builtin(DoubleShow), dbl(f64::INFINITY))),
        text("Infinity")
    );
}

#[test]
fn text_show_escapes() {
    use Builtin::TextShow;
    let e = app(builtin(TextShow), text("a\"b$c\\d\ne"));
    assert_eq!(
        normalize(&e),
        text("\"a\\\"b\\u0024c\\\\d\\ne\"")
    );
}

#[test]
fn text_interpolation_flattening() {
    // "a${"b${x}c"}d" ⇥ "ab${x}cd"
    let inner = text_interp("b", vec![(var("x"), "c")]);
    let outer = text_interp("a", vec![(inner, "d")]);
    assert_eq!(
        normalize(&outer),
        text_interp("ab", vec![(var("x"), "cd")])
    );
    // a literal-only interpolation collapses to a plain literal
    let e = text_interp("a", vec![(text("b"), "c")]);
    assert_eq!(normalize(&e), text("abc"));
    // "${x}" collapses to x
    let e = text_interp("", vec![(var("x"), "")]);
    assert_eq!(normalize(&e), var("x"));
}

#[test]
fn text_append_desugars_to_interpolation() {
    let e = binop(BinOp::TextAppend, text("foo"), text("bar"));
    assert_eq!(normalize(&e), text("foobar"));
    let e = binop(BinOp::TextAppend, var("x"), var("y"));
    assert_eq!(
        normalize(&e),
        text_interp("", vec![(var("x"), ""), (var("y"), "")])
    );
}

#[test]
fn list_operations() {
    let xs = list(vec![nat(1), nat(2), nat(3)]);
    let e = apps(builtin(ListLength), vec![builtin(Natural), xs.clone()]);
    assert_eq!(normalize(&e), nat(3));

    let e = apps(builtin(ListHead), vec![builtin(Natural), xs.clone()]);
    assert_eq!(normalize(&e), some(nat(1)));
    let e = apps(builtin(ListLast), vec![builtin(Natural), xs.clone()]);
    assert_eq!(normalize(&e), some(nat(3)));
    let e = apps(
        builtin(ListHead),
        vec![builtin(Natural), empty_list(builtin(Natural))],
    );
    assert_eq!(normalize(&e), none_of(builtin(Natural)));

    let e = apps(builtin(ListReverse), vec![builtin(Natural), xs.clone()]);
    assert_eq!(normalize(&e), list(vec![nat(3), nat(2), nat(1)]));

    let e = apps(
        builtin(ListIndexed),
        vec![builtin(Natural), list(vec![nat(5), nat(6)])],
    );
    assert_eq!(
        normalize(&e),
        list(vec![
            record_lit(vec![("index", nat(0)), ("value", nat(5))]),
            record_lit(vec![("index", nat(1)), ("value", nat(6))]),
        ])
    );

    // the empty result still carries the `{ index, value }` element type
    let e = apps(
        builtin(ListIndexed),
        vec![builtin(Natural), empty_list(builtin(Natural))],
    );
    assert_eq!(
        normalize(&e),
        empty_list(record_ty(vec![
            ("index", builtin(Natural)),
            ("value", builtin(Natural)),
        ]))
    );
}

#[test]
fn list_append() {
    let e = binop(
        BinOp::ListAppend,
        list(vec![nat(1)]),
        list(vec![nat(2), nat(3)]),
    );
    assert_eq!(normalize(&e), list(vec![nat(1), nat(2), nat(3)]));
    let e = binop(BinOp::ListAppend, empty_list(builtin(Natural)), var("xs"));
    assert_eq!(normalize(&e), var("xs"));
    let e = binop(BinOp::ListAppend, var("xs"), empty_list(builtin(Natural)));
    assert_eq!(normalize(&e), var("xs"));
}

#[test]
fn list_fold() {
    // List/fold Natural [1, 2] Natural (λ(x : Natural) → λ(acc : Natural) →
    //   x + acc) 0 ⇥ 3
    let cons = lam(
        "x",
        builtin(Natural),
        lam(
            "acc",
            builtin(Natural),
            binop(BinOp::NaturalPlus, var("x"), var("acc")),
        ),
    );
    let e = apps(
        builtin(ListFold),
        vec![
            builtin(Natural),
            list(vec![nat(1), nat(2)]),
            builtin(Natural),
            cons,
            nat(0),
        ],
    );
    assert_eq!(normalize(&e), nat(3));
}

#[test]
fn list_build_fold_fusion() {
    // List/build T (List/fold T e) ⇥ e
    let xs = list(vec![nat(1), nat(2)]);
    let e = apps(
        builtin(ListBuild),
        vec![
            builtin(Natural),
            apps(builtin(ListFold), vec![builtin(Natural), xs.clone()]),
        ],
    );
    assert_eq!(normalize(&e), normalize(&xs));
}

#[test]
fn optional_fold_and_build() {
    let just = lam("x", builtin(Natural), var("x"));
    let e = apps(
        builtin(OptionalFold),
        vec![
            builtin(Natural),
            some(nat(5)),
            builtin(Natural),
            just.clone(),
            nat(0),
        ],
    );
    assert_eq!(normalize(&e), nat(5));

    let e = apps(
        builtin(OptionalFold),
        vec![
            builtin(Natural),
            none_of(builtin(Natural)),
            builtin(Natural),
            just,
            nat(0),
        ],
    );
    assert_eq!(normalize(&e), nat(0));

    // Optional/build T (Optional/fold T e) ⇥ e
    let e = apps(
        builtin(OptionalBuild),
        vec![
            builtin(Natural),
            apps(builtin(OptionalFold), vec![builtin(Natural), some(nat(1))]),
        ],
    );
    assert_eq!(normalize(&e), some(nat(1)));
}

#[test]
fn record_prefer() {
    // { a = 1, b = 2 } ⫽ { b = 3, c = 4 } ⇥ { a = 1, b = 3, c = 4 }
    let e = binop(
        BinOp::RightBiasedRecordMerge,
        record_lit(vec![("a", nat(1)), ("b", nat(2))]),
        record_lit(vec![("b", nat(3)), ("c", nat(4))]),
    );
    assert_eq!(
        normalize(&e),
        record_lit(vec![("a", nat(1)), ("b", nat(3)), ("c", nat(4))])
    );

    // empty record is the identity on both sides
    let e = binop(
        BinOp::RightBiasedRecordMerge,
        record_lit(vec![]),
        var("r"),
    );
    assert_eq!(normalize(&e), var("r"));
    let e = binop(
        BinOp::RightBiasedRecordMerge,
        var("r"),
        record_lit(vec![]),
    );
    assert_eq!(normalize(&e), var("r"));
    // convertible sides collapse
    let e = binop(BinOp::RightBiasedRecordMerge, var("r"), var("r"));
    assert_eq!(normalize(&e), var("r"));
}

#[test]
fn record_combine() {
    // deep merge recurses through nested records
    let l = record_lit(vec![
        ("a", record_lit(vec![("x", nat(1))])),
        ("b", nat(2)),
    ]);
    let r = record_lit(vec![("a", record_lit(vec![("y", nat(3))]))]);
    let e = binop(BinOp::RecursiveRecordMerge, l, r);
    assert_eq!(
        normalize(&e),
        record_lit(vec![
            ("a", record_lit(vec![("x", nat(1)), ("y", nat(3))])),
            ("b", nat(2)),
        ])
    );
}

#[test]
fn record_combine_types() {
    let l = record_ty(vec![("a", record_ty(vec![("x", builtin(Natural))]))]);
    let r = record_ty(vec![
        ("a", record_ty(vec![("y", builtin(Builtin::Bool))])),
        ("b", builtin(Builtin::Text)),
    ]);
    let e = binop(BinOp::RecursiveRecordTypeMerge, l, r);
    assert_eq!(
        normalize(&e),
        record_ty(vec![
            (
                "a",
                record_ty(vec![
                    ("x", builtin(Natural)),
                    ("y", builtin(Builtin::Bool)),
                ])
            ),
            ("b", builtin(Builtin::Text)),
        ])
    );
}

#[test]
fn field_selection() {
    let e = field(record_lit(vec![("a", nat(1)), ("b", nat(2))]), "b");
    assert_eq!(normalize(&e), nat(2));

    // (r ⫽ { a = 1 }).a ⇥ 1
    let e = field(
        binop(
            BinOp::RightBiasedRecordMerge,
            var("r"),
            record_lit(vec![("a", nat(1))]),
        ),
        "a",
    );
    assert_eq!(normalize(&e), nat(1));

    // ({ a = 1 } ∧ r).b ⇥ r.b
    let e = field(
        binop(
            BinOp::RecursiveRecordMerge,
            record_lit(vec![("a", nat(1))]),
            var("r"),
        ),
        "b",
    );
    assert_eq!(normalize(&e), field(var("r"), "b"));
}

#[test]
fn projection() {
    let r = record_lit(vec![("a", nat(1)), ("b", nat(2)), ("c", nat(3))]);
    let e = project(r, vec!["a", "c"]);
    assert_eq!(
        normalize(&e),
        record_lit(vec![("a", nat(1)), ("c", nat(3))])
    );

    // the empty projection is the empty record even on stuck terms
    let e = project(var("r"), vec![]);
    assert_eq!(normalize(&e), record_lit(vec![]));

    // (r ⫽ { b = 1 }).{ a, b } ⇥ r.{ a } ⫽ { b = 1 }
    let e = project(
        binop(
            BinOp::RightBiasedRecordMerge,
            var("r"),
            record_lit(vec![("b", nat(1))]),
        ),
        vec!["a", "b"],
    );
    assert_eq!(
        normalize(&e),
        binop(
            BinOp::RightBiasedRecordMerge,
            project(var("r"), vec!["a"]),
            record_lit(vec![("b", nat(1))]),
        )
    );
}

#[test]
fn projection_by_type() {
    use dhall_norm::syntax::{rc, Expr};
    let r = record_lit(vec![("a", nat(1)), ("b", nat(2))]);
    let t = record_ty(vec![("a", builtin(Natural))]);
    let e = rc(Expr::ProjectionByExpr(r, t));
    assert_eq!(normalize(&e), record_lit(vec![("a", nat(1))]));
}

#[test]
fn merge_union() {
    // merge { Some = λ(x : Natural) → x, None = 0 } (Some 5) ⇥ 5
    let handlers = record_lit(vec![
        ("Some", lam("x", builtin(Natural), var("x"))),
        ("None", nat(0)),
    ]);
    let e = merge(handlers.clone(), some(nat(5)));
    assert_eq!(normalize(&e), nat(5));
    let e = merge(handlers, none_of(builtin(Natural)));
    assert_eq!(normalize(&e), nat(0));

    // merge on a union literal applies the matching handler
    let union = union_ty(vec![("Left", Some(builtin(Natural))), ("Right", None)]);
    let scrut = app(field(union.clone(), "Left"), nat(3));
    let handlers = record_lit(vec![
        ("Left", lam("x", builtin(Natural), var("x"))),
        ("Right", nat(9)),
    ]);
    let e = merge(handlers.clone(), scrut);
    assert_eq!(normalize(&e), nat(3));

    // and a nullary tag selects the handler as-is
    let e = merge(handlers, field(union, "Right"));
    assert_eq!(normalize(&e), nat(9));
}

#[test]
fn union_constructors_requote() {
    let union = union_ty(vec![("A", Some(builtin(Natural))), ("B", None)]);
    // an unapplied constructor and a nullary tag both quote back to field
    // selections on the union type
    let e = field(union.clone(), "B");
    assert_eq!(normalize(&e), e);
    let e = app(field(union, "A"), nat(2));
    assert_eq!(normalize(&e), e);
}

#[test]
fn to_map() {
    let e = common::to_map(record_lit(vec![("b", nat(1)), ("a", nat(2))]));
    assert_eq!(
        normalize(&e),
        list(vec![
            record_lit(vec![("mapKey", text("a")), ("mapValue", nat(2))]),
            record_lit(vec![("mapKey", text("b")), ("mapValue", nat(1))]),
        ])
    );

    // the empty record needs its annotation to produce a typed empty list
    let row = record_ty(vec![
        ("mapKey", builtin(Builtin::Text)),
        ("mapValue", builtin(Natural)),
    ]);
    let e = to_map_annot(
        record_lit(vec![]),
        app(builtin(List), row.clone()),
    );
    assert_eq!(normalize(&e), empty_list(row));
}

#[test]
fn record_completion() {
    use dhall_norm::syntax::{rc, Expr};
    let schema = record_lit(vec![
        ("Type", record_ty(vec![("a", builtin(Natural)), ("b", builtin(Natural))])),
        ("default", record_lit(vec![("a", nat(1)), ("b", nat(2))])),
    ]);
    let e = rc(Expr::Completion(schema, record_lit(vec![("b", nat(3))])));
    assert_eq!(
        normalize(&e),
        record_lit(vec![("a", nat(1)), ("b", nat(3))])
    );
}

#[test]
fn eta_equivalence() {
    // λ(f : Bool → Bool) → λ(x : Bool) → f x  ≡  λ(f : Bool → Bool) → f
    let fn_ty = pi("_", builtin(Builtin::Bool), builtin(Builtin::Bool));
    let expanded = lam(
        "f",
        fn_ty.clone(),
        lam("x", builtin(Builtin::Bool), app(var("f"), var("x"))),
    );
    let plain = lam("f", fn_ty, var("f"));
    assert!(judgmentally_equal(&expanded, &plain));
}

#[test]
fn nan_is_judgmentally_equal_to_itself() {
    assert!(judgmentally_equal(&dbl(f64::NAN), &dbl(f64::NAN)));
    assert!(!judgmentally_equal(&dbl(0.0), &dbl(-0.0)));
}

#[test]
fn alpha_normalization() {
    // λ(a : T) → λ(b : T) → a b  becomes  λ(_ : T) → λ(_ : T) → _@1 _@0
    let e = lam(
        "a",
        var("T"),
        lam("b", var("T"), app(var("a"), var("b"))),
    );
    let expected = lam(
        "_",
        var("T"),
        lam("_", var("T"), app(var_at("_", 1), var_at("_", 0))),
    );
    assert_eq!(alpha_normalize(&e), expected);

    // a free `_` skips the renamed binders instead of being captured
    let e = lam("x", var("T"), var("_"));
    assert_eq!(alpha_normalize(&e), lam("_", var("T"), var_at("_", 1)));
}

#[test]
fn normalization_is_idempotent() {
    let exprs = vec![
        app(
            lam(
                "x",
                builtin(Natural),
                binop(BinOp::NaturalPlus, var("x"), nat(1)),
            ),
            nat(2),
        ),
        binop(BinOp::ListAppend, list(vec![nat(1)]), var("xs")),
        app(builtin(NaturalBuild), var("g")),
        apps(builtin(ListBuild), vec![builtin(Natural), var("g")]),
        common::to_map(record_lit(vec![("k", var("v"))])),
        binop(BinOp::TextAppend, var("x"), text("a")),
    ];
    for e in exprs {
        let once = normalize(&e);
        assert_eq!(normalize(&once), once);
    }
}

#[test]
fn judgmental_equality_ignores_notes_and_names() {
    use dhall_norm::syntax::{rc, Expr, Span};
    let plain = lam("x", builtin(Natural), var("x"));
    let noted = rc(Expr::Note(
        Span { start: 0, end: 9 },
        lam("y", builtin(Natural), var("y")),
    ));
    assert!(judgmentally_equal(&plain, &noted));
}
