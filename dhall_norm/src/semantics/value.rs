use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::semantics::{apply_builtin, eval, Env};
use crate::syntax::{
    Builtin, Const, Integer, InterpolatedTextContents, Label, NaiveDouble,
    Natural, SubExpr,
};

/// A semantic value. Values are immutable trees shared through `Rc`; new
/// values are only ever created by reduction. Comparing two `Val`s for
/// judgmental equality goes through `conv`, never through a derived `Eq`.
#[derive(Debug, Clone)]
pub struct Val(Rc<ValKind>);

impl Val {
    pub fn kind(&self) -> &ValKind {
        &self.0
    }

    pub fn rigid_var(x: Label, level: isize) -> Val {
        ValKind::Var(x, level).into_val()
    }

    pub fn from_builtin(b: Builtin) -> Val {
        ValKind::AppliedBuiltin(BuiltinClosure::new(b, Env::new())).into_val()
    }

    /// Applies a function value to an argument, reducing where the head is a
    /// closure, a builtin awaiting arguments, or a union constructor.
    /// Anything else produces a stuck application.
    pub fn app(&self, u: Val) -> Val {
        match self.kind() {
            ValKind::Lam(_, cl) => cl.apply(u),
            ValKind::AppliedBuiltin(bc)
                if bc.args().len() < bc.builtin().arity() =>
            {
                bc.apply(u)
            }
            ValKind::UnionConstructor(k, kts)
                if matches!(kts.get(k), Some(Some(_))) =>
            {
                ValKind::UnionLit(k.clone(), u, kts.clone()).into_val()
            }
            _ => ValKind::App(self.clone(), u).into_val(),
        }
    }
}

/// This represents a value in β-head-normal form: the head constructor is
/// final, and subvalues may still be stuck terms mentioning rigid variables.
#[derive(Debug, Clone)]
pub enum ValKind {
    /// Closures
    Lam(Val, Closure),
    Pi(Val, Closure),
    /// A builtin plus the arguments it has been applied to so far. This one
    /// constructor covers unapplied builtins, partial applications (among
    /// them the fusion-detectable `Natural/fold n`, `List/fold a xs`,
    /// `Optional/fold a o` and the identity-like `Natural/subtract 0`), and
    /// saturated applications whose reduction rule could not fire.
    AppliedBuiltin(BuiltinClosure),

    /// A rigid variable: name plus the number of same-named binders below
    /// its own. Negative levels mark references that fell off the end of an
    /// ill-scoped environment.
    Var(Label, isize),
    Const(Const),
    /// A stuck application with a non-function head.
    App(Val, Val),

    BoolLit(bool),
    BoolAnd(Val, Val),
    BoolOr(Val, Val),
    BoolEQ(Val, Val),
    BoolNE(Val, Val),
    BoolIf(Val, Val, Val),

    NaturalLit(Natural),
    NaturalPlus(Val, Val),
    NaturalTimes(Val, Val),
    IntegerLit(Integer),
    DoubleLit(NaiveDouble),

    TextLit(TextLit),

    // EmptyListLit(t) means `[] : List t`, not `[] : t`
    EmptyListLit(Val),
    NEListLit(Vec<Val>),
    ListAppend(Val, Val),
    EmptyOptionalLit(Val),
    NEOptionalLit(Val),

    RecordType(BTreeMap<Label, Val>),
    RecordLit(BTreeMap<Label, Val>),
    UnionType(BTreeMap<Label, Option<Val>>),
    /// A union alternative selected out of its type: a nullary tag when the
    /// alternative carries no payload type, a constructor awaiting its
    /// argument otherwise.
    UnionConstructor(Label, BTreeMap<Label, Option<Val>>),
    UnionLit(Label, Val, BTreeMap<Label, Option<Val>>),

    Combine(Val, Val),
    CombineTypes(Val, Val),
    Prefer(Val, Val),
    Merge(Val, Val, Option<Val>),
    ToMap(Val, Option<Val>),
    Field(Val, Label),
    Project(Val, BTreeSet<Label>),
    ProjectByType(Val, Val),

    Assert(Val),
    Equivalence(Val, Val),
}

impl ValKind {
    pub fn into_val(self) -> Val {
        Val(Rc::new(self))
    }
}

/// A suspended function: a body not yet evaluated, paired with the
/// environment captured at its binder.
#[derive(Debug, Clone)]
pub struct Closure {
    name: Label,
    env: Env,
    body: SubExpr,
}

impl Closure {
    pub fn new(name: Label, env: &Env, body: SubExpr) -> Self {
        Closure { name, env: env.clone(), body }
    }

    /// The binder's source-level name, used to reconstruct it when quoting
    /// and to pick non-shadowing fresh variables during conversion.
    pub fn name(&self) -> &Label {
        &self.name
    }

    pub fn apply(&self, v: Val) -> Val {
        eval(&self.env.extend(self.name.clone(), v), &self.body)
    }
}

/// A builtin with the arguments applied to it so far. The environment at the
/// builtin's occurrence is captured so that reduction rules which compare
/// their arguments for convertibility count names in the enclosing scope.
#[derive(Debug, Clone)]
pub struct BuiltinClosure {
    b: Builtin,
    env: Env,
    args: SmallVec<[Val; 4]>,
}

impl BuiltinClosure {
    pub fn new(b: Builtin, env: Env) -> Self {
        BuiltinClosure { b, env, args: SmallVec::new() }
    }

    pub fn builtin(&self) -> Builtin {
        self.b
    }

    pub fn args(&self) -> &[Val] {
        &self.args
    }

    /// Pushes one more argument onto the spine; at saturation the builtin's
    /// reduction rule gets a chance to fire, otherwise the application
    /// stays stuck as data.
    pub fn apply(&self, v: Val) -> Val {
        let mut args = self.args.clone();
        args.push(v);
        if args.len() == self.b.arity() {
            if let Some(result) = apply_builtin(self.b, &args, &self.env) {
                return result;
            }
        }
        ValKind::AppliedBuiltin(BuiltinClosure {
            b: self.b,
            env: self.env.clone(),
            args,
        })
        .into_val()
    }
}

/// A text literal with interpolations.
// Invariant: this must not contain interpolations that are themselves
// TextLits, and contiguous text segments must be merged.
#[derive(Debug, Clone)]
pub struct TextLit(Vec<InterpolatedTextContents<Val>>);

impl TextLit {
    /// Builds a literal from arbitrary segments, splicing nested text
    /// literals inline and merging adjacent text. Iterative on purpose:
    /// interpolation chains can be long.
    pub fn new(
        elts: impl IntoIterator<Item = InterpolatedTextContents<Val>>,
    ) -> Self {
        use InterpolatedTextContents::{Expr, Text};
        let mut out = Vec::new();
        let mut pending = String::new();
        for elt in elts {
            match elt {
                Text(s) => pending.push_str(&s),
                Expr(v) => {
                    let spliced = match v.kind() {
                        ValKind::TextLit(inner) => inner.0.clone(),
                        _ => vec![Expr(v.clone())],
                    };
                    for part in spliced {
                        match part {
                            Text(s) => pending.push_str(&s),
                            Expr(v) => {
                                if !pending.is_empty() {
                                    out.push(Text(std::mem::take(
                                        &mut pending,
                                    )));
                                }
                                out.push(Expr(v));
                            }
                        }
                    }
                }
            }
        }
        if !pending.is_empty() {
            out.push(Text(pending));
        }
        TextLit(out)
    }

    pub fn from_text(s: String) -> TextLit {
        if s.is_empty() {
            TextLit(Vec::new())
        } else {
            TextLit(vec![InterpolatedTextContents::Text(s)])
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// If the literal consists of exactly one interpolation and no text,
    /// return the interpolated value.
    pub fn as_single_expr(&self) -> Option<&Val> {
        use InterpolatedTextContents::Expr;
        if let [Expr(v)] = self.0.as_slice() {
            Some(v)
        } else {
            None
        }
    }

    /// If there are no interpolations, return the literal text.
    pub fn as_text(&self) -> Option<String> {
        use InterpolatedTextContents::Text;
        if self.is_empty() {
            Some(String::new())
        } else if let [Text(s)] = self.0.as_slice() {
            Some(s.clone())
        } else {
            None
        }
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = &InterpolatedTextContents<Val>> {
        self.0.iter()
    }
}
