use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use once_cell::sync::Lazy;

pub type Natural = num_bigint::BigUint;
pub type Integer = num_bigint::BigInt;

/// An empty type. The import layer replaces every embedded import before the
/// evaluator runs, so the `Embed` leaf can never actually be constructed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Void {}

/// A record/union field name or bound-variable name. Ordered lexicographically
/// by Unicode code points; this ordering is the canonical field sort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(String);

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_owned())
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A location in the source text, attached by the parser via `Note`.
/// Evaluation is completely transparent to it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Double with bitwise equality, so that judgmental equality treats `NaN`
/// as equal to itself and distinguishes `-0.0` from `+0.0`.
#[derive(Debug, Copy, Clone)]
pub struct NaiveDouble(f64);

impl PartialEq for NaiveDouble {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for NaiveDouble {}

impl From<f64> for NaiveDouble {
    fn from(x: f64) -> Self {
        NaiveDouble(x)
    }
}

impl From<NaiveDouble> for f64 {
    fn from(x: NaiveDouble) -> f64 {
        x.0
    }
}

/// Constants for a pure type system
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Const {
    Type,
    Kind,
    Sort,
}

impl std::fmt::Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Const::Type => "Type",
            Const::Kind => "Kind",
            Const::Sort => "Sort",
        })
    }
}

/// Bound variable
///
/// The `Label` field is the variable's name (i.e. "`x`").
/// The `usize` field is a de Bruijn index counting, from the innermost binder
/// out, only the binders that share the variable's name. A count that exceeds
/// the number of enclosing same-named binders denotes a free variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V(pub Label, pub usize);

impl From<Label> for V {
    fn from(x: Label) -> V {
        V(x, 0)
    }
}

impl std::fmt::Display for V {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.1 == 0 {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{}@{}", self.0, self.1)
        }
    }
}

// Definition order must match precedence order for
// pretty-printing to work correctly
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BinOp {
    /// `x ? y`
    ImportAlt,
    /// `x || y`
    BoolOr,
    /// `x + y`
    NaturalPlus,
    /// `x ++ y`
    TextAppend,
    /// `x # y`
    ListAppend,
    /// `x && y`
    BoolAnd,
    /// `x ∧ y`
    RecursiveRecordMerge,
    /// `x ⫽ y`
    RightBiasedRecordMerge,
    /// `x ⩓ y`
    RecursiveRecordTypeMerge,
    /// `x * y`
    NaturalTimes,
    /// `x == y`
    BoolEQ,
    /// `x != y`
    BoolNE,
    /// `x === y`
    Equivalence,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinOp::*;
        f.write_str(match self {
            ImportAlt => "?",
            BoolOr => "||",
            NaturalPlus => "+",
            TextAppend => "++",
            ListAppend => "#",
            BoolAnd => "&&",
            RecursiveRecordMerge => "∧",
            RightBiasedRecordMerge => "⫽",
            RecursiveRecordTypeMerge => "⩓",
            NaturalTimes => "*",
            BoolEQ => "==",
            BoolNE => "!=",
            Equivalence => "===",
        })
    }
}

/// Built-ins
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Builtin {
    Bool,
    Natural,
    Integer,
    Double,
    Text,
    List,
    Optional,
    OptionalNone,
    NaturalBuild,
    NaturalFold,
    NaturalIsZero,
    NaturalEven,
    NaturalOdd,
    NaturalToInteger,
    NaturalShow,
    NaturalSubtract,
    IntegerToDouble,
    IntegerShow,
    DoubleShow,
    ListBuild,
    ListFold,
    ListLength,
    ListHead,
    ListLast,
    ListIndexed,
    ListReverse,
    OptionalFold,
    OptionalBuild,
    TextShow,
}

const ALL_BUILTINS: &[Builtin] = &[
    Builtin::Bool,
    Builtin::Natural,
    Builtin::Integer,
    Builtin::Double,
    Builtin::Text,
    Builtin::List,
    Builtin::Optional,
    Builtin::OptionalNone,
    Builtin::NaturalBuild,
    Builtin::NaturalFold,
    Builtin::NaturalIsZero,
    Builtin::NaturalEven,
    Builtin::NaturalOdd,
    Builtin::NaturalToInteger,
    Builtin::NaturalShow,
    Builtin::NaturalSubtract,
    Builtin::IntegerToDouble,
    Builtin::IntegerShow,
    Builtin::DoubleShow,
    Builtin::ListBuild,
    Builtin::ListFold,
    Builtin::ListLength,
    Builtin::ListHead,
    Builtin::ListLast,
    Builtin::ListIndexed,
    Builtin::ListReverse,
    Builtin::OptionalFold,
    Builtin::OptionalBuild,
    Builtin::TextShow,
];

static BUILTINS_BY_NAME: Lazy<BTreeMap<&'static str, Builtin>> =
    Lazy::new(|| ALL_BUILTINS.iter().map(|b| (b.name(), *b)).collect());

impl Builtin {
    pub fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            Bool => "Bool",
            Natural => "Natural",
            Integer => "Integer",
            Double => "Double",
            Text => "Text",
            List => "List",
            Optional => "Optional",
            OptionalNone => "None",
            NaturalBuild => "Natural/build",
            NaturalFold => "Natural/fold",
            NaturalIsZero => "Natural/isZero",
            NaturalEven => "Natural/even",
            NaturalOdd => "Natural/odd",
            NaturalToInteger => "Natural/toInteger",
            NaturalShow => "Natural/show",
            NaturalSubtract => "Natural/subtract",
            IntegerToDouble => "Integer/toDouble",
            IntegerShow => "Integer/show",
            DoubleShow => "Double/show",
            ListBuild => "List/build",
            ListFold => "List/fold",
            ListLength => "List/length",
            ListHead => "List/head",
            ListLast => "List/last",
            ListIndexed => "List/indexed",
            ListReverse => "List/reverse",
            OptionalFold => "Optional/fold",
            OptionalBuild => "Optional/build",
            TextShow => "Text/show",
        }
    }

    pub fn parse(s: &str) -> Option<Builtin> {
        BUILTINS_BY_NAME.get(s).copied()
    }

    /// Number of arguments the builtin consumes before a reduction rule can
    /// fire. `List`/`Optional` still never reduce; they are saturated type
    /// formers and stay stuck once applied.
    pub fn arity(self) -> usize {
        use Builtin::*;
        match self {
            Bool | Natural | Integer | Double | Text => 0,
            List | Optional | OptionalNone => 1,
            NaturalBuild | NaturalIsZero | NaturalEven | NaturalOdd
            | NaturalToInteger | NaturalShow | IntegerToDouble
            | IntegerShow | DoubleShow | TextShow => 1,
            NaturalSubtract | ListBuild | ListLength | ListHead | ListLast
            | ListIndexed | ListReverse | OptionalBuild => 2,
            NaturalFold => 4,
            ListFold | OptionalFold => 5,
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A text literal with interpolations: a leading string segment followed by
/// (interpolated expression, string segment) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolatedText<SubExpr> {
    head: String,
    tail: Vec<(SubExpr, String)>,
}

impl<SE> InterpolatedText<SE> {
    pub fn new(head: String, tail: Vec<(SE, String)>) -> Self {
        InterpolatedText { head, tail }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn tail(&self) -> &[(SE, String)] {
        &self.tail
    }

    /// The literal's text when it contains no interpolations.
    pub fn as_text(&self) -> Option<&str> {
        if self.tail.is_empty() {
            Some(&self.head)
        } else {
            None
        }
    }

    pub fn map_ref<SE2>(
        &self,
        mut f: impl FnMut(&SE) -> SE2,
    ) -> InterpolatedText<SE2> {
        InterpolatedText {
            head: self.head.clone(),
            tail: self
                .tail
                .iter()
                .map(|(e, s)| (f(e), s.clone()))
                .collect(),
        }
    }
}

impl<SE> From<String> for InterpolatedText<SE> {
    fn from(head: String) -> Self {
        InterpolatedText { head, tail: Vec::new() }
    }
}

/// One segment of an interpolated text literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpolatedTextContents<SubExpr> {
    Text(String),
    Expr(SubExpr),
}

pub type SubExpr = Rc<Expr>;

// Should probably rename this
pub fn rc(x: Expr) -> SubExpr {
    Rc::new(x)
}

/// Syntax tree for expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Const(Const),
    ///  `x`
    ///  `x@n`
    Var(V),
    ///  `λ(x : A) -> b`
    Lam(Label, SubExpr, SubExpr),
    ///  `A -> B`
    ///  `∀(x : A) -> B`
    Pi(Label, SubExpr, SubExpr),
    ///  `f a`
    App(SubExpr, SubExpr),
    ///  `let x     = r in e`
    ///  `let x : t = r in e`
    Let(Label, Option<SubExpr>, SubExpr, SubExpr),
    ///  `x : t`
    Annot(SubExpr, SubExpr),
    ///  `assert : t`
    Assert(SubExpr),
    /// Built-in values
    Builtin(Builtin),
    // Binary operations
    BinOp(BinOp, SubExpr, SubExpr),
    ///  `True`
    BoolLit(bool),
    ///  `if x then y else z`
    BoolIf(SubExpr, SubExpr, SubExpr),
    ///  `1`
    NaturalLit(Natural),
    ///  `+2`
    IntegerLit(Integer),
    ///  `3.24`
    DoubleLit(NaiveDouble),
    ///  `"Some ${interpolated} text"`
    TextLit(InterpolatedText<SubExpr>),
    ///  `[] : t`
    EmptyListLit(SubExpr),
    ///  `[x, y, z]`
    NEListLit(Vec<SubExpr>),
    ///  `Some e`
    SomeLit(SubExpr),
    ///  `{ k1 : t1, k2 : t1 }`
    RecordType(BTreeMap<Label, SubExpr>),
    ///  `{ k1 = v1, k2 = v2 }`
    RecordLit(BTreeMap<Label, SubExpr>),
    ///  `< k1 : t1, k2 >`
    UnionType(BTreeMap<Label, Option<SubExpr>>),
    ///  `merge x y : t`
    Merge(SubExpr, SubExpr, Option<SubExpr>),
    ///  `toMap x : t`
    ToMap(SubExpr, Option<SubExpr>),
    ///  `e.x`
    Field(SubExpr, Label),
    ///  `e.{ x, y, z }`
    Projection(SubExpr, BTreeSet<Label>),
    ///  `e.(t)`
    ProjectionByExpr(SubExpr, SubExpr),
    ///  `T::r`
    Completion(SubExpr, SubExpr),
    /// Attaches a source span; semantically transparent
    Note(Span, SubExpr),
    /// Embeds the result of resolving an import
    Embed(Void),
}

/// Constructors for the terms the evaluator and the tests assemble directly;
/// the parser lives outside this crate.
impl Expr {
    pub fn var(x: impl Into<Label>) -> SubExpr {
        rc(Expr::Var(V(x.into(), 0)))
    }

    pub fn builtin(b: Builtin) -> SubExpr {
        rc(Expr::Builtin(b))
    }

    pub fn natural_lit(n: Natural) -> SubExpr {
        rc(Expr::NaturalLit(n))
    }

    pub fn app(f: SubExpr, a: SubExpr) -> SubExpr {
        rc(Expr::App(f, a))
    }

    pub fn lam(x: impl Into<Label>, t: SubExpr, b: SubExpr) -> SubExpr {
        rc(Expr::Lam(x.into(), t, b))
    }

    pub fn pi(x: impl Into<Label>, t: SubExpr, b: SubExpr) -> SubExpr {
        rc(Expr::Pi(x.into(), t, b))
    }

    pub fn binop(o: BinOp, l: SubExpr, r: SubExpr) -> SubExpr {
        rc(Expr::BinOp(o, l, r))
    }

    pub fn ne_list_lit(xs: Vec<SubExpr>) -> SubExpr {
        rc(Expr::NEListLit(xs))
    }

    pub fn some_lit(x: SubExpr) -> SubExpr {
        rc(Expr::SomeLit(x))
    }
}

/// Strips all `Note` wrappers recursively.
pub fn denote(e: &SubExpr) -> SubExpr {
    use Expr::*;
    let opt = |oe: &Option<SubExpr>| oe.as_ref().map(denote);
    rc(match &**e {
        Note(_, inner) => return denote(inner),
        Const(c) => Const(*c),
        Var(v) => Var(v.clone()),
        Lam(x, t, b) => Lam(x.clone(), denote(t), denote(b)),
        Pi(x, t, b) => Pi(x.clone(), denote(t), denote(b)),
        App(f, a) => App(denote(f), denote(a)),
        Let(x, t, a, b) => Let(x.clone(), opt(t), denote(a), denote(b)),
        Annot(a, t) => Annot(denote(a), denote(t)),
        Assert(a) => Assert(denote(a)),
        Builtin(b) => Builtin(*b),
        BinOp(o, l, r) => BinOp(*o, denote(l), denote(r)),
        BoolLit(b) => BoolLit(*b),
        BoolIf(c, t, f) => BoolIf(denote(c), denote(t), denote(f)),
        NaturalLit(n) => NaturalLit(n.clone()),
        IntegerLit(n) => IntegerLit(n.clone()),
        DoubleLit(d) => DoubleLit(*d),
        TextLit(chunks) => TextLit(chunks.map_ref(denote)),
        EmptyListLit(t) => EmptyListLit(denote(t)),
        NEListLit(xs) => NEListLit(xs.iter().map(denote).collect()),
        SomeLit(x) => SomeLit(denote(x)),
        RecordType(kts) => RecordType(
            kts.iter().map(|(k, t)| (k.clone(), denote(t))).collect(),
        ),
        RecordLit(kvs) => RecordLit(
            kvs.iter().map(|(k, v)| (k.clone(), denote(v))).collect(),
        ),
        UnionType(kts) => UnionType(
            kts.iter()
                .map(|(k, t)| (k.clone(), t.as_ref().map(denote)))
                .collect(),
        ),
        Merge(r, u, t) => Merge(denote(r), denote(u), opt(t)),
        ToMap(r, t) => ToMap(denote(r), opt(t)),
        Field(r, k) => Field(denote(r), k.clone()),
        Projection(r, ks) => Projection(denote(r), ks.clone()),
        ProjectionByExpr(r, t) => ProjectionByExpr(denote(r), denote(t)),
        Completion(t, r) => Completion(denote(t), denote(r)),
        Embed(v) => match *v {},
    })
}

/// Refreshes a note-free expression into a form that may later carry notes.
/// With `Note` as an ordinary constructor this is the identity on the
/// payload; callers re-source-annotate through it.
pub fn renote(e: &SubExpr) -> SubExpr {
    SubExpr::clone(e)
}

/// Peels only the outermost `Note`s.
pub fn shallow_denote(e: &SubExpr) -> &SubExpr {
    match &**e {
        Expr::Note(_, inner) => shallow_denote(inner),
        _ => e,
    }
}
