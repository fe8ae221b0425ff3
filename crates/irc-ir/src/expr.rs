//! The IR expression tree, per `spec.md` §3.2.

use crate::literal::{BinOp, Literal, RelOp, UnOp};
use crate::pattern::Pattern;
use irc_common::interner::Atom;
use irc_common::span::Span;
use irc_types::{Control, FuncSort, Type, TypeBind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    Const,
    Var,
}

/// Every IR node: a variant, a source position, a type annotation, and
/// an effect annotation (`spec.md` §3.2).
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: Box<ExprKind>,
    pub at: Span,
    pub typ: Type,
    pub eff: irc_types::Effect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub pat: Pattern,
    pub body: Expr,
}

/// A function value: sort/control/binders plus the argument pattern and
/// body. `name` is `Some` for a recursive binding (`let rec f = func ...`
/// shape desugared into the function carrying its own name) and is what
/// the tail-call optimizer matches a self call against.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncData {
    pub sort: FuncSort,
    pub control: Control,
    pub name: Option<Atom>,
    pub binds: Vec<TypeBind>,
    pub arg: Pattern,
    pub arg_typ: Type,
    pub ret_typs: Vec<Type>,
    pub body: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Lit(Literal),
    /// A variable reference.
    Var(Atom),
    /// A reference to a primitive operator by name (e.g. `Array.tabulate`).
    Prim(Atom),
    Unop(UnOp, Type, Expr),
    Binop(BinOp, Type, Expr, Expr),
    Relop(RelOp, Type, Expr, Expr),
    Show(Type, Expr),
    Tuple(Vec<Expr>),
    Proj(Expr, u32),
    /// `?e`, injecting into an `Option`.
    Opt(Expr),
    /// Variant constructor injection.
    Tag(Atom, Expr),
    /// Record field access.
    Dot(Expr, Atom),
    /// Actor field access — carries send-capability semantics, distinct
    /// from [`ExprKind::Dot`] so the checker can require an `Actor` sort.
    ActorDot(Expr, Atom),
    /// `mutable` flag, element type, elements.
    Array(bool, Type, Vec<Expr>),
    Idx(Expr, Expr),
    Assign(Expr, Expr),
    Func(FuncData),
    /// Call convention, explicit type arguments, function expression,
    /// single argument expression (tuples encode multi-argument calls).
    Call(FuncSort, Vec<Type>, Expr, Expr),
    Block(Vec<Dec>, Expr),
    If(Expr, Expr, Expr),
    Switch(Expr, Vec<Case>),
    /// An unbounded loop; the body must have unit type.
    Loop(Expr),
    Label(Atom, Type, Expr),
    Break(Atom, Expr),
    Ret(Expr),
    Async(Expr),
    Await(Expr),
    Assert(Expr),
    ActorBody { decs: Vec<Dec>, fields: Vec<(Atom, Expr)> },
    Object(irc_types::ObjSort, Vec<(Atom, Expr)>),
}

/// A declaration inside a block, per `spec.md` §3.2/§4.5.
///
/// [`Dec::Declare`] and [`Dec::Define`] do not occur in elaborator
/// output; they are introduced by the await transform's block rule,
/// which announces every value declaration's name before CPS-sequencing
/// its initializer and only binds it afterward (`spec.md` §4.5).
#[derive(Clone, Debug, PartialEq)]
pub enum Dec {
    Let(Pattern, Expr),
    Var(Atom, Expr),
    Type(irc_types::ConId),
    Declare(Atom, Type),
    Define(Atom, Mutability, Expr),
}

#[cfg(test)]
#[path = "tests/expr.rs"]
mod tests;
