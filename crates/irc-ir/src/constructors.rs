//! Smart constructors (`spec.md` §4.2).
//!
//! Every helper here assembles a node whose type and effect annotation
//! are computed from its sub-expressions so that the result is, by
//! construction, accepted by the checker. None of them validate their
//! inputs against a scope — that is the checker's job — they only keep
//! the annotation arithmetic (effect lub, shape of the result type) in
//! one place instead of scattered across every call site in the
//! transforms.

use crate::expr::{Dec, Expr, ExprKind, Mutability};
use crate::pattern::Pattern;
use irc_common::id::IdGen;
use irc_common::interner::{Atom, Interner};
use irc_common::span::Span;
use irc_types::{Effect, Type};

fn node(at: Span, typ: Type, eff: Effect, kind: ExprKind) -> Expr {
    Expr { kind: Box::new(kind), at, typ, eff }
}

/// Generates a variable expression with a name derived from `hint` and
/// guaranteed fresh within this compilation (via the shared [`IdGen`]).
pub fn fresh_var(gen: &IdGen, interner: &mut Interner, hint: &str, t: Type, at: Span) -> Expr {
    let name = interner.intern(&format!("{hint}${}", gen.fresh()));
    node(at, t, Effect::Triv, ExprKind::Var(name))
}

/// Just the fresh name, for callers that need to bind it themselves
/// before turning it into a [`ExprKind::Var`] reference.
pub fn fresh_name(gen: &IdGen, interner: &mut Interner, hint: &str) -> Atom {
    interner.intern(&format!("{hint}${}", gen.fresh()))
}

pub fn var_expr(name: Atom, t: Type, at: Span) -> Expr {
    node(at, t, Effect::Triv, ExprKind::Var(name))
}

/// `let pattern = e in body`, as a one-declaration block.
pub fn let_expr(pat: Pattern, e: Expr, body: Expr, at: Span) -> Expr {
    let eff = e.eff.lub(body.eff);
    let typ = body.typ.clone();
    node(at, typ, eff, ExprKind::Block(vec![Dec::Let(pat, e)], body))
}

pub fn var_dec_expr(name: Atom, e: Expr, body: Expr, at: Span) -> Expr {
    let eff = e.eff.lub(body.eff);
    let typ = body.typ.clone();
    node(at, typ, eff, ExprKind::Block(vec![Dec::Var(name, e)], body))
}

pub fn block_expr(decs: Vec<Dec>, result: Expr, at: Span) -> Expr {
    let eff = decs
        .iter()
        .map(dec_effect)
        .fold(result.eff, Effect::lub);
    let typ = result.typ.clone();
    node(at, typ, eff, ExprKind::Block(decs, result))
}

fn dec_effect(dec: &Dec) -> Effect {
    match dec {
        Dec::Let(_, e) | Dec::Var(_, e) | Dec::Define(_, _, e) => e.eff,
        Dec::Type(_) | Dec::Declare(_, _) => Effect::Triv,
    }
}

pub fn if_expr(cond: Expr, then_branch: Expr, else_branch: Expr, result_typ: Type, at: Span) -> Expr {
    let eff = cond.eff.lub(then_branch.eff).lub(else_branch.eff);
    node(at, result_typ, eff, ExprKind::If(cond, then_branch, else_branch))
}

pub fn func_expr(data: crate::expr::FuncData, at: Span) -> Expr {
    let typ = Type::Func(irc_types::FuncType {
        sort: data.sort,
        control: data.control,
        binds: data.binds.clone(),
        args: vec![data.arg_typ.clone()],
        ret: data.ret_typs.clone(),
    });
    node(at, typ, Effect::Triv, ExprKind::Func(data))
}

pub fn tuple_expr(es: Vec<Expr>, at: Span) -> Expr {
    let eff = Effect::lub_all(es.iter().map(|e| e.eff));
    let typ = Type::Tuple(es.iter().map(|e| e.typ.clone()).collect());
    node(at, typ, eff, ExprKind::Tuple(es))
}

/// `break label arg`. Annotation is `Non`: control never falls through.
pub fn break_expr(label: Atom, arg: Expr, at: Span) -> Expr {
    let eff = arg.eff;
    node(at, Type::Non, eff, ExprKind::Break(label, arg))
}

pub fn ret_expr(arg: Expr, at: Span) -> Expr {
    let eff = arg.eff;
    node(at, Type::Non, eff, ExprKind::Ret(arg))
}

/// `target := source`; requires `typ(target)` to already be a `Mut u`
/// annotation (the checker verifies this, this constructor only
/// combines the effects and annotates the result as unit).
pub fn assign_expr(target: Expr, source: Expr, at: Span) -> Expr {
    let eff = target.eff.lub(source.eff);
    node(at, Type::unit(), eff, ExprKind::Assign(target, source))
}

/// `f arg`; the effect is the lub of `f` and `arg`'s effects
/// (`spec.md` §4.2).
pub fn application(
    sort: irc_types::FuncSort,
    type_args: Vec<Type>,
    f: Expr,
    arg: Expr,
    result_typ: Type,
    at: Span,
) -> Expr {
    let eff = f.eff.lub(arg.eff);
    node(at, result_typ, eff, ExprKind::Call(sort, type_args, f, arg))
}

/// `tuple.i`; panics if `i` is out of range for a statically known
/// tuple type, mirroring the checker's own bounds check (`spec.md` rule
/// for `ProjE`).
pub fn project(tuple: Expr, i: u32, at: Span) -> Expr {
    let typ = match &tuple.typ {
        Type::Tuple(ts) => ts
            .get(i as usize)
            .cloned()
            .unwrap_or_else(|| panic!("project: index {i} out of range for {ts:?}")),
        Type::Non => Type::Non,
        other => panic!("project: not a tuple type: {other:?}"),
    };
    let eff = tuple.eff;
    node(at, typ, eff, ExprKind::Proj(tuple, i))
}

pub fn idx(arr: Expr, i: Expr, elem_typ: Type, at: Span) -> Expr {
    let eff = arr.eff.lub(i.eff);
    node(at, elem_typ, eff, ExprKind::Idx(arr, i))
}

pub fn declare_dec(name: Atom, t: Type) -> Dec {
    Dec::Declare(name, t)
}

pub fn define_dec(name: Atom, mutability: Mutability, value: Expr) -> Dec {
    Dec::Define(name, mutability, value)
}

pub fn typ_decl(con: irc_types::ConId) -> Dec {
    Dec::Type(con)
}

pub fn switch_expr(scrutinee: Expr, cases: Vec<crate::expr::Case>, result_typ: Type, at: Span) -> Expr {
    let eff = cases
        .iter()
        .map(|c| c.body.eff)
        .fold(scrutinee.eff, Effect::lub);
    node(at, result_typ, eff, ExprKind::Switch(scrutinee, cases))
}

/// An unbounded loop; the body must have unit type (checker's concern).
pub fn loop_expr(body: Expr, at: Span) -> Expr {
    let eff = body.eff;
    node(at, Type::Non, eff, ExprKind::Loop(body))
}

/// `label L : t { body }`. `result_typ` is `t`, the type a `break L` may
/// supply; the label's own type is the lub with the body's fallthrough type.
pub fn label_expr(label: Atom, result_typ: Type, body: Expr, at: Span) -> Expr {
    let eff = body.eff;
    let typ = body.typ.clone();
    node(at, typ, eff, ExprKind::Label(label, result_typ, body))
}

pub fn assert_expr(cond: Expr, at: Span) -> Expr {
    let eff = cond.eff;
    node(at, Type::unit(), eff, ExprKind::Assert(cond))
}

/// `async { body }`; annotated effect is always `Triv` — suspension is
/// contained, never visible to the surrounding expression.
pub fn async_expr(body: Expr, at: Span) -> Expr {
    let typ = Type::Async(Box::new(body.typ.clone()));
    node(at, typ, Effect::Triv, ExprKind::Async(body))
}

/// `await e`; `e` must have an `Async u` type (checker's concern).
pub fn await_expr(e: Expr, result_typ: Type, at: Span) -> Expr {
    node(at, result_typ, Effect::Await, ExprKind::Await(e))
}

pub fn array_expr(mutable: bool, elem_typ: Type, es: Vec<Expr>, at: Span) -> Expr {
    let eff = Effect::lub_all(es.iter().map(|e| e.eff));
    let array_elem = if mutable { Type::Mut(Box::new(elem_typ.clone())) } else { elem_typ.clone() };
    node(at, Type::Array(Box::new(array_elem)), eff, ExprKind::Array(mutable, elem_typ, es))
}

pub fn opt_expr(e: Expr, at: Span) -> Expr {
    let typ = Type::Option(Box::new(e.typ.clone()));
    let eff = e.eff;
    node(at, typ, eff, ExprKind::Opt(e))
}

pub fn tag_expr(label: Atom, e: Expr, result_typ: Type, at: Span) -> Expr {
    let eff = e.eff;
    node(at, result_typ, eff, ExprKind::Tag(label, e))
}

pub fn object_expr(sort: irc_types::ObjSort, fields: Vec<(Atom, Expr)>, at: Span) -> Expr {
    let eff = Effect::lub_all(fields.iter().map(|(_, e)| e.eff));
    let mut type_fields: Vec<irc_types::Field> = fields
        .iter()
        .map(|(label, e)| irc_types::Field { label: *label, typ: e.typ.clone() })
        .collect();
    type_fields.sort_by_key(|f| f.label);
    node(at, Type::Object(sort, type_fields), eff, ExprKind::Object(sort, fields))
}

#[cfg(test)]
#[path = "tests/constructors.rs"]
mod tests;
