//! Structural dispatch over [`ExprKind`].
//!
//! There is no runtime type reflection in this IR (`spec.md` §9): every
//! consumer — the checker, both transforms — dispatches on the tag by
//! hand. [`for_each_child`] factors out exactly the part that's the same
//! everywhere (which sub-expressions a node has), grounded on the
//! teacher's `ExpressionDispatcher` pattern of one dispatch site per
//! node kind; it does not recurse itself; callers recurse by calling it
//! again in their own visitor closure.

use crate::expr::{Dec, Expr, ExprKind};

/// Invokes `f` once for every direct child expression of `e`, in
/// evaluation order. Declarations inside a [`ExprKind::Block`] are
/// visited via their own initializer/value expressions.
pub fn for_each_child<'a>(e: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    match e.kind.as_ref() {
        ExprKind::Lit(_) | ExprKind::Var(_) | ExprKind::Prim(_) => {}
        ExprKind::Unop(_, _, a) => f(a),
        ExprKind::Binop(_, _, a, b) | ExprKind::Relop(_, _, a, b) => {
            f(a);
            f(b);
        }
        ExprKind::Show(_, a) => f(a),
        ExprKind::Tuple(es) => es.iter().for_each(|e| f(e)),
        ExprKind::Proj(a, _) => f(a),
        ExprKind::Opt(a) => f(a),
        ExprKind::Tag(_, a) => f(a),
        ExprKind::Dot(a, _) | ExprKind::ActorDot(a, _) => f(a),
        ExprKind::Array(_, _, es) => es.iter().for_each(|e| f(e)),
        ExprKind::Idx(a, b) => {
            f(a);
            f(b);
        }
        ExprKind::Assign(a, b) => {
            f(a);
            f(b);
        }
        ExprKind::Func(data) => f(&data.body),
        ExprKind::Call(_, _, func, arg) => {
            f(func);
            f(arg);
        }
        ExprKind::Block(decs, result) => {
            for dec in decs {
                match dec {
                    Dec::Let(_, e) | Dec::Var(_, e) | Dec::Define(_, _, e) => f(e),
                    Dec::Type(_) | Dec::Declare(_, _) => {}
                }
            }
            f(result);
        }
        ExprKind::If(c, t, e) => {
            f(c);
            f(t);
            f(e);
        }
        ExprKind::Switch(scrutinee, cases) => {
            f(scrutinee);
            cases.iter().for_each(|case| f(&case.body));
        }
        ExprKind::Loop(body) => f(body),
        ExprKind::Label(_, _, body) => f(body),
        ExprKind::Break(_, a) => f(a),
        ExprKind::Ret(a) => f(a),
        ExprKind::Async(a) => f(a),
        ExprKind::Await(a) => f(a),
        ExprKind::Assert(a) => f(a),
        ExprKind::ActorBody { decs, fields } => {
            for dec in decs {
                match dec {
                    Dec::Let(_, e) | Dec::Var(_, e) | Dec::Define(_, _, e) => f(e),
                    Dec::Type(_) | Dec::Declare(_, _) => {}
                }
            }
            fields.iter().for_each(|(_, e)| f(e));
        }
        ExprKind::Object(_, fields) => fields.iter().for_each(|(_, e)| f(e)),
    }
}

/// Whether `e` or any sub-expression is an `async` block or `await`
/// expression. Used by the await transform's own tests to confirm the
/// erasure property (`spec.md` §8 property 3).
pub fn contains_async_or_await(e: &Expr) -> bool {
    if matches!(e.kind.as_ref(), ExprKind::Async(_) | ExprKind::Await(_)) {
        return true;
    }
    let mut found = false;
    for_each_child(e, &mut |child| {
        found = found || contains_async_or_await(child);
    });
    found
}

#[cfg(test)]
#[path = "tests/visit.rs"]
mod tests;
