//! `check_expr`: the main rule table, per `spec.md` §4.3.
//!
//! Every rule below has the same shape: validate the node's own type
//! annotation with [`check_typ`], recurse into its children under
//! whatever context change the node introduces, then confirm that the
//! node's shape actually matches its annotation via `subtype`. The
//! effect-soundness side of the table (an annotated effect must dominate
//! the effects actually produced) is factored out into
//! [`structural_min_effect`] and applied once per node rather than
//! repeated per rule, since it is uniform (`spec.md` §8 property 4): every node's
//! effect lub's its children's effects, except `async` (which resets to
//! `Triv` — the suspension it wraps cannot leak past the boundary) and
//! `await` (which is always `Await`).

use crate::check_pattern::{check_pattern, literal_type};
use crate::check_typ::{check_typ, check_typ_as_func_member, is_illegal_mut_here};
use crate::gather::{bind_all, gather};
use crate::scope::Context;
use irc_common::diagnostic::Diagnostic;
use irc_common::limits::{MAX_EXPR_CHECK_DEPTH, MAX_SWITCH_ARMS};
use irc_common::span::Span;
use irc_ir::visit::for_each_child;
use irc_ir::{Case, Dec, Expr, ExprKind, FuncData};
use irc_types::{ops, subtype::subtype, Control, Effect, FuncSort, ObjSort, Prim, Type};

fn fail(phase: &'static str, at: Span, message: impl Into<String>) -> Diagnostic {
    let message = message.into();
    tracing::trace!(phase, %at, %message, "rule rejected node");
    Diagnostic::new(phase, at, message)
}

/// The type demanded at a read/write occurrence of a mutable location
/// (a variable or an object field): if the occurrence's own annotation
/// asks for the cell itself (`Mut u`, as an assignment target does), the
/// actual cell type must match directly; otherwise the occurrence reads
/// through the cell and only the immutable view need apply
/// (`spec.md` §4.3: "immutable view of mutable cells is taken implicitly").
fn cell_view(actual: &Type, requested: &Type) -> Type {
    match requested {
        Type::Mut(_) => actual.clone(),
        _ => ops::as_immut(actual),
    }
}

/// The minimum effect `e`'s shape structurally demands, independent of
/// its own (possibly more conservative) annotation: the lub of its
/// children's annotated effects, except that an `async` block always
/// resets to `Triv` (its body's effect is absorbed, not leaked) and an
/// `await` is always `Await`.
fn structural_min_effect(e: &Expr) -> Effect {
    match e.kind.as_ref() {
        ExprKind::Async(_) => Effect::Triv,
        ExprKind::Await(_) => Effect::Await,
        _ => {
            let mut eff = Effect::Triv;
            for_each_child(e, &mut |child| eff = eff.lub(child.eff));
            eff
        }
    }
}

/// Checks `e` against its own `typ`/`eff` annotations in `cx`, recursing
/// into its children. `depth` bounds the recursion
/// ([`MAX_EXPR_CHECK_DEPTH`]); callers pass `0` at the root of a body.
pub fn check_expr(cx: &Context, e: &Expr, depth: u32) -> Result<(), Diagnostic> {
    if depth >= MAX_EXPR_CHECK_DEPTH {
        return Err(fail(cx.phase, e.at, "expression nesting too deep"));
    }
    check_typ(cx.cons, cx.phase, e.at, &e.typ)?;

    let min_eff = structural_min_effect(e);
    if !min_eff.le(e.eff) {
        return Err(fail(cx.phase, e.at, "expression's annotated effect does not dominate its actual effect"));
    }

    check_kind(cx, e, depth)
}

fn sub(cx: &Context, t1: &Type, t2: &Type) -> bool {
    subtype(cx.cons, t1, t2)
}

fn check_kind(cx: &Context, e: &Expr, depth: u32) -> Result<(), Diagnostic> {
    let at = e.at;
    match e.kind.as_ref() {
        ExprKind::Lit(lit) => {
            let lt = literal_type(lit);
            require(cx, at, sub(cx, &lt, &e.typ), "literal's type is not a subtype of its annotation")
        }

        ExprKind::Var(name) => {
            let actual = cx
                .scope
                .vals
                .get(name)
                .ok_or_else(|| fail(cx.phase, at, "variable reference is not in scope"))?;
            let view = cell_view(actual, &e.typ);
            require(cx, at, sub(cx, &view, &e.typ), "variable's type is not a subtype of its annotation")
        }

        // A bare reference to a primitive operator; its annotation is
        // trusted as-is, there being no catalogue of primitive-operator
        // signatures in this pipeline (that lives upstream, in the
        // elaborator that produced this IR).
        ExprKind::Prim(_) => Ok(()),

        ExprKind::Unop(_, operand_typ, a) => {
            check_typ(cx.cons, cx.phase, at, operand_typ)?;
            check_expr(cx, a, depth + 1)?;
            require(cx, at, sub(cx, &a.typ, operand_typ), "unary operand is not a subtype of the operator's declared type")?;
            require(cx, at, sub(cx, operand_typ, &e.typ), "unary result is not a subtype of its annotation")
        }

        ExprKind::Binop(_, operand_typ, a, b) => {
            check_typ(cx.cons, cx.phase, at, operand_typ)?;
            check_expr(cx, a, depth + 1)?;
            check_expr(cx, b, depth + 1)?;
            require(cx, at, sub(cx, &a.typ, operand_typ) && sub(cx, &b.typ, operand_typ), "binary operand is not a subtype of the operator's declared type")?;
            require(cx, at, sub(cx, operand_typ, &e.typ), "binary result is not a subtype of its annotation")
        }

        ExprKind::Relop(_, operand_typ, a, b) => {
            check_typ(cx.cons, cx.phase, at, operand_typ)?;
            check_expr(cx, a, depth + 1)?;
            check_expr(cx, b, depth + 1)?;
            require(cx, at, sub(cx, &a.typ, operand_typ) && sub(cx, &b.typ, operand_typ), "relational operand is not a subtype of the operator's declared type")?;
            require(cx, at, sub(cx, &Type::Prim(Prim::Bool), &e.typ), "relational result must be Bool")
        }

        ExprKind::Show(operand_typ, a) => {
            if !cx.flavor.has_show {
                return Err(fail(cx.phase, at, "show expression present in a flavor that no longer has show"));
            }
            check_typ(cx.cons, cx.phase, at, operand_typ)?;
            check_expr(cx, a, depth + 1)?;
            require(cx, at, sub(cx, &a.typ, operand_typ), "show operand is not a subtype of the operator's declared type")?;
            require(cx, at, sub(cx, &Type::Prim(Prim::Text), &e.typ), "show result must be Text")
        }

        ExprKind::Tuple(es) => {
            es.iter().try_for_each(|c| check_expr(cx, c, depth + 1))?;
            for c in es {
                if is_illegal_mut_here(&c.typ) {
                    return Err(fail(cx.phase, at, "tuple component type may not be directly Mut"));
                }
            }
            let t = Type::Tuple(es.iter().map(|c| c.typ.clone()).collect());
            require(cx, at, sub(cx, &t, &e.typ), "tuple's type is not a subtype of its annotation")
        }

        ExprKind::Proj(tuple, i) => {
            check_expr(cx, tuple, depth + 1)?;
            let ts = ops::as_tup_sub(cx.cons, &tuple.typ).map_err(|err| fail(cx.phase, at, format!("projection: {err}")))?;
            if !ts.is_empty() && (*i as usize) >= ts.len() {
                return Err(fail(cx.phase, at, "tuple projection index out of range"));
            }
            let component = ts.get(*i as usize).cloned().unwrap_or(Type::Non);
            require(cx, at, sub(cx, &component, &e.typ), "projected component is not a subtype of its annotation")
        }

        ExprKind::Opt(a) => {
            check_expr(cx, a, depth + 1)?;
            require(cx, at, sub(cx, &Type::Option(Box::new(a.typ.clone())), &e.typ), "option injection is not a subtype of its annotation")
        }

        ExprKind::Tag(label, a) => {
            check_expr(cx, a, depth + 1)?;
            let t = Type::Variant(vec![(*label, a.typ.clone())]);
            require(cx, at, sub(cx, &t, &e.typ), "variant injection is not a subtype of its annotation")
        }

        ExprKind::Dot(obj, label) => {
            check_expr(cx, obj, depth + 1)?;
            let (sort, fields) = ops::as_obj_sub(cx.cons, &obj.typ).map_err(|err| fail(cx.phase, at, format!("field access: {err}")))?;
            if sort == ObjSort::Actor {
                return Err(fail(cx.phase, at, "plain field access on an actor; use the actor-call form"));
            }
            let field_typ = ops::lookup_field(*label, &fields)
                .ok_or_else(|| fail(cx.phase, at, "field access names a field absent from the object type"))?;
            let view = cell_view(field_typ, &e.typ);
            require(cx, at, sub(cx, &view, &e.typ), "field's type is not a subtype of its annotation")
        }

        ExprKind::ActorDot(obj, label) => {
            check_expr(cx, obj, depth + 1)?;
            let (sort, fields) = ops::as_obj_sub(cx.cons, &obj.typ).map_err(|err| fail(cx.phase, at, format!("actor field access: {err}")))?;
            if sort != ObjSort::Actor {
                return Err(fail(cx.phase, at, "actor field access on a non-actor object"));
            }
            let field_typ = ops::lookup_field(*label, &fields)
                .ok_or_else(|| fail(cx.phase, at, "actor field access names a field absent from the actor type"))?;
            require(cx, at, sub(cx, field_typ, &e.typ), "actor field's type is not a subtype of its annotation")
        }

        ExprKind::Array(mutable, elem_typ, es) => {
            check_typ(cx.cons, cx.phase, at, elem_typ)?;
            es.iter().try_for_each(|c| check_expr(cx, c, depth + 1))?;
            es.iter().try_for_each(|c| {
                require(cx, at, sub(cx, &c.typ, elem_typ), "array element is not a subtype of the array's declared element type")
            })?;
            let element = if *mutable { Type::Mut(Box::new(elem_typ.clone())) } else { elem_typ.clone() };
            require(cx, at, sub(cx, &Type::Array(Box::new(element)), &e.typ), "array's type is not a subtype of its annotation")
        }

        ExprKind::Idx(arr, i) => {
            check_expr(cx, arr, depth + 1)?;
            check_expr(cx, i, depth + 1)?;
            require(cx, at, sub(cx, &i.typ, &Type::Prim(Prim::Nat)), "array index is not a subtype of Nat")?;
            let elem = ops::as_array_sub(cx.cons, &arr.typ).map_err(|err| fail(cx.phase, at, format!("indexing: {err}")))?;
            let view = cell_view(&elem, &e.typ);
            require(cx, at, sub(cx, &view, &e.typ), "indexed element is not a subtype of its annotation")
        }

        ExprKind::Assign(target, source) => {
            check_expr(cx, target, depth + 1)?;
            check_expr(cx, source, depth + 1)?;
            let cell = ops::as_mut(cx.cons, &target.typ).map_err(|err| fail(cx.phase, at, format!("assignment target: {err}")))?;
            require(cx, at, sub(cx, &source.typ, &cell), "assigned value is not a subtype of the target's cell type")?;
            require(cx, at, sub(cx, &Type::unit(), &e.typ), "assignment's annotation must be unit")
        }

        ExprKind::Func(data) => check_func(cx, e, data, depth),

        ExprKind::Call(call_sort, type_args, f, arg) => {
            check_expr(cx, f, depth + 1)?;
            check_expr(cx, arg, depth + 1)?;
            type_args.iter().try_for_each(|t| check_typ(cx.cons, cx.phase, at, t))?;
            if type_args.iter().any(is_illegal_mut_here) {
                return Err(fail(cx.phase, at, "type argument may not be directly Mut"));
            }
            let ft = ops::as_func_sub(cx.cons, &f.typ).map_err(|err| fail(cx.phase, at, format!("call: {err}")))?;
            if ft.sort != *call_sort {
                return Err(fail(cx.phase, at, "call convention does not match the callee's function sort"));
            }
            if ft.binds.len() != type_args.len() {
                return Err(fail(cx.phase, at, "call supplies the wrong number of type arguments"));
            }
            for (bind, ta) in ft.binds.iter().zip(type_args) {
                let bound = irc_types::open(&ft.binds, type_args, &bind.bound);
                require(cx, at, sub(cx, ta, &bound), "type argument does not satisfy the callee's bound")?;
            }
            let domain = irc_types::open(&ft.binds, type_args, &ops::seq(&ft.args));
            let codomain = irc_types::open(&ft.binds, type_args, &ops::seq(&ft.ret));
            require(cx, at, sub(cx, &arg.typ, &domain), "call argument is not a subtype of the callee's domain")?;
            if *call_sort == FuncSort::Shared && (!ops::is_concrete(cx.cons, &domain) || !ops::is_concrete(cx.cons, &codomain)) {
                return Err(fail(cx.phase, at, "shared call's domain or codomain is not concrete"));
            }
            require(cx, at, sub(cx, &codomain, &e.typ), "call result is not a subtype of its annotation")
        }

        ExprKind::Block(decs, result) => {
            let scope = gather(cx.cons, cx.phase, at, &cx.scope, decs)?;
            tracing::trace!(phase = cx.phase, %at, "entering block scope");
            let inner = cx.with_scope(scope);
            check_decs(&inner, decs, at, depth + 1)?;
            check_expr(&inner, result, depth + 1)?;
            tracing::trace!(phase = cx.phase, %at, "leaving block scope");
            require(cx, at, sub(cx, &result.typ, &e.typ), "block's result is not a subtype of its annotation")
        }

        ExprKind::If(cond, then_branch, else_branch) => {
            check_expr(cx, cond, depth + 1)?;
            check_expr(cx, then_branch, depth + 1)?;
            check_expr(cx, else_branch, depth + 1)?;
            require(cx, at, sub(cx, &cond.typ, &Type::Prim(Prim::Bool)), "if condition is not a subtype of Bool")?;
            require(cx, at, sub(cx, &then_branch.typ, &e.typ), "if's then-branch is not a subtype of its annotation")?;
            require(cx, at, sub(cx, &else_branch.typ, &e.typ), "if's else-branch is not a subtype of its annotation")
        }

        ExprKind::Switch(scrutinee, cases) => {
            if cases.len() as u32 > MAX_SWITCH_ARMS {
                return Err(fail(cx.phase, at, "switch has more arms than the checker will walk"));
            }
            check_expr(cx, scrutinee, depth + 1)?;
            cases.iter().try_for_each(|case| check_case(cx, case, &scrutinee.typ, &e.typ, depth + 1))
        }

        ExprKind::Loop(body) => {
            check_expr(cx, body, depth + 1)?;
            require(cx, at, sub(cx, &body.typ, &Type::unit()), "loop body is not a subtype of unit")
        }

        ExprKind::Label(label, t, body) => {
            check_typ(cx.cons, cx.phase, at, t)?;
            let inner = cx.with_label(*label, t.clone());
            check_expr(&inner, body, depth + 1)?;
            require(cx, at, sub(cx, &body.typ, t), "labelled block's body is not a subtype of its label's type")?;
            require(cx, at, sub(cx, t, &e.typ), "labelled block's type is not a subtype of its annotation")
        }

        ExprKind::Break(label, arg) => {
            check_expr(cx, arg, depth + 1)?;
            let label_typ = cx
                .labels
                .get(label)
                .ok_or_else(|| fail(cx.phase, at, "break names a label not currently in scope"))?;
            require(cx, at, sub(cx, &arg.typ, label_typ), "break argument is not a subtype of its label's type")?;
            require(cx, at, sub(cx, &Type::Non, &e.typ), "break's annotation must accept Non")
        }

        ExprKind::Ret(arg) => {
            check_expr(cx, arg, depth + 1)?;
            let ret = cx
                .return_typ
                .as_ref()
                .ok_or_else(|| fail(cx.phase, at, "return outside of any function body"))?;
            require(cx, at, sub(cx, &arg.typ, ret), "return argument is not a subtype of the enclosing function's result type")?;
            require(cx, at, sub(cx, &Type::Non, &e.typ), "return's annotation must accept Non")
        }

        ExprKind::Async(body) => {
            if !cx.flavor.has_await {
                return Err(fail(cx.phase, at, "async expression present in a flavor that no longer has await"));
            }
            // Body checked with empty labels, its own type as the return
            // slot, and the async flag raised.
            let inner = cx.enter_body(cx.scope.clone(), Some(body.typ.clone()), true);
            check_expr(&inner, body, depth + 1)?;
            require(cx, at, sub(cx, &Type::Async(Box::new(body.typ.clone())), &e.typ), "async's type is not a subtype of its annotation")
        }

        ExprKind::Await(body) => {
            if !cx.flavor.has_await {
                return Err(fail(cx.phase, at, "await expression present in a flavor that no longer has await"));
            }
            if !cx.is_async {
                return Err(fail(cx.phase, at, "await used outside of an async context"));
            }
            check_expr(cx, body, depth + 1)?;
            let inner = ops::as_async_sub(cx.cons, &body.typ).map_err(|err| fail(cx.phase, at, format!("await: {err}")))?;
            require(cx, at, sub(cx, &inner, &e.typ), "awaited value is not a subtype of its annotation")
        }

        ExprKind::Assert(a) => {
            check_expr(cx, a, depth + 1)?;
            require(cx, at, sub(cx, &a.typ, &Type::Prim(Prim::Bool)), "assert's operand is not a subtype of Bool")?;
            require(cx, at, sub(cx, &Type::unit(), &e.typ), "assert's annotation must be unit")
        }

        ExprKind::ActorBody { decs, fields } => {
            let scope = gather(cx.cons, cx.phase, at, &cx.scope, decs)?;
            // Fresh body: empty labels, no return slot, async flag cleared.
            let inner = cx.enter_body(scope, None, false);
            check_decs(&inner, decs, at, depth + 1)?;
            fields.iter().try_for_each(|(_, body)| check_expr(&inner, body, depth + 1))?;
            let object_fields: Result<Vec<_>, Diagnostic> = fields
                .iter()
                .map(|(label, body)| Ok(irc_types::Field { label: *label, typ: body.typ.clone() }))
                .collect();
            let mut object_fields = object_fields?;
            object_fields.sort_by_key(|f| f.label);
            require(cx, at, sub(cx, &Type::Object(ObjSort::Actor, object_fields), &e.typ), "actor's field set is not a subtype of its annotation")
        }

        ExprKind::Object(sort, fields) => {
            fields.iter().try_for_each(|(_, body)| check_expr(cx, body, depth + 1))?;
            let mut object_fields: Vec<_> = fields
                .iter()
                .map(|(label, body)| irc_types::Field { label: *label, typ: body.typ.clone() })
                .collect();
            object_fields.sort_by_key(|f| f.label);
            require(cx, at, sub(cx, &Type::Object(*sort, object_fields), &e.typ), "object's field set is not a subtype of its annotation")
        }
    }
}

fn require(cx: &Context, at: Span, ok: bool, message: &'static str) -> Result<(), Diagnostic> {
    if ok {
        Ok(())
    } else {
        Err(fail(cx.phase, at, message))
    }
}

pub(crate) fn check_decs(cx: &Context, decs: &[Dec], at: Span, depth: u32) -> Result<(), Diagnostic> {
    for dec in decs {
        match dec {
            Dec::Let(pat, init) => {
                check_expr(cx, init, depth)?;
                let _ = check_pattern(cx.cons, cx.phase, init.at, pat, &init.typ)?;
            }
            Dec::Var(_, init) => {
                check_expr(cx, init, depth)?;
            }
            Dec::Declare(_, t) => {
                check_typ(cx.cons, cx.phase, at, t)?;
            }
            Dec::Define(name, _, value) => {
                check_expr(cx, value, depth)?;
                let declared = cx
                    .scope
                    .vals
                    .get(name)
                    .ok_or_else(|| fail(cx.phase, value.at, "define names a variable with no matching declare in this block"))?;
                require(cx, value.at, sub(cx, &value.typ, declared), "define's value is not a subtype of its declared type")?;
            }
            Dec::Type(_) => {
                // Identity was already checked into the scope by `gather`;
                // nothing further to verify here, the constructor's own
                // kind was validated when it was declared.
            }
        }
    }
    Ok(())
}

fn check_case(cx: &Context, case: &Case, scrutinee_typ: &Type, result_typ: &Type, depth: u32) -> Result<(), Diagnostic> {
    let bound = check_pattern(cx.cons, cx.phase, case.body.at, &case.pat, scrutinee_typ)?;
    let mut scope = cx.scope.clone();
    bind_all(cx.phase, case.body.at, &mut scope, bound)?;
    let inner = cx.with_scope(scope);
    check_expr(&inner, &case.body, depth)?;
    require(cx, case.body.at, sub(cx, &case.body.typ, result_typ), "switch case body is not a subtype of the switch's annotation")
}

fn check_func(cx: &Context, e: &Expr, data: &FuncData, depth: u32) -> Result<(), Diagnostic> {
    let at = e.at;
    // A function's own type parameters are in scope (as `Type::Bound`
    // references one level deep) throughout its binds' bounds, its
    // argument type, and its result types.
    data.binds.iter().try_for_each(|b| check_typ_as_func_member(cx.cons, cx.phase, at, &b.bound))?;
    check_typ_as_func_member(cx.cons, cx.phase, at, &data.arg_typ)?;
    data.ret_typs.iter().try_for_each(|t| check_typ_as_func_member(cx.cons, cx.phase, at, t))?;
    if is_illegal_mut_here(&data.arg_typ) {
        return Err(fail(cx.phase, at, "function parameter type may not be directly Mut"));
    }
    for t in &data.ret_typs {
        if is_illegal_mut_here(t) {
            return Err(fail(cx.phase, at, "function result type may not be directly Mut"));
        }
    }

    let mut scope = cx.scope.clone();
    if let Some(name) = data.name {
        scope.vals.insert(name, e.typ.clone());
    }
    let bound = check_pattern(cx.cons, cx.phase, at, &data.arg, &data.arg_typ)?;
    bind_all(cx.phase, at, &mut scope, bound)?;
    let return_typ = ops::seq(&data.ret_typs);
    let inner = cx.enter_body(scope, Some(return_typ), false);
    check_expr(&inner, &data.body, depth + 1)?;
    require(cx, at, sub(cx, &data.body.typ, &ops::seq(&data.ret_typs)), "function body is not a subtype of its declared result")?;

    if data.control == Control::Promises && !cx.flavor.has_async_typ {
        return Err(fail(cx.phase, at, "function promises a result in a flavor without async types"));
    }

    // Shared-function extra conditions (`spec.md` §3.1): a message that
    // may cross actor boundaries must have a concrete domain and
    // codomain; if it promises, the promised result must itself be
    // shareable.
    if data.sort == FuncSort::Shared {
        let domain = data.arg_typ.clone();
        let codomain = ops::seq(&data.ret_typs);
        if !ops::is_concrete(cx.cons, &domain) || !ops::is_concrete(cx.cons, &codomain) {
            return Err(fail(cx.phase, at, "shared function's domain or codomain is not concrete"));
        }
        if data.control == Control::Promises {
            let Type::Async(result) = &codomain else {
                return Err(fail(cx.phase, at, "a promising shared function's result must be an Async type"));
            };
            if !ops::is_shared(cx.cons, result) {
                return Err(fail(cx.phase, at, "a promising shared function's result must be shareable"));
            }
        }
    }

    let func_typ = Type::Func(irc_types::FuncType {
        sort: data.sort,
        control: data.control,
        binds: data.binds.clone(),
        args: vec![data.arg_typ.clone()],
        ret: data.ret_typs.clone(),
    });
    require(cx, at, sub(cx, &func_typ, &e.typ), "function's constructed type is not a subtype of its annotation")
}

#[cfg(test)]
#[path = "tests/check_expr.rs"]
mod tests;
