//! The self tail-call optimizer (`spec.md` §4.4).
//!
//! Rewrites each locally bound, self tail-recursive function into the
//! loop-and-reassign form: a function whose body contains at least one
//! call to its own name, in tail position, with identity generic
//! instantiation, runs in constant stack depth regardless of the
//! argument. Every other function is left untouched; mutual recursion
//! and non-identity instantiation are explicitly out of scope (`spec.md`
//! §4.4 Non-goals) and pass through as ordinary calls.

use irc_common::id::IdGen;
use irc_common::interner::{Atom, Interner};
use irc_common::span::Span;
use irc_ir::constructors::{
    assign_expr, block_expr, break_expr, fresh_name, label_expr, let_expr, loop_expr, project, ret_expr, tuple_expr, var_expr,
};
use irc_ir::{Dec, Expr, ExprKind, FuncData, Pattern, Program};
use irc_types::{Effect, Type, TypeBind};
use std::cell::Cell;
use std::rc::Rc;

/// Everything the optimizer needs about the innermost enclosing
/// candidate function while it walks that function's body.
struct FuncInfo {
    name: Atom,
    binds: Vec<TypeBind>,
    /// One fresh mutable temporary per flattened argument component.
    temps: Vec<Atom>,
    /// Types of the same components, parallel to `temps`.
    arg_typs: Vec<Type>,
    /// Whether the function's own argument type is literally a tuple
    /// (including the zero-component unit tuple), as opposed to a single
    /// plain type that happens to flatten to one component.
    is_tuple: bool,
    /// The back-edge label.
    label: Atom,
    /// Set the first time a qualifying self tail call is rewritten.
    detected: Rc<Cell<bool>>,
}

#[derive(Clone)]
struct Env {
    tail_pos: bool,
    info: Option<Rc<FuncInfo>>,
}

impl Env {
    fn root() -> Self {
        Env { tail_pos: true, info: None }
    }

    fn non_tail(&self) -> Self {
        Env { tail_pos: false, info: self.info.clone() }
    }

    fn tail(&self) -> Self {
        Env { tail_pos: true, info: self.info.clone() }
    }

    /// Entering a function, async, or actor body: no tail calls cross
    /// this boundary (`spec.md` §4.4).
    fn fresh_boundary() -> Self {
        Env { tail_pos: true, info: None }
    }

    /// Clears `info` if any of `names` shadows the enclosing candidate's
    /// own name (`spec.md` §4.4: "any local binder ... that shadows
    /// `info.name` clears `info` for the scope it introduces").
    fn after_binding(&self, names: &[Atom]) -> Self {
        match &self.info {
            Some(info) if names.contains(&info.name) => Env { tail_pos: self.tail_pos, info: None },
            _ => self.clone(),
        }
    }
}

/// Rewrites every locally bound self tail-recursive function in
/// `program`'s top-level declaration groups. Actor fields are left
/// untouched: actor bodies are opaque to this pass (`spec.md` §9 design
/// note on the `ActorE` rule — no descent into actor scopes).
pub fn tailcall_pass(gen: &IdGen, interner: &mut Interner, program: &Program) -> Program {
    let env = Env::root();
    let decs = program
        .decs
        .iter()
        .map(|group| group.iter().map(|dec| rewrite_dec(gen, interner, &env, dec)).collect())
        .collect();
    Program {
        args: program.args.clone(),
        decs,
        actor_fields: program.actor_fields.clone(),
        flavor: program.flavor,
    }
}

fn rewrite_dec(gen: &IdGen, interner: &mut Interner, env: &Env, dec: &Dec) -> Dec {
    match dec {
        Dec::Let(pat, init) => Dec::Let(pat.clone(), rewrite_expr(gen, interner, env, init)),
        Dec::Var(name, init) => Dec::Var(*name, rewrite_expr(gen, interner, env, init)),
        Dec::Declare(name, t) => Dec::Declare(*name, t.clone()),
        Dec::Define(name, m, value) => Dec::Define(*name, *m, rewrite_expr(gen, interner, env, value)),
        Dec::Type(con) => Dec::Type(*con),
    }
}

fn dec_bound_names(dec: &Dec, out: &mut Vec<Atom>) {
    match dec {
        Dec::Let(pat, _) => pat.bound_vars(out),
        Dec::Var(name, _) | Dec::Declare(name, _) | Dec::Define(name, _, _) => out.push(*name),
        Dec::Type(_) => {}
    }
}

fn is_identity_instantiation(type_args: &[Type], binds: &[TypeBind]) -> bool {
    type_args.len() == binds.len()
        && type_args.iter().enumerate().all(|(i, t)| matches!(t, Type::Bound(j) if *j as usize == i))
}

/// If `e` is, under `env`, a call to the enclosing candidate's own name
/// with identity type arguments, returns its (type arguments, argument
/// expression).
fn match_self_tail_call<'a>(env: &Env, e: &'a Expr) -> Option<(&'a [Type], &'a Expr)> {
    if !env.tail_pos {
        return None;
    }
    let info = env.info.as_ref()?;
    let ExprKind::Call(_sort, type_args, f, arg) = e.kind.as_ref() else {
        return None;
    };
    let ExprKind::Var(name) = f.kind.as_ref() else {
        return None;
    };
    if *name != info.name || !is_identity_instantiation(type_args, &info.binds) {
        return None;
    }
    Some((type_args.as_slice(), arg))
}

fn rewrite_expr(gen: &IdGen, interner: &mut Interner, env: &Env, e: &Expr) -> Expr {
    if let Some((_, arg)) = match_self_tail_call(env, e) {
        let info = env.info.clone().expect("match_self_tail_call only matches with info present");
        info.detected.set(true);
        tracing::debug!(name = ?info.name, %e.at, "rewriting self tail call into a loop back-edge");
        let new_arg = rewrite_expr(gen, interner, &env.non_tail(), arg);
        return build_tail_jump(gen, interner, &info, new_arg, e.at);
    }

    let rebuild = |kind: ExprKind| Expr { kind: Box::new(kind), at: e.at, typ: e.typ.clone(), eff: e.eff };

    match e.kind.as_ref() {
        ExprKind::Lit(_) | ExprKind::Var(_) | ExprKind::Prim(_) => e.clone(),

        ExprKind::Unop(op, t, a) => rebuild(ExprKind::Unop(*op, t.clone(), rewrite_expr(gen, interner, &env.non_tail(), a))),

        ExprKind::Binop(op, t, a, b) => rebuild(ExprKind::Binop(
            *op,
            t.clone(),
            rewrite_expr(gen, interner, &env.non_tail(), a),
            rewrite_expr(gen, interner, &env.non_tail(), b),
        )),

        ExprKind::Relop(op, t, a, b) => rebuild(ExprKind::Relop(
            *op,
            t.clone(),
            rewrite_expr(gen, interner, &env.non_tail(), a),
            rewrite_expr(gen, interner, &env.non_tail(), b),
        )),

        ExprKind::Show(t, a) => rebuild(ExprKind::Show(t.clone(), rewrite_expr(gen, interner, &env.non_tail(), a))),

        ExprKind::Tuple(es) => {
            rebuild(ExprKind::Tuple(es.iter().map(|c| rewrite_expr(gen, interner, &env.non_tail(), c)).collect()))
        }

        ExprKind::Proj(a, i) => rebuild(ExprKind::Proj(rewrite_expr(gen, interner, &env.non_tail(), a), *i)),

        ExprKind::Opt(a) => rebuild(ExprKind::Opt(rewrite_expr(gen, interner, &env.non_tail(), a))),

        ExprKind::Tag(label, a) => rebuild(ExprKind::Tag(*label, rewrite_expr(gen, interner, &env.non_tail(), a))),

        ExprKind::Dot(a, label) => rebuild(ExprKind::Dot(rewrite_expr(gen, interner, &env.non_tail(), a), *label)),

        ExprKind::ActorDot(a, label) => rebuild(ExprKind::ActorDot(rewrite_expr(gen, interner, &env.non_tail(), a), *label)),

        ExprKind::Array(mutable, t, es) => rebuild(ExprKind::Array(
            *mutable,
            t.clone(),
            es.iter().map(|c| rewrite_expr(gen, interner, &env.non_tail(), c)).collect(),
        )),

        ExprKind::Idx(a, i) => rebuild(ExprKind::Idx(
            rewrite_expr(gen, interner, &env.non_tail(), a),
            rewrite_expr(gen, interner, &env.non_tail(), i),
        )),

        ExprKind::Assign(a, b) => rebuild(ExprKind::Assign(
            rewrite_expr(gen, interner, &env.non_tail(), a),
            rewrite_expr(gen, interner, &env.non_tail(), b),
        )),

        ExprKind::Func(data) => rebuild(ExprKind::Func(rewrite_func(gen, interner, data))),

        ExprKind::Call(sort, type_args, f, arg) => rebuild(ExprKind::Call(
            *sort,
            type_args.clone(),
            rewrite_expr(gen, interner, &env.non_tail(), f),
            rewrite_expr(gen, interner, &env.non_tail(), arg),
        )),

        ExprKind::Block(decs, result) => {
            let mut running = env.clone();
            let mut new_decs = Vec::with_capacity(decs.len());
            for dec in decs {
                new_decs.push(rewrite_dec(gen, interner, &running, dec));
                let mut bound = Vec::new();
                dec_bound_names(dec, &mut bound);
                running = running.after_binding(&bound);
            }
            let new_result = rewrite_expr(gen, interner, &running.tail(), result);
            rebuild(ExprKind::Block(new_decs, new_result))
        }

        ExprKind::If(c, t, el) => rebuild(ExprKind::If(
            rewrite_expr(gen, interner, &env.non_tail(), c),
            rewrite_expr(gen, interner, &env.tail(), t),
            rewrite_expr(gen, interner, &env.tail(), el),
        )),

        ExprKind::Switch(scrutinee, cases) => {
            let new_scrutinee = rewrite_expr(gen, interner, &env.non_tail(), scrutinee);
            let new_cases = cases
                .iter()
                .map(|case| {
                    let mut bound = Vec::new();
                    case.pat.bound_vars(&mut bound);
                    let inner = env.tail().after_binding(&bound);
                    irc_ir::Case { pat: case.pat.clone(), body: rewrite_expr(gen, interner, &inner, &case.body) }
                })
                .collect();
            rebuild(ExprKind::Switch(new_scrutinee, new_cases))
        }

        ExprKind::Loop(body) => rebuild(ExprKind::Loop(rewrite_expr(gen, interner, &env.non_tail(), body))),

        ExprKind::Label(label, t, body) => {
            let inner = env.after_binding(std::slice::from_ref(label));
            rebuild(ExprKind::Label(*label, t.clone(), rewrite_expr(gen, interner, &inner, body)))
        }

        ExprKind::Break(label, arg) => rebuild(ExprKind::Break(*label, rewrite_expr(gen, interner, &env.non_tail(), arg))),

        // The operand of `return` is a tail position even when `return`
        // itself is not (`spec.md` §4.4).
        ExprKind::Ret(arg) => rebuild(ExprKind::Ret(rewrite_expr(gen, interner, &env.tail(), arg))),

        ExprKind::Async(body) => rebuild(ExprKind::Async(rewrite_expr(gen, interner, &Env::fresh_boundary(), body))),

        ExprKind::Await(a) => rebuild(ExprKind::Await(rewrite_expr(gen, interner, &env.non_tail(), a))),

        ExprKind::Assert(a) => rebuild(ExprKind::Assert(rewrite_expr(gen, interner, &env.non_tail(), a))),

        // Actor bodies are opaque to this pass: no descent (`spec.md` §9).
        ExprKind::ActorBody { .. } => e.clone(),

        ExprKind::Object(sort, fields) => rebuild(ExprKind::Object(
            *sort,
            fields.iter().map(|(label, v)| (*label, rewrite_expr(gen, interner, &env.non_tail(), v))).collect(),
        )),
    }
}

fn flatten_arg_typ(arg_typ: &Type) -> Vec<Type> {
    match arg_typ {
        Type::Tuple(ts) => ts.clone(),
        other => vec![other.clone()],
    }
}

fn rewrite_func(gen: &IdGen, interner: &mut Interner, data: &FuncData) -> FuncData {
    let Some(name) = data.name else {
        let inner = Env::fresh_boundary();
        let body = rewrite_expr(gen, interner, &inner, &data.body);
        return FuncData { body, ..data.clone() };
    };

    let mut shadowed_by_arg = Vec::new();
    data.arg.bound_vars(&mut shadowed_by_arg);

    let is_tuple = matches!(data.arg_typ, Type::Tuple(_));
    let arg_typs = flatten_arg_typ(&data.arg_typ);
    let temps: Vec<Atom> = arg_typs.iter().map(|_| fresh_name(gen, interner, "temp")).collect();
    let label = fresh_name(gen, interner, "tailcall");
    let detected = Rc::new(Cell::new(false));
    let info = Rc::new(FuncInfo { name, binds: data.binds.clone(), temps, arg_typs, is_tuple, label, detected: Rc::clone(&detected) });

    let inner = if shadowed_by_arg.contains(&name) {
        Env { tail_pos: true, info: None }
    } else {
        Env { tail_pos: true, info: Some(info.clone()) }
    };
    let new_body = rewrite_expr(gen, interner, &inner, &data.body);

    if !detected.get() {
        return FuncData { body: new_body, ..data.clone() };
    }

    let at = data.body.at;
    let whole_name = fresh_name(gen, interner, "args");
    let whole_typ = data.arg_typ.clone();

    let mut decs = Vec::with_capacity(info.temps.len());
    if !info.is_tuple {
        let src = var_expr(whole_name, whole_typ.clone(), at);
        decs.push(Dec::Var(info.temps[0], src));
    } else {
        for (i, temp) in info.temps.iter().enumerate() {
            let whole = var_expr(whole_name, whole_typ.clone(), at);
            let src = project(whole, i as u32, at);
            decs.push(Dec::Var(*temp, src));
        }
    }

    let rebind_value = if info.temps.is_empty() {
        tuple_expr(Vec::new(), at)
    } else if !info.is_tuple {
        var_expr(info.temps[0], info.arg_typs[0].clone(), at)
    } else {
        let components = info
            .temps
            .iter()
            .zip(info.arg_typs.iter())
            .map(|(t, ty)| var_expr(*t, ty.clone(), at))
            .collect();
        tuple_expr(components, at)
    };

    let returned = ret_expr(new_body, at);
    let rebound = let_expr(data.arg.clone(), rebind_value, returned, at);
    let labeled = label_expr(info.label, Type::unit(), rebound, at);
    let looped = loop_expr(labeled, at);
    let body = block_expr(decs, looped, at);

    FuncData { arg: Pattern::Var(whole_name), body, ..data.clone() }
}

/// Builds `{ temp := newArgs; break L }` for a recognized self tail
/// call, per the `assignEs` rule (`spec.md` §4.4): a single argument is
/// assigned directly; a tuple-literal argument is bound component-wise
/// through fresh lets before the assignments (so a component that reads
/// an old temporary is evaluated before any temporary is overwritten);
/// anything else binds the whole argument to one fresh temporary first,
/// then projects.
fn build_tail_jump(gen: &IdGen, interner: &mut Interner, info: &FuncInfo, new_arg: Expr, at: Span) -> Expr {
    let arity = info.temps.len();
    let mut pre: Vec<Dec> = Vec::new();
    let mut sources: Vec<Expr> = Vec::with_capacity(arity);

    if !info.is_tuple {
        sources.push(new_arg);
    } else if let ExprKind::Tuple(es) = new_arg.kind.as_ref() {
        if es.len() == arity {
            for comp in es {
                let v = fresh_name(gen, interner, "newarg");
                pre.push(Dec::Let(Pattern::Var(v), comp.clone()));
                sources.push(var_expr(v, comp.typ.clone(), at));
            }
        } else {
            bind_whole_then_project(gen, interner, info, new_arg, at, &mut pre, &mut sources);
        }
    } else {
        bind_whole_then_project(gen, interner, info, new_arg, at, &mut pre, &mut sources);
    }

    let mut decs = pre;
    for (temp, (comp_ty, src)) in info.temps.iter().zip(info.arg_typs.iter().zip(sources)) {
        let target = Expr { kind: Box::new(ExprKind::Var(*temp)), at, typ: Type::Mut(Box::new(comp_ty.clone())), eff: Effect::Triv };
        decs.push(Dec::Let(Pattern::Wild, assign_expr(target, src, at)));
    }
    let brk = break_expr(info.label, tuple_expr(Vec::new(), at), at);
    block_expr(decs, brk, at)
}

fn bind_whole_then_project(
    gen: &IdGen,
    interner: &mut Interner,
    info: &FuncInfo,
    new_arg: Expr,
    at: Span,
    pre: &mut Vec<Dec>,
    sources: &mut Vec<Expr>,
) {
    let whole_typ = new_arg.typ.clone();
    let whole = fresh_name(gen, interner, "newargs");
    pre.push(Dec::Let(Pattern::Var(whole), new_arg));
    for i in 0..info.temps.len() {
        let w = var_expr(whole, whole_typ.clone(), at);
        sources.push(project(w, i as u32, at));
    }
}

#[cfg(test)]
#[path = "tests/tailcall.rs"]
mod tests;
