//! The async/await CPS transform (`spec.md` §4.5).
//!
//! Eliminates every `async`/`await` node by rewriting suspending
//! expressions into continuation-passing style while leaving pure
//! subtrees untouched. Two mutually recursive translations do the work:
//! [`direct`] ("T[e]") for expressions whose effect is already `Triv`,
//! and [`cps_await`] ("C[e] k") for expressions whose effect is `Await`,
//! consuming a continuation that is either a reified IR variable
//! ([`Cont::Var`]) or a meta-level Rust closure ([`Cont::Meta`]) used
//! exactly once. Every reified continuation has type `arg -> Non`: it
//! is invoked for effect, never for its own result.

use irc_common::id::IdGen;
use irc_common::interner::{Atom, Interner};
use irc_common::span::Span;
use irc_ir::constructors::{application, block_expr, fresh_name, func_expr, let_expr, tuple_expr, var_dec_expr, var_expr};
use irc_ir::{Case, Dec, Expr, ExprKind, FuncData, Mutability, Pattern, Program};
use irc_types::{Control, Effect, FuncSort, FuncType, Type, TypeBind};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A host-side continuation: given the IR value `e` produced, returns
/// the IR expression that runs next. Logically called once.
type MetaFn = Rc<dyn Fn(&IdGen, &mut Interner, Expr) -> Expr>;

#[derive(Clone)]
enum Cont {
    /// An already-named, in-scope function of type `arg_typ -> Non`.
    Var(Atom, Type),
    Meta(MetaFn),
}

#[derive(Clone)]
enum LabelBinding {
    /// The label is unaffected by CPS translation; literal `break`/fall
    /// through remain valid.
    Passthrough,
    /// The label's scope was reified: breaking to it, or falling off
    /// its body, both invoke this continuation.
    Cont(Atom, Type),
}

/// The label environment (`spec.md` §4.5), minus the checker's own
/// scope tracking: which in-scope labels have been reified, and — via
/// `ret` — where `return` currently redirects to (absent outside any
/// `async`, in which case `return` is left as an ordinary IR node).
#[derive(Clone, Default)]
struct LabelEnv {
    ret: Option<Box<Cont>>,
    labels: FxHashMap<Atom, LabelBinding>,
}

impl LabelEnv {
    fn empty() -> Self {
        Self::default()
    }

    fn with_ret(&self, k: Cont) -> Self {
        LabelEnv { ret: Some(Box::new(k)), labels: self.labels.clone() }
    }

    fn with_label(&self, name: Atom, binding: LabelBinding) -> Self {
        let mut labels = self.labels.clone();
        labels.insert(name, binding);
        LabelEnv { ret: self.ret.clone(), labels }
    }

    fn ret_cont(&self) -> Option<Cont> {
        self.ret.as_deref().cloned()
    }

    fn label(&self, name: Atom) -> Option<LabelBinding> {
        self.labels.get(&name).cloned()
    }
}

/// Rewrites every `async`/`await` in `program`, clearing `has_await`.
pub fn cps_pass(gen: &IdGen, interner: &mut Interner, program: &Program) -> Program {
    let label_env = LabelEnv::empty();
    let decs = program
        .decs
        .iter()
        .map(|group| group.iter().map(|dec| direct_dec(gen, interner, &label_env, dec)).collect())
        .collect();
    let actor_fields =
        program.actor_fields.iter().map(|(name, body)| (*name, direct(gen, interner, &label_env, body))).collect();
    Program { args: program.args.clone(), decs, actor_fields, flavor: program.flavor.without_await() }
}

fn apply_cont(gen: &IdGen, interner: &mut Interner, k: &Cont, value: Expr, at: Span) -> Expr {
    match k {
        Cont::Var(name, arg_typ) => {
            let f_typ = func_of(arg_typ.clone());
            application(FuncSort::Local, Vec::new(), var_expr(*name, f_typ, at), value, Type::Non, at)
        }
        Cont::Meta(f) => f(gen, interner, value),
    }
}

fn func_of(arg_typ: Type) -> Type {
    Type::Func(FuncType { sort: FuncSort::Local, control: Control::Returns, binds: Vec::new(), args: vec![arg_typ], ret: vec![Type::Non] })
}

/// Reifies `k` into a named variable if it is still a meta closure,
/// returning that name plus a wrapper that binds it around whatever
/// expression is built to use it (identity if `k` was already a
/// variable, per the `letcont` rule).
fn reify_cont(gen: &IdGen, interner: &mut Interner, k: Cont, arg_typ: Type, at: Span) -> (Atom, Box<dyn FnOnce(Expr) -> Expr>) {
    match k {
        Cont::Var(name, _) => (name, Box::new(|rest| rest)),
        Cont::Meta(f) => {
            let kname = fresh_name(gen, interner, "k");
            let vname = fresh_name(gen, interner, "v");
            let body = f(gen, interner, var_expr(vname, arg_typ.clone(), at));
            let data = FuncData {
                sort: FuncSort::Local,
                control: Control::Returns,
                name: None,
                binds: Vec::new(),
                arg: Pattern::Var(vname),
                arg_typ: arg_typ.clone(),
                ret_typs: vec![Type::Non],
                body,
            };
            let func = func_expr(data, at);
            (kname, Box::new(move |rest| let_expr(Pattern::Var(kname), func, rest, at)))
        }
    }
}

/// Translates `e`, feeding its value to `k` — `T[e]` composed with
/// continuation application when `eff(e) = Triv`, `C[e] k` when
/// `eff(e) = Await`. `return`/`break` are redirected through the label
/// environment regardless of `e`'s own effect, since they never
/// produce a value for `k` to receive.
fn cps(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, e: &Expr, k: Cont) -> Expr {
    match e.kind.as_ref() {
        ExprKind::Ret(arg) => translate_ret(gen, interner, label_env, arg, e.at),
        ExprKind::Break(name, arg) => translate_break(gen, interner, label_env, *name, arg, e.at),
        _ => match e.eff {
            Effect::Triv => {
                let v = direct(gen, interner, label_env, e);
                apply_cont(gen, interner, &k, v, e.at)
            }
            Effect::Await => cps_await(gen, interner, label_env, e, k),
        },
    }
}

fn translate_ret(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, arg: &Expr, at: Span) -> Expr {
    match label_env.ret_cont() {
        Some(target) => cps(gen, interner, label_env, arg, target),
        None => {
            let meta: MetaFn = Rc::new(move |_gen, _interner, v| irc_ir::constructors::ret_expr(v, at));
            cps(gen, interner, label_env, arg, Cont::Meta(meta))
        }
    }
}

fn translate_break(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, name: Atom, arg: &Expr, at: Span) -> Expr {
    match label_env.label(name) {
        Some(LabelBinding::Cont(kname, arg_typ)) => cps(gen, interner, label_env, arg, Cont::Var(kname, arg_typ)),
        _ => {
            let meta: MetaFn = Rc::new(move |_gen, _interner, v| irc_ir::constructors::break_expr(name, v, at));
            cps(gen, interner, label_env, arg, Cont::Meta(meta))
        }
    }
}

/// `T[e]`: structural direct-style rewrite of an expression whose
/// effect is `Triv`. Still descends into nested `async` bodies (always
/// `Triv` at their own node) and re-associates `return`/`break` via the
/// label environment, since both may appear under a `Triv` node.
fn direct(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, e: &Expr) -> Expr {
    let rebuild = |kind: ExprKind| Expr { kind: Box::new(kind), at: e.at, typ: e.typ.clone(), eff: e.eff };
    match e.kind.as_ref() {
        ExprKind::Lit(_) | ExprKind::Var(_) | ExprKind::Prim(_) => e.clone(),

        ExprKind::Unop(op, t, a) => rebuild(ExprKind::Unop(*op, t.clone(), direct(gen, interner, label_env, a))),

        ExprKind::Binop(op, t, a, b) => rebuild(ExprKind::Binop(
            *op,
            t.clone(),
            direct(gen, interner, label_env, a),
            direct(gen, interner, label_env, b),
        )),

        ExprKind::Relop(op, t, a, b) => rebuild(ExprKind::Relop(
            *op,
            t.clone(),
            direct(gen, interner, label_env, a),
            direct(gen, interner, label_env, b),
        )),

        ExprKind::Show(t, a) => rebuild(ExprKind::Show(t.clone(), direct(gen, interner, label_env, a))),

        ExprKind::Tuple(es) => rebuild(ExprKind::Tuple(es.iter().map(|c| direct(gen, interner, label_env, c)).collect())),

        ExprKind::Proj(a, i) => rebuild(ExprKind::Proj(direct(gen, interner, label_env, a), *i)),

        ExprKind::Opt(a) => rebuild(ExprKind::Opt(direct(gen, interner, label_env, a))),

        ExprKind::Tag(label, a) => rebuild(ExprKind::Tag(*label, direct(gen, interner, label_env, a))),

        ExprKind::Dot(a, label) => rebuild(ExprKind::Dot(direct(gen, interner, label_env, a), *label)),

        ExprKind::ActorDot(a, label) => rebuild(ExprKind::ActorDot(direct(gen, interner, label_env, a), *label)),

        ExprKind::Array(mutable, t, es) => {
            rebuild(ExprKind::Array(*mutable, t.clone(), es.iter().map(|c| direct(gen, interner, label_env, c)).collect()))
        }

        ExprKind::Idx(a, i) => {
            rebuild(ExprKind::Idx(direct(gen, interner, label_env, a), direct(gen, interner, label_env, i)))
        }

        ExprKind::Assign(a, b) => {
            rebuild(ExprKind::Assign(direct(gen, interner, label_env, a), direct(gen, interner, label_env, b)))
        }

        ExprKind::Func(data) => {
            // A function body is a fresh scope: no label or return
            // redirection crosses it.
            let fresh_env = LabelEnv::empty();
            let body = direct(gen, interner, &fresh_env, &data.body);
            rebuild(ExprKind::Func(FuncData { body, ..data.clone() }))
        }

        ExprKind::Call(sort, type_args, f, arg) => rebuild(ExprKind::Call(
            *sort,
            type_args.clone(),
            direct(gen, interner, label_env, f),
            direct(gen, interner, label_env, arg),
        )),

        ExprKind::Block(decs, result) => {
            let new_decs = decs.iter().map(|d| direct_dec(gen, interner, label_env, d)).collect();
            let new_result = direct(gen, interner, label_env, result);
            rebuild(ExprKind::Block(new_decs, new_result))
        }

        ExprKind::If(c, t, el) => rebuild(ExprKind::If(
            direct(gen, interner, label_env, c),
            direct(gen, interner, label_env, t),
            direct(gen, interner, label_env, el),
        )),

        ExprKind::Switch(scrutinee, cases) => {
            let new_scrutinee = direct(gen, interner, label_env, scrutinee);
            let new_cases =
                cases.iter().map(|c| Case { pat: c.pat.clone(), body: direct(gen, interner, label_env, &c.body) }).collect();
            rebuild(ExprKind::Switch(new_scrutinee, new_cases))
        }

        ExprKind::Loop(body) => rebuild(ExprKind::Loop(direct(gen, interner, label_env, body))),

        ExprKind::Label(name, t, body) => {
            let inner = label_env.with_label(*name, LabelBinding::Passthrough);
            rebuild(ExprKind::Label(*name, t.clone(), direct(gen, interner, &inner, body)))
        }

        ExprKind::Break(name, arg) => translate_break(gen, interner, label_env, *name, arg, e.at),

        ExprKind::Ret(arg) => translate_ret(gen, interner, label_env, arg, e.at),

        ExprKind::Async(body) => async_case(gen, interner, body, e.at),

        // An `await` always has effect `Await` and so can never itself
        // reach `direct`; kept total (no panic) in case an earlier pass
        // ever violates that invariant.
        ExprKind::Await(a) => rebuild(ExprKind::Await(direct(gen, interner, label_env, a))),

        ExprKind::Assert(a) => rebuild(ExprKind::Assert(direct(gen, interner, label_env, a))),

        ExprKind::ActorBody { decs, fields } => {
            let fresh_env = LabelEnv::empty();
            let new_decs = decs.iter().map(|d| direct_dec(gen, interner, &fresh_env, d)).collect();
            let new_fields = fields.iter().map(|(l, body)| (*l, direct(gen, interner, &fresh_env, body))).collect();
            rebuild(ExprKind::ActorBody { decs: new_decs, fields: new_fields })
        }

        ExprKind::Object(sort, fields) => {
            rebuild(ExprKind::Object(*sort, fields.iter().map(|(l, v)| (*l, direct(gen, interner, label_env, v))).collect()))
        }
    }
}

fn direct_dec(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, dec: &Dec) -> Dec {
    match dec {
        Dec::Let(p, e) => Dec::Let(p.clone(), direct(gen, interner, label_env, e)),
        Dec::Var(n, e) => Dec::Var(*n, direct(gen, interner, label_env, e)),
        Dec::Declare(n, t) => Dec::Declare(*n, t.clone()),
        Dec::Define(n, m, e) => Dec::Define(*n, *m, direct(gen, interner, label_env, e)),
        Dec::Type(c) => Dec::Type(*c),
    }
}

/// `C[e] k` for every `ExprKind` whose effect can be `Await`.
/// `return`/`break` are handled before this is ever reached (see
/// [`cps`]); everything else either composes a sequence of operands
/// left-to-right (`spec.md`'s composition rule) or is one of the
/// specific cases below.
fn cps_await(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, e: &Expr, k: Cont) -> Expr {
    let at = e.at;
    // Every `cps_seq`-composed node below denotes the same value the
    // original node did; only its children and effect annotation change.
    let result_typ = e.typ.clone();
    match e.kind.as_ref() {
        ExprKind::Await(inner) => cps_await_specific(gen, interner, label_env, inner, e.typ.clone(), k, at),

        ExprKind::Unop(op, t, a) => {
            let op = *op;
            let t = t.clone();
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Unop(op, t.clone(), v[0].clone()))), k, at)
        }

        ExprKind::Binop(op, t, a, b) => {
            let op = *op;
            let t = t.clone();
            cps_seq(
                gen, interner, label_env, &[(**a).clone(), (**b).clone()],
                Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Binop(op, t.clone(), v[0].clone(), v[1].clone()))),
                k, at,
            )
        }

        ExprKind::Relop(op, t, a, b) => {
            let op = *op;
            let t = t.clone();
            cps_seq(
                gen, interner, label_env, &[(**a).clone(), (**b).clone()],
                Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Relop(op, t.clone(), v[0].clone(), v[1].clone()))),
                k, at,
            )
        }

        ExprKind::Show(t, a) => {
            let t = t.clone();
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Show(t.clone(), v[0].clone()))), k, at)
        }

        ExprKind::Tuple(es) => cps_seq(gen, interner, label_env, es, Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Tuple(v))), k, at),

        ExprKind::Proj(a, i) => {
            let i = *i;
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Proj(v[0].clone(), i))), k, at)
        }

        ExprKind::Opt(a) => cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Opt(v[0].clone()))), k, at),

        ExprKind::Tag(label, a) => {
            let label = *label;
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Tag(label, v[0].clone()))), k, at)
        }

        ExprKind::Dot(a, label) => {
            let label = *label;
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Dot(v[0].clone(), label))), k, at)
        }

        ExprKind::ActorDot(a, label) => {
            let label = *label;
            cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::ActorDot(v[0].clone(), label))), k, at)
        }

        ExprKind::Array(mutable, t, es) => {
            let mutable = *mutable;
            let t = t.clone();
            cps_seq(gen, interner, label_env, es, Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Array(mutable, t.clone(), v))), k, at)
        }

        ExprKind::Idx(a, i) => cps_seq(
            gen, interner, label_env, &[(**a).clone(), (**i).clone()],
            Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Idx(v[0].clone(), v[1].clone()))),
            k, at,
        ),

        ExprKind::Assign(a, b) => cps_seq(
            gen, interner, label_env, &[(**a).clone(), (**b).clone()],
            Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Assign(v[0].clone(), v[1].clone()))),
            k, at,
        ),

        ExprKind::Call(sort, type_args, f, arg) => {
            let sort = *sort;
            let type_args = type_args.clone();
            cps_seq(
                gen, interner, label_env, &[(**f).clone(), (**arg).clone()],
                Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Call(sort, type_args.clone(), v[0].clone(), v[1].clone()))),
                k, at,
            )
        }

        ExprKind::Assert(a) => cps_seq(gen, interner, label_env, &[(**a).clone()], Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Assert(v[0].clone()))), k, at),

        ExprKind::Object(sort, fields) => {
            let sort = *sort;
            let labels: Vec<Atom> = fields.iter().map(|(l, _)| *l).collect();
            let values: Vec<Expr> = fields.iter().map(|(_, v)| v.clone()).collect();
            cps_seq(
                gen, interner, label_env, &values,
                Rc::new(move |v: Vec<Expr>| rebuild_at(at, result_typ.clone(), ExprKind::Object(sort, labels.iter().copied().zip(v).collect()))),
                k, at,
            )
        }

        ExprKind::If(c, t, el) => cps_if(gen, interner, label_env, c, t, el, e.typ.clone(), k, at),

        ExprKind::Switch(scrutinee, cases) => cps_switch(gen, interner, label_env, scrutinee, cases, e.typ.clone(), k, at),

        ExprKind::Loop(body) => cps_loop(gen, interner, label_env, body, at),

        ExprKind::Label(name, result_typ, body) => cps_label(gen, interner, label_env, *name, result_typ.clone(), body, k, at),

        ExprKind::Block(decs, result) => cps_decs(gen, interner, label_env, decs, Vec::new(), result, k, at),

        // `Lit`/`Var`/`Prim`/`Func`/`Async` are always `Triv`; unreachable
        // in practice, kept total rather than panicking.
        _ => {
            let v = direct(gen, interner, label_env, e);
            apply_cont(gen, interner, &k, v, at)
        }
    }
}

fn rebuild_at(at: Span, typ: Type, kind: ExprKind) -> Expr {
    // Children have already been reduced to pure values by `cps_seq`;
    // the composed node is therefore `Triv`.
    Expr { kind: Box::new(kind), at, typ, eff: Effect::Triv }
}

/// Translates a left-to-right operand list, at least one of which may
/// have effect `Await`: operands before the first `Await` one are
/// reduced directly, that operand is CPS-converted and its result
/// named, and the remainder is processed the same way recursively.
/// Once every operand is a pure value, `rebuild` reassembles the parent
/// node and its value is fed to `k`.
fn cps_seq(
    gen: &IdGen,
    interner: &mut Interner,
    label_env: &LabelEnv,
    operands: &[Expr],
    rebuild: Rc<dyn Fn(Vec<Expr>) -> Expr>,
    k: Cont,
    at: Span,
) -> Expr {
    cps_seq_from(gen, interner, label_env, operands, Vec::with_capacity(operands.len()), rebuild, k, at)
}

fn cps_seq_from(
    gen: &IdGen,
    interner: &mut Interner,
    label_env: &LabelEnv,
    operands: &[Expr],
    mut done: Vec<Expr>,
    rebuild: Rc<dyn Fn(Vec<Expr>) -> Expr>,
    k: Cont,
    at: Span,
) -> Expr {
    let Some((operand, rest)) = operands.split_first() else {
        let v = rebuild(done);
        return apply_cont(gen, interner, &k, v, at);
    };
    match operand.eff {
        Effect::Triv => {
            done.push(direct(gen, interner, label_env, operand));
            cps_seq_from(gen, interner, label_env, rest, done, rebuild, k, at)
        }
        Effect::Await => {
            let rest_owned: Vec<Expr> = rest.to_vec();
            let label_env_owned = label_env.clone();
            let meta: MetaFn = Rc::new(move |gen2: &IdGen, interner2: &mut Interner, v: Expr| {
                let mut done2 = done.clone();
                done2.push(v);
                cps_seq_from(gen2, interner2, &label_env_owned, &rest_owned, done2, rebuild.clone(), k.clone(), at)
            });
            cps(gen, interner, label_env, operand, Cont::Meta(meta))
        }
    }
}

fn cps_if(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, c: &Expr, t: &Expr, el: &Expr, result_typ: Type, k: Cont, at: Span) -> Expr {
    match c.eff {
        Effect::Triv => {
            let c2 = direct(gen, interner, label_env, c);
            cps_if_branches(gen, interner, label_env, c2, t, el, result_typ, k, at)
        }
        Effect::Await => {
            let label_env2 = label_env.clone();
            let t2 = t.clone();
            let el2 = el.clone();
            let result_typ2 = result_typ.clone();
            let meta: MetaFn = Rc::new(move |gen2: &IdGen, interner2: &mut Interner, cv: Expr| {
                cps_if_branches(gen2, interner2, &label_env2, cv, &t2, &el2, result_typ2.clone(), k.clone(), at)
            });
            cps(gen, interner, label_env, c, Cont::Meta(meta))
        }
    }
}

fn cps_if_branches(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, c: Expr, t: &Expr, el: &Expr, result_typ: Type, k: Cont, at: Span) -> Expr {
    let (kname, wrap) = reify_cont(gen, interner, k, result_typ.clone(), at);
    let kvar = Cont::Var(kname, result_typ);
    let then_branch = cps(gen, interner, label_env, t, kvar.clone());
    let else_branch = cps(gen, interner, label_env, el, kvar);
    let if_node = Expr { kind: Box::new(ExprKind::If(c, then_branch, else_branch)), at, typ: Type::Non, eff: Effect::Triv };
    wrap(if_node)
}

fn cps_switch(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, scrutinee: &Expr, cases: &[Case], result_typ: Type, k: Cont, at: Span) -> Expr {
    match scrutinee.eff {
        Effect::Triv => {
            let s2 = direct(gen, interner, label_env, scrutinee);
            cps_switch_branches(gen, interner, label_env, s2, cases, result_typ, k, at)
        }
        Effect::Await => {
            let cases2 = cases.to_vec();
            let label_env2 = label_env.clone();
            let result_typ2 = result_typ.clone();
            let meta: MetaFn = Rc::new(move |gen2: &IdGen, interner2: &mut Interner, sv: Expr| {
                cps_switch_branches(gen2, interner2, &label_env2, sv, &cases2, result_typ2.clone(), k.clone(), at)
            });
            cps(gen, interner, label_env, scrutinee, Cont::Meta(meta))
        }
    }
}

fn cps_switch_branches(
    gen: &IdGen,
    interner: &mut Interner,
    label_env: &LabelEnv,
    scrutinee: Expr,
    cases: &[Case],
    result_typ: Type,
    k: Cont,
    at: Span,
) -> Expr {
    let (kname, wrap) = reify_cont(gen, interner, k, result_typ.clone(), at);
    let kvar = Cont::Var(kname, result_typ);
    let new_cases: Vec<Case> =
        cases.iter().map(|c| Case { pat: c.pat.clone(), body: cps(gen, interner, label_env, &c.body, kvar.clone()) }).collect();
    let switch_node = Expr { kind: Box::new(ExprKind::Switch(scrutinee, new_cases)), at, typ: Type::Non, eff: Effect::Triv };
    wrap(switch_node)
}

/// A `loop` that may await is rewritten into a self-recursive local
/// continuation — the same "named function referring to itself via
/// `FuncData::name`" shape the tail-call optimizer produces — invoked
/// once: each pass through the body, on completing without a `break`,
/// calls itself again instead of looping natively. The loop's own
/// outer continuation is never invoked: a `loop` only ever exits
/// through an enclosing label's `break`, handled by that label's own
/// reified continuation, not by this function returning.
fn cps_loop(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, body: &Expr, at: Span) -> Expr {
    let loop_fn = fresh_name(gen, interner, "loopk");
    let unit = Type::unit();
    let self_cont = Cont::Var(loop_fn, unit.clone());
    let new_body = cps(gen, interner, label_env, body, self_cont);
    let data = FuncData {
        sort: FuncSort::Local,
        control: Control::Returns,
        name: Some(loop_fn),
        binds: Vec::new(),
        arg: Pattern::Wild,
        arg_typ: unit.clone(),
        ret_typs: vec![Type::Non],
        body: new_body,
    };
    let func = func_expr(data, at);
    let func_typ = func.typ.clone();
    let call_once = application(FuncSort::Local, Vec::new(), var_expr(loop_fn, func_typ, at), tuple_expr(Vec::new(), at), Type::Non, at);
    let_expr(Pattern::Var(loop_fn), func, call_once, at)
}

fn cps_label(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, name: Atom, result_typ: Type, body: &Expr, k: Cont, at: Span) -> Expr {
    let (kname, wrap) = reify_cont(gen, interner, k, result_typ.clone(), at);
    let kvar = Cont::Var(kname, result_typ.clone());
    let inner_env = label_env.with_label(name, LabelBinding::Cont(kname, result_typ));
    let body2 = cps(gen, interner, &inner_env, body, kvar);
    wrap(body2)
}

/// `Block(decs, e)`: type declarations pass through untouched; each
/// value declaration's name is declared (with its type) before its
/// initializer is CPS-sequenced, and defined only once that
/// initializer's value is known — required because the initializer may
/// await between sibling declarations (`spec.md` §4.5).
fn cps_decs(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, decs: &[Dec], mut prefix: Vec<Dec>, tail: &Expr, k: Cont, at: Span) -> Expr {
    let Some((dec, rest)) = decs.split_first() else {
        let body = cps(gen, interner, label_env, tail, k);
        return if prefix.is_empty() { body } else { block_expr(prefix, body, at) };
    };

    match dec {
        Dec::Type(con) => {
            prefix.push(Dec::Type(*con));
            cps_decs(gen, interner, label_env, rest, prefix, tail, k, at)
        }
        Dec::Declare(name, t) => {
            prefix.push(Dec::Declare(*name, t.clone()));
            cps_decs(gen, interner, label_env, rest, prefix, tail, k, at)
        }
        Dec::Define(name, m, init) => {
            prefix.push(Dec::Declare(*name, init.typ.clone()));
            let name = *name;
            let m = *m;
            cps_sequence_value(gen, interner, label_env, init, rest, tail, k, at, prefix, move |v| Dec::Define(name, m, v), |rest| rest)
        }
        Dec::Let(pat, init) => {
            let temp = fresh_name(gen, interner, "dec");
            let val_typ = init.typ.clone();
            prefix.push(Dec::Declare(temp, val_typ.clone()));
            let pat = pat.clone();
            cps_sequence_value(gen, interner, label_env, init, rest, tail, k, at, prefix, move |v| Dec::Define(temp, Mutability::Const, v), move |rest| {
                let_expr(pat.clone(), var_expr(temp, val_typ.clone(), at), rest, at)
            })
        }
        Dec::Var(name, init) => {
            let temp = fresh_name(gen, interner, "cell");
            let val_typ = init.typ.clone();
            prefix.push(Dec::Declare(temp, val_typ.clone()));
            let name = *name;
            cps_sequence_value(gen, interner, label_env, init, rest, tail, k, at, prefix, move |v| Dec::Define(temp, Mutability::Const, v), move |rest| {
                var_dec_expr(name, var_expr(temp, val_typ.clone(), at), rest, at)
            })
        }
    }
}

/// Shared machinery behind every `Dec` arm above: CPS-sequence `init`,
/// and once its value is known, emit `make_define(value)` followed by
/// the real binding (`bind_rest`, wrapping whatever comes next) before
/// continuing with the remaining declarations.
#[allow(clippy::too_many_arguments)]
fn cps_sequence_value(
    gen: &IdGen,
    interner: &mut Interner,
    label_env: &LabelEnv,
    init: &Expr,
    rest: &[Dec],
    tail: &Expr,
    k: Cont,
    at: Span,
    prefix: Vec<Dec>,
    make_define: impl Fn(Expr) -> Dec + 'static,
    bind_rest: impl Fn(Expr) -> Expr + 'static,
) -> Expr {
    let rest_owned: Vec<Dec> = rest.to_vec();
    let tail_owned = tail.clone();
    let label_env_owned = label_env.clone();
    let make_define = Rc::new(make_define);
    let bind_rest = Rc::new(bind_rest);
    let meta: MetaFn = Rc::new(move |gen2: &IdGen, interner2: &mut Interner, v: Expr| {
        let define = (make_define)(v);
        let continuation_body = cps_decs(gen2, interner2, &label_env_owned, &rest_owned, Vec::new(), &tail_owned, k.clone(), at);
        let bound = (bind_rest)(continuation_body);
        block_expr(vec![define], bound, at)
    });
    let evaluated = cps(gen, interner, label_env, init, Cont::Meta(meta));
    if prefix.is_empty() { evaluated } else { block_expr(prefix, evaluated, at) }
}

/// `Async e`: alpha-renames `e`'s own bound variables (the body is
/// about to be lifted into a fresh closure, so its binders must not
/// collide with anything captured from the enclosing scope), then
/// wraps `prim_async t (λk_ret. C[e'] k_ret)`.
fn async_case(gen: &IdGen, interner: &mut Interner, body: &Expr, at: Span) -> Expr {
    tracing::debug!(%at, "cps-converting an async block");
    let renamed = alpha_rename(gen, interner, body);
    let result_typ = renamed.typ.clone();
    let kret = fresh_name(gen, interner, "kret");
    let label_env = LabelEnv::empty().with_ret(Cont::Var(kret, result_typ.clone()));
    let cps_body = cps(gen, interner, &label_env, &renamed, Cont::Var(kret, result_typ.clone()));
    let data = FuncData {
        sort: FuncSort::Local,
        control: Control::Returns,
        name: None,
        binds: Vec::new(),
        arg: Pattern::Var(kret),
        arg_typ: func_of(result_typ.clone()),
        ret_typs: vec![Type::Non],
        body: cps_body,
    };
    let body_fn = func_expr(data, at);
    prim_async_call(interner, result_typ, body_fn, at)
}

fn prim_async_call(interner: &mut Interner, result_typ: Type, body_fn: Expr, at: Span) -> Expr {
    let async_atom = interner.intern("@async");
    let bind = TypeBind { var: interner.intern("A"), bound: Type::Any };
    let prim_typ = Type::Func(FuncType {
        sort: FuncSort::Local,
        control: Control::Returns,
        binds: vec![bind],
        args: vec![func_of(Type::Bound(0))],
        ret: vec![Type::Async(Box::new(Type::Bound(0)))],
    });
    let prim = Expr { kind: Box::new(ExprKind::Prim(async_atom)), at, typ: prim_typ, eff: Effect::Triv };
    application(FuncSort::Local, vec![result_typ.clone()], prim, body_fn, Type::Async(Box::new(result_typ)), at)
}

/// `Await e`: `letcont k in λk'. prim_await t (T[e] or C[e], k')`.
fn cps_await_specific(gen: &IdGen, interner: &mut Interner, label_env: &LabelEnv, inner: &Expr, result_typ: Type, k: Cont, at: Span) -> Expr {
    tracing::trace!(%at, "cps-converting an await");
    match inner.eff {
        Effect::Triv => {
            let async_val = direct(gen, interner, label_env, inner);
            build_await_call(gen, interner, async_val, result_typ, k, at)
        }
        Effect::Await => {
            let result_typ2 = result_typ.clone();
            let meta: MetaFn = Rc::new(move |gen2: &IdGen, interner2: &mut Interner, v: Expr| {
                build_await_call(gen2, interner2, v, result_typ2.clone(), k.clone(), at)
            });
            cps(gen, interner, label_env, inner, Cont::Meta(meta))
        }
    }
}

fn build_await_call(gen: &IdGen, interner: &mut Interner, async_val: Expr, result_typ: Type, k: Cont, at: Span) -> Expr {
    let (kname, wrap) = reify_cont(gen, interner, k, result_typ.clone(), at);
    let call = prim_await_call(interner, async_val, result_typ, kname, at);
    wrap(call)
}

fn prim_await_call(interner: &mut Interner, async_val: Expr, result_typ: Type, kname: Atom, at: Span) -> Expr {
    let await_atom = interner.intern("@await");
    let bind = TypeBind { var: interner.intern("A"), bound: Type::Any };
    let pair_typ = Type::Tuple(vec![Type::Async(Box::new(Type::Bound(0))), func_of(Type::Bound(0))]);
    let prim_typ = Type::Func(FuncType { sort: FuncSort::Local, control: Control::Returns, binds: vec![bind], args: vec![pair_typ], ret: vec![Type::Non] });
    let prim = Expr { kind: Box::new(ExprKind::Prim(await_atom)), at, typ: prim_typ, eff: Effect::Triv };
    let kvar = var_expr(kname, func_of(result_typ.clone()), at);
    let pair = tuple_expr(vec![async_val, kvar], at);
    application(FuncSort::Local, vec![result_typ], prim, pair, Type::Non, at)
}

// ---------------------------------------------------------------------
// Alpha-renaming (for `Async e`'s bound variables before the body is
// lifted into a fresh closure).
// ---------------------------------------------------------------------

fn alpha_rename(gen: &IdGen, interner: &mut Interner, e: &Expr) -> Expr {
    let subst = FxHashMap::default();
    rename_expr(gen, interner, &subst, e)
}

fn rename_pattern(gen: &IdGen, interner: &mut Interner, subst: &FxHashMap<Atom, Atom>, pat: &Pattern) -> (Pattern, FxHashMap<Atom, Atom>) {
    let mut names = Vec::new();
    pat.bound_vars(&mut names);
    let mut extended = subst.clone();
    for name in names {
        extended.insert(name, fresh_name(gen, interner, "h"));
    }
    (rename_pattern_shape(pat, &extended), extended)
}

fn rename_pattern_shape(pat: &Pattern, subst: &FxHashMap<Atom, Atom>) -> Pattern {
    match pat {
        Pattern::Wild | Pattern::Lit(_) => pat.clone(),
        Pattern::Var(name) => Pattern::Var(*subst.get(name).unwrap_or(name)),
        Pattern::Tuple(ps) => Pattern::Tuple(ps.iter().map(|p| rename_pattern_shape(p, subst)).collect()),
        Pattern::Object(fs) => Pattern::Object(fs.iter().map(|(l, p)| (*l, rename_pattern_shape(p, subst))).collect()),
        Pattern::Opt(p) => Pattern::Opt(Box::new(rename_pattern_shape(p, subst))),
        Pattern::Tag(l, p) => Pattern::Tag(*l, Box::new(rename_pattern_shape(p, subst))),
        Pattern::Alt(ps) => Pattern::Alt(ps.iter().map(|p| rename_pattern_shape(p, subst)).collect()),
    }
}

fn rename_expr(gen: &IdGen, interner: &mut Interner, subst: &FxHashMap<Atom, Atom>, e: &Expr) -> Expr {
    let rebuild = |kind: ExprKind| Expr { kind: Box::new(kind), at: e.at, typ: e.typ.clone(), eff: e.eff };
    match e.kind.as_ref() {
        ExprKind::Var(name) => rebuild(ExprKind::Var(*subst.get(name).unwrap_or(name))),
        ExprKind::Lit(_) | ExprKind::Prim(_) => e.clone(),

        ExprKind::Unop(op, t, a) => rebuild(ExprKind::Unop(*op, t.clone(), rename_expr(gen, interner, subst, a))),
        ExprKind::Binop(op, t, a, b) => {
            rebuild(ExprKind::Binop(*op, t.clone(), rename_expr(gen, interner, subst, a), rename_expr(gen, interner, subst, b)))
        }
        ExprKind::Relop(op, t, a, b) => {
            rebuild(ExprKind::Relop(*op, t.clone(), rename_expr(gen, interner, subst, a), rename_expr(gen, interner, subst, b)))
        }
        ExprKind::Show(t, a) => rebuild(ExprKind::Show(t.clone(), rename_expr(gen, interner, subst, a))),
        ExprKind::Tuple(es) => rebuild(ExprKind::Tuple(es.iter().map(|c| rename_expr(gen, interner, subst, c)).collect())),
        ExprKind::Proj(a, i) => rebuild(ExprKind::Proj(rename_expr(gen, interner, subst, a), *i)),
        ExprKind::Opt(a) => rebuild(ExprKind::Opt(rename_expr(gen, interner, subst, a))),
        ExprKind::Tag(l, a) => rebuild(ExprKind::Tag(*l, rename_expr(gen, interner, subst, a))),
        ExprKind::Dot(a, l) => rebuild(ExprKind::Dot(rename_expr(gen, interner, subst, a), *l)),
        ExprKind::ActorDot(a, l) => rebuild(ExprKind::ActorDot(rename_expr(gen, interner, subst, a), *l)),
        ExprKind::Array(m, t, es) => rebuild(ExprKind::Array(*m, t.clone(), es.iter().map(|c| rename_expr(gen, interner, subst, c)).collect())),
        ExprKind::Idx(a, b) => rebuild(ExprKind::Idx(rename_expr(gen, interner, subst, a), rename_expr(gen, interner, subst, b))),
        ExprKind::Assign(a, b) => rebuild(ExprKind::Assign(rename_expr(gen, interner, subst, a), rename_expr(gen, interner, subst, b))),

        ExprKind::Func(data) => {
            let mut extended = subst.clone();
            let new_name = data.name.map(|n| {
                let fresh = fresh_name(gen, interner, "h");
                extended.insert(n, fresh);
                fresh
            });
            let (new_arg, extended2) = rename_pattern(gen, interner, &extended, &data.arg);
            let new_body = rename_expr(gen, interner, &extended2, &data.body);
            rebuild(ExprKind::Func(FuncData { name: new_name, arg: new_arg, body: new_body, ..data.clone() }))
        }

        ExprKind::Call(sort, targs, f, arg) => {
            rebuild(ExprKind::Call(*sort, targs.clone(), rename_expr(gen, interner, subst, f), rename_expr(gen, interner, subst, arg)))
        }

        ExprKind::Block(decs, result) => {
            let mut cur = subst.clone();
            let mut new_decs = Vec::with_capacity(decs.len());
            for dec in decs {
                match dec {
                    Dec::Let(p, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let (p2, cur2) = rename_pattern(gen, interner, &cur, p);
                        new_decs.push(Dec::Let(p2, e2r));
                        cur = cur2;
                    }
                    Dec::Var(n, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let fresh = fresh_name(gen, interner, "h");
                        cur.insert(*n, fresh);
                        new_decs.push(Dec::Var(fresh, e2r));
                    }
                    Dec::Declare(n, t) => {
                        let fresh = fresh_name(gen, interner, "h");
                        cur.insert(*n, fresh);
                        new_decs.push(Dec::Declare(fresh, t.clone()));
                    }
                    Dec::Define(n, m, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let name2 = *cur.get(n).unwrap_or(n);
                        new_decs.push(Dec::Define(name2, *m, e2r));
                    }
                    Dec::Type(c) => new_decs.push(Dec::Type(*c)),
                }
            }
            let new_result = rename_expr(gen, interner, &cur, result);
            rebuild(ExprKind::Block(new_decs, new_result))
        }

        ExprKind::If(c, t, el) => rebuild(ExprKind::If(
            rename_expr(gen, interner, subst, c),
            rename_expr(gen, interner, subst, t),
            rename_expr(gen, interner, subst, el),
        )),

        ExprKind::Switch(scrutinee, cases) => {
            let new_scrutinee = rename_expr(gen, interner, subst, scrutinee);
            let new_cases = cases
                .iter()
                .map(|c| {
                    let (p2, extended) = rename_pattern(gen, interner, subst, &c.pat);
                    Case { pat: p2, body: rename_expr(gen, interner, &extended, &c.body) }
                })
                .collect();
            rebuild(ExprKind::Switch(new_scrutinee, new_cases))
        }

        ExprKind::Loop(body) => rebuild(ExprKind::Loop(rename_expr(gen, interner, subst, body))),

        // Labels are a separate namespace from variables; left as-is.
        ExprKind::Label(name, t, body) => rebuild(ExprKind::Label(*name, t.clone(), rename_expr(gen, interner, subst, body))),
        ExprKind::Break(name, a) => rebuild(ExprKind::Break(*name, rename_expr(gen, interner, subst, a))),

        ExprKind::Ret(a) => rebuild(ExprKind::Ret(rename_expr(gen, interner, subst, a))),
        ExprKind::Async(body) => rebuild(ExprKind::Async(rename_expr(gen, interner, subst, body))),
        ExprKind::Await(a) => rebuild(ExprKind::Await(rename_expr(gen, interner, subst, a))),
        ExprKind::Assert(a) => rebuild(ExprKind::Assert(rename_expr(gen, interner, subst, a))),

        ExprKind::ActorBody { decs, fields } => {
            let mut cur = subst.clone();
            let mut new_decs = Vec::with_capacity(decs.len());
            for dec in decs {
                match dec {
                    Dec::Let(p, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let (p2, cur2) = rename_pattern(gen, interner, &cur, p);
                        new_decs.push(Dec::Let(p2, e2r));
                        cur = cur2;
                    }
                    Dec::Var(n, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let fresh = fresh_name(gen, interner, "h");
                        cur.insert(*n, fresh);
                        new_decs.push(Dec::Var(fresh, e2r));
                    }
                    Dec::Declare(n, t) => {
                        let fresh = fresh_name(gen, interner, "h");
                        cur.insert(*n, fresh);
                        new_decs.push(Dec::Declare(fresh, t.clone()));
                    }
                    Dec::Define(n, m, e2) => {
                        let e2r = rename_expr(gen, interner, &cur, e2);
                        let name2 = *cur.get(n).unwrap_or(n);
                        new_decs.push(Dec::Define(name2, *m, e2r));
                    }
                    Dec::Type(c) => new_decs.push(Dec::Type(*c)),
                }
            }
            let new_fields = fields.iter().map(|(l, body)| (*l, rename_expr(gen, interner, &cur, body))).collect();
            rebuild(ExprKind::ActorBody { decs: new_decs, fields: new_fields })
        }

        ExprKind::Object(sort, fields) => {
            rebuild(ExprKind::Object(*sort, fields.iter().map(|(l, v)| (*l, rename_expr(gen, interner, subst, v))).collect()))
        }
    }
}

#[cfg(test)]
#[path = "tests/cps.rs"]
mod tests;
