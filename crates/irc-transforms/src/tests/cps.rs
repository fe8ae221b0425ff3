use super::*;
use irc_common::interner::{Atom, Interner};
use irc_common::span::Span;
use irc_ir::constructors::{async_expr, await_expr, block_expr, if_expr, ret_expr};
use irc_ir::visit::contains_async_or_await;
use irc_ir::{BinOp, Dec, Expr, ExprKind, Flavor, Literal, Pattern, Program};
use irc_types::{Effect, Prim, Type};

fn lit_nat(n: u128) -> Expr {
    Expr { kind: Box::new(ExprKind::Lit(Literal::Nat(n))), at: Span::dummy(), typ: Type::Prim(Prim::Nat), eff: Effect::Triv }
}

fn var(name: Atom, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Var(name)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

fn add(a: Expr, b: Expr) -> Expr {
    let eff = a.eff.lub(b.eff);
    Expr { kind: Box::new(ExprKind::Binop(BinOp::Add, Type::Prim(Prim::Nat), a, b)), at: Span::dummy(), typ: Type::Prim(Prim::Nat), eff }
}

#[test]
fn an_async_block_with_no_await_lowers_to_a_bare_prim_async_call() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let body = add(lit_nat(1), lit_nat(2));

    let result = async_case(&gen, &mut interner, &body, Span::dummy());

    let ExprKind::Call(_, _, f, _) = result.kind.as_ref() else { panic!("expected a call") };
    let ExprKind::Prim(atom) = f.kind.as_ref() else { panic!("expected a primitive reference") };
    assert_eq!(interner.resolve(*atom), "@async");
    assert!(!contains_async_or_await(&result));
}

#[test]
fn cps_await_of_a_pure_operand_produces_a_prim_await_call() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let p = interner.intern("p");
    let kname = interner.intern("k");
    let async_typ = Type::Async(Box::new(Type::Prim(Prim::Nat)));
    let pending = var(p, async_typ);
    let awaited = await_expr(pending, Type::Prim(Prim::Nat), Span::dummy());

    let result = cps(&gen, &mut interner, &LabelEnv::empty(), &awaited, Cont::Var(kname, Type::Prim(Prim::Nat)));

    let ExprKind::Call(_, _, f, _) = result.kind.as_ref() else { panic!("expected a call") };
    let ExprKind::Prim(atom) = f.kind.as_ref() else { panic!("expected a primitive reference") };
    assert_eq!(interner.resolve(*atom), "@await");
    assert!(!contains_async_or_await(&result));
}

#[test]
fn cps_pass_erases_every_async_and_await_node_from_a_program() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let get = interner.intern("get");
    let p = interner.intern("p");
    let x = interner.intern("x");
    let async_typ = Type::Async(Box::new(Type::Prim(Prim::Nat)));
    let pending = var(p, async_typ);
    let awaited = await_expr(pending, Type::Prim(Prim::Nat), Span::dummy());
    let dec = Dec::Let(Pattern::Var(x), awaited);
    let tail = add(var(x, Type::Prim(Prim::Nat)), lit_nat(2));
    let body = block_expr(vec![dec], tail, Span::dummy());
    let field = async_expr(body, Span::dummy());

    let program = Program { args: Vec::new(), decs: Vec::new(), actor_fields: vec![(get, field)], flavor: Flavor::full() };

    let rewritten = cps_pass(&gen, &mut interner, &program);

    assert!(!rewritten.flavor.has_await);
    for (_, field_expr) in &rewritten.actor_fields {
        assert!(!contains_async_or_await(field_expr));
    }
}

#[test]
fn return_inside_an_async_body_is_redirected_to_the_return_continuation_not_the_outer_one() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let kret = interner.intern("kret");
    let kother = interner.intern("kother");
    let label_env = LabelEnv::empty().with_ret(Cont::Var(kret, Type::Prim(Prim::Nat)));
    let ret_node = ret_expr(lit_nat(5), Span::dummy());

    let result = cps(&gen, &mut interner, &label_env, &ret_node, Cont::Var(kother, Type::Prim(Prim::Nat)));

    let ExprKind::Call(_, _, f, _) = result.kind.as_ref() else { panic!("expected a call") };
    let ExprKind::Var(name) = f.kind.as_ref() else { panic!("expected a var") };
    assert_eq!(*name, kret, "`return`'s value must be fed to the async's own return point, not the ambient continuation");
}

#[test]
fn an_if_with_an_awaiting_condition_reifies_one_continuation_shared_by_both_branches() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let p = interner.intern("p");
    let kname = interner.intern("k");
    let async_typ = Type::Async(Box::new(Type::Prim(Prim::Bool)));
    let pending = var(p, async_typ);
    let cond = await_expr(pending, Type::Prim(Prim::Bool), Span::dummy());
    let if_node = if_expr(cond, lit_nat(1), lit_nat(2), Type::Prim(Prim::Nat), Span::dummy());

    let result = cps(&gen, &mut interner, &LabelEnv::empty(), &if_node, Cont::Var(kname, Type::Prim(Prim::Nat)));

    let ExprKind::Block(decs, tail) = result.kind.as_ref() else { panic!("expected the reified continuation's binding block") };
    assert_eq!(decs.len(), 1);
    let Dec::Let(_, func_val) = &decs[0] else { panic!("expected a let binding the reified continuation") };
    let ExprKind::Func(data) = func_val.kind.as_ref() else { panic!("expected a function value") };
    assert!(matches!(data.body.kind.as_ref(), ExprKind::If(..)), "the reified continuation's body is the rebuilt `if`");

    let ExprKind::Call(_, _, f, _) = tail.kind.as_ref() else { panic!("expected the prim_await call") };
    let ExprKind::Prim(atom) = f.kind.as_ref() else { panic!("expected a primitive reference") };
    assert_eq!(interner.resolve(*atom), "@await");
    assert!(!contains_async_or_await(&result));
}

#[test]
fn a_let_whose_initializer_awaits_declares_the_binding_before_defining_it() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let p = interner.intern("p");
    let x = interner.intern("x");
    let kname = interner.intern("k");
    let async_typ = Type::Async(Box::new(Type::Prim(Prim::Nat)));
    let pending = var(p, async_typ);
    let awaited = await_expr(pending, Type::Prim(Prim::Nat), Span::dummy());
    let dec = Dec::Let(Pattern::Var(x), awaited);
    let tail = var(x, Type::Prim(Prim::Nat));
    let block = block_expr(vec![dec], tail, Span::dummy());

    let result = cps(&gen, &mut interner, &LabelEnv::empty(), &block, Cont::Var(kname, Type::Prim(Prim::Nat)));

    // The outermost node announces the fresh temporary's type before
    // anything runs; only once `@await` resolves is it actually defined.
    let ExprKind::Block(decs, _) = result.kind.as_ref() else { panic!("expected a block") };
    assert_eq!(decs.len(), 1);
    assert!(matches!(decs[0], Dec::Declare(_, _)), "the binding must be declared before its initializer is sequenced");
    assert!(!contains_async_or_await(&result));
}
