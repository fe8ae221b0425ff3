use super::*;
use crate::literal::Literal;
use irc_common::id::IdGen;
use irc_common::interner::Interner;
use irc_common::span::Span;
use irc_types::{Effect, Prim, Type};

fn lit(v: Literal, t: Type) -> Expr {
    Expr { kind: Box::new(ExprKind::Lit(v)), at: Span::dummy(), typ: t, eff: Effect::Triv }
}

#[test]
fn fresh_var_names_are_unique_across_calls() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let a = fresh_var(&gen, &mut interner, "tmp", Type::Prim(Prim::Nat), Span::dummy());
    let b = fresh_var(&gen, &mut interner, "tmp", Type::Prim(Prim::Nat), Span::dummy());
    assert_ne!(a, b);
}

#[test]
fn tuple_expr_effect_is_the_lub_of_its_components() {
    let a = lit(Literal::Bool(true), Type::Prim(Prim::Bool));
    let mut b = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    b.eff = Effect::Await;
    let t = tuple_expr(vec![a, b], Span::dummy());
    assert_eq!(t.eff, Effect::Await);
    assert_eq!(t.typ, Type::Tuple(vec![Type::Prim(Prim::Bool), Type::Prim(Prim::Nat)]));
}

#[test]
fn application_effect_is_the_lub_of_function_and_argument() {
    let mut interner = Interner::new();
    let f_name = interner.intern("f");
    let f_typ = Type::Func(irc_types::FuncType {
        sort: irc_types::FuncSort::Local,
        control: irc_types::Control::Returns,
        binds: vec![],
        args: vec![Type::Prim(Prim::Nat)],
        ret: vec![Type::Prim(Prim::Nat)],
    });
    let f = var_expr(f_name, f_typ, Span::dummy());
    let arg = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    let call = application(
        irc_types::FuncSort::Local,
        vec![],
        f,
        arg,
        Type::Prim(Prim::Nat),
        Span::dummy(),
    );
    assert_eq!(call.eff, Effect::Triv);
}

#[test]
fn project_reads_the_component_type_out_of_a_tuple_annotation() {
    let tuple = lit(
        Literal::Null,
        Type::Tuple(vec![Type::Prim(Prim::Bool), Type::Prim(Prim::Nat)]),
    );
    let p = project(tuple, 1, Span::dummy());
    assert_eq!(p.typ, Type::Prim(Prim::Nat));
}

#[test]
fn break_and_ret_are_annotated_non_because_control_never_falls_through() {
    let arg = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    let mut interner = Interner::new();
    let label = interner.intern("L");
    let b = break_expr(label, arg.clone(), Span::dummy());
    assert_eq!(b.typ, Type::Non);
    let r = ret_expr(arg, Span::dummy());
    assert_eq!(r.typ, Type::Non);
}

#[test]
fn block_expr_effect_includes_declaration_initializer_effects() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let mut init = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    init.eff = Effect::Await;
    let result = var_expr(x, Type::Prim(Prim::Nat), Span::dummy());
    let block = block_expr(vec![Dec::Var(x, init)], result, Span::dummy());
    assert_eq!(block.eff, Effect::Await);
}

#[test]
fn typ_decl_wraps_a_constructor_identity_without_touching_the_table() {
    let gen = IdGen::new();
    let mut interner = Interner::new();
    let mut cons = irc_types::ConTable::new();
    let name = interner.intern("T");
    let con = cons.declare(&gen, name, irc_types::Kind::Abs { binds: vec![], bound: Type::Any });
    assert_eq!(typ_decl(con), Dec::Type(con));
}

#[test]
fn switch_expr_effect_is_the_lub_of_the_scrutinee_and_every_case_body() {
    let mut interner = Interner::new();
    let a = interner.intern("A");
    let b = interner.intern("B");
    let scrutinee = lit(Literal::Nat(0), Type::Prim(Prim::Nat));
    let mut case_b_body = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    case_b_body.eff = Effect::Await;
    let cases = vec![
        crate::expr::Case { pat: Pattern::Var(a), body: lit(Literal::Nat(0), Type::Prim(Prim::Nat)) },
        crate::expr::Case { pat: Pattern::Var(b), body: case_b_body },
    ];
    let sw = switch_expr(scrutinee, cases, Type::Prim(Prim::Nat), Span::dummy());
    assert_eq!(sw.eff, Effect::Await);
}

#[test]
fn loop_expr_is_annotated_non_and_carries_the_body_effect() {
    let mut body = lit(Literal::Null, Type::unit());
    body.eff = Effect::Await;
    let l = loop_expr(body, Span::dummy());
    assert_eq!(l.typ, Type::Non);
    assert_eq!(l.eff, Effect::Await);
}

#[test]
fn label_expr_carries_the_bodys_own_type_not_the_break_type() {
    let mut interner = Interner::new();
    let label = interner.intern("L");
    let body = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    let labelled = label_expr(label, Type::Prim(Prim::Int), body, Span::dummy());
    assert_eq!(labelled.typ, Type::Prim(Prim::Nat));
    let ExprKind::Label(_, result_typ, _) = labelled.kind.as_ref() else { panic!("expected a label node") };
    assert_eq!(*result_typ, Type::Prim(Prim::Int));
}

#[test]
fn assert_expr_is_annotated_unit() {
    let cond = lit(Literal::Bool(true), Type::Prim(Prim::Bool));
    let a = assert_expr(cond, Span::dummy());
    assert_eq!(a.typ, Type::unit());
}

#[test]
fn async_expr_wraps_the_body_type_and_resets_its_effect_to_triv() {
    let mut body = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    body.eff = Effect::Await;
    let a = async_expr(body, Span::dummy());
    assert_eq!(a.typ, Type::Async(Box::new(Type::Prim(Prim::Nat))));
    assert_eq!(a.eff, Effect::Triv, "an async block's own suspension never leaks to its surrounding expression");
}

#[test]
fn await_expr_is_always_annotated_the_await_effect() {
    let pending = lit(Literal::Null, Type::Async(Box::new(Type::Prim(Prim::Nat))));
    let a = await_expr(pending, Type::Prim(Prim::Nat), Span::dummy());
    assert_eq!(a.eff, Effect::Await);
    assert_eq!(a.typ, Type::Prim(Prim::Nat));
}

#[test]
fn array_expr_wraps_element_types_in_mut_only_when_mutable() {
    let es = vec![lit(Literal::Nat(1), Type::Prim(Prim::Nat)), lit(Literal::Nat(2), Type::Prim(Prim::Nat))];
    let immutable = array_expr(false, Type::Prim(Prim::Nat), es.clone(), Span::dummy());
    assert_eq!(immutable.typ, Type::Array(Box::new(Type::Prim(Prim::Nat))));
    let mutable = array_expr(true, Type::Prim(Prim::Nat), es, Span::dummy());
    assert_eq!(mutable.typ, Type::Array(Box::new(Type::Mut(Box::new(Type::Prim(Prim::Nat))))));
}

#[test]
fn opt_expr_wraps_the_inner_type_and_carries_its_effect() {
    let mut inner = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    inner.eff = Effect::Await;
    let o = opt_expr(inner, Span::dummy());
    assert_eq!(o.typ, Type::Option(Box::new(Type::Prim(Prim::Nat))));
    assert_eq!(o.eff, Effect::Await);
}

#[test]
fn tag_expr_is_annotated_with_the_caller_supplied_variant_type() {
    let mut interner = Interner::new();
    let label = interner.intern("ok");
    let payload = lit(Literal::Nat(1), Type::Prim(Prim::Nat));
    let variant_typ = Type::Variant(vec![(label, Type::Prim(Prim::Nat))]);
    let t = tag_expr(label, payload, variant_typ.clone(), Span::dummy());
    assert_eq!(t.typ, variant_typ);
}

#[test]
fn object_expr_sorts_its_type_fields_by_label_regardless_of_construction_order() {
    let mut interner = Interner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let fields = vec![(b, lit(Literal::Nat(1), Type::Prim(Prim::Nat))), (a, lit(Literal::Bool(true), Type::Prim(Prim::Bool)))];
    let obj = object_expr(irc_types::ObjSort::Object, fields, Span::dummy());
    let Type::Object(_, type_fields) = &obj.typ else { panic!("expected an object type") };
    assert_eq!(type_fields.iter().map(|f| f.label).collect::<Vec<_>>(), vec![a, b]);
}
