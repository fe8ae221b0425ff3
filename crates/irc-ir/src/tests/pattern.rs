use super::*;
use irc_common::interner::Interner;

#[test]
fn bound_vars_collects_in_left_to_right_order() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let pat = Pattern::Tuple(vec![Pattern::Var(x), Pattern::Wild, Pattern::Var(y)]);

    let mut vars = Vec::new();
    pat.bound_vars(&mut vars);
    assert_eq!(vars, vec![x, y]);
}

#[test]
fn alternative_patterns_still_report_their_subpatterns_vars_for_the_checker_to_reject() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let pat = Pattern::Alt(vec![Pattern::Var(x), Pattern::Wild]);

    let mut vars = Vec::new();
    pat.bound_vars(&mut vars);
    assert_eq!(vars, vec![x]);
}
