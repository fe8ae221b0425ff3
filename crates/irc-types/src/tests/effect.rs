use super::*;

#[test]
fn triv_is_the_bottom_of_the_lattice() {
    assert_eq!(Effect::Triv.lub(Effect::Triv), Effect::Triv);
    assert_eq!(Effect::Triv.lub(Effect::Await), Effect::Await);
    assert_eq!(Effect::Await.lub(Effect::Triv), Effect::Await);
    assert_eq!(Effect::Await.lub(Effect::Await), Effect::Await);
}

#[test]
fn lub_all_of_empty_is_triv() {
    assert_eq!(Effect::lub_all(std::iter::empty()), Effect::Triv);
}

#[test]
fn lub_all_is_await_if_any_is_await() {
    let effects = [Effect::Triv, Effect::Triv, Effect::Await, Effect::Triv];
    assert_eq!(Effect::lub_all(effects), Effect::Await);
}

#[test]
fn ordering_matches_the_lattice() {
    assert!(Effect::Triv < Effect::Await);
    assert!(Effect::Triv.le(Effect::Await));
    assert!(!Effect::Await.le(Effect::Triv));
}
