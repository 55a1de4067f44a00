use super::Bound;

#[test]
fn unbounded_allows_any_usage() {
  assert!(Bound::Unbounded.allows(0));
  assert!(Bound::Unbounded.allows(usize::MAX));
}

#[test]
fn finite_allows_usage_below_the_limit() {
  let bound = Bound::Finite(2);
  assert!(bound.allows(0));
  assert!(bound.allows(1));
  assert!(!bound.allows(2));
  assert!(!bound.allows(3));
}

#[test]
fn display_formats_both_arms() {
  assert_eq!(Bound::Unbounded.to_string(), "unbounded");
  assert_eq!(Bound::Finite(5).to_string(), "5");
}
