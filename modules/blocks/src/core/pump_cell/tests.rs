use super::PumpCell;

#[test]
fn only_the_first_begin_wins() {
  let cell = PumpCell::new();
  assert!(cell.try_begin());
  assert!(!cell.try_begin());
}

#[test]
fn finish_allows_a_new_begin() {
  let cell = PumpCell::new();
  assert!(cell.try_begin());
  cell.finish();
  assert!(cell.try_begin());
}
