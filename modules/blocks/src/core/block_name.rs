
use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// User-facing block name rendered from a `name_format` template.
///
/// `{0}` substitutes the block kind and `{1}` the block id.
#[derive(Debug, Clone)]
pub(crate) struct BlockName {
  kind:   &'static str,
  id:     u64,
  format: String,
}

impl BlockName {
  pub(crate) fn new(kind: &'static str, format: String) -> Self {
    Self { kind, id: NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed), format }
  }

  pub(crate) const fn id(&self) -> u64 {
    self.id
  }
}

impl fmt::Display for BlockName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered = self.format.replace("{0}", self.kind).replace("{1}", &self.id.to_string());
    f.write_str(&rendered)
  }
}
