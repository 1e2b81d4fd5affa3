//! Ordering and client-side pagination of the record list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::ScreeningRecord;

/// Records shown per page in the browser.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
  #[default]
  CreatedAt,
  ScreeningNumber,
  LastName,
  Date,
}

impl SortKey {
  pub fn label(self) -> &'static str {
    match self {
      SortKey::CreatedAt => "enregistrement",
      SortKey::ScreeningNumber => "n° dépistage",
      SortKey::LastName => "nom",
      SortKey::Date => "date",
    }
  }

  /// The key after this one, wrapping around.
  pub fn cycle(self) -> Self {
    match self {
      SortKey::CreatedAt => SortKey::ScreeningNumber,
      SortKey::ScreeningNumber => SortKey::LastName,
      SortKey::LastName => SortKey::Date,
      SortKey::Date => SortKey::CreatedAt,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
  Ascending,
  #[default]
  Descending,
}

impl SortOrder {
  pub fn toggle(self) -> Self {
    match self {
      SortOrder::Ascending => SortOrder::Descending,
      SortOrder::Descending => SortOrder::Ascending,
    }
  }
}

/// Default is newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
  pub key:   SortKey,
  pub order: SortOrder,
}

impl Sort {
  pub fn compare(&self, a: &ScreeningRecord, b: &ScreeningRecord) -> Ordering {
    let ord = match self.key {
      SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
      // Numeric numbers sort numerically and before anything unparseable.
      SortKey::ScreeningNumber => match (a.number(), b.number()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.screening_number.cmp(&b.screening_number),
      },
      SortKey::LastName => a
        .last_name
        .to_lowercase()
        .cmp(&b.last_name.to_lowercase())
        .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase())),
      SortKey::Date => a.date.cmp(&b.date),
    };
    match self.order {
      SortOrder::Ascending => ord,
      SortOrder::Descending => ord.reverse(),
    }
  }

  /// Stable sort, so equal keys keep the order the store returned.
  pub fn apply(&self, records: &mut [ScreeningRecord]) {
    records.sort_by(|a, b| self.compare(a, b));
  }
}

/// Number of pages needed for `len` records. An empty list still has one
/// (empty) page.
pub fn page_count(len: usize, size: usize) -> usize {
  if size == 0 {
    return 1;
  }
  len.div_ceil(size).max(1)
}

/// The `n`-th page (1-based). `n` is clamped to `1..=page_count`.
pub fn page<T>(records: &[T], n: usize, size: usize) -> &[T] {
  if size == 0 {
    return records;
  }
  let n = n.clamp(1, page_count(records.len(), size));
  let start = (n - 1) * size;
  let end = (start + size).min(records.len());
  &records[start.min(records.len())..end]
}
