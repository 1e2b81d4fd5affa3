//! Chronological screening numbers.
//!
//! The next number is derived from the most recently created record. The
//! read-then-insert in [`create_screening`] is not atomic: two concurrent
//! creations can read the same last number. The SQLite backend rejects the
//! second insert through a UNIQUE index; the memory backend does not guard.

use crate::{
  Classify, Error, ErrorKind,
  record::{NewScreening, ScreeningRecord},
  store::RecordStore,
};

/// Number following `last`.
///
/// Only the leading digits are read, so `"12abc"` is followed by `"13"`.
/// Values without leading digits, including negative ones, restart at 1.
pub fn next_screening_number(last: Option<&str>) -> String {
  let next = last
    .and_then(leading_number)
    .map_or(1, |n| n.saturating_add(1));
  next.to_string()
}

fn leading_number(s: &str) -> Option<u64> {
  let s = s.trim_start();
  let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
  s[..end].parse().ok()
}

/// Error returned by [`create_screening`]: either the payload was rejected
/// before touching the store, or the store failed.
#[derive(Debug, thiserror::Error)]
pub enum CreateError<E> {
  #[error(transparent)]
  Invalid(Error),
  #[error(transparent)]
  Store(E),
}

impl<E: Classify> Classify for CreateError<E> {
  fn kind(&self) -> ErrorKind {
    match self {
      CreateError::Invalid(e) => e.kind(),
      CreateError::Store(e) => e.kind(),
    }
  }
}

/// Validate `input`, assign the next screening number and insert.
pub async fn create_screening<S: RecordStore>(
  store: &S,
  input: NewScreening,
) -> Result<ScreeningRecord, CreateError<S::Error>> {
  let input = input.normalized();
  input.validate().map_err(CreateError::Invalid)?;

  let last = store.last_screening_number().await.map_err(CreateError::Store)?;
  let number = next_screening_number(last.as_deref());
  tracing::debug!(%number, "assigning screening number");

  store.insert(number, input).await.map_err(CreateError::Store)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{memory::MemoryStore, testing::payload};

  #[test]
  fn next_after_seven_is_eight() {
    assert_eq!(next_screening_number(Some("7")), "8");
  }

  #[test]
  fn empty_store_starts_at_one() {
    assert_eq!(next_screening_number(None), "1");
  }

  #[test]
  fn non_numeric_restarts_at_one() {
    assert_eq!(next_screening_number(Some("N/A")), "1");
    assert_eq!(next_screening_number(Some("")), "1");
    assert_eq!(next_screening_number(Some("-3")), "1");
  }

  #[test]
  fn trailing_garbage_after_a_number_is_ignored() {
    assert_eq!(next_screening_number(Some("12abc")), "13");
    assert_eq!(next_screening_number(Some("7.5")), "8");
    assert_eq!(next_screening_number(Some("abc12")), "1");
  }

  #[test]
  fn surrounding_whitespace_is_tolerated() {
    assert_eq!(next_screening_number(Some(" 41 ")), "42");
  }

  #[tokio::test]
  async fn sequential_insertions_are_numbered_one_to_n() {
    let store = MemoryStore::new();
    let mut numbers = Vec::new();
    for i in 0..12 {
      let rec = create_screening(&store, payload(&format!("P{i}"))).await.unwrap();
      numbers.push(rec.screening_number);
    }
    let expected: Vec<String> = (1..=12).map(|n| n.to_string()).collect();
    assert_eq!(numbers, expected);
  }

  #[tokio::test]
  async fn numbering_continues_after_a_deletion_of_an_older_record() {
    let store = MemoryStore::new();
    let first = create_screening(&store, payload("A")).await.unwrap();
    create_screening(&store, payload("B")).await.unwrap();
    store.delete(first.id).await.unwrap();
    let third = create_screening(&store, payload("C")).await.unwrap();
    assert_eq!(third.screening_number, "3");
  }

  #[tokio::test]
  async fn invalid_payload_never_reaches_the_store() {
    let store = MemoryStore::new();
    let mut bad = payload("X");
    bad.phone.clear();
    let err = create_screening(&store, bad).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert!(store.list().await.unwrap().is_empty());
  }
}
