//! [`MemoryStore`]: a process-local [`RecordStore`].
//!
//! Serves as the secondary store when the SQLite file is unusable, and as a
//! demo backend seeded with two sample records.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  record::{Answer, FcuLocation, NewScreening, ScreeningRecord},
  store::RecordStore,
};

/// Records kept in insertion order behind a lock.
///
/// Cloning is cheap: clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  records: Arc<RwLock<Vec<ScreeningRecord>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store pre-filled with records, e.g. from [`demo_records`].
  pub fn with_records(records: Vec<ScreeningRecord>) -> Self {
    let mut records = records;
    records.sort_by_key(|r| r.created_at);
    Self { records: Arc::new(RwLock::new(records)) }
  }

  pub fn len(&self) -> usize {
    self.records.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn newest_first(records: &[ScreeningRecord]) -> Vec<ScreeningRecord> {
    // Insertion order breaks created_at ties: later insert sorts first.
    let mut indexed: Vec<(usize, &ScreeningRecord)> = records.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, r)| r.clone()).collect()
  }
}

impl RecordStore for MemoryStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> { Ok(()) }

  async fn list(&self) -> Result<Vec<ScreeningRecord>> {
    let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
    Ok(Self::newest_first(&records))
  }

  async fn get(&self, id: Uuid) -> Result<Option<ScreeningRecord>> {
    let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
    Ok(records.iter().find(|r| r.id == id).cloned())
  }

  async fn insert(&self, screening_number: String, input: NewScreening) -> Result<ScreeningRecord> {
    let record = ScreeningRecord::from_new(Uuid::new_v4(), screening_number, Utc::now(), input);
    self
      .records
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .push(record.clone());
    Ok(record)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
    let before = records.len();
    records.retain(|r| r.id != id);
    if records.len() == before {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn last_screening_number(&self) -> Result<Option<String>> {
    let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
    Ok(
      Self::newest_first(&records)
        .into_iter()
        .next()
        .map(|r| r.screening_number),
    )
  }
}

/// The two sample patients used when the server runs in demo mode.
pub fn demo_records() -> Vec<ScreeningRecord> {
  let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
  vec![
    ScreeningRecord::from_new(
      Uuid::new_v4(),
      "1".into(),
      Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).single().unwrap_or_default(),
      NewScreening {
        date:                 date(2024, 1, 15),
        last_name:            "Dupont".into(),
        first_name:           "Marie".into(),
        age:                  45,
        phone:                "0123456789".into(),
        address:              "123 Rue de la Paix, Paris".into(),
        vaccination:          true,
        mammography:          Some(Answer::Oui),
        mammography_date:     Some(date(2024, 1, 20)),
        gyneco_consultation:  true,
        gyneco_date:          Some(date(2024, 1, 10)),
        has_additional_exams: Some(Answer::Oui),
        fcu:                  true,
        fcu_location:         Some(FcuLocation::Sar),
        hpv:                  false,
        mammary_ultrasound:   true,
        thermo_ablation:      false,
        anapath:              false,
      },
    ),
    ScreeningRecord::from_new(
      Uuid::new_v4(),
      "2".into(),
      Utc.with_ymd_and_hms(2024, 1, 16, 14, 30, 0).single().unwrap_or_default(),
      NewScreening {
        date:                 date(2024, 1, 16),
        last_name:            "Martin".into(),
        first_name:           "Sophie".into(),
        age:                  38,
        phone:                "0987654321".into(),
        address:              "456 Avenue des Champs, Lyon".into(),
        vaccination:          false,
        mammography:          Some(Answer::Non),
        mammography_date:     None,
        gyneco_consultation:  true,
        gyneco_date:          Some(date(2024, 1, 12)),
        has_additional_exams: Some(Answer::Oui),
        fcu:                  false,
        fcu_location:         None,
        hpv:                  true,
        mammary_ultrasound:   false,
        thermo_ablation:      true,
        anapath:              false,
      },
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Classify, ErrorKind, testing::payload};

  #[tokio::test]
  async fn list_is_newest_first() {
    let s = MemoryStore::new();
    s.insert("1".into(), payload("A")).await.unwrap();
    s.insert("2".into(), payload("B")).await.unwrap();
    s.insert("3".into(), payload("C")).await.unwrap();

    let names: Vec<String> = s.list().await.unwrap().into_iter().map(|r| r.last_name).collect();
    assert_eq!(names, vec!["C", "B", "A"]);
    assert_eq!(s.last_screening_number().await.unwrap().as_deref(), Some("3"));
  }

  #[tokio::test]
  async fn get_and_delete() {
    let s = MemoryStore::new();
    let a = s.insert("1".into(), payload("A")).await.unwrap();
    let b = s.insert("2".into(), payload("B")).await.unwrap();

    assert_eq!(s.get(a.id).await.unwrap().unwrap().last_name, "A");
    s.delete(a.id).await.unwrap();
    assert!(s.get(a.id).await.unwrap().is_none());

    let remaining = s.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);
  }

  #[tokio::test]
  async fn deleting_unknown_id_is_not_found_and_leaves_others() {
    let s = MemoryStore::new();
    s.insert("1".into(), payload("A")).await.unwrap();

    let err = s.delete(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(s.len(), 1);
  }

  #[tokio::test]
  async fn demo_store_continues_numbering_after_seed() {
    let s = MemoryStore::with_records(demo_records());
    assert_eq!(s.last_screening_number().await.unwrap().as_deref(), Some("2"));
    let listed = s.list().await.unwrap();
    assert_eq!(listed[0].last_name, "Martin");
  }
}
