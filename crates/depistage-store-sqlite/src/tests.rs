//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use depistage_core::{
  Classify, ErrorKind,
  record::{Answer, FcuLocation, NewScreening},
  sequence::create_screening,
  store::RecordStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn payload(last_name: &str) -> NewScreening {
  NewScreening {
    date:                 date(2024, 10, 15),
    last_name:            last_name.into(),
    first_name:           "Fatou".into(),
    age:                  49,
    phone:                "0505050505".into(),
    address:              "Treichville".into(),
    vaccination:          false,
    mammography:          Some(Answer::Non),
    mammography_date:     None,
    gyneco_consultation:  false,
    gyneco_date:          None,
    has_additional_exams: None,
    fcu:                  false,
    fcu_location:         None,
    hpv:                  false,
    mammary_ultrasound:   false,
    thermo_ablation:      false,
    anapath:              false,
  }
}

// ─── Numbering ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn sequential_creations_are_numbered_one_to_n() {
  let s = store().await;
  assert_eq!(s.last_screening_number().await.unwrap(), None);

  for i in 1..=15 {
    let rec = create_screening(&s, payload(&format!("P{i}"))).await.unwrap();
    assert_eq!(rec.screening_number, i.to_string());
  }
  assert_eq!(s.last_screening_number().await.unwrap().as_deref(), Some("15"));
}

#[tokio::test]
async fn duplicate_screening_number_is_rejected() {
  let s = store().await;
  s.insert("1".into(), payload("A")).await.unwrap();

  let err = s.insert("1".into(), payload("B")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Unknown);
  assert_eq!(s.list().await.unwrap().len(), 1);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  for name in ["A", "B", "C"] {
    create_screening(&s, payload(name)).await.unwrap();
  }

  let names: Vec<String> = s.list().await.unwrap().into_iter().map(|r| r.last_name).collect();
  assert_eq!(names, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn stored_record_reads_back_unchanged() {
  let s = store().await;
  let mut input = payload("Yao");
  input.vaccination = true;
  input.mammography = Some(Answer::Oui);
  input.mammography_date = Some(date(2024, 9, 30));
  input.gyneco_consultation = true;
  input.gyneco_date = Some(date(2024, 10, 1));
  input.has_additional_exams = Some(Answer::Oui);
  input.fcu = true;
  input.fcu_location = Some(FcuLocation::Ailleurs);
  input.thermo_ablation = true;

  let created = s.insert("4".into(), input).await.unwrap();
  let fetched = s.get(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn conditional_values_are_dropped_on_insert() {
  let s = store().await;
  let mut input = payload("Yao");
  input.mammography = Some(Answer::Non);
  input.mammography_date = Some(date(2024, 9, 30));
  input.fcu_location = Some(FcuLocation::Sar);

  let created = s.insert("1".into(), input).await.unwrap();
  let fetched = s.get(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.mammography_date, None);
  assert_eq!(fetched.fcu_location, None);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_only_the_target() {
  let s = store().await;
  let a = create_screening(&s, payload("A")).await.unwrap();
  let b = create_screening(&s, payload("B")).await.unwrap();

  s.delete(a.id).await.unwrap();
  assert!(s.get(a.id).await.unwrap().is_none());

  let remaining = s.list().await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].id, b.id);
}

#[tokio::test]
async fn delete_missing_is_not_found() {
  let s = store().await;
  create_screening(&s, payload("A")).await.unwrap();

  let err = s.delete(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(s.list().await.unwrap().len(), 1);
}

// ─── Availability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn ping_succeeds_on_open_store() {
  let s = store().await;
  s.ping().await.unwrap();
}

#[tokio::test]
async fn unopenable_path_is_store_unavailable() {
  let path = std::env::temp_dir()
    .join(format!("missing-{}", Uuid::new_v4()))
    .join("screenings.db");
  let err = SqliteStore::open(&path).await.err().expect("open should fail");
  assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
}

#[tokio::test]
async fn records_survive_reopening_the_file() {
  let path = std::env::temp_dir().join(format!("depistage-{}.db", Uuid::new_v4()));
  {
    let s = SqliteStore::open(&path).await.unwrap();
    create_screening(&s, payload("A")).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  let next = create_screening(&s, payload("B")).await.unwrap();
  assert_eq!(next.screening_number, "2");
  let _ = std::fs::remove_file(&path);
}
