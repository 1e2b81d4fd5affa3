//! Router tests against an in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use depistage_core::{
  Error, Result,
  memory::{MemoryStore, demo_records},
  record::{NewScreening, ScreeningRecord},
  stats::Statistics,
  store::RecordStore,
};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{api_router, screenings::Created};

async fn send<S: RecordStore + 'static>(
  store: Arc<S>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  api_router(store).oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
  serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn intake(last_name: &str) -> Value {
  json!({
    "date": "2024-10-15",
    "lastName": last_name,
    "firstName": "Adjoua",
    "age": 51,
    "phone": "0101010101",
    "address": "Abobo",
    "vaccination": true,
    "mammography": "oui",
    "mammographyDate": "2024-10-01"
  })
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_screening_number() {
  let store = Arc::new(MemoryStore::new());

  let resp = send(store.clone(), "POST", "/screenings", Some(intake("Kouadio"))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Created = body_json(resp).await;
  assert_eq!(created.screening_number, "1");
  assert_eq!(created.screening.last_name, "Kouadio");

  let resp = send(store.clone(), "POST", "/screenings", Some(intake("Bamba"))).await;
  let created: Created = body_json(resp).await;
  assert_eq!(created.screening_number, "2");
  assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn create_with_missing_fields_is_400() {
  let store = Arc::new(MemoryStore::new());
  let mut body = intake("  ");
  body["mammographyDate"] = Value::Null;

  let resp = send(store.clone(), "POST", "/screenings", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let err: Value = body_json(resp).await;
  let msg = err["error"].as_str().unwrap();
  assert!(msg.contains("Nom"), "{msg}");
  assert!(msg.contains("Date mammographie"), "{msg}");
  assert!(store.is_empty());
}

#[tokio::test]
async fn create_without_dependent_values_is_400() {
  let store = Arc::new(MemoryStore::new());
  let mut body = intake("Koné");
  body["gynecoConsultation"] = json!(true);
  body["fcu"] = json!(true);

  let resp = send(store.clone(), "POST", "/screenings", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let err: Value = body_json(resp).await;
  let msg = err["error"].as_str().unwrap();
  assert!(msg.contains("Date consultation"), "{msg}");
  assert!(msg.contains("Lieu FCU"), "{msg}");
  assert!(store.is_empty());
}

#[tokio::test]
async fn create_with_malformed_body_is_400() {
  let store = Arc::new(MemoryStore::new());
  let resp = send(store, "POST", "/screenings", Some(json!({ "lastName": "X" }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Read & delete ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_get_and_delete() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));

  let resp = send(store.clone(), "GET", "/screenings", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let listed: Vec<ScreeningRecord> = body_json(resp).await;
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].last_name, "Martin");

  let id = listed[1].id;
  let resp = send(store.clone(), "GET", &format!("/screenings/{id}"), None).await;
  let one: ScreeningRecord = body_json(resp).await;
  assert_eq!(one.last_name, "Dupont");

  let resp = send(store.clone(), "DELETE", &format!("/screenings/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(store.clone(), "GET", &format!("/screenings/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(store.clone(), "DELETE", &format!("/screenings/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn list_accepts_a_sort() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));
  let resp = send(store, "GET", "/screenings?sort=lastName&order=ascending", None).await;
  let listed: Vec<ScreeningRecord> = body_json(resp).await;
  let names: Vec<&str> = listed.iter().map(|r| r.last_name.as_str()).collect();
  assert_eq!(names, vec!["Dupont", "Martin"]);
}

#[tokio::test]
async fn malformed_id_is_400_with_an_error_body() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));
  for method in ["GET", "DELETE"] {
    let resp = send(store.clone(), method, "/screenings/not-a-uuid", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method}");
    let err: Value = body_json(resp).await;
    assert!(err["error"].is_string(), "{method}: {err}");
  }
  assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn unknown_sort_key_is_400_with_an_error_body() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));
  for uri in ["/screenings?sort=bogus", "/screenings/export?order=sideways"] {
    let resp = send(store.clone(), "GET", uri, None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    let err: Value = body_json(resp).await;
    assert!(err["error"].is_string(), "{uri}: {err}");
  }
}

// ─── Export & stats ──────────────────────────────────────────────────────────

#[tokio::test]
async fn export_is_a_csv_attachment() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));
  let resp = send(store, "GET", "/screenings/export", None).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let disposition = resp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_owned();
  assert!(disposition.starts_with("attachment; filename=\"depistages-"));
  assert!(resp.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));

  let csv = String::from_utf8(body_bytes(resp).await).unwrap();
  assert_eq!(csv.lines().count(), 3);
  assert!(csv.lines().nth(1).unwrap().starts_with("2;16/01/2024;Martin;Sophie;38;"));
}

#[tokio::test]
async fn stats_summarise_the_store() {
  let store = Arc::new(MemoryStore::with_records(demo_records()));
  let resp = send(store, "GET", "/stats", None).await;
  let stats: Statistics = body_json(resp).await;
  assert_eq!(stats.total, 2);
  assert_eq!(stats.vaccinated, 1);
  assert_eq!(stats.mammography_done, 1);
  assert_eq!(stats.average_age, 41.5);
  assert_eq!(stats.exams_breakdown.hpv, 1);
}

#[tokio::test]
async fn stats_on_empty_store_are_zero() {
  let resp = send(Arc::new(MemoryStore::new()), "GET", "/stats", None).await;
  let stats: Value = body_json(resp).await;
  assert_eq!(stats["total"], 0);
  assert_eq!(stats["averageAge"], 0.0);
}

// ─── Unavailable store ───────────────────────────────────────────────────────

/// A backend that is never reachable.
struct Down;

impl RecordStore for Down {
  type Error = Error;

  async fn ping(&self) -> Result<()> { Err(Error::StoreUnavailable) }

  async fn list(&self) -> Result<Vec<ScreeningRecord>> { Err(Error::StoreUnavailable) }

  async fn get(&self, _id: Uuid) -> Result<Option<ScreeningRecord>> {
    Err(Error::StoreUnavailable)
  }

  async fn insert(&self, _n: String, _input: NewScreening) -> Result<ScreeningRecord> {
    Err(Error::StoreUnavailable)
  }

  async fn delete(&self, _id: Uuid) -> Result<()> { Err(Error::StoreUnavailable) }

  async fn last_screening_number(&self) -> Result<Option<String>> {
    Err(Error::StoreUnavailable)
  }
}

#[tokio::test]
async fn unavailable_store_is_503() {
  let resp = send(Arc::new(Down), "POST", "/screenings", Some(intake("A"))).await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

  let resp = send(Arc::new(Down), "GET", "/screenings", None).await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  let err: Value = body_json(resp).await;
  assert_eq!(err["error"], "record store unavailable");
}
