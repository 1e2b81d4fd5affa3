//! Async HTTP client wrapping the screening JSON API.

use std::time::Duration;

use depistage_core::{
  Classify, ErrorKind,
  record::{NewScreening, ScreeningRecord},
  stats::Statistics,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// A failed API call, classified the same way the server classifies store
/// errors.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
  pub kind:    ErrorKind,
  pub message: String,
}

impl Classify for ClientError {
  fn kind(&self) -> ErrorKind { self.kind }
}

impl ClientError {
  fn transport(what: &str, e: reqwest::Error) -> Self {
    // A server that cannot be reached is as good as an unavailable store.
    let kind = if e.is_connect() || e.is_timeout() {
      ErrorKind::StoreUnavailable
    } else {
      ErrorKind::Unknown
    };
    Self { kind, message: format!("{what}: {e}") }
  }

  /// Build from a non-success response, reading the `{"error": ...}` body.
  async fn from_response(what: &str, resp: Response) -> Self {
    #[derive(Deserialize)]
    struct Body {
      error: String,
    }

    let status = resp.status();
    let kind = match status {
      StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::ValidationFailed,
      StatusCode::NOT_FOUND => ErrorKind::NotFound,
      StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
        ErrorKind::StoreUnavailable
      }
      _ => ErrorKind::Unknown,
    };
    let message = match resp.json::<Body>().await {
      Ok(body) => body.error,
      Err(_) => format!("{what} → {status}"),
    };
    Self { kind, message }
  }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Body of a successful `POST /api/screenings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
  pub screening_number: String,
  pub screening:        ScreeningRecord,
}

/// Async HTTP client for the screening JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    use anyhow::Context as _;
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  async fn send(&self, what: &str, req: reqwest::RequestBuilder) -> ClientResult<Response> {
    let resp = req.send().await.map_err(|e| ClientError::transport(what, e))?;
    if !resp.status().is_success() {
      return Err(ClientError::from_response(what, resp).await);
    }
    Ok(resp)
  }

  async fn json<T: serde::de::DeserializeOwned>(what: &str, resp: Response) -> ClientResult<T> {
    resp.json().await.map_err(|e| ClientError {
      kind:    ErrorKind::Unknown,
      message: format!("{what}: invalid response: {e}"),
    })
  }

  // ── Screenings ────────────────────────────────────────────────────────────

  /// `GET /api/screenings`
  pub async fn list_screenings(&self) -> ClientResult<Vec<ScreeningRecord>> {
    let what = "GET /screenings";
    let resp = self.send(what, self.client.get(self.url("/screenings"))).await?;
    Self::json(what, resp).await
  }

  /// `POST /api/screenings`
  pub async fn create_screening(&self, input: &NewScreening) -> ClientResult<Created> {
    let what = "POST /screenings";
    let resp = self
      .send(what, self.client.post(self.url("/screenings")).json(input))
      .await?;
    Self::json(what, resp).await
  }

  /// `DELETE /api/screenings/:id`
  pub async fn delete_screening(&self, id: Uuid) -> ClientResult<()> {
    self
      .send(
        "DELETE /screenings/:id",
        self.client.delete(self.url(&format!("/screenings/{id}"))),
      )
      .await?;
    Ok(())
  }

  /// `GET /api/screenings/export`: the CSV document as text.
  pub async fn export_csv(&self) -> ClientResult<String> {
    let what = "GET /screenings/export";
    let resp = self
      .send(what, self.client.get(self.url("/screenings/export")))
      .await?;
    resp.text().await.map_err(|e| ClientError::transport(what, e))
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/stats`
  pub async fn stats(&self) -> ClientResult<Statistics> {
    let what = "GET /stats";
    let resp = self.send(what, self.client.get(self.url("/stats"))).await?;
    Self::json(what, resp).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig { base_url: base_url.into() }).unwrap()
  }

  #[tokio::test]
  async fn urls_are_nested_under_api() {
    assert_eq!(client("http://h:3000").url("/stats"), "http://h:3000/api/stats");
    assert_eq!(client("http://h:3000/").url("/screenings"), "http://h:3000/api/screenings");
  }

  #[test]
  fn created_body_decodes() {
    let id = Uuid::new_v4();
    let body = serde_json::json!({
      "screeningNumber": "4",
      "screening": {
        "id": id,
        "screeningNumber": "4",
        "date": "2025-10-19",
        "lastName": "Yao",
        "firstName": "Adjoua",
        "age": 47,
        "phone": "0102030405",
        "address": "Bouaké",
        "vaccination": true,
        "mammography": "oui",
        "mammographyDate": "2025-09-01",
        "gynecoConsultation": false,
        "gynecoDate": null,
        "hasAdditionalExams": "non",
        "fcu": false,
        "fcuLocation": null,
        "hpv": false,
        "mammaryUltrasound": false,
        "thermoAblation": false,
        "anapath": false,
        "createdAt": "2025-10-19T08:30:00Z"
      }
    });
    let created: Created = serde_json::from_value(body).unwrap();
    assert_eq!(created.screening_number, "4");
    assert_eq!(created.screening.id, id);
    assert!(created.screening.vaccination);
  }

  #[tokio::test]
  async fn unreachable_server_is_unavailable() {
    let err = client("http://127.0.0.1:9").list_screenings().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
  }
}
