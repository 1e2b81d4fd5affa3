//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use depistage_core::{
  record::{NewScreening, ScreeningRecord},
  store::RecordStore,
};

use crate::{
  Error, Result,
  encode::{
    RawScreening, encode_answer, encode_date, encode_dt, encode_fcu_location, encode_uuid,
  },
  schema::{COLUMNS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A screening record store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query(&self, sql: String, args: Vec<String>) -> Result<Vec<ScreeningRecord>> {
    let raws: Vec<RawScreening> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawScreening::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawScreening::into_record).collect()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list(&self) -> Result<Vec<ScreeningRecord>> {
    self
      .query(
        format!("SELECT {COLUMNS} FROM screenings ORDER BY created_at DESC, rowid DESC"),
        Vec::new(),
      )
      .await
  }

  async fn get(&self, id: Uuid) -> Result<Option<ScreeningRecord>> {
    let mut found = self
      .query(
        format!("SELECT {COLUMNS} FROM screenings WHERE id = ?1"),
        vec![encode_uuid(id)],
      )
      .await?;
    Ok(found.pop())
  }

  async fn insert(&self, screening_number: String, input: NewScreening) -> Result<ScreeningRecord> {
    let record =
      ScreeningRecord::from_new(Uuid::new_v4(), screening_number, Utc::now(), input.normalized());

    let id_str               = encode_uuid(record.id);
    let number               = record.screening_number.clone();
    let date_str             = encode_date(record.date);
    let last_name            = record.last_name.clone();
    let first_name           = record.first_name.clone();
    let age                  = record.age;
    let phone                = record.phone.clone();
    let address              = record.address.clone();
    let vaccination          = record.vaccination;
    let mammography          = record.mammography.map(encode_answer);
    let mammography_date     = record.mammography_date.map(encode_date);
    let gyneco_consultation  = record.gyneco_consultation;
    let gyneco_date          = record.gyneco_date.map(encode_date);
    let has_additional_exams = record.has_additional_exams.map(encode_answer);
    let fcu                  = record.fcu;
    let fcu_location         = record.fcu_location.map(encode_fcu_location);
    let exams                = [
      record.hpv,
      record.mammary_ultrasound,
      record.thermo_ablation,
      record.anapath,
    ];
    let created_at_str       = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO screenings (
             id, screening_number, date, last_name, first_name, age, phone,
             address, vaccination, mammography, mammography_date,
             gyneco_consultation, gyneco_date, has_additional_exams, fcu,
             fcu_location, hpv, mammary_ultrasound, thermo_ablation, anapath,
             created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                     ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
          rusqlite::params![
            id_str,
            number,
            date_str,
            last_name,
            first_name,
            age,
            phone,
            address,
            vaccination,
            mammography,
            mammography_date,
            gyneco_consultation,
            gyneco_date,
            has_additional_exams,
            fcu,
            fcu_location,
            exams[0],
            exams[1],
            exams[2],
            exams[3],
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(id = %record.id, number = %record.screening_number, "screening stored");
    Ok(record)
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM screenings WHERE id = ?1", rusqlite::params![id_str])?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::NotFound(id));
    }
    Ok(())
  }

  async fn last_screening_number(&self) -> Result<Option<String>> {
    let number = self
      .conn
      .call(|conn| {
        let n: Option<String> = conn
          .query_row(
            "SELECT screening_number FROM screenings
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            [],
            |r| r.get(0),
          )
          .optional()?;
        Ok(n)
      })
      .await?;
    Ok(number)
  }
}
