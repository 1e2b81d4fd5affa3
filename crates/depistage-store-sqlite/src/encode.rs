//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings with microsecond precision so that
//! lexical order matches chronological order. Calendar dates are
//! `YYYY-MM-DD`. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use depistage_core::record::{Answer, FcuLocation, ScreeningRecord};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|_| Error::Decode { column: "created_at", value: s.to_owned() })
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(column: &'static str, s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|_| Error::Decode { column, value: s.to_owned() })
}

// ─── Answers ─────────────────────────────────────────────────────────────────

pub fn encode_answer(a: Answer) -> &'static str { a.as_str() }

pub fn decode_answer(column: &'static str, s: &str) -> Result<Answer> {
  match s {
    "oui" => Ok(Answer::Oui),
    "non" => Ok(Answer::Non),
    other => Err(Error::Decode { column, value: other.to_owned() }),
  }
}

pub fn encode_fcu_location(l: FcuLocation) -> &'static str { l.as_str() }

pub fn decode_fcu_location(s: &str) -> Result<FcuLocation> {
  match s {
    "SAR" => Ok(FcuLocation::Sar),
    "Ailleurs" => Ok(FcuLocation::Ailleurs),
    other => Err(Error::Decode { column: "fcu_location", value: other.to_owned() }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `screenings` row, in
/// [`COLUMNS`](crate::schema::COLUMNS) order.
pub struct RawScreening {
  pub id:                   String,
  pub screening_number:     String,
  pub date:                 String,
  pub last_name:            String,
  pub first_name:           String,
  pub age:                  u32,
  pub phone:                String,
  pub address:              String,
  pub vaccination:          bool,
  pub mammography:          Option<String>,
  pub mammography_date:     Option<String>,
  pub gyneco_consultation:  bool,
  pub gyneco_date:          Option<String>,
  pub has_additional_exams: Option<String>,
  pub fcu:                  bool,
  pub fcu_location:         Option<String>,
  pub hpv:                  bool,
  pub mammary_ultrasound:   bool,
  pub thermo_ablation:      bool,
  pub anapath:              bool,
  pub created_at:           String,
}

impl RawScreening {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      screening_number:     row.get(1)?,
      date:                 row.get(2)?,
      last_name:            row.get(3)?,
      first_name:           row.get(4)?,
      age:                  row.get(5)?,
      phone:                row.get(6)?,
      address:              row.get(7)?,
      vaccination:          row.get(8)?,
      mammography:          row.get(9)?,
      mammography_date:     row.get(10)?,
      gyneco_consultation:  row.get(11)?,
      gyneco_date:          row.get(12)?,
      has_additional_exams: row.get(13)?,
      fcu:                  row.get(14)?,
      fcu_location:         row.get(15)?,
      hpv:                  row.get(16)?,
      mammary_ultrasound:   row.get(17)?,
      thermo_ablation:      row.get(18)?,
      anapath:              row.get(19)?,
      created_at:           row.get(20)?,
    })
  }

  pub fn into_record(self) -> Result<ScreeningRecord> {
    let optional_date = |column, v: Option<String>| {
      v.as_deref().map(|s| decode_date(column, s)).transpose()
    };

    Ok(ScreeningRecord {
      id:                   decode_uuid(&self.id)?,
      screening_number:     self.screening_number,
      date:                 decode_date("date", &self.date)?,
      last_name:            self.last_name,
      first_name:           self.first_name,
      age:                  self.age,
      phone:                self.phone,
      address:              self.address,
      vaccination:          self.vaccination,
      mammography:          self
        .mammography
        .as_deref()
        .map(|s| decode_answer("mammography", s))
        .transpose()?,
      mammography_date:     optional_date("mammography_date", self.mammography_date)?,
      gyneco_consultation:  self.gyneco_consultation,
      gyneco_date:          optional_date("gyneco_date", self.gyneco_date)?,
      has_additional_exams: self
        .has_additional_exams
        .as_deref()
        .map(|s| decode_answer("has_additional_exams", s))
        .transpose()?,
      fcu:                  self.fcu,
      fcu_location:         self.fcu_location.as_deref().map(decode_fcu_location).transpose()?,
      hpv:                  self.hpv,
      mammary_ultrasound:   self.mammary_ultrasound,
      thermo_ablation:      self.thermo_ablation,
      anapath:              self.anapath,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}
