//! Screening records: one per patient visit.
//!
//! Records are created by a single insert and never updated in place. The
//! store assigns the UUID and the creation timestamp; the screening number is
//! computed by [`crate::sequence`] just before the insert.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Answers ─────────────────────────────────────────────────────────────────

/// A yes/no answer as captured on the paper form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
  Oui,
  Non,
}

impl Answer {
  pub fn is_yes(self) -> bool { matches!(self, Self::Oui) }

  pub fn as_str(self) -> &'static str {
    match self {
      Answer::Oui => "oui",
      Answer::Non => "non",
    }
  }

  pub fn from_bool(yes: bool) -> Self { if yes { Self::Oui } else { Self::Non } }
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where the cervical smear (FCU) was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcuLocation {
  /// On site, at the campaign's own facility.
  #[serde(rename = "SAR")]
  Sar,
  #[serde(rename = "Ailleurs")]
  Ailleurs,
}

impl FcuLocation {
  pub fn as_str(self) -> &'static str {
    match self {
      FcuLocation::Sar => "SAR",
      FcuLocation::Ailleurs => "Ailleurs",
    }
  }
}

impl fmt::Display for FcuLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Every user-editable attribute of a record, in form order.
///
/// Used to report missing information and to label export columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
  Date,
  LastName,
  FirstName,
  Age,
  Phone,
  Address,
  Vaccination,
  GynecoConsultation,
  GynecoDate,
  Mammography,
  MammographyDate,
  HasAdditionalExams,
  Fcu,
  FcuLocation,
  Hpv,
  MammaryUltrasound,
  ThermoAblation,
  Anapath,
}

impl Field {
  /// Human-readable French label, as printed on the campaign form.
  pub fn label(self) -> &'static str {
    match self {
      Field::Date => "Date",
      Field::LastName => "Nom",
      Field::FirstName => "Prénom(s)",
      Field::Age => "Âge",
      Field::Phone => "Téléphone",
      Field::Address => "Adresse",
      Field::Vaccination => "Vaccination",
      Field::GynecoConsultation => "Consultation gynécologique",
      Field::GynecoDate => "Date consultation",
      Field::Mammography => "Mammographie",
      Field::MammographyDate => "Date mammographie",
      Field::HasAdditionalExams => "Examens complémentaires",
      Field::Fcu => "FCU",
      Field::FcuLocation => "Lieu FCU",
      Field::Hpv => "HPV",
      Field::MammaryUltrasound => "Échographie mammaire",
      Field::ThermoAblation => "Thermo-ablation",
      Field::Anapath => "Anapath",
    }
  }

  pub fn join_labels(fields: &[Field]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The intake payload: a record minus the store-assigned attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScreening {
  pub date:                 NaiveDate,
  pub last_name:            String,
  pub first_name:           String,
  pub age:                  u32,
  pub phone:                String,
  pub address:              String,
  #[serde(default)]
  pub vaccination:          bool,
  /// `None` when the record was auto-submitted before the question was
  /// answered.
  #[serde(default)]
  pub mammography:          Option<Answer>,
  #[serde(default)]
  pub mammography_date:     Option<NaiveDate>,
  #[serde(default)]
  pub gyneco_consultation:  bool,
  #[serde(default)]
  pub gyneco_date:          Option<NaiveDate>,
  #[serde(default)]
  pub has_additional_exams: Option<Answer>,
  #[serde(default)]
  pub fcu:                  bool,
  #[serde(default)]
  pub fcu_location:         Option<FcuLocation>,
  #[serde(default)]
  pub hpv:                  bool,
  #[serde(default)]
  pub mammary_ultrasound:   bool,
  #[serde(default)]
  pub thermo_ablation:      bool,
  #[serde(default)]
  pub anapath:              bool,
}

impl NewScreening {
  /// Trim free-text fields and drop conditional values whose governing
  /// answer is negative.
  pub fn normalized(mut self) -> Self {
    for s in [
      &mut self.last_name,
      &mut self.first_name,
      &mut self.phone,
      &mut self.address,
    ] {
      let trimmed = s.trim();
      if trimmed.len() != s.len() {
        *s = trimmed.to_owned();
      }
    }
    if self.mammography != Some(Answer::Oui) {
      self.mammography_date = None;
    }
    if !self.gyneco_consultation {
      self.gyneco_date = None;
    }
    if !self.fcu {
      self.fcu_location = None;
    }
    self
  }

  /// Fields that are required but absent, in form order.
  pub fn missing_fields(&self) -> Vec<Field> {
    let mut missing = Vec::new();
    if self.last_name.trim().is_empty() {
      missing.push(Field::LastName);
    }
    if self.first_name.trim().is_empty() {
      missing.push(Field::FirstName);
    }
    if self.age == 0 {
      missing.push(Field::Age);
    }
    if self.phone.trim().is_empty() {
      missing.push(Field::Phone);
    }
    if self.address.trim().is_empty() {
      missing.push(Field::Address);
    }
    if self.gyneco_consultation && self.gyneco_date.is_none() {
      missing.push(Field::GynecoDate);
    }
    if self.mammography == Some(Answer::Oui) && self.mammography_date.is_none() {
      missing.push(Field::MammographyDate);
    }
    if self.fcu && self.fcu_location.is_none() {
      missing.push(Field::FcuLocation);
    }
    missing
  }

  /// Returns [`Error::ValidationFailed`] listing every missing field.
  pub fn validate(&self) -> Result<()> {
    let missing = self.missing_fields();
    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::ValidationFailed(missing))
    }
  }
}

/// A persisted screening record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningRecord {
  pub id:                   Uuid,
  pub screening_number:     String,
  pub date:                 NaiveDate,
  pub last_name:            String,
  pub first_name:           String,
  pub age:                  u32,
  pub phone:                String,
  pub address:              String,
  pub vaccination:          bool,
  pub mammography:          Option<Answer>,
  pub mammography_date:     Option<NaiveDate>,
  pub gyneco_consultation:  bool,
  pub gyneco_date:          Option<NaiveDate>,
  pub has_additional_exams: Option<Answer>,
  pub fcu:                  bool,
  pub fcu_location:         Option<FcuLocation>,
  pub hpv:                  bool,
  pub mammary_ultrasound:   bool,
  pub thermo_ablation:      bool,
  pub anapath:              bool,
  pub created_at:           DateTime<Utc>,
}

impl ScreeningRecord {
  /// Assemble a record from a payload and the store-assigned attributes.
  pub fn from_new(
    id: Uuid,
    screening_number: String,
    created_at: DateTime<Utc>,
    input: NewScreening,
  ) -> Self {
    Self {
      id,
      screening_number,
      date: input.date,
      last_name: input.last_name,
      first_name: input.first_name,
      age: input.age,
      phone: input.phone,
      address: input.address,
      vaccination: input.vaccination,
      mammography: input.mammography,
      mammography_date: input.mammography_date,
      gyneco_consultation: input.gyneco_consultation,
      gyneco_date: input.gyneco_date,
      has_additional_exams: input.has_additional_exams,
      fcu: input.fcu,
      fcu_location: input.fcu_location,
      hpv: input.hpv,
      mammary_ultrasound: input.mammary_ultrasound,
      thermo_ablation: input.thermo_ablation,
      anapath: input.anapath,
      created_at,
    }
  }

  /// "LASTNAME Firstname", the way the campaign sheets list patients.
  pub fn display_name(&self) -> String {
    format!("{} {}", self.last_name.to_uppercase(), self.first_name)
  }

  /// Screening number as an integer, when it parses as one.
  pub fn number(&self) -> Option<u64> { self.screening_number.trim().parse().ok() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload() -> NewScreening {
    NewScreening {
      date:                 NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
      last_name:            "  Dupont ".into(),
      first_name:           "Marie".into(),
      age:                  45,
      phone:                "0123456789".into(),
      address:              "123 Rue de la Paix".into(),
      vaccination:          false,
      mammography:          Some(Answer::Non),
      mammography_date:     NaiveDate::from_ymd_opt(2024, 10, 2),
      gyneco_consultation:  false,
      gyneco_date:          NaiveDate::from_ymd_opt(2024, 10, 3),
      has_additional_exams: None,
      fcu:                  false,
      fcu_location:         Some(FcuLocation::Sar),
      hpv:                  false,
      mammary_ultrasound:   false,
      thermo_ablation:      false,
      anapath:              false,
    }
  }

  #[test]
  fn normalized_drops_conditional_values_with_negative_answers() {
    let n = payload().normalized();
    assert_eq!(n.last_name, "Dupont");
    assert_eq!(n.mammography_date, None);
    assert_eq!(n.gyneco_date, None);
    assert_eq!(n.fcu_location, None);
  }

  #[test]
  fn normalized_keeps_conditional_values_with_positive_answers() {
    let mut p = payload();
    p.mammography = Some(Answer::Oui);
    p.gyneco_consultation = true;
    p.fcu = true;
    let n = p.normalized();
    assert!(n.mammography_date.is_some());
    assert!(n.gyneco_date.is_some());
    assert_eq!(n.fcu_location, Some(FcuLocation::Sar));
  }

  #[test]
  fn validate_lists_missing_fields_in_form_order() {
    let mut p = payload();
    p.first_name = "   ".into();
    p.age = 0;
    p.address.clear();
    match p.validate() {
      Err(Error::ValidationFailed(fields)) => {
        assert_eq!(fields, vec![Field::FirstName, Field::Age, Field::Address]);
      }
      other => panic!("expected ValidationFailed, got {other:?}"),
    }
  }

  #[test]
  fn mammography_date_is_required_when_mammography_is_oui() {
    let mut p = payload();
    p.mammography = Some(Answer::Oui);
    p.mammography_date = None;
    assert_eq!(p.missing_fields(), vec![Field::MammographyDate]);
  }

  #[test]
  fn affirmative_answers_require_their_dependent_values() {
    let mut p = payload();
    p.gyneco_consultation = true;
    p.gyneco_date = None;
    p.fcu = true;
    p.fcu_location = None;
    assert_eq!(p.missing_fields(), vec![Field::GynecoDate, Field::FcuLocation]);

    p.gyneco_date = NaiveDate::from_ymd_opt(2024, 9, 30);
    p.fcu_location = Some(FcuLocation::Ailleurs);
    assert!(p.validate().is_ok());
  }

  #[test]
  fn wire_format_uses_camel_case_and_french_answers() {
    let json = serde_json::to_value(payload().normalized()).unwrap();
    assert_eq!(json["lastName"], "Dupont");
    assert_eq!(json["mammography"], "non");
    assert!(json["fcuLocation"].is_null());

    let back: NewScreening = serde_json::from_value(serde_json::json!({
      "date": "2024-10-01",
      "lastName": "Martin",
      "firstName": "Sophie",
      "age": 38,
      "phone": "0987654321",
      "address": "Lyon",
      "fcu": true,
      "fcuLocation": "Ailleurs"
    }))
    .unwrap();
    assert_eq!(back.fcu_location, Some(FcuLocation::Ailleurs));
    assert_eq!(back.mammography, None);
    assert!(!back.vaccination);
  }
}
