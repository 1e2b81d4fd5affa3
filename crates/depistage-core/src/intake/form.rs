//! Raw form values and the per-step validity predicates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{Answer, FcuLocation, Field, NewScreening};

/// A single field update coming from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldEdit {
  Date(Option<NaiveDate>),
  LastName(String),
  FirstName(String),
  Age(Option<u32>),
  Phone(String),
  Address(String),
  Vaccination(Answer),
  GynecoConsultation(Answer),
  GynecoDate(Option<NaiveDate>),
  Mammography(Answer),
  MammographyDate(Option<NaiveDate>),
  HasAdditionalExams(Answer),
  Fcu(Answer),
  FcuLocation(FcuLocation),
  Hpv(bool),
  MammaryUltrasound(bool),
  ThermoAblation(bool),
  Anapath(bool),
}

impl FieldEdit {
  pub fn field(&self) -> Field {
    match self {
      FieldEdit::Date(_) => Field::Date,
      FieldEdit::LastName(_) => Field::LastName,
      FieldEdit::FirstName(_) => Field::FirstName,
      FieldEdit::Age(_) => Field::Age,
      FieldEdit::Phone(_) => Field::Phone,
      FieldEdit::Address(_) => Field::Address,
      FieldEdit::Vaccination(_) => Field::Vaccination,
      FieldEdit::GynecoConsultation(_) => Field::GynecoConsultation,
      FieldEdit::GynecoDate(_) => Field::GynecoDate,
      FieldEdit::Mammography(_) => Field::Mammography,
      FieldEdit::MammographyDate(_) => Field::MammographyDate,
      FieldEdit::HasAdditionalExams(_) => Field::HasAdditionalExams,
      FieldEdit::Fcu(_) => Field::Fcu,
      FieldEdit::FcuLocation(_) => Field::FcuLocation,
      FieldEdit::Hpv(_) => Field::Hpv,
      FieldEdit::MammaryUltrasound(_) => Field::MammaryUltrasound,
      FieldEdit::ThermoAblation(_) => Field::ThermoAblation,
      FieldEdit::Anapath(_) => Field::Anapath,
    }
  }
}

/// Everything typed into the wizard so far. Unanswered questions are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
  pub date:                 Option<NaiveDate>,
  pub last_name:            String,
  pub first_name:           String,
  pub age:                  Option<u32>,
  pub phone:                String,
  pub address:              String,
  pub vaccination:          Option<Answer>,
  pub gyneco_consultation:  Option<Answer>,
  pub gyneco_date:          Option<NaiveDate>,
  pub mammography:          Option<Answer>,
  pub mammography_date:     Option<NaiveDate>,
  pub has_additional_exams: Option<Answer>,
  pub fcu:                  Option<Answer>,
  pub fcu_location:         Option<FcuLocation>,
  pub hpv:                  bool,
  pub mammary_ultrasound:   bool,
  pub thermo_ablation:      bool,
  pub anapath:              bool,
}

impl IntakeForm {
  /// A blank form; every date field defaults to `today`.
  pub fn new(today: NaiveDate) -> Self {
    Self {
      date:                 Some(today),
      last_name:            String::new(),
      first_name:           String::new(),
      age:                  None,
      phone:                String::new(),
      address:              String::new(),
      vaccination:          None,
      gyneco_consultation:  None,
      gyneco_date:          Some(today),
      mammography:          None,
      mammography_date:     Some(today),
      has_additional_exams: None,
      fcu:                  None,
      fcu_location:         None,
      hpv:                  false,
      mammary_ultrasound:   false,
      thermo_ablation:      false,
      anapath:              false,
    }
  }

  pub fn apply(&mut self, edit: FieldEdit) {
    match edit {
      FieldEdit::Date(v) => self.date = v,
      FieldEdit::LastName(v) => self.last_name = v,
      FieldEdit::FirstName(v) => self.first_name = v,
      FieldEdit::Age(v) => self.age = v,
      FieldEdit::Phone(v) => self.phone = v,
      FieldEdit::Address(v) => self.address = v,
      FieldEdit::Vaccination(v) => self.vaccination = Some(v),
      FieldEdit::GynecoConsultation(v) => self.gyneco_consultation = Some(v),
      FieldEdit::GynecoDate(v) => self.gyneco_date = v,
      FieldEdit::Mammography(v) => self.mammography = Some(v),
      FieldEdit::MammographyDate(v) => self.mammography_date = v,
      FieldEdit::HasAdditionalExams(v) => self.has_additional_exams = Some(v),
      FieldEdit::Fcu(v) => self.fcu = Some(v),
      FieldEdit::FcuLocation(v) => self.fcu_location = Some(v),
      FieldEdit::Hpv(v) => self.hpv = v,
      FieldEdit::MammaryUltrasound(v) => self.mammary_ultrasound = v,
      FieldEdit::ThermoAblation(v) => self.thermo_ablation = v,
      FieldEdit::Anapath(v) => self.anapath = v,
    }
  }

  /// Step 1 fields that are still empty.
  pub fn missing_personal(&self) -> Vec<Field> {
    let mut missing = Vec::new();
    if self.date.is_none() {
      missing.push(Field::Date);
    }
    if self.last_name.trim().is_empty() {
      missing.push(Field::LastName);
    }
    if self.first_name.trim().is_empty() {
      missing.push(Field::FirstName);
    }
    if !self.age.is_some_and(|a| a > 0) {
      missing.push(Field::Age);
    }
    if self.phone.trim().is_empty() {
      missing.push(Field::Phone);
    }
    if self.address.trim().is_empty() {
      missing.push(Field::Address);
    }
    missing
  }

  /// Step 2 fields that are still unanswered.
  pub fn missing_medical(&self) -> Vec<Field> {
    let mut missing = Vec::new();
    if self.vaccination.is_none() {
      missing.push(Field::Vaccination);
    }
    match self.gyneco_consultation {
      None => missing.push(Field::GynecoConsultation),
      Some(Answer::Oui) if self.gyneco_date.is_none() => missing.push(Field::GynecoDate),
      Some(_) => {}
    }
    match self.mammography {
      None => missing.push(Field::Mammography),
      Some(Answer::Oui) if self.mammography_date.is_none() => {
        missing.push(Field::MammographyDate)
      }
      Some(_) => {}
    }
    missing
  }

  /// Step 3 values required by an affirmative answer.
  pub fn missing_exams(&self) -> Vec<Field> {
    let yes = |a: Option<Answer>| a.is_some_and(Answer::is_yes);
    if yes(self.has_additional_exams) && yes(self.fcu) && self.fcu_location.is_none() {
      vec![Field::FcuLocation]
    } else {
      Vec::new()
    }
  }

  /// V1.
  pub fn personal_complete(&self) -> bool { self.missing_personal().is_empty() }

  /// V2.
  pub fn medical_complete(&self) -> bool { self.missing_medical().is_empty() }

  /// Build the insert payload from the current values.
  ///
  /// Returns `None` while V1 does not hold. Conditional values are only
  /// carried over when their governing answer is "oui", and the step-3 exam
  /// checkboxes only when additional exams were declared.
  pub fn to_new_screening(&self) -> Option<NewScreening> {
    let date = self.date?;
    let age = self.age.filter(|a| *a > 0)?;
    if !self.personal_complete() {
      return None;
    }

    let yes = |a: Option<Answer>| a.is_some_and(Answer::is_yes);
    let exams = yes(self.has_additional_exams);
    let fcu = exams && yes(self.fcu);

    Some(
      NewScreening {
        date,
        last_name: self.last_name.clone(),
        first_name: self.first_name.clone(),
        age,
        phone: self.phone.clone(),
        address: self.address.clone(),
        vaccination: yes(self.vaccination),
        mammography: self.mammography,
        mammography_date: self.mammography_date,
        gyneco_consultation: yes(self.gyneco_consultation),
        gyneco_date: self.gyneco_date,
        has_additional_exams: self.has_additional_exams,
        fcu,
        fcu_location: self.fcu_location,
        hpv: exams && self.hpv,
        mammary_ultrasound: exams && self.mammary_ultrasound,
        thermo_ablation: exams && self.thermo_ablation,
        anapath: exams && self.anapath,
      }
      .normalized(),
    )
  }
}
