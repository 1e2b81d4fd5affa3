//! Shared fixtures for unit tests.

use chrono::NaiveDate;

use crate::record::{Answer, NewScreening};

/// A complete, valid payload for a patient named `last_name`.
pub fn payload(last_name: &str) -> NewScreening {
  NewScreening {
    date:                 NaiveDate::from_ymd_opt(2024, 10, 15).unwrap(),
    last_name:            last_name.into(),
    first_name:           "Awa".into(),
    age:                  52,
    phone:                "0700000000".into(),
    address:              "Abidjan".into(),
    vaccination:          true,
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
