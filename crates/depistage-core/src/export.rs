//! Spreadsheet export of the record list.
//!
//! The output is CSV as spreadsheet software in a French locale expects it:
//! `;` separated, UTF-8 with a byte-order mark, French headers, dates as
//! `dd/mm/YYYY` and booleans as Oui/Non.

use chrono::{Local, NaiveDate};

use crate::record::{Answer, Field, ScreeningRecord};

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const BOM: &str = "\u{feff}";
const SEPARATOR: &str = ";";
const DATE_FORMAT: &str = "%d/%m/%Y";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Column headers, in output order.
pub fn headers() -> Vec<&'static str> {
  let mut headers = vec!["N° Dépistage"];
  headers.extend(
    [
      Field::Date,
      Field::LastName,
      Field::FirstName,
      Field::Age,
      Field::Phone,
      Field::Address,
      Field::Vaccination,
      Field::Mammography,
      Field::MammographyDate,
      Field::GynecoConsultation,
      Field::GynecoDate,
      Field::HasAdditionalExams,
      Field::Fcu,
      Field::FcuLocation,
      Field::Hpv,
      Field::MammaryUltrasound,
      Field::ThermoAblation,
      Field::Anapath,
    ]
    .map(Field::label),
  );
  headers.push("Enregistré le");
  headers
}

/// Suggested file name for an export made on `today`.
pub fn file_name(today: NaiveDate) -> String {
  format!("depistages-{}.csv", today.format("%Y-%m-%d"))
}

/// Render every record, in the given order, as one CSV document.
pub fn to_csv(records: &[ScreeningRecord]) -> String {
  let mut out = String::from(BOM);
  push_row(&mut out, headers().into_iter().map(String::from));
  for r in records {
    push_row(&mut out, row(r).into_iter());
  }
  out
}

fn row(r: &ScreeningRecord) -> Vec<String> {
  let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
  let answer = |a: Option<Answer>| a.map(|a| yes_no(a.is_yes()).to_owned()).unwrap_or_default();

  vec![
    r.screening_number.clone(),
    date(Some(r.date)),
    r.last_name.clone(),
    r.first_name.clone(),
    r.age.to_string(),
    r.phone.clone(),
    r.address.clone(),
    yes_no(r.vaccination).into(),
    answer(r.mammography),
    date(r.mammography_date),
    yes_no(r.gyneco_consultation).into(),
    date(r.gyneco_date),
    answer(r.has_additional_exams),
    yes_no(r.fcu).into(),
    r.fcu_location.map(|l| l.as_str().to_owned()).unwrap_or_default(),
    yes_no(r.hpv).into(),
    yes_no(r.mammary_ultrasound).into(),
    yes_no(r.thermo_ablation).into(),
    yes_no(r.anapath).into(),
    r.created_at
      .with_timezone(&Local)
      .format(TIMESTAMP_FORMAT)
      .to_string(),
  ]
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
  let cells: Vec<String> = cells.map(|c| csv_escape(&c)).collect();
  out.push_str(&cells.join(SEPARATOR));
  out.push_str("\r\n");
}

fn yes_no(b: bool) -> &'static str { if b { "Oui" } else { "Non" } }

fn csv_escape(s: &str) -> String {
  let needs_quoting = s.contains(SEPARATOR) || s.contains('"') || s.contains('\n') || s.contains('\r');
  let has_formula_prefix = matches!(s.as_bytes().first(), Some(b'=' | b'+' | b'-' | b'@' | b'\t'));

  if has_formula_prefix {
    // Keep spreadsheets from evaluating the cell.
    format!("\"'{}\"", s.replace('"', "\"\""))
  } else if needs_quoting {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_string()
  }
}
