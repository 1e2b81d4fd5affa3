//! Dashboard figures computed from the full record list.

use serde::{Deserialize, Serialize};

use crate::record::{Answer, ScreeningRecord};

/// How many records declare each additional exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamsBreakdown {
  pub fcu:                usize,
  pub hpv:                usize,
  pub mammary_ultrasound: usize,
  pub thermo_ablation:    usize,
  pub anapath:            usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
  pub total:                     usize,
  pub vaccinated:                usize,
  /// Records whose mammography answer is not "non". Unanswered counts as
  /// done.
  pub mammography_done:          usize,
  pub gyneco_consultation_count: usize,
  /// Mean age, 0 for an empty set.
  pub average_age:               f64,
  pub exams_breakdown:           ExamsBreakdown,
}

impl Statistics {
  pub fn from_records(records: &[ScreeningRecord]) -> Self {
    let mut stats = Statistics { total: records.len(), ..Default::default() };
    let mut age_sum: u64 = 0;

    for r in records {
      age_sum += u64::from(r.age);
      stats.vaccinated += usize::from(r.vaccination);
      stats.mammography_done += usize::from(r.mammography != Some(Answer::Non));
      stats.gyneco_consultation_count += usize::from(r.gyneco_consultation);

      let exams = &mut stats.exams_breakdown;
      exams.fcu += usize::from(r.fcu);
      exams.hpv += usize::from(r.hpv);
      exams.mammary_ultrasound += usize::from(r.mammary_ultrasound);
      exams.thermo_ablation += usize::from(r.thermo_ablation);
      exams.anapath += usize::from(r.anapath);
    }

    if stats.total > 0 {
      stats.average_age = age_sum as f64 / stats.total as f64;
    }
    stats
  }

  /// Share of vaccinated records, rounded for display.
  pub fn vaccination_rate(&self) -> u32 { percentage(self.vaccinated, self.total) }

  pub fn mammography_rate(&self) -> u32 { percentage(self.mammography_done, self.total) }

  pub fn gyneco_rate(&self) -> u32 { percentage(self.gyneco_consultation_count, self.total) }
}

/// `count / total` as a whole percentage; 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  (count as f64 / total as f64 * 100.0).round() as u32
}
