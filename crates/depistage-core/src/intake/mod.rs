//! The three-step intake wizard as a pure state machine.
//!
//! [`transition`] takes the current [`IntakeState`], one [`IntakeEvent`] and
//! today's date, and returns the next state together with the [`Effect`]s the
//! caller must carry out. The state machine never talks to a store itself: a
//! submission is requested through [`Effect::SubmitRecord`] and its outcome
//! comes back as [`IntakeEvent::SubmissionSucceeded`] or
//! [`IntakeEvent::SubmissionFailed`].
//!
//! Two field edits submit the record early:
//!
//! - answering "oui" to vaccination, once step 1 is complete;
//! - answering "non" to additional exams, once steps 1 and 2 are complete.

mod form;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use self::form::{FieldEdit, IntakeForm};
use crate::{
  ErrorKind,
  record::{Answer, Field, NewScreening},
};

// ─── Steps ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
  Personal,
  Medical,
  AdditionalExams,
}

impl Step {
  pub const ALL: [Step; 3] = [Step::Personal, Step::Medical, Step::AdditionalExams];

  /// 1-based position in the wizard.
  pub fn number(self) -> u8 {
    match self {
      Step::Personal => 1,
      Step::Medical => 2,
      Step::AdditionalExams => 3,
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Step::Personal => "Informations personnelles",
      Step::Medical => "Informations médicales",
      Step::AdditionalExams => "Examens complémentaires",
    }
  }

  pub fn next(self) -> Option<Step> {
    match self {
      Step::Personal => Some(Step::Medical),
      Step::Medical => Some(Step::AdditionalExams),
      Step::AdditionalExams => None,
    }
  }

  pub fn previous(self) -> Option<Step> {
    match self {
      Step::Personal => None,
      Step::Medical => Some(Step::Personal),
      Step::AdditionalExams => Some(Step::Medical),
    }
  }
}

// ─── Events & effects ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeEvent {
  Edit(FieldEdit),
  Next,
  Previous,
  Save,
  SubmissionSucceeded { screening_number: String },
  SubmissionFailed { kind: ErrorKind, message: String },
  Reset,
}

/// What caused a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
  Vaccination,
  NoAdditionalExams,
  Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
  /// Persist `payload`; report the outcome back as a submission event.
  SubmitRecord { payload: NewScreening, trigger: Trigger },
  /// An auto-submit trigger fired before the form was complete enough.
  MissingInformation { trigger: Trigger, missing: Vec<Field> },
  /// `Next` or `Save` was refused. `missing` is empty when every step is
  /// valid but the wizard is not on its last step.
  ValidationFailed { step: Step, missing: Vec<Field> },
  /// A submission was requested while another one is still pending.
  SubmissionInFlight,
  Submitted { screening_number: String },
  SubmissionError { kind: ErrorKind, message: String },
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeState {
  pub step:       Step,
  pub completed:  BTreeSet<Step>,
  pub form:       IntakeForm,
  pub submitting: bool,
}

impl IntakeState {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      step:       Step::Personal,
      completed:  BTreeSet::new(),
      form:       IntakeForm::new(today),
      submitting: false,
    }
  }

  pub fn is_completed(&self, step: Step) -> bool { self.completed.contains(&step) }

  /// Fields still missing for `step` to be valid.
  pub fn missing_for(&self, step: Step) -> Vec<Field> {
    match step {
      Step::Personal => self.form.missing_personal(),
      Step::Medical => self.form.missing_medical(),
      Step::AdditionalExams => self.form.missing_exams(),
    }
  }

  /// Apply one event in place and return the resulting effects.
  pub fn handle(&mut self, event: IntakeEvent, today: NaiveDate) -> Vec<Effect> {
    match event {
      IntakeEvent::Edit(edit) => self.edit(edit),
      IntakeEvent::Next => self.next(),
      IntakeEvent::Previous => {
        if let Some(prev) = self.step.previous() {
          self.step = prev;
        }
        Vec::new()
      }
      IntakeEvent::Save => self.save(),
      IntakeEvent::SubmissionSucceeded { screening_number } => {
        if !self.submitting {
          tracing::debug!(%screening_number, "ignoring stale submission result");
          return Vec::new();
        }
        self.reset(today);
        vec![Effect::Submitted { screening_number }]
      }
      IntakeEvent::SubmissionFailed { kind, message } => {
        if !self.submitting {
          return Vec::new();
        }
        self.submitting = false;
        vec![Effect::SubmissionError { kind, message }]
      }
      IntakeEvent::Reset => {
        let submitting = self.submitting;
        self.reset(today);
        self.submitting = submitting;
        Vec::new()
      }
    }
  }

  fn reset(&mut self, today: NaiveDate) { *self = Self::new(today); }

  fn edit(&mut self, edit: FieldEdit) -> Vec<Effect> {
    let trigger = match edit {
      FieldEdit::Vaccination(Answer::Oui) => Some(Trigger::Vaccination),
      FieldEdit::HasAdditionalExams(Answer::Non) => Some(Trigger::NoAdditionalExams),
      _ => None,
    };
    self.form.apply(edit);

    let Some(trigger) = trigger else {
      return Vec::new();
    };

    let (missing, completes) = match trigger {
      Trigger::Vaccination => (self.form.missing_personal(), Step::Medical),
      _ => {
        let mut missing = self.form.missing_personal();
        missing.extend(self.form.missing_medical());
        (missing, Step::AdditionalExams)
      }
    };
    if !missing.is_empty() {
      return vec![Effect::MissingInformation { trigger, missing }];
    }

    let effects = self.submit(trigger);
    if matches!(effects.first(), Some(Effect::SubmitRecord { .. })) {
      self.completed.insert(completes);
    }
    effects
  }

  fn next(&mut self) -> Vec<Effect> {
    let Some(next) = self.step.next() else {
      return Vec::new();
    };
    let missing = self.missing_for(self.step);
    if !missing.is_empty() {
      return vec![Effect::ValidationFailed { step: self.step, missing }];
    }
    self.completed.insert(self.step);
    self.step = next;
    Vec::new()
  }

  fn save(&mut self) -> Vec<Effect> {
    for step in [Step::Personal, Step::Medical] {
      let missing = self.missing_for(step);
      if !missing.is_empty() {
        return vec![Effect::ValidationFailed { step, missing }];
      }
    }
    if self.step != Step::AdditionalExams {
      return vec![Effect::ValidationFailed { step: self.step, missing: Vec::new() }];
    }
    let missing = self.form.missing_exams();
    if !missing.is_empty() {
      return vec![Effect::MissingInformation { trigger: Trigger::Save, missing }];
    }
    self.submit(Trigger::Save)
  }

  /// Request a submission unless one is already pending.
  fn submit(&mut self, trigger: Trigger) -> Vec<Effect> {
    if self.submitting {
      return vec![Effect::SubmissionInFlight];
    }
    match self.form.to_new_screening() {
      // The store would reject it; report what is missing instead.
      Some(payload) if !payload.missing_fields().is_empty() => {
        vec![Effect::MissingInformation { trigger, missing: payload.missing_fields() }]
      }
      Some(payload) => {
        self.submitting = true;
        vec![Effect::SubmitRecord { payload, trigger }]
      }
      None => vec![Effect::MissingInformation {
        trigger,
        missing: self.form.missing_personal(),
      }],
    }
  }
}

/// Advance `state` by one event.
pub fn transition(
  state: IntakeState,
  event: IntakeEvent,
  today: NaiveDate,
) -> (IntakeState, Vec<Effect>) {
  let mut state = state;
  let effects = state.handle(event, today);
  (state, effects)
}
