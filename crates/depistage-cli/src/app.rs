//! Application state machine and event dispatcher.

use std::{path::PathBuf, sync::Arc};

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use depistage_core::{
  ErrorKind,
  browse::{self, PAGE_SIZE, Sort},
  export,
  intake::{Effect, FieldEdit, IntakeEvent, IntakeForm, IntakeState, Step},
  record::{Answer, FcuLocation, Field, ScreeningRecord},
  stats::Statistics,
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::client::{ApiClient, ClientResult, Created};

const DATE_INPUT: &str = "%d/%m/%Y";

// ─── Screen ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Paginated record table.
  Records,
  /// One record, full width.
  Detail,
  Dashboard,
  /// The three-step intake wizard.
  Intake,
}

// ─── Background results ──────────────────────────────────────────────────────

/// Outcome of a spawned task, delivered back to the event loop.
#[derive(Debug)]
pub enum Message {
  Loaded(ClientResult<Vec<ScreeningRecord>>),
  Deleted { id: Uuid, result: ClientResult<()> },
  Submitted(ClientResult<Created>),
  Exported(Result<PathBuf, String>),
}

// ─── Form fields ─────────────────────────────────────────────────────────────

/// How a form field is edited from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Number,
  Date,
  Answer,
  Location,
  Check,
}

pub fn field_kind(field: Field) -> FieldKind {
  match field {
    Field::LastName | Field::FirstName | Field::Phone | Field::Address => FieldKind::Text,
    Field::Age => FieldKind::Number,
    Field::Date | Field::GynecoDate | Field::MammographyDate => FieldKind::Date,
    Field::Vaccination
    | Field::GynecoConsultation
    | Field::Mammography
    | Field::HasAdditionalExams
    | Field::Fcu => FieldKind::Answer,
    Field::FcuLocation => FieldKind::Location,
    Field::Hpv | Field::MammaryUltrasound | Field::ThermoAblation | Field::Anapath => {
      FieldKind::Check
    }
  }
}

/// Fields shown on `step`, given the answers so far.
pub fn visible_fields(step: Step, form: &IntakeForm) -> Vec<Field> {
  let yes = |a: Option<Answer>| a == Some(Answer::Oui);
  match step {
    Step::Personal => vec![
      Field::Date,
      Field::LastName,
      Field::FirstName,
      Field::Age,
      Field::Phone,
      Field::Address,
    ],
    Step::Medical => {
      let mut fields = vec![Field::Vaccination, Field::GynecoConsultation];
      if yes(form.gyneco_consultation) {
        fields.push(Field::GynecoDate);
      }
      fields.push(Field::Mammography);
      if yes(form.mammography) {
        fields.push(Field::MammographyDate);
      }
      fields
    }
    Step::AdditionalExams => {
      let mut fields = vec![Field::HasAdditionalExams];
      if yes(form.has_additional_exams) {
        fields.push(Field::Fcu);
        if yes(form.fcu) {
          fields.push(Field::FcuLocation);
        }
        fields.extend([
          Field::Hpv,
          Field::MammaryUltrasound,
          Field::ThermoAblation,
          Field::Anapath,
        ]);
      }
      fields
    }
  }
}

/// Current value of `field` as shown in the form.
pub fn display_value(form: &IntakeForm, field: Field) -> String {
  let date = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_INPUT).to_string()).unwrap_or_default();
  let answer = |a: Option<Answer>| a.map(|a| a.to_string()).unwrap_or_default();
  let check = |b: bool| if b { "[x]" } else { "[ ]" }.to_string();

  match field {
    Field::Date => date(form.date),
    Field::LastName => form.last_name.clone(),
    Field::FirstName => form.first_name.clone(),
    Field::Age => form.age.map(|a| a.to_string()).unwrap_or_default(),
    Field::Phone => form.phone.clone(),
    Field::Address => form.address.clone(),
    Field::Vaccination => answer(form.vaccination),
    Field::GynecoConsultation => answer(form.gyneco_consultation),
    Field::GynecoDate => date(form.gyneco_date),
    Field::Mammography => answer(form.mammography),
    Field::MammographyDate => date(form.mammography_date),
    Field::HasAdditionalExams => answer(form.has_additional_exams),
    Field::Fcu => answer(form.fcu),
    Field::FcuLocation => form.fcu_location.map(|l| l.to_string()).unwrap_or_default(),
    Field::Hpv => check(form.hpv),
    Field::MammaryUltrasound => check(form.mammary_ultrasound),
    Field::ThermoAblation => check(form.thermo_ablation),
    Field::Anapath => check(form.anapath),
  }
}

/// The edit produced by typing `input` into a text-like field.
fn typed_edit(field: Field, input: &str) -> Option<FieldEdit> {
  let date = || NaiveDate::parse_from_str(input.trim(), DATE_INPUT).ok();
  Some(match field {
    Field::Date => FieldEdit::Date(date()),
    Field::GynecoDate => FieldEdit::GynecoDate(date()),
    Field::MammographyDate => FieldEdit::MammographyDate(date()),
    Field::LastName => FieldEdit::LastName(input.to_owned()),
    Field::FirstName => FieldEdit::FirstName(input.to_owned()),
    Field::Phone => FieldEdit::Phone(input.to_owned()),
    Field::Address => FieldEdit::Address(input.to_owned()),
    Field::Age => FieldEdit::Age(input.parse().ok()),
    _ => return None,
  })
}

fn answer_edit(field: Field, a: Answer) -> Option<FieldEdit> {
  Some(match field {
    Field::Vaccination => FieldEdit::Vaccination(a),
    Field::GynecoConsultation => FieldEdit::GynecoConsultation(a),
    Field::Mammography => FieldEdit::Mammography(a),
    Field::HasAdditionalExams => FieldEdit::HasAdditionalExams(a),
    Field::Fcu => FieldEdit::Fcu(a),
    _ => return None,
  })
}

fn current_answer(form: &IntakeForm, field: Field) -> Option<Answer> {
  match field {
    Field::Vaccination => form.vaccination,
    Field::GynecoConsultation => form.gyneco_consultation,
    Field::Mammography => form.mammography,
    Field::HasAdditionalExams => form.has_additional_exams,
    Field::Fcu => form.fcu,
    _ => None,
  }
}

fn toggled_check(form: &IntakeForm, field: Field) -> Option<FieldEdit> {
  Some(match field {
    Field::Hpv => FieldEdit::Hpv(!form.hpv),
    Field::MammaryUltrasound => FieldEdit::MammaryUltrasound(!form.mammary_ultrasound),
    Field::ThermoAblation => FieldEdit::ThermoAblation(!form.thermo_ablation),
    Field::Anapath => FieldEdit::Anapath(!form.anapath),
    _ => return None,
  })
}

// ─── App ─────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// Every record from the last successful fetch, newest first.
  pub records: Vec<ScreeningRecord>,

  /// Whether at least one fetch has completed.
  pub loaded: bool,

  /// Last fetch error, cleared by the next successful fetch.
  pub connection_error: Option<String>,

  pub sort: Sort,

  /// Current page, 1-based.
  pub page: usize,

  /// Cursor position within the current page.
  pub cursor: usize,

  /// Current fuzzy-filter string.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  /// Record shown on the detail screen.
  pub detail_id: Option<Uuid>,

  pub detail_scroll: u16,

  /// Record awaiting delete confirmation.
  pub confirm_delete: Option<Uuid>,

  pub intake: IntakeState,

  /// Index of the focused field in [`visible_fields`].
  pub intake_focus: usize,

  /// Text being typed into the focused text-like field.
  pub input: String,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,

  tx: mpsc::UnboundedSender<Message>,
}

impl App {
  pub fn new(client: ApiClient, tx: mpsc::UnboundedSender<Message>) -> Self {
    let intake = IntakeState::new(today());
    let mut app = Self {
      screen: Screen::Records,
      records: Vec::new(),
      loaded: false,
      connection_error: None,
      sort: Sort::default(),
      page: 1,
      cursor: 0,
      filter: String::new(),
      filter_active: false,
      detail_id: None,
      detail_scroll: 0,
      confirm_delete: None,
      intake,
      intake_focus: 0,
      input: String::new(),
      status_msg: String::new(),
      client: Arc::new(client),
      tx,
    };
    app.load_input();
    app
  }

  // ── Background work ───────────────────────────────────────────────────────

  /// Fire-and-forget fetch of the full list; the newest response wins.
  pub fn refresh(&self) {
    let client = self.client.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = client.list_screenings().await;
      let _ = tx.send(Message::Loaded(result));
    });
  }

  fn spawn_delete(&mut self, id: Uuid) {
    self.status_msg = "Suppression…".into();
    let client = self.client.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = client.delete_screening(id).await;
      let _ = tx.send(Message::Deleted { id, result });
    });
  }

  fn spawn_submit(&mut self, payload: depistage_core::record::NewScreening) {
    self.status_msg = "Enregistrement…".into();
    let client = self.client.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = client.create_screening(&payload).await;
      let _ = tx.send(Message::Submitted(result));
    });
  }

  /// Write the full list, in the current order, to a CSV file in the working
  /// directory.
  fn spawn_export(&mut self) {
    let mut records = self.records.clone();
    self.sort.apply(&mut records);
    let path = PathBuf::from(export::file_name(today()));
    self.status_msg = format!("Export de {} dossier(s)…", records.len());

    let tx = self.tx.clone();
    tokio::spawn(async move {
      let csv = export::to_csv(&records);
      let result = tokio::fs::write(&path, csv)
        .await
        .map(|()| path)
        .map_err(|e| e.to_string());
      let _ = tx.send(Message::Exported(result));
    });
  }

  /// Apply a result delivered by a spawned task.
  pub fn handle_message(&mut self, msg: Message) {
    match msg {
      Message::Loaded(Ok(records)) => {
        self.records = records;
        self.loaded = true;
        self.connection_error = None;
        self.clamp_cursor();
        if self.screen == Screen::Detail && self.detail_record().is_none() {
          self.close_detail();
        }
      }
      Message::Loaded(Err(e)) => {
        tracing::warn!(error = %e, "refresh failed");
        self.connection_error = Some(e.message);
      }
      Message::Deleted { id, result } => match result {
        Ok(()) => {
          self.remove_local(id);
          self.status_msg = "Dossier supprimé.".into();
        }
        Err(e) if e.kind == ErrorKind::NotFound => {
          self.remove_local(id);
          self.status_msg = "Ce dossier n'existe plus.".into();
        }
        Err(e) => {
          tracing::error!(%id, error = %e, "delete failed");
          self.status_msg = format!("Échec de la suppression : {e}");
        }
      },
      Message::Submitted(Ok(created)) => {
        let number = created.screening_number.clone();
        if !self.records.iter().any(|r| r.id == created.screening.id) {
          self.records.insert(0, created.screening);
        }
        self.dispatch(IntakeEvent::SubmissionSucceeded { screening_number: number });
      }
      Message::Submitted(Err(e)) => {
        tracing::error!(error = %e, "submission failed");
        self.dispatch(IntakeEvent::SubmissionFailed { kind: e.kind, message: e.message });
      }
      Message::Exported(Ok(path)) => {
        self.status_msg = format!("Exporté vers {}", path.display());
      }
      Message::Exported(Err(e)) => {
        self.status_msg = format!("Échec de l'export : {e}");
      }
    }
  }

  fn remove_local(&mut self, id: Uuid) {
    self.records.retain(|r| r.id != id);
    if self.detail_id == Some(id) {
      self.close_detail();
    }
    self.clamp_cursor();
  }

  // ── Record list ───────────────────────────────────────────────────────────

  /// Records matching the filter, in the current sort order.
  pub fn filtered_records(&self) -> Vec<&ScreeningRecord> {
    let mut list: Vec<&ScreeningRecord> = if self.filter.is_empty() {
      self.records.iter().collect()
    } else {
      let matcher = SkimMatcherV2::default();
      self
        .records
        .iter()
        .filter(|r| {
          matcher.fuzzy_match(&r.display_name(), &self.filter).is_some()
            || matcher.fuzzy_match(&r.screening_number, &self.filter).is_some()
        })
        .collect()
    };
    list.sort_by(|a, b| self.sort.compare(a, b));
    list
  }

  pub fn page_count(&self) -> usize { browse::page_count(self.filtered_records().len(), PAGE_SIZE) }

  pub fn page_records(&self) -> Vec<&ScreeningRecord> {
    let all = self.filtered_records();
    browse::page(&all, self.page, PAGE_SIZE).to_vec()
  }

  pub fn cursor_record(&self) -> Option<&ScreeningRecord> {
    self.page_records().get(self.cursor).copied()
  }

  pub fn detail_record(&self) -> Option<&ScreeningRecord> {
    let id = self.detail_id?;
    self.records.iter().find(|r| r.id == id)
  }

  pub fn statistics(&self) -> Statistics { Statistics::from_records(&self.records) }

  fn clamp_cursor(&mut self) {
    self.page = self.page.clamp(1, self.page_count());
    let len = self.page_records().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  fn close_detail(&mut self) {
    self.detail_id = None;
    self.detail_scroll = 0;
    if self.screen == Screen::Detail {
      self.screen = Screen::Records;
    }
  }

  // ── Intake ────────────────────────────────────────────────────────────────

  pub fn intake_fields(&self) -> Vec<Field> { visible_fields(self.intake.step, &self.intake.form) }

  pub fn focused_field(&self) -> Option<Field> { self.intake_fields().get(self.intake_focus).copied() }

  /// Reload the typing buffer from the form for the focused field.
  fn load_input(&mut self) {
    self.input = match self.focused_field() {
      Some(f) if matches!(field_kind(f), FieldKind::Text | FieldKind::Number | FieldKind::Date) => {
        display_value(&self.intake.form, f)
      }
      _ => String::new(),
    };
  }

  fn focus(&mut self, index: usize) {
    let len = self.intake_fields().len();
    self.intake_focus = index.min(len.saturating_sub(1));
    self.load_input();
  }

  /// Feed one event to the wizard and carry out its effects.
  fn dispatch(&mut self, event: IntakeEvent) {
    let step_before = self.intake.step;
    let effects = self.intake.handle(event, today());
    for effect in effects {
      self.apply_effect(effect);
    }
    if self.intake.step != step_before {
      self.focus(0);
    } else {
      // Conditional fields may have appeared or disappeared.
      let len = self.intake_fields().len();
      self.intake_focus = self.intake_focus.min(len.saturating_sub(1));
    }
  }

  fn apply_effect(&mut self, effect: Effect) {
    match effect {
      Effect::SubmitRecord { payload, .. } => self.spawn_submit(payload),
      Effect::MissingInformation { missing, .. } => {
        self.status_msg = format!(
          "Informations manquantes : {}",
          Field::join_labels(&missing)
        );
      }
      Effect::ValidationFailed { step, missing } if missing.is_empty() => {
        self.status_msg = format!(
          "Étape {} : passez à l'étape 3 pour enregistrer.",
          step.number()
        );
      }
      Effect::ValidationFailed { step, missing } => {
        self.status_msg = format!(
          "Étape {} incomplète : {}",
          step.number(),
          Field::join_labels(&missing)
        );
      }
      Effect::SubmissionInFlight => {
        self.status_msg = "Un enregistrement est déjà en cours.".into();
      }
      Effect::Submitted { screening_number } => {
        tracing::info!(%screening_number, "screening recorded");
        self.status_msg = format!("Dépistage n° {screening_number} enregistré.");
        self.focus(0);
      }
      Effect::SubmissionError { kind, message } => {
        self.status_msg = if kind.is_retryable() {
          format!("Échec de l'enregistrement : {message}. Réessayez.")
        } else {
          format!("Échec de l'enregistrement : {message}")
        };
      }
    }
  }

  fn edit(&mut self, edit: Option<FieldEdit>) {
    if let Some(edit) = edit {
      self.dispatch(IntakeEvent::Edit(edit));
    }
  }

  fn open_intake(&mut self) {
    self.screen = Screen::Intake;
    self.focus(self.intake_focus);
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.confirm_delete.is_some() {
      self.handle_confirm_key(key);
      return true;
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match self.screen {
      Screen::Records => self.handle_list_key(key),
      Screen::Detail => self.handle_detail_key(key),
      Screen::Dashboard => self.handle_dashboard_key(key),
      Screen::Intake => {
        self.handle_intake_key(key);
        true
      }
    }
  }

  fn handle_confirm_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('y' | 'o') | KeyCode::Enter => {
        if let Some(id) = self.confirm_delete.take() {
          self.spawn_delete(id);
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.confirm_delete = None;
        self.status_msg = "Suppression annulée.".into();
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => {
        self.filter_active = false;
      }
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
      }
      _ => return,
    }
    self.page = 1;
    self.cursor = 0;
  }

  fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.page_records().len();
        if len > 0 && self.cursor + 1 < len {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }
      KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => {
        if self.page < self.page_count() {
          self.page += 1;
          self.cursor = 0;
        }
      }
      KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
        if self.page > 1 {
          self.page -= 1;
          self.cursor = 0;
        }
      }

      // Open detail
      KeyCode::Enter => {
        if let Some(id) = self.cursor_record().map(|r| r.id) {
          self.detail_id = Some(id);
          self.detail_scroll = 0;
          self.screen = Screen::Detail;
        }
      }

      // Filter
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.page = 1;
        self.cursor = 0;
      }

      // Ordering
      KeyCode::Char('s') => {
        self.sort.key = self.sort.key.cycle();
        self.clamp_cursor();
      }
      KeyCode::Char('o') => {
        self.sort.order = self.sort.order.toggle();
        self.clamp_cursor();
      }

      // Actions
      KeyCode::Char('d') => {
        if let Some(id) = self.cursor_record().map(|r| r.id) {
          self.confirm_delete = Some(id);
        }
      }
      KeyCode::Char('e') => self.spawn_export(),
      KeyCode::Char('r') => {
        self.status_msg = "Actualisation…".into();
        self.refresh();
      }
      KeyCode::Char('t') => self.screen = Screen::Dashboard,
      KeyCode::Char('n') => self.open_intake(),

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      // Quit
      KeyCode::Char('q') => return false,

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),

      // Scroll detail
      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll = self.detail_scroll.saturating_add(1),
      KeyCode::Up | KeyCode::Char('k') => self.detail_scroll = self.detail_scroll.saturating_sub(1),

      KeyCode::Char('d') => self.confirm_delete = self.detail_id,

      _ => {}
    }
    true
  }

  fn handle_dashboard_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Char('t') => self.screen = Screen::Records,
      KeyCode::Char('n') => self.open_intake(),
      KeyCode::Char('r') => self.refresh(),
      _ => {}
    }
    true
  }

  fn handle_intake_key(&mut self, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => {
        self.screen = Screen::Records;
        return;
      }
      KeyCode::Char('s') if ctrl => return self.dispatch(IntakeEvent::Save),
      KeyCode::Char('r') if ctrl => {
        self.dispatch(IntakeEvent::Reset);
        self.focus(0);
        self.status_msg = "Nouveau formulaire.".into();
        return;
      }
      KeyCode::Enter if self.intake.step == Step::AdditionalExams => {
        return self.dispatch(IntakeEvent::Save);
      }
      KeyCode::Enter | KeyCode::PageDown => return self.dispatch(IntakeEvent::Next),
      KeyCode::PageUp => return self.dispatch(IntakeEvent::Previous),
      KeyCode::Tab | KeyCode::Down => {
        let len = self.intake_fields().len();
        return self.focus((self.intake_focus + 1) % len.max(1));
      }
      KeyCode::BackTab | KeyCode::Up => {
        let len = self.intake_fields().len().max(1);
        return self.focus((self.intake_focus + len - 1) % len);
      }
      _ => {}
    }

    let Some(field) = self.focused_field() else {
      return;
    };
    let form = &self.intake.form;

    let edit = match field_kind(field) {
      FieldKind::Text | FieldKind::Number | FieldKind::Date => {
        match key.code {
          KeyCode::Backspace => {
            self.input.pop();
          }
          KeyCode::Char(c) if field_kind(field) == FieldKind::Number && !c.is_ascii_digit() => {
            return;
          }
          KeyCode::Char(c)
            if field_kind(field) == FieldKind::Date && !(c.is_ascii_digit() || c == '/') =>
          {
            return;
          }
          KeyCode::Char(c) => self.input.push(c),
          _ => return,
        }
        typed_edit(field, &self.input)
      }
      FieldKind::Answer => match key.code {
        KeyCode::Char('o' | 'O') => answer_edit(field, Answer::Oui),
        KeyCode::Char('n' | 'N') => answer_edit(field, Answer::Non),
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
          let next = match current_answer(form, field) {
            Some(Answer::Oui) => Answer::Non,
            _ => Answer::Oui,
          };
          answer_edit(field, next)
        }
        _ => None,
      },
      FieldKind::Location => match key.code {
        KeyCode::Char('s' | 'S') => Some(FieldEdit::FcuLocation(FcuLocation::Sar)),
        KeyCode::Char('a' | 'A') => Some(FieldEdit::FcuLocation(FcuLocation::Ailleurs)),
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
          Some(FieldEdit::FcuLocation(match form.fcu_location {
            Some(FcuLocation::Sar) => FcuLocation::Ailleurs,
            _ => FcuLocation::Sar,
          }))
        }
        _ => None,
      },
      FieldKind::Check => match key.code {
        KeyCode::Char(' ' | 'x') => toggled_check(form, field),
        _ => None,
      },
    };
    self.edit(edit);
  }
}

fn today() -> NaiveDate { Local::now().date_naive() }

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use depistage_core::record::NewScreening;

  use super::*;
  use crate::client::{ApiConfig, ClientError};

  fn app() -> (App, mpsc::UnboundedReceiver<Message>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let client = ApiClient::new(ApiConfig { base_url: "http://127.0.0.1:9".into() }).unwrap();
    (App::new(client, tx), rx)
  }

  fn record(n: usize, last_name: &str) -> ScreeningRecord {
    let input = NewScreening {
      date:                 NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
      last_name:            last_name.into(),
      first_name:           "Rokia".into(),
      age:                  40,
      phone:                "0600000000".into(),
      address:              "Daloa".into(),
      vaccination:          false,
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
    };
    let created = Utc.with_ymd_and_hms(2024, 10, 1, 8, 0, 0).unwrap() + Duration::minutes(n as i64);
    ScreeningRecord::from_new(Uuid::new_v4(), n.to_string(), created, input)
  }

  fn loaded(n: usize) -> (App, mpsc::UnboundedReceiver<Message>) {
    let (mut app, rx) = app();
    let mut records: Vec<ScreeningRecord> = (1..=n).map(|i| record(i, &format!("P{i}"))).collect();
    records.reverse();
    app.handle_message(Message::Loaded(Ok(records)));
    (app, rx)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn not_found() -> ClientError {
    ClientError { kind: ErrorKind::NotFound, message: "gone".into() }
  }

  #[tokio::test]
  async fn list_is_paged_by_ten() {
    let (mut app, _rx) = loaded(25);
    assert_eq!(app.page_count(), 3);
    assert_eq!(app.page_records()[0].screening_number, "25");

    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Right));
    app.handle_key(key(KeyCode::Right));
    assert_eq!(app.page, 3);
    assert_eq!(app.page_records().len(), 5);
  }

  #[tokio::test]
  async fn filter_narrows_the_list() {
    let (mut app, _rx) = loaded(12);
    app.handle_key(key(KeyCode::Char('/')));
    type_str(&mut app, "p11");
    app.handle_key(key(KeyCode::Enter));
    let names: Vec<&str> = app.filtered_records().iter().map(|r| r.last_name.as_str()).collect();
    assert_eq!(names, vec!["P11"]);
  }

  #[tokio::test]
  async fn delete_asks_for_confirmation() {
    let (mut app, _rx) = loaded(3);
    app.handle_key(key(KeyCode::Char('d')));
    assert!(app.confirm_delete.is_some());
    app.handle_key(key(KeyCode::Esc));
    assert!(app.confirm_delete.is_none());
    assert_eq!(app.records.len(), 3);
  }

  #[tokio::test]
  async fn deleted_or_missing_records_are_removed_locally() {
    let (mut app, _rx) = loaded(3);
    let a = app.records[0].id;
    let b = app.records[1].id;

    app.handle_message(Message::Deleted { id: a, result: Ok(()) });
    app.handle_message(Message::Deleted { id: b, result: Err(not_found()) });
    assert_eq!(app.records.len(), 1);

    let c = app.records[0].id;
    app.handle_message(Message::Deleted {
      id:     c,
      result: Err(ClientError { kind: ErrorKind::StoreUnavailable, message: "down".into() }),
    });
    assert_eq!(app.records.len(), 1);
  }

  #[tokio::test]
  async fn failed_refresh_keeps_the_list() {
    let (mut app, _rx) = loaded(2);
    app.handle_message(Message::Loaded(Err(ClientError {
      kind:    ErrorKind::StoreUnavailable,
      message: "connexion refusée".into(),
    })));
    assert_eq!(app.records.len(), 2);
    assert!(app.connection_error.is_some());
  }

  #[tokio::test]
  async fn conditional_fields_follow_answers() {
    let mut form = IntakeForm::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(visible_fields(Step::Medical, &form).len(), 3);
    form.apply(FieldEdit::Mammography(Answer::Oui));
    form.apply(FieldEdit::GynecoConsultation(Answer::Oui));
    assert!(visible_fields(Step::Medical, &form).contains(&Field::MammographyDate));
    assert!(visible_fields(Step::Medical, &form).contains(&Field::GynecoDate));
    assert_eq!(visible_fields(Step::AdditionalExams, &form), vec![Field::HasAdditionalExams]);
  }

  #[tokio::test]
  async fn typing_fills_the_form_and_next_is_validated() {
    let (mut app, _rx) = app();
    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(app.screen, Screen::Intake);

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.intake.step, Step::Personal);
    assert!(app.status_msg.starts_with("Étape 1 incomplète"));

    for value in ["Koffi", "Ama", "4a2", "0708091011", "Gagnoa"] {
      app.handle_key(key(KeyCode::Tab));
      type_str(&mut app, value);
    }
    assert_eq!(app.intake.form.last_name, "Koffi");
    assert_eq!(app.intake.form.age, Some(42));

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.intake.step, Step::Medical);
    assert_eq!(app.focused_field(), Some(Field::Vaccination));
  }

  #[tokio::test]
  async fn submission_result_resets_the_wizard() {
    let (mut app, _rx) = app();
    app.intake.submitting = true;
    app.intake.form.last_name = "Koffi".into();

    let rec = record(7, "Koffi");
    app.handle_message(Message::Submitted(Ok(Created {
      screening_number: "7".into(),
      screening:        rec.clone(),
    })));
    assert!(app.intake.form.last_name.is_empty());
    assert!(!app.intake.submitting);
    assert_eq!(app.records[0].id, rec.id);
    assert!(app.status_msg.contains("n° 7"));
  }
}
