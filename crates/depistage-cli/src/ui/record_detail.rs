//! Full view of one record.

use depistage_core::record::{Answer, Field, ScreeningRecord};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use super::{fmt_date, panel};
use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail screen into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(r) = app.detail_record() else {
    let block = panel(" Dossier ".into());
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Ce dossier n'existe plus.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let block = panel(format!(" n° {} · {} ", r.screening_number, r.display_name()));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let para = Paragraph::new(lines(r)).scroll((app.detail_scroll, 0));
  f.render_widget(para, inner);
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

fn lines(r: &ScreeningRecord) -> Vec<Line<'static>> {
  let yes_no = |b: bool| if b { "oui" } else { "non" }.to_string();
  let answer = |a: Option<Answer>| a.map(|a| a.to_string()).unwrap_or_else(|| "—".into());

  let mut out = vec![section("Informations personnelles")];
  out.push(row(Field::Date, fmt_date(Some(r.date))));
  out.push(row(Field::LastName, r.last_name.clone()));
  out.push(row(Field::FirstName, r.first_name.clone()));
  out.push(row(Field::Age, format!("{} ans", r.age)));
  out.push(row(Field::Phone, r.phone.clone()));
  out.push(row(Field::Address, r.address.clone()));

  out.push(Line::from(""));
  out.push(section("Informations médicales"));
  out.push(row(Field::Vaccination, yes_no(r.vaccination)));
  out.push(row(Field::GynecoConsultation, yes_no(r.gyneco_consultation)));
  if r.gyneco_consultation {
    out.push(row(Field::GynecoDate, fmt_date(r.gyneco_date)));
  }
  out.push(row(Field::Mammography, answer(r.mammography)));
  if r.mammography == Some(Answer::Oui) {
    out.push(row(Field::MammographyDate, fmt_date(r.mammography_date)));
  }

  out.push(Line::from(""));
  out.push(section("Examens complémentaires"));
  out.push(row(Field::HasAdditionalExams, answer(r.has_additional_exams)));
  out.push(row(Field::Fcu, yes_no(r.fcu)));
  if let Some(loc) = r.fcu_location {
    out.push(row(Field::FcuLocation, loc.to_string()));
  }
  out.push(row(Field::Hpv, yes_no(r.hpv)));
  out.push(row(Field::MammaryUltrasound, yes_no(r.mammary_ultrasound)));
  out.push(row(Field::ThermoAblation, yes_no(r.thermo_ablation)));
  out.push(row(Field::Anapath, yes_no(r.anapath)));

  out.push(Line::from(""));
  out.push(Line::from(Span::styled(
    format!(
      "Enregistré le {}",
      r.created_at
        .with_timezone(&chrono::Local)
        .format("%d/%m/%Y à %H:%M")
    ),
    Style::default().fg(Color::DarkGray),
  )));
  out
}

fn section(title: &'static str) -> Line<'static> {
  Line::from(Span::styled(
    title,
    Style::default()
      .fg(Color::Magenta)
      .add_modifier(Modifier::BOLD),
  ))
}

fn row(field: Field, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("  {:<28}", field.label()),
      Style::default().fg(Color::Cyan),
    ),
    Span::raw(value),
  ])
}
