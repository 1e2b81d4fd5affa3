//! Dashboard: headline figures and exam breakdown.

use depistage_core::stats::{Statistics, percentage};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Gauge, Paragraph},
};

use super::panel;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let s = app.statistics();

  let block = panel(" Tableau de bord ".into());
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3), // totals
      Constraint::Length(2), // vaccination
      Constraint::Length(2), // mammography
      Constraint::Length(2), // gyneco
      Constraint::Length(1),
      Constraint::Min(0), // exams
    ])
    .split(inner);

  let totals = vec![
    Line::from(vec![
      Span::styled("Dépistages  ", Style::default().fg(Color::Cyan)),
      Span::styled(
        s.total.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
      ),
    ]),
    Line::from(vec![
      Span::styled("Âge moyen   ", Style::default().fg(Color::Cyan)),
      Span::raw(format!("{:.1} ans", s.average_age)),
    ]),
  ];
  f.render_widget(Paragraph::new(totals), rows[0]);

  gauge(f, rows[1], "Vaccinées", s.vaccinated, s.total, Color::Green);
  gauge(f, rows[2], "Mammographies", s.mammography_done, s.total, Color::Magenta);
  gauge(
    f,
    rows[3],
    "Consultations gynécologiques",
    s.gyneco_consultation_count,
    s.total,
    Color::Blue,
  );

  f.render_widget(Paragraph::new(exam_lines(&s)), rows[5]);
}

fn gauge(f: &mut Frame, area: Rect, label: &str, count: usize, total: usize, color: Color) {
  let pct = percentage(count, total);
  let g = Gauge::default()
    .gauge_style(Style::default().fg(color).bg(Color::Black))
    .percent(pct.min(100) as u16)
    .label(format!("{label} · {count}/{total} ({pct}%)"));
  f.render_widget(g, Rect { height: 1, ..area });
}

fn exam_lines(s: &Statistics) -> Vec<Line<'static>> {
  let e = s.exams_breakdown;
  let mut lines = vec![Line::from(Span::styled(
    "Examens complémentaires",
    Style::default()
      .fg(Color::Magenta)
      .add_modifier(Modifier::BOLD),
  ))];
  for (name, count) in [
    ("FCU", e.fcu),
    ("HPV", e.hpv),
    ("Échographie mammaire", e.mammary_ultrasound),
    ("Thermo-ablation", e.thermo_ablation),
    ("Anapath", e.anapath),
  ] {
    lines.push(Line::from(vec![
      Span::styled(format!("  {name:<22}"), Style::default().fg(Color::Cyan)),
      Span::raw(format!("{count:>4}  ")),
      Span::styled(
        "█".repeat(bar_width(count, s.total)),
        Style::default().fg(Color::Magenta),
      ),
    ]));
  }
  lines
}

/// Bar length out of 30 cells.
fn bar_width(count: usize, total: usize) -> usize { percentage(count, total) as usize * 30 / 100 }
