//! Intake wizard: step indicator and the fields of the current step.

use depistage_core::intake::Step;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use super::panel;
use crate::app::{App, FieldKind, display_value, field_kind};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let state = &app.intake;
  let title = if state.submitting {
    " Nouveau dépistage · enregistrement… ".to_string()
  } else {
    " Nouveau dépistage ".to_string()
  };
  let block = panel(title);
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(2), Constraint::Min(0)])
    .split(inner);

  f.render_widget(Paragraph::new(steps_line(app)), rows[0]);
  f.render_widget(Paragraph::new(field_lines(app)), rows[1]);
}

/// `● 1 Informations personnelles  ○ 2 ...` with the current step highlighted.
fn steps_line(app: &App) -> Line<'static> {
  let mut spans = Vec::new();
  for step in Step::ALL {
    let mark = if app.intake.is_completed(step) { "●" } else { "○" };
    let style = if step == app.intake.step {
      Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
    } else if app.intake.is_completed(step) {
      Style::default().fg(Color::Green)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled(
      format!("{mark} {} {}   ", step.number(), step.title()),
      style,
    ));
  }
  Line::from(spans)
}

fn field_lines(app: &App) -> Vec<Line<'static>> {
  let form = &app.intake.form;
  let missing = app.intake.missing_for(app.intake.step);

  app
    .intake_fields()
    .into_iter()
    .enumerate()
    .map(|(i, field)| {
      let focused = i == app.intake_focus;
      let value = if focused
        && matches!(field_kind(field), FieldKind::Text | FieldKind::Number | FieldKind::Date)
      {
        format!("{}_", app.input)
      } else {
        display_value(form, field)
      };
      let hint = match field_kind(field) {
        FieldKind::Answer => "  (o/n)",
        FieldKind::Location => "  (s = SAR, a = ailleurs)",
        FieldKind::Check => "  (espace)",
        FieldKind::Date => "  (jj/mm/aaaa)",
        FieldKind::Text | FieldKind::Number => "",
      };

      let label_style = if focused {
        Style::default()
          .fg(Color::White)
          .bg(Color::Blue)
          .add_modifier(Modifier::BOLD)
      } else if missing.contains(&field) {
        Style::default().fg(Color::LightRed)
      } else {
        Style::default().fg(Color::Cyan)
      };

      let mut spans = vec![
        Span::styled(format!(" {:<28}", field.label()), label_style),
        Span::raw(" "),
        Span::raw(value),
      ];
      if focused {
        spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
      }
      Line::from(spans)
    })
    .collect()
}
