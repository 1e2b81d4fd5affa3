//! TUI rendering: orchestrates all screens.

pub mod dashboard;
pub mod intake;
pub mod record_detail;
pub mod record_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.screen {
    Screen::Records => record_list::draw(f, rows[1], app),
    Screen::Detail => record_detail::draw(f, rows[1], app),
    Screen::Dashboard => dashboard::draw(f, rows[1], app),
    Screen::Intake => intake::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);

  if let Some(id) = app.confirm_delete {
    let name = app
      .records
      .iter()
      .find(|r| r.id == id)
      .map(|r| format!("n° {} · {}", r.screening_number, r.display_name()))
      .unwrap_or_else(|| "ce dossier".into());
    draw_confirm(f, area, &name);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%d/%m/%Y").to_string();

  let left = Span::styled(
    " dépistage  [n] nouveau  [t] tableau de bord  [q] quitter",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = match &app.connection_error {
    Some(_) => Span::styled(
      format!("hors ligne · {} · {date} ", app.client.base_url()),
      Style::default().fg(Color::LightRed),
    ),
    None => Span::styled(
      format!("{} · {date} ", app.client.base_url()),
      Style::default().fg(Color::Gray),
    ),
  };

  // Simple left-right header: pad the middle.
  let left_width = left.content.chars().count() as u16;
  let right_width = right.content.chars().count() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    _ if app.confirm_delete.is_some() => ("SUPPR", "o/Entrée confirmer  n/Esc annuler"),
    Screen::Records if app.filter_active => (
      "FILTRE",
      "Tapez pour filtrer  Esc annuler  Entrée valider",
    ),
    Screen::Records => (
      "LISTE",
      "↑↓ naviguer  ←→ page  Entrée détail  / filtrer  s tri  o ordre  d supprimer  e export",
    ),
    Screen::Detail => ("DÉTAIL", "↑↓ défiler  d supprimer  Esc retour  q quitter"),
    Screen::Dashboard => ("STATS", "r actualiser  n nouveau  Esc retour  q quitter"),
    Screen::Intake => (
      "SAISIE",
      "Tab champ  Entrée suivant  PgPréc précédent  Ctrl-S enregistrer  Ctrl-R effacer  Esc retour",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Magenta)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Popups ───────────────────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, area: Rect, name: &str) {
  let popup = centered_rect(50, 7, area);
  f.render_widget(Clear, popup);

  let block = Block::default()
    .title(" Supprimer ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::LightRed));
  let text = vec![
    Line::from(format!("Supprimer définitivement {name} ?")),
    Line::from(""),
    Line::from(Span::styled(
      "[o] oui   [n] non",
      Style::default().add_modifier(Modifier::BOLD),
    )),
  ];
  f.render_widget(
    Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
    popup,
  );
}

/// A box `percent_x` wide and `height` rows tall, centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [col] = Layout::horizontal([Constraint::Percentage(percent_x)])
    .flex(Flex::Center)
    .areas(row);
  col
}

/// Shared bordered block for full-width screens.
pub(crate) fn panel(title: String) -> Block<'static> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

/// `dd/mm/YYYY`, or a dash when absent.
pub(crate) fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
  d.map(|d| d.format("%d/%m/%Y").to_string())
    .unwrap_or_else(|| "—".into())
}
