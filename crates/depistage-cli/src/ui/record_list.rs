//! Record table: one page at a time.

use depistage_core::record::Answer;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Cell, Paragraph, Row, Table, TableState},
};

use super::{fmt_date, panel};
use crate::app::App;

/// Render the record table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_records().len();
  let total = app.records.len();
  let order = match app.sort.order {
    depistage_core::browse::SortOrder::Ascending => "↑",
    depistage_core::browse::SortOrder::Descending => "↓",
  };

  // Title with count, page and ordering.
  let count = if app.filter_active || !app.filter.is_empty() {
    format!("{filtered}/{total}")
  } else {
    total.to_string()
  };
  let title = format!(
    " Dépistages ({count}) · page {}/{} · tri {} {order} ",
    app.page,
    app.page_count(),
    app.sort.key.label(),
  );

  let block = panel(title);
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  // Filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect {
      x:      inner.x,
      y:      inner.y + inner.height - 1,
      width:  inner.width,
      height: 1,
    };
    inner.height = inner.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let records = app.page_records();
  if records.is_empty() {
    let msg = if !app.loaded {
      "Chargement…"
    } else if total == 0 {
      "Aucun dépistage enregistré. Appuyez sur n pour commencer."
    } else {
      "Aucun dossier ne correspond au filtre."
    };
    f.render_widget(
      Paragraph::new(Line::from(msg)).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let header = Row::new(["N°", "Date", "Nom", "Âge", "Téléphone", "Vacc.", "Mammo.", "Examens"])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows: Vec<Row> = records
    .iter()
    .map(|r| {
      let mammo = match r.mammography {
        Some(Answer::Oui) => format!("oui {}", fmt_date(r.mammography_date)),
        Some(Answer::Non) => "non".into(),
        None => "—".into(),
      };
      let exams: Vec<&str> = [
        (r.fcu, "FCU"),
        (r.hpv, "HPV"),
        (r.mammary_ultrasound, "Écho"),
        (r.thermo_ablation, "Thermo"),
        (r.anapath, "Anapath"),
      ]
      .into_iter()
      .filter_map(|(done, name)| done.then_some(name))
      .collect();

      Row::new(vec![
        Cell::from(r.screening_number.clone()),
        Cell::from(fmt_date(Some(r.date))),
        Cell::from(r.display_name()),
        Cell::from(r.age.to_string()),
        Cell::from(r.phone.clone()),
        Cell::from(if r.vaccination { "oui" } else { "non" }),
        Cell::from(mammo),
        Cell::from(exams.join(", ")),
      ])
    })
    .collect();

  let widths = [
    Constraint::Length(5),
    Constraint::Length(10),
    Constraint::Min(18),
    Constraint::Length(4),
    Constraint::Length(12),
    Constraint::Length(5),
    Constraint::Length(15),
    Constraint::Min(10),
  ];

  let mut state = TableState::default();
  state.select(Some(app.cursor));

  f.render_stateful_widget(
    Table::new(rows, widths)
      .header(header)
      .column_spacing(1)
      .row_highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    inner,
    &mut state,
  );
}
