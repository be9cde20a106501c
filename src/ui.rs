use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::app::{App, InputMode};
use crate::format::{Emphasis, Rendered};
use crate::pagination::Pagination;
use crate::params::UrlState;
use crate::table::{Align, LoadState};
use crate::tabs::Tab;
use crate::theme::ColorScheme;

// ===============================
// Top-level draw
// ===============================
pub fn draw<S: UrlState>(f: &mut Frame, app: &mut App<S>) {
    let colors = app.theme().colors();
    let summary = app.view().summary();
    let has_tabs = app.view().tab().is_some();

    let mut constraints: Vec<Constraint> = Vec::with_capacity(6);
    constraints.push(Constraint::Length(1)); // header
    if has_tabs {
        constraints.push(Constraint::Length(1)); // tab bar
    }
    if !summary.is_empty() {
        constraints.push(Constraint::Length(summary.len() as u16 + 2)); // summary box
    }
    constraints.push(Constraint::Min(0)); // table
    constraints.push(Constraint::Length(1)); // pagination
    constraints.push(Constraint::Length(2)); // footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let mut idx = 0usize;
    header(f, chunks[idx], app, &colors);
    idx += 1;
    if has_tabs {
        tab_bar(f, chunks[idx], app, &colors);
        idx += 1;
    }
    if !summary.is_empty() {
        summary_box(f, chunks[idx], &summary, &colors);
        idx += 1;
    }
    // pagination slots get whatever the bar decoration leaves
    let rows = app.view().table().rows_per_page();
    app.on_resize(pagination_budget(chunks[idx].width, rows));
    table(f, chunks[idx], app, &colors);
    idx += 1;
    pagination_bar(f, chunks[idx], app, &colors);
    idx += 1;
    footer(f, chunks[idx], app, &colors);

    // Overlays render last
    if app.toast_message().is_some() {
        draw_toast_modal(f, app, &colors);
    }
}

// ===============================
// Rendered values
// ===============================
fn piece_style(emphasis: Emphasis, colors: &ColorScheme) -> Style {
    match emphasis {
        Emphasis::Normal => Style::default().fg(colors.text),
        Emphasis::Small => Style::default().fg(colors.text_dim),
        Emphasis::Zeros => Style::default().fg(colors.zeros),
        Emphasis::Sup => Style::default().fg(colors.text_dim).add_modifier(Modifier::ITALIC),
    }
}

/// Styled spans for a formatted value; group separators use the plain text color.
pub fn rendered_spans(value: &Rendered, colors: &ColorScheme) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(value.pieces().len() * 2);
    for piece in value.pieces() {
        spans.push(Span::styled(piece.display_text(), piece_style(piece.emphasis, colors)));
        if let Some(sep) = piece.sep {
            spans.push(Span::styled(sep.to_string(), Style::default().fg(colors.text)));
        }
    }
    spans
}

fn rendered_line(value: &Rendered, align: Align, colors: &ColorScheme) -> Line<'static> {
    let line = Line::from(rendered_spans(value, colors));
    match align {
        Align::Left => line,
        Align::Right => line.alignment(Alignment::Right),
    }
}

// ===============================
// Header / Tabs / Summary
// ===============================
fn header<S: UrlState>(f: &mut Frame, area: Rect, app: &App<S>, colors: &ColorScheme) {
    let mut spans = vec![
        Span::styled(" ecashx ", Style::default().fg(colors.background).bg(colors.accent).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(app.view().title(), Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", app.url()), Style::default().fg(colors.text_dim)),
    ];
    if app.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(colors.text_dim).add_modifier(Modifier::ITALIC)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn tab_bar<S: UrlState>(f: &mut Frame, area: Rect, app: &App<S>, colors: &ColorScheme) {
    let active = app.view().tab();
    let mut spans = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        spans.push(Span::styled(
            if i == 0 { "┌─" } else { "┬─" },
            Style::default().fg(colors.border),
        ));
        let label = match app.view().tab_count(*tab) {
            Some(count) => format!("{} ({count})", tab.title()),
            None => tab.title().to_string(),
        };
        if Some(*tab) == active {
            spans.push(Span::styled(label, Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(colors.text_dim)));
        }
        spans.push(Span::styled("─", Style::default().fg(colors.border)));
    }
    spans.push(Span::styled("┐", Style::default().fg(colors.border)));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn summary_box(f: &mut Frame, area: Rect, summary: &[(&'static str, Rendered)], colors: &ColorScheme) {
    let key_width = summary.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let lines: Vec<Line> = summary
        .iter()
        .map(|(key, value)| {
            let mut spans = vec![Span::styled(
                format!("{key:<key_width$}  "),
                Style::default().fg(colors.text_dim),
            )];
            spans.extend(rendered_spans(value, colors));
            Line::from(spans)
        })
        .collect();
    let w = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.border)),
    );
    f.render_widget(w, area);
}

// ===============================
// Table / Pagination
// ===============================
fn table<S: UrlState>(f: &mut Frame, area: Rect, app: &App<S>, colors: &ColorScheme) {
    let view = app.view().table();
    let cells = view.cells();

    let (badge, badge_style) = match view.state() {
        LoadState::Idle => (String::new(), Style::default()),
        LoadState::Loading => (" loading… ".to_string(), Style::default().fg(colors.text_dim)),
        LoadState::Ready => {
            let count = match view.total() {
                Some(total) => format!(" {total} rows "),
                None => format!(" {} rows ", cells.len()),
            };
            (count, Style::default().fg(colors.positive))
        }
        LoadState::Failed(msg) => (format!(" failed: {msg} "), Style::default().fg(colors.negative)),
    };
    let block = Block::default()
        .title(Line::from(vec![
            Span::styled(format!(" {} ", view.name()), Style::default().fg(colors.accent)),
            Span::styled(badge, badge_style),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors.border));

    if cells.is_empty() {
        let text = match view.state() {
            LoadState::Loading | LoadState::Idle => "Loading…".to_string(),
            LoadState::Failed(msg) => format!("Could not load: {msg}"),
            LoadState::Ready => "No rows".to_string(),
        };
        let w = Paragraph::new(text)
            .style(Style::default().fg(colors.text_dim))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(w, area);
        return;
    }

    let headers = view.headers();
    let widths: Vec<Constraint> = headers.iter().map(|(_, w, _)| Constraint::Length(*w)).collect();
    let header_row = Row::new(headers.iter().map(|(title, _, align)| {
        let line = Line::from(*title);
        Cell::from(match align {
            Align::Left => line,
            Align::Right => line.alignment(Alignment::Right),
        })
    }))
    .style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = cells
        .iter()
        .map(|row| {
            Row::new(
                row.iter()
                    .zip(headers.iter())
                    .map(|(value, (_, _, align))| Cell::from(rendered_line(value, *align, colors))),
            )
        })
        .collect();

    let t = Table::new(rows, widths)
        .header(header_row)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(colors.selection_bg)
                .fg(colors.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .block(block);
    let mut state = TableState::default().with_selected(Some(view.selected()));
    f.render_stateful_widget(t, area, &mut state);
}

/// Spans of the page-link bar: `‹ 1 … 4 [5] 6 … 20 ›`.
pub fn pagination_spans(pagination: &Pagination, colors: &ColorScheme) -> Vec<Span<'static>> {
    let link = Style::default().fg(colors.link);
    let dim = Style::default().fg(colors.text_dim);
    let mut spans = Vec::new();
    spans.push(Span::styled("‹ ", if pagination.prev().is_some() { link } else { dim }));
    for slot in pagination.with_gaps() {
        match slot {
            Some(page) if page == pagination.current => spans.push(Span::styled(
                format!("[{page}]"),
                Style::default().fg(colors.current_page).add_modifier(Modifier::BOLD),
            )),
            Some(page) => spans.push(Span::styled(page.to_string(), link)),
            None => spans.push(Span::styled("…", dim)),
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("›", if pagination.next().is_some() { link } else { dim }));
    spans
}

fn rows_suffix(rows_per_page: u32) -> String {
    format!("   {rows_per_page} rows/page")
}

/// Cells of a `width`-wide bar left for page links once the leading pad, both
/// arrows, the current-page brackets and the rows suffix are taken.
pub fn pagination_budget(width: u16, rows_per_page: u32) -> u16 {
    let fixed = 6 + rows_suffix(rows_per_page).chars().count();
    width.saturating_sub(u16::try_from(fixed).unwrap_or(u16::MAX))
}

fn pagination_line(pagination: &Pagination, rows_per_page: u32, colors: &ColorScheme) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    spans.extend(pagination_spans(pagination, colors));
    spans.push(Span::styled(rows_suffix(rows_per_page), Style::default().fg(colors.text_dim)));
    Line::from(spans)
}

fn pagination_bar<S: UrlState>(f: &mut Frame, area: Rect, app: &App<S>, colors: &ColorScheme) {
    let view = app.view().table();
    let line = pagination_line(view.pagination(), view.rows_per_page(), colors);
    f.render_widget(Paragraph::new(line), area);
}

// ===============================
// Footer / Toast
// ===============================
fn footer<S: UrlState>(f: &mut Frame, area: Rect, app: &App<S>, colors: &ColorScheme) {
    let key = Style::default().fg(colors.accent);
    let mut spans: Vec<Span> = Vec::with_capacity(32);

    match app.input_mode() {
        InputMode::GoTo | InputMode::Page => {
            let prompt = if app.input_mode() == InputMode::GoTo {
                "Go to (hash, height, address): "
            } else {
                "Page: "
            };
            spans.push(Span::styled(prompt, key));
            spans.push(Span::styled(app.input().to_string(), Style::default().fg(colors.text)));
            spans.push(Span::styled("█", Style::default().fg(colors.accent)));
            spans.push(Span::styled("   Enter", key));
            spans.push(Span::raw(" go │ "));
            spans.push(Span::styled("Esc", key));
            spans.push(Span::raw(" cancel"));
        }
        InputMode::Normal => {
            let hints: &[(&str, &str)] = &[
                ("←/→", "page"),
                ("Home/End", "first/last"),
                ("↑/↓", "row"),
                ("Enter", "open"),
                ("r", "rows"),
                ("o", "order"),
                ("Tab", "tab"),
                ("g", "go to"),
                ("p", "page #"),
                ("Backspace", "back"),
                ("y", "copy link"),
                ("F5", "refresh"),
                ("q", "quit"),
            ];
            for (i, (k, label)) in hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" │ "));
                }
                spans.push(Span::styled(*k, key));
                spans.push(Span::raw(format!(" {label}")));
            }
            spans.push(Span::raw(format!(" │ {} │ FPS {}", app.theme(), app.fps())));
        }
    }

    let w = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_type(BorderType::Plain)
            .border_style(Style::default().fg(colors.border)),
    );
    f.render_widget(w, area);
}

fn draw_toast_modal<S: UrlState>(f: &mut Frame, app: &App<S>, colors: &ColorScheme) {
    let message = app.toast_message().unwrap_or("");
    let (mark, color) = if app.toast_is_error() {
        ("✗", colors.toast_error)
    } else {
        ("✓", colors.toast_success)
    };

    // Small centered box (40% width, 3 lines height)
    let area = f.area();
    let width = ((area.width * 4) / 10).max((message.chars().count() as u16 + 6).min(area.width));
    let height = 3.min(area.height);
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let overlay = Rect { x, y, width, height };

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));

    let text = Paragraph::new(format!("{mark} {message}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(block);

    f.render_widget(text, overlay);
}
