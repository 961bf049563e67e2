mod notifications;

use std::sync::OnceLock;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, FormField, Popup, Severity};
use crate::theme::Theme;

// Theme is resolved once at startup (config overrides applied in main)
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
pub(crate) fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn inactive() -> Color { theme().inactive }
fn header() -> Color { theme().header }

pub(crate) fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => warning(),
        Severity::Success => success(),
        Severity::Danger => danger(),
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info line
            Constraint::Min(5),    // Data box
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_data_box(f, app, chunks[1]);
    draw_footer(f, chunks[2]);

    // Popups on top
    match app.popup {
        Popup::None => {}
        Popup::Modal => draw_modal(f, app),
        Popup::Form => draw_form(f, app),
        Popup::Help => draw_help_popup(f),
    }

    // Notification stack above everything
    notifications::draw_stack(f, app, area);
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: loading indicator > payload summary > ready
    let line = if app.loads_in_flight > 0 {
        Line::from(vec![
            Span::styled("⟳ ", Style::default().fg(warning())),
            Span::styled("Loading data...", Style::default().fg(warning())),
        ])
    } else if let Some(ref data) = app.current_data {
        Line::from(vec![Span::styled(
            format!(
                "{} · {} items · {}",
                data.message,
                data.items.len(),
                data.timestamp
            ),
            Style::default().fg(text_dim()),
        )])
    } else {
        Line::from(vec![Span::styled(
            format!("Ready · {}", app.client.base_url()),
            Style::default().fg(text_dim()),
        )])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_data_box(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " Data ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let Some(ref data) = app.current_data else {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No data yet. Press f to fetch from /api/data.",
                Style::default().fg(text_dim()),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(placeholder, area);
        return;
    };

    f.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Heading + timestamp
            Constraint::Min(1),    // Items table
        ])
        .split(area);

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            data.message.as_str(),
            Style::default().fg(text()).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("as of {}", data.timestamp),
            Style::default().fg(text_dim()),
        )),
    ]);
    f.render_widget(heading, inner[0]);

    // One row per item, payload order, no sorting or truncation
    let rows: Vec<Row> = if data.items.is_empty() {
        vec![Row::new(vec![Span::styled(
            "  No items in payload",
            Style::default().fg(text_dim()),
        )])]
    } else {
        data.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let row_style = if i == app.selected_item {
                    Style::default().bg(bg_selected()).fg(text())
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Span::styled(item.id.to_string(), Style::default().fg(accent())),
                    Span::styled(item.name.as_str(), Style::default().fg(text())),
                    Span::styled(item.description.as_str(), Style::default().fg(text_dim())),
                ])
                .style(row_style)
            })
            .collect()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Percentage(65),
        ],
    )
    .header(Row::new(vec![
        Span::styled("ID", Style::default().fg(header())),
        Span::styled("Name", Style::default().fg(header())),
        Span::styled("Description", Style::default().fg(header())),
    ]));

    f.render_widget(table, inner[1]);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let hints = [
        ("f", "fetch"),
        ("s", "test submit"),
        ("n", "new submission"),
        ("x", "dismiss"),
        ("?", "help"),
        ("q", "quit"),
    ];

    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(inactive())));
        }
        spans.push(Span::styled(*key, Style::default().fg(accent())));
        spans.push(Span::styled(
            format!(" {}", label),
            Style::default().fg(text_dim()),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

/// Singleton response modal: re-invocation replaces title and body in place
fn draw_modal(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 90 { 90 } else { 60 },
        if area.height < 30 { 80 } else { 60 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let body: Vec<Line> = app
        .modal_body
        .lines()
        .map(|line| Line::styled(line.to_string(), Style::default().fg(text())))
        .collect();

    let modal = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((app.modal_scroll, 0))
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", app.modal_title),
                    Style::default().fg(accent()),
                ))
                .title_bottom(" Esc close · j/k scroll ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        );

    f.render_widget(modal, popup_area);
}

fn draw_form(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 90 } else { 60 },
        if area.height < 30 { 90 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(
            " New Submission ",
            Style::default().fg(accent()),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()));
    f.render_widget(block, popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(3), // Email
            Constraint::Min(3),    // Message
            Constraint::Length(3), // Buttons
        ])
        .split(popup_area);

    draw_form_field(f, inner[0], " Name ", &app.form_name, app.form_field == FormField::Name);
    draw_form_field(f, inner[1], " Email ", &app.form_email, app.form_field == FormField::Email);
    draw_form_field(
        f,
        inner[2],
        " Message ",
        &app.form_message,
        app.form_field == FormField::Message,
    );

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled("  [ ", Style::default().fg(text_dim())),
        Span::styled(
            "F2 = Submit",
            Style::default().fg(success()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ]  [ ", Style::default().fg(text_dim())),
        Span::styled("Tab = Next Field", Style::default().fg(accent())),
        Span::styled(" ]  [ ", Style::default().fg(text_dim())),
        Span::styled("Esc = Cancel", Style::default().fg(danger())),
        Span::styled(" ]  ", Style::default().fg(text_dim())),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(inactive())),
    );
    f.render_widget(buttons, inner[3]);
}

fn draw_form_field(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border = if focused { accent() } else { inactive() };
    let cursor = if focused { "_" } else { "" };

    let input = Paragraph::new(format!("{}{}", value, cursor))
        .style(Style::default().fg(text()))
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default().fg(if focused { accent() } else { header() }),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(input, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Requests ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  f / r     ", Style::default().fg(accent())),
            Span::raw("Fetch data from /api/data"),
        ]),
        Line::from(vec![
            Span::styled("  s         ", Style::default().fg(accent())),
            Span::raw("Send the canned test record to /api/submit"),
        ]),
        Line::from(vec![
            Span::styled("  n         ", Style::default().fg(accent())),
            Span::raw("Open the submission form"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Navigation ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", Style::default().fg(accent())),
            Span::raw("Move through items (scroll in modal)"),
        ]),
        Line::from(vec![
            Span::styled("  x         ", Style::default().fg(accent())),
            Span::raw("Dismiss the newest notification"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Quick Start ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  madoguchi            ", Style::default().fg(accent())),
            Span::raw("Launch this TUI"),
        ]),
        Line::from(vec![
            Span::styled("  madoguchi --fetch    ", Style::default().fg(accent())),
            Span::raw("Print /api/data as JSON and exit"),
        ]),
        Line::from(vec![
            Span::styled("  madoguchi --submit   ", Style::default().fg(accent())),
            Span::raw("Send the test record and print the response"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
