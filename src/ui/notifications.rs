//! Stacked notification toasts
//!
//! Rendered bottom-right on top of all other content, newest at the bottom.
//! Notifications stay until dismissed with 'x' (or by the one-shot success
//! sweep in App::tick).

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Notification};

const TOAST_HEIGHT: u16 = 3; // 1 line of text + borders

pub fn draw_stack(f: &mut Frame, app: &App, area: Rect) {
    if app.notifications.is_empty() {
        return;
    }

    // Newest sits closest to the bottom edge; older ones stack upward until
    // we run out of vertical space.
    let max_visible = (area.height.saturating_sub(2) / TOAST_HEIGHT) as usize;

    for (i, notification) in app.notifications.iter().rev().take(max_visible).enumerate() {
        let y_offset = TOAST_HEIGHT * (i as u16 + 1);
        if area.bottom() < y_offset + 1 {
            break;
        }
        draw_toast(f, notification, area, y_offset);
    }
}

fn draw_toast(f: &mut Frame, notification: &Notification, area: Rect, y_offset: u16) {
    let width = (notification.message.len() as u16 + 4).min(area.width.saturating_sub(4));
    let x = area.right().saturating_sub(width + 2);
    let y = area.bottom().saturating_sub(y_offset + 1);
    let toast_area = Rect::new(x, y, width, TOAST_HEIGHT);

    let color = super::severity_color(notification.severity);
    let age = notification.created_at.elapsed().as_secs();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {}s ", age))
        .title_bottom(" (x) dismiss ")
        .title_alignment(Alignment::Right)
        .title_style(Style::default().fg(super::text_dim()));

    let text = Paragraph::new(notification.message.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .block(block);

    // Clear the area first so the toast appears on top
    f.render_widget(Clear, toast_area);
    f.render_widget(text, toast_area);
}
