//! Modal form rendering helpers — labeled input boxes and checkboxes.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::theme;

/// Render one labeled input box (3 rows tall). The active field gets a
/// highlighted border and a block cursor after the value.
pub fn render_input_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if active {
            theme::border_focused()
        } else {
            theme::border_default()
        });

    let display = if active {
        format!("{value}█")
    } else {
        value.to_owned()
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(display).style(theme::table_row()),
        inner,
    );
}

/// Render a one-line checkbox: `[x] Label`.
pub fn render_checkbox(frame: &mut Frame, area: Rect, label: &str, checked: bool, active: bool) {
    let mark = if checked { "[x]" } else { "[ ]" };
    let line = Line::from(vec![
        Span::styled(
            format!(" {mark} "),
            if active {
                theme::tab_active()
            } else {
                theme::table_row()
            },
        ),
        Span::styled(label.to_owned(), theme::table_row()),
        Span::styled("  (space toggles)", theme::key_hint()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
