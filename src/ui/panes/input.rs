//! Command input line

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const PROMPT: &str = "> ";

/// Render the input box and place the terminal cursor at `cursor`
/// (a char index into `input`).
pub fn render_input_line(frame: &mut Frame, area: Rect, input: &str, cursor: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        );

    let inner_width = area.width.saturating_sub(2) as usize;
    let prompt_width = PROMPT.chars().count();

    // Scroll horizontally so the cursor stays visible
    let available = inner_width.saturating_sub(prompt_width + 1).max(1);
    let skip = cursor.saturating_sub(available);
    let visible: String = input.chars().skip(skip).collect();

    let line = Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(DEFAULT_THEME.prompt)),
        Span::styled(visible, Style::default().fg(DEFAULT_THEME.fg)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    let x = area.x + 1 + (prompt_width + cursor - skip) as u16;
    frame.set_cursor_position(Position::new(x, area.y + 1));
}
