//! Transcript pane rendering

use crate::console::{LineKind, Transcript};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the console output pane.
///
/// `scroll_offset` is clamped in place; `usize::MAX` pins the view to the
/// newest line.
pub fn render_transcript_pane(
    frame: &mut Frame,
    area: Rect,
    transcript: &Transcript,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if transcript.is_empty() {
        let paragraph = Paragraph::new("Type 'help' for a list of commands.")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let total_items = transcript.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders, min 1

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = transcript
        .lines()
        .iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|line| {
            let style = match line.kind {
                LineKind::Input => Style::default().fg(DEFAULT_THEME.prompt),
                LineKind::Output => Style::default().fg(DEFAULT_THEME.fg),
                LineKind::Error => Style::default().fg(DEFAULT_THEME.error),
            };
            ListItem::new(line.text.as_str()).style(style)
        })
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
