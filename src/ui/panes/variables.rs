//! Variables pane: live `$N` slots, `%name` aliases and `%#`

use crate::session::Session;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the variables pane
pub fn render_variables_pane<D>(
    frame: &mut Frame,
    area: Rect,
    session: &Session<D>,
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
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut all_items = Vec::new();

    for (index, variable) in session.variables().list() {
        let kind_style = if variable.is_code {
            Style::default().fg(DEFAULT_THEME.code)
        } else {
            Style::default().fg(DEFAULT_THEME.primary)
        };
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("${:<3}", index), kind_style),
            Span::styled(
                format!("0x{:08x}", variable.address),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::raw(" | "),
            Span::styled(
                format!("0x{:x} bytes", variable.size),
                Style::default().fg(DEFAULT_THEME.fg),
            ),
            Span::raw(" "),
            Span::styled(variable.kind().to_string(), kind_style),
        ])));
    }

    for (name, value) in session.locals().list() {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("%{} ", name), Style::default().fg(DEFAULT_THEME.local)),
            Span::styled(
                format!("0x{:08x}", value),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ])));
    }

    if let Some(value) = session.last_result() {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(
                "%# ",
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("0x{:08x}", value),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ])));
    }

    if all_items.is_empty() {
        all_items.push(
            ListItem::new("(no variables)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let max_scroll = all_items.len().saturating_sub(visible_height);
    *scroll_offset = (*scroll_offset).min(max_scroll);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
