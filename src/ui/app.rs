//! Main TUI application state and logic

use crate::console::Console;
use crate::device::Device;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane Up/Down scroll when not browsing history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Console,
    Variables,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Console => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Console,
        }
    }
}

/// The main application state
pub struct App<D> {
    /// The console the operator drives
    pub console: Console<D>,

    /// Current contents of the input line and cursor (char index)
    pub input: String,
    pub cursor: usize,

    /// Previously entered lines, oldest first
    pub history: Vec<String>,
    /// Position while browsing history (None = editing a fresh line)
    pub history_pos: Option<usize>,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets (usize::MAX = follow newest output)
    pub transcript_scroll: usize,
    pub variables_scroll: usize,

    /// Status message to display
    pub status_message: String,
    pub status_is_error: bool,

    /// Whether the app should quit
    pub should_quit: bool,
}

impl<D: Device> App<D> {
    pub fn new(console: Console<D>) -> Self {
        App {
            console,
            input: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_pos: None,
            focused_pane: FocusedPane::Console,
            transcript_scroll: usize::MAX,
            variables_scroll: 0,
            status_message: String::from("Ready!"),
            status_is_error: false,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // Panes on top, input line, status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(main_chunks[0]);

        super::panes::render_transcript_pane(
            frame,
            columns[0],
            self.console.transcript(),
            self.focused_pane == FocusedPane::Console,
            &mut self.transcript_scroll,
        );

        super::panes::render_variables_pane(
            frame,
            columns[1],
            self.console.session(),
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        super::panes::render_input_line(frame, main_chunks[1], &self.input, self.cursor);

        let session = self.console.session();
        super::panes::render_status_bar(
            frame,
            main_chunks[2],
            &self.status_message,
            self.status_is_error,
            session.variables().live_count(),
            session.locals().len(),
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.input.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index();
                    self.input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.input.chars().count() {
                    let at = self.byte_index();
                    self.input.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.chars().count(),
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Console => self.history_back(),
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Console => self.history_forward(),
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_add(1);
                }
            },
            KeyCode::PageUp => {
                // Offset was clamped during the last render
                self.transcript_scroll = self.transcript_scroll.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.transcript_scroll = self.transcript_scroll.saturating_add(10);
            }
            _ => {}
        }
    }

    /// Run the current input line
    fn submit(&mut self) {
        let line = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.history_pos = None;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.history.last().map(String::as_str) != Some(trimmed) {
            self.history.push(trimmed.to_string());
        }

        match self.console.execute_line(trimmed) {
            Ok(()) => {
                self.status_message = "OK".to_string();
                self.status_is_error = false;
            }
            Err(e) => {
                self.status_message = e.to_string();
                self.status_is_error = true;
            }
        }

        if self.console.should_quit() {
            self.should_quit = true;
        }
        // Auto-scroll console to bottom
        self.transcript_scroll = usize::MAX;
    }

    fn history_back(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            Some(pos) => pos.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_pos = Some(pos);
        self.set_input(self.history[pos].clone());
    }

    fn history_forward(&mut self) {
        match self.history_pos {
            Some(pos) if pos + 1 < self.history.len() => {
                self.history_pos = Some(pos + 1);
                self.set_input(self.history[pos + 1].clone());
            }
            Some(_) => {
                self.history_pos = None;
                self.set_input(String::new());
            }
            None => {}
        }
    }

    fn set_input(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.input = text;
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}
