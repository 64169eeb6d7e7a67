//! TUI pane rendering modules
//!
//! Each pane is a stateless render function; scroll offsets live in
//! [`crate::ui::app::App`] and are clamped in place by the renderer.
//!
//! - [`transcript`]: console output with input/output/error coloring
//! - [`variables`]: live `$N` slots, `%name` aliases and `%#`
//! - [`input`]: the command line with cursor
//! - [`status`]: status bar with counters and keybindings

pub mod input;
pub mod status;
pub mod transcript;
pub mod variables;

pub use input::render_input_line;
pub use status::render_status_bar;
pub use transcript::render_transcript_pane;
pub use variables::render_variables_pane;
