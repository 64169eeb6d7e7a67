//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard event loop, input line and history
//! - **[`panes`]**: stateless render functions for each visible pane (console,
//!   variables, input, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a [`Console`] and
//! call [`App::run`] to start the event loop.
//!
//! [`Console`]: crate::console::Console
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
