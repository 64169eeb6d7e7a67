//! Operator command layer
//!
//! This module turns text lines into session operations:
//! - [`command`]: parses a line into a closed [`Command`] enum
//! - [`engine`]: [`Console`], which runs commands against a session
//! - [`transcript`]: the output log rendered by the TUI and batch mode
//! - [`errors`]: [`CommandError`], wrapping every lower-layer error
//! - `hexdump`, `help`: output formatting
//!
//! # Scripts
//!
//! `script file` feeds each line of a file through the same path as typed
//! input. Execution stops at the first failing line and the error carries the
//! file and line number.

pub mod command;
pub mod engine;
pub mod errors;
mod help;
mod hexdump;
pub mod transcript;

pub use command::Command;
pub use engine::Console;
pub use errors::CommandError;
pub use transcript::{LineKind, Transcript, TranscriptLine};
