//! Errors reported by console commands
//!
//! [`CommandError`] wraps every lower-layer error so a command can use `?`
//! throughout. None of these end the session; the operator fixes the command
//! and tries again.

use crate::device::TransportError;
use crate::session::errors::{AddressError, LengthError, TableError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Length(#[from] LengthError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// First token is not a command
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    /// Wrong number or shape of arguments
    #[error("usage: {usage}")]
    Usage {
        command: &'static str,
        usage: &'static str,
    },

    /// Local file could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File has fewer bytes than the requested write length
    #[error("{} holds 0x{available:x} bytes, 0x{requested:x} requested", path.display())]
    ShortFile {
        path: PathBuf,
        available: u64,
        requested: u64,
    },

    /// Scripts calling scripts too deeply
    #[error("scripts nested deeper than {limit} levels")]
    ScriptDepth { limit: usize },

    /// A script line failed
    #[error("{}:{line}: {source}", path.display())]
    Script {
        path: PathBuf,
        line: usize,
        #[source]
        source: Box<CommandError>,
    },
}
