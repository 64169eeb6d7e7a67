//! Command execution against a session
//!
//! [`Console`] is the thin consumer of the session: every command parses its
//! address tokens, resolves them through [`Session`], performs at most one
//! device operation, and writes what happened to the [`Transcript`].

use super::command::Command;
use super::errors::CommandError;
use super::help::HELP_TEXT;
use super::hexdump::hex_dump;
use super::transcript::Transcript;
use crate::device::Device;
use crate::expr::{parse_address, AddressReference};
use crate::session::errors::{AddressError, TableError};
use crate::session::locals::normalize_name;
use crate::session::Session;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Deepest allowed `script` nesting
pub const MAX_SCRIPT_DEPTH: usize = 8;

/// Operator console: a session plus its output log
#[derive(Debug)]
pub struct Console<D> {
    session: Session<D>,
    transcript: Transcript,
    script_depth: usize,
    should_quit: bool,
}

impl<D: Device> Console<D> {
    pub fn new(device: D) -> Self {
        Console {
            session: Session::new(device),
            transcript: Transcript::new(),
            script_depth: 0,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<D> {
        &mut self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Set once a `quit` command has run
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run one operator line, recording it and any error in the transcript
    pub fn execute_line(&mut self, line: &str) -> Result<(), CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        self.transcript.input(line);
        let result = self.run_line(line);
        if let Err(e) = &result {
            self.transcript.error(e.to_string());
        }
        result
    }

    /// Run an already-parsed command, recording any error in the transcript
    pub fn execute(&mut self, command: Command) -> Result<(), CommandError> {
        let result = self.run(command);
        if let Err(e) = &result {
            self.transcript.error(e.to_string());
        }
        result
    }

    /// Replay a command file, stopping at the first failing line
    pub fn run_script(&mut self, path: &Path) -> Result<(), CommandError> {
        if self.script_depth >= MAX_SCRIPT_DEPTH {
            return Err(CommandError::ScriptDepth {
                limit: MAX_SCRIPT_DEPTH,
            });
        }

        let source = fs::read_to_string(path).map_err(|source| CommandError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "running script");

        self.script_depth += 1;
        let result = self.run_script_source(path, &source);
        self.script_depth -= 1;
        result
    }

    fn run_script_source(&mut self, path: &Path, source: &str) -> Result<(), CommandError> {
        for (number, line) in source.lines().enumerate() {
            if self.should_quit {
                break;
            }
            let command = line.trim();
            if command.is_empty() || command.starts_with('#') {
                continue;
            }

            self.transcript.input(command);
            self.run_line(command)
                .map_err(|source| CommandError::Script {
                    path: path.to_path_buf(),
                    line: number + 1,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    fn run_line(&mut self, line: &str) -> Result<(), CommandError> {
        match Command::parse(line)? {
            Some(command) => self.run(command),
            None => Ok(()),
        }
    }

    /// Execute a parsed command
    pub fn run(&mut self, command: Command) -> Result<(), CommandError> {
        debug!(?command, "dispatch");

        match command {
            Command::Alloc { kind, size } => {
                let index = self.session.allocate(kind, size)?;
                let variable = self.session.variables().get(index)?;
                self.transcript.output(format!(
                    "${} = 0x{:x} (0x{:x} bytes of {})",
                    index, variable.address, variable.size, kind
                ));
            }
            Command::Free { addr } => self.free(&addr)?,
            Command::Read { addr, length, file } => self.read(&addr, length, file.as_deref())?,
            Command::Write {
                addr,
                length,
                file,
                force_code,
            } => self.write(&addr, length, &file, force_code)?,
            Command::Set { addr, value } => {
                let target = self.session.resolve_token(&addr)?;
                let value = self.session.resolve_token(&value)?.address;
                self.session.write_word(&target, value)?;
                self.transcript
                    .output(format!("0x{:x} <- 0x{:x}", target.address, value));
            }
            Command::Get { addr, name } => {
                let name = normalize_name(&name)?.to_string();
                let target = self.session.resolve_token(&addr)?;
                let value = self.session.read_word(&target)?;
                self.session.set_local(&name, value)?;
                self.session.record_last_result(value);
                self.transcript.output(format!("%{} = 0x{:x}", name, value));
            }
            Command::Local { addr, name } => {
                let name = normalize_name(&name)?.to_string();
                let value = self.session.resolve_token(&addr)?.address;
                self.session.set_local(&name, value)?;
                self.transcript.output(format!("%{} = 0x{:x}", name, value));
            }
            Command::Exec { addr, args } => {
                let target = self.session.resolve_token(&addr)?;
                let args = args
                    .iter()
                    .map(|a| self.session.resolve_token(a).map(|t| t.address))
                    .collect::<Result<Vec<u64>, AddressError>>()?;
                let value = self.session.execute(&target, &args)?;
                self.transcript.output(format!("%# = 0x{:x}", value));
            }
            Command::Vars => self.print_vars(),
            Command::Echo { text } => {
                let reply = self.session.echo(&text)?;
                self.transcript.output(reply);
            }
            Command::Script { file } => self.run_script(&file)?,
            Command::Help => self.transcript.output(HELP_TEXT),
            Command::Quit => self.should_quit = true,
        }

        Ok(())
    }

    fn free(&mut self, addr: &str) -> Result<(), CommandError> {
        let index = match parse_address(addr, &self.session) {
            Ok(AddressReference::VariableSlot(index, 0)) => {
                self.session.free(index)?;
                index
            }
            Ok(reference) => {
                let target = self.session.resolve(&reference)?;
                self.session.free_address(target.address)?
            }
            // A stale `$N` on free is a double free
            Err(AddressError::FreedVariable { index }) => {
                return Err(TableError::UnallocatedVariable { index }.into());
            }
            Err(e) => return Err(e.into()),
        };
        self.transcript.output(format!("freed ${}", index));
        Ok(())
    }

    fn read(
        &mut self,
        addr: &str,
        length: Option<u64>,
        file: Option<&Path>,
    ) -> Result<(), CommandError> {
        let target = self.session.resolve_token(addr)?;
        let length = self.session.length_for(&target, length)?;
        let bytes = self.session.read(&target, length)?;

        match file {
            Some(path) => {
                fs::write(path, &bytes).map_err(|source| CommandError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                self.transcript.output(format!(
                    "saved 0x{:x} bytes from 0x{:x} to {}",
                    bytes.len(),
                    target.address,
                    path.display()
                ));
            }
            None => {
                for row in hex_dump(target.address, &bytes) {
                    self.transcript.output(row);
                }
            }
        }
        Ok(())
    }

    fn write(
        &mut self,
        addr: &str,
        length: Option<u64>,
        path: &Path,
        force_code: bool,
    ) -> Result<(), CommandError> {
        let target = self.session.resolve_token(addr)?;
        let mut bytes = fs::read(path).map_err(|source| CommandError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(requested) = length {
            let available = bytes.len() as u64;
            if available < requested {
                return Err(CommandError::ShortFile {
                    path: path.to_path_buf(),
                    available,
                    requested,
                });
            }
            bytes.truncate(requested as usize);
        }

        self.session
            .length_for(&target, Some(bytes.len() as u64))?;
        self.session.write(&target, &bytes, force_code)?;

        let memory = if force_code || target.is_code {
            "code"
        } else {
            "data"
        };
        self.transcript.output(format!(
            "wrote 0x{:x} bytes of {} to 0x{:x}",
            bytes.len(),
            memory,
            target.address
        ));
        Ok(())
    }

    fn print_vars(&mut self) {
        let mut lines = Vec::new();

        for (index, variable) in self.session.variables().list() {
            lines.push(format!(
                "${}: 0x{:X}, size: 0x{:X}, code: {}",
                index, variable.address, variable.size, variable.is_code
            ));
        }
        for (name, value) in self.session.locals().list() {
            lines.push(format!("%{}: 0x{:X}", name, value));
        }
        if let Some(value) = self.session.last_result() {
            lines.push(format!("%#: 0x{:X}", value));
        }

        if lines.is_empty() {
            self.transcript.output("(no variables)");
        }
        for line in lines {
            self.transcript.output(line);
        }
    }
}
