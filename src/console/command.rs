//! Command line parsing
//!
//! Each input line is parsed once into a [`Command`]. Everything that can be
//! checked without a session is checked here: argument counts, the `alloc`
//! kind, and length tokens. Address tokens stay as text because they can only
//! be validated against the tables at the moment the command runs.

use super::errors::CommandError;
use crate::expr::parse_length;
use crate::session::constants::MAX_EXEC_ARGS;
use crate::session::errors::LengthError;
use crate::session::variables::VariableKind;
use std::path::PathBuf;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Alloc {
        kind: VariableKind,
        size: u64,
    },
    Free {
        addr: String,
    },
    Read {
        addr: String,
        length: Option<u64>,
        file: Option<PathBuf>,
    },
    Write {
        addr: String,
        length: Option<u64>,
        file: PathBuf,
        force_code: bool,
    },
    Set {
        addr: String,
        value: String,
    },
    Get {
        addr: String,
        name: String,
    },
    Local {
        addr: String,
        name: String,
    },
    Exec {
        addr: String,
        args: Vec<String>,
    },
    Vars,
    Echo {
        text: String,
    },
    Script {
        file: PathBuf,
    },
    Help,
    Quit,
}

/// Usage line for each command, in help order
pub const USAGE: [(&str, &str); 14] = [
    ("alloc", "alloc data|code length"),
    ("free", "free addr"),
    ("read", "read addr [length] [file]"),
    ("write", "write addr [length] file"),
    ("writecode", "writecode addr [length] file"),
    ("set", "set addr value"),
    ("get", "get addr name"),
    ("local", "local addr name"),
    ("exec", "exec addr [arg0] ... [arg3]"),
    ("vars", "vars"),
    ("echo", "echo [text]"),
    ("script", "script file"),
    ("help", "help"),
    ("quit", "quit"),
];

fn usage(command: &'static str) -> CommandError {
    let usage = USAGE
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, usage)| *usage)
        .unwrap_or(command);
    CommandError::Usage { command, usage }
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();
        let owned = |i: usize| args[i].to_string();

        let command = match name {
            "alloc" => {
                let [kind, length] = args.as_slice() else {
                    return Err(usage("alloc"));
                };
                let kind = VariableKind::from_name(kind).ok_or_else(|| usage("alloc"))?;
                Command::Alloc {
                    kind,
                    size: parse_length(length)?,
                }
            }
            "free" => match args.len() {
                1 => Command::Free { addr: owned(0) },
                _ => return Err(usage("free")),
            },
            "read" => match args.len() {
                1 => Command::Read {
                    addr: owned(0),
                    length: None,
                    file: None,
                },
                2 => match parse_length(args[1]) {
                    Ok(length) => Command::Read {
                        addr: owned(0),
                        length: Some(length),
                        file: None,
                    },
                    Err(LengthError::UnknownLengthSpecifier { .. }) => Command::Read {
                        addr: owned(0),
                        length: None,
                        file: Some(PathBuf::from(args[1])),
                    },
                    Err(e) => return Err(e.into()),
                },
                3 => Command::Read {
                    addr: owned(0),
                    length: Some(parse_length(args[1])?),
                    file: Some(PathBuf::from(args[2])),
                },
                _ => return Err(usage("read")),
            },
            "write" | "writecode" => {
                let force_code = name == "writecode";
                let (length, file) = match args.len() {
                    2 => (None, args[1]),
                    3 => (Some(parse_length(args[1])?), args[2]),
                    _ => return Err(usage(if force_code { "writecode" } else { "write" })),
                };
                Command::Write {
                    addr: owned(0),
                    length,
                    file: PathBuf::from(file),
                    force_code,
                }
            }
            "set" => match args.len() {
                2 => Command::Set {
                    addr: owned(0),
                    value: owned(1),
                },
                _ => return Err(usage("set")),
            },
            "get" => match args.len() {
                2 => Command::Get {
                    addr: owned(0),
                    name: owned(1),
                },
                _ => return Err(usage("get")),
            },
            "local" => match args.len() {
                2 => Command::Local {
                    addr: owned(0),
                    name: owned(1),
                },
                _ => return Err(usage("local")),
            },
            "exec" => match args.split_first() {
                Some((addr, rest)) if rest.len() <= MAX_EXEC_ARGS => Command::Exec {
                    addr: addr.to_string(),
                    args: rest.iter().map(|a| a.to_string()).collect(),
                },
                _ => return Err(usage("exec")),
            },
            "vars" => Command::Vars,
            "echo" | "print" => Command::Echo {
                text: rest.to_string(),
            },
            "script" => match args.len() {
                1 => Command::Script {
                    file: PathBuf::from(args[0]),
                },
                _ => return Err(usage("script")),
            },
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert!(Command::parse("").unwrap().is_none());
        assert!(Command::parse("   ").unwrap().is_none());
        assert!(Command::parse("# alloc data 4").unwrap().is_none());
    }

    #[test]
    fn test_alloc() {
        assert_eq!(
            parse("alloc code 0x100"),
            Command::Alloc {
                kind: VariableKind::Code,
                size: 0x100
            }
        );
        assert_eq!(
            parse("alloc data int"),
            Command::Alloc {
                kind: VariableKind::Data,
                size: 4
            }
        );
        assert!(matches!(
            Command::parse("alloc heap 4"),
            Err(CommandError::Usage { command: "alloc", .. })
        ));
        assert!(matches!(
            Command::parse("alloc data bogus"),
            Err(CommandError::Length(_))
        ));
    }

    #[test]
    fn test_read_disambiguates_length_and_file() {
        assert_eq!(
            parse("read $0 0x10"),
            Command::Read {
                addr: "$0".to_string(),
                length: Some(0x10),
                file: None
            }
        );
        assert_eq!(
            parse("read $0 dump.bin"),
            Command::Read {
                addr: "$0".to_string(),
                length: None,
                file: Some(PathBuf::from("dump.bin"))
            }
        );
        assert_eq!(
            parse("read 0x1000 int32 out.bin"),
            Command::Read {
                addr: "0x1000".to_string(),
                length: Some(4),
                file: Some(PathBuf::from("out.bin"))
            }
        );
    }

    #[test]
    fn test_write_variants() {
        assert_eq!(
            parse("writecode $1 payload.bin"),
            Command::Write {
                addr: "$1".to_string(),
                length: None,
                file: PathBuf::from("payload.bin"),
                force_code: true
            }
        );
        assert!(matches!(
            Command::parse("write $1"),
            Err(CommandError::Usage { command: "write", .. })
        ));
    }

    #[test]
    fn test_exec_argument_limit() {
        assert_eq!(
            parse("exec $0 1 2 %#"),
            Command::Exec {
                addr: "$0".to_string(),
                args: vec!["1".to_string(), "2".to_string(), "%#".to_string()]
            }
        );
        assert!(matches!(
            Command::parse("exec $0 1 2 3 4 5"),
            Err(CommandError::Usage { command: "exec", .. })
        ));
        assert!(Command::parse("exec").is_err());
    }

    #[test]
    fn test_echo_keeps_spacing() {
        assert_eq!(
            parse("echo hello   world"),
            Command::Echo {
                text: "hello   world".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            Command::parse("compile a.c a"),
            Err(CommandError::UnknownCommand(name)) if name == "compile"
        ));
    }
}
