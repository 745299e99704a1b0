//! Interactive session.
//!
//! One engine lives for the whole session, so a document can be loaded,
//! signed, saved and verified with the same key pair without exporting it.
//! Errors are reported and the prompt comes back; nothing here ends the
//! session except `quit` or end of input.

use docseal_core::{EngineError, SignatureEngine, SignatureSink};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::output::{self, Format};
use crate::picker::{PickerConfig, PickerError};

pub const PROMPT: &str = "docseal> ";

const HELP: &str = "\
Commands:
  load <path>                   select a document and compute its hash
  hash                          show the selected document and its hash
  sign                          sign the selected document
  save [name]                   write the signature (default from config)
  verify [document] [signature] verify a document against a saved signature
  pubkey [name]                 write this session's public key as PEM
  status                        show the current state
  help                          show this list
  quit                          leave the session

Arguments containing spaces can be wrapped in double quotes:
  verify \"my report.pdf\" \"my report.sig\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Hash,
    Sign,
    Save(Option<String>),
    Verify {
        document: Option<PathBuf>,
        signature: Option<String>,
    },
    PublicKey(Option<String>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },
}

impl Command {
    /// Parse one input line. The `load` argument is the rest of the line,
    /// so paths may contain spaces; other arguments may be double-quoted.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let word = word.to_ascii_lowercase();
        let takes_rest = matches!(word.as_str(), "load" | "open");
        let mut args = if takes_rest {
            Vec::new().into_iter()
        } else {
            split_args(rest)?.into_iter()
        };

        let command = match word.as_str() {
            "" => return Err(CommandError::Empty),
            "load" | "open" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage {
                        command: "load",
                        expected: "a document path",
                    });
                }
                Command::Load(PathBuf::from(unquote(rest)))
            }
            "hash" => Command::Hash,
            "sign" => Command::Sign,
            "save" => Command::Save(args.next()),
            "verify" => Command::Verify {
                document: args.next().map(PathBuf::from),
                signature: args.next(),
            },
            "pubkey" => Command::PublicKey(args.next()),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        if args.next().is_some() {
            return Err(CommandError::Usage {
                command: match command {
                    Command::Save(_) => "save",
                    Command::Verify { .. } => "verify",
                    Command::PublicKey(_) => "pubkey",
                    _ => "this command",
                },
                expected: "fewer arguments",
            });
        }

        Ok(command)
    }
}

/// Split on whitespace, keeping double-quoted runs together
fn split_args(rest: &str) -> Result<Vec<String>, CommandError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;

    for c in rest.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quoted {
        return Err(CommandError::Usage {
            command: "this command",
            expected: "a closing double quote",
        });
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Strip one pair of surrounding double quotes
fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Picker(#[from] PickerError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Command(_) => "CommandError",
            SessionError::Picker(_) => "SelectionError",
            SessionError::Engine(e) => e.kind(),
        }
    }
}

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

pub struct Session<S: SignatureSink> {
    engine: SignatureEngine<S>,
    picker: PickerConfig,
    format: Format,
}

impl<S: SignatureSink> Session<S> {
    pub fn new(engine: SignatureEngine<S>, picker: PickerConfig, format: Format) -> Self {
        Self {
            engine,
            picker,
            format,
        }
    }

    pub fn engine(&self) -> &SignatureEngine<S> {
        &self.engine
    }

    pub fn execute(&mut self, command: Command) -> Result<Step, SessionError> {
        let format = self.format;
        let text = match command {
            Command::Load(path) => {
                self.picker.select(&path)?;
                let info = self.engine.load(&path)?;
                output::document(&info, format)
            }
            Command::Hash => {
                let info = self
                    .engine
                    .document()
                    .ok_or(EngineError::NoDocumentLoaded)?;
                output::document(&info, format)
            }
            Command::Sign => {
                let info = self.engine.sign()?;
                output::signature(&info, format)
            }
            Command::Save(name) => {
                let name = name.unwrap_or_else(|| self.engine.config().default_sink.clone());
                self.engine.persist(&name)?;
                format!(
                    "Signature saved as '{}'",
                    self.engine.sink().locate(&name)
                )
            }
            Command::Verify {
                document,
                signature,
            } => {
                let signature =
                    signature.unwrap_or_else(|| self.engine.config().default_sink.clone());
                let result = match document {
                    Some(path) => {
                        self.picker.select(&path)?;
                        self.engine.verify(&path, &signature)?
                    }
                    None => self.engine.verify_loaded(&signature)?,
                };
                output::verification(result, format)
            }
            Command::PublicKey(name) => {
                let name = name.unwrap_or_else(|| {
                    crate::commands::public_key_name(&self.engine.config().default_sink)
                });
                self.engine.persist_public_key(&name)?;
                format!(
                    "Public key saved as '{}'",
                    self.engine.sink().locate(&name)
                )
            }
            Command::Status => output::state(
                self.engine.state(),
                self.engine.document().as_ref(),
                self.engine.signature().as_ref(),
                &self.engine.fingerprint(),
                format,
            ),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Step::Quit),
        };
        Ok(Step::Continue(text))
    }

    /// Parse and run one line of input
    pub fn execute_line(&mut self, line: &str) -> Result<Step, SessionError> {
        let command = Command::parse(line)?;
        tracing::debug!(?command, "Session command");
        self.execute(command)
    }

    /// Read commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                match self.execute_line(&line) {
                    Ok(Step::Continue(text)) => writeln!(out, "{}", text)?,
                    Ok(Step::Quit) => return Ok(()),
                    Err(e) => {
                        tracing::debug!(kind = e.kind(), error = %e, "Session command failed");
                        writeln!(out, "Error [{}]: {}", e.kind(), e)?;
                    }
                }
            }
            write!(out, "{}", PROMPT)?;
            out.flush()?;
        }

        writeln!(out)?;
        Ok(())
    }
}
