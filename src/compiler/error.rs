//! Error kinds for the two phases of a Riddical run.
//!
//! Compile errors carry the line index of the offending source line where
//! one exists. Run errors carry a negative process status so the binary can
//! report them the same way the interpreter always has.

use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    EmptySource,
    MalformedSection(&'static str),
    SectionOverlap,
    UnexpectedToken { line: usize, token: String },
    MissingArguments { line: usize, name: String },
    BadDeclaration { line: usize, reason: &'static str },
    OutOfMemory,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use CompileError::*;
        match self {
            EmptySource => write!(f, "could not tokenize source file"),
            MalformedSection(name) => write!(f, "malformed {} section", name),
            SectionOverlap => write!(f, "sections overlap"),
            UnexpectedToken { line, token } => {
                write!(f, "line {}: unexpected token {}", line, token)
            }
            MissingArguments { line, name } => {
                write!(f, "line {}: instruction with no arguments {}", line, name)
            }
            BadDeclaration { line, reason } => {
                write!(f, "line {}: incorrect variable declaration: {}", line, reason)
            }
            OutOfMemory => write!(f, "no memory"),
        }
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug)]
pub enum RunError {
    UnknownVariable(String),
    BadWriteMode,
    BadDestination(String),
    DivisionByZero,
    NotImplemented(String),
    Io(io::Error),
}

impl RunError {
    /// Status returned to the process when a run fails. Kept negative to
    /// stay distinct from every reachable program exit value path in `main`.
    pub fn status(&self) -> i32 {
        match self {
            RunError::NotImplemented(_) => -2,
            _ => -1,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use RunError::*;
        match self {
            UnknownVariable(name) => {
                write!(f, "in section Start: unknown variable {}", name)
            }
            BadWriteMode => write!(
                f,
                "in section Start: second argument of write must be a number literal 0 or 1"
            ),
            BadDestination(op) => write!(
                f,
                "in section Start: second argument of {} must be a register or a variable",
                op
            ),
            DivisionByZero => write!(f, "in section Start: division by zero"),
            NotImplemented(name) => write!(f, "in section Start: not implemented: {}", name),
            Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for RunError {}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> Self {
        RunError::Io(e)
    }
}
