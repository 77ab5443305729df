//! Error taxonomy shared by every plyboard crate.
//!
//! - [`ParsingError`]: malformed notation, carries a line/column and an optional
//!   example of valid syntax
//! - [`BuildError`]: a host-supplied program failed validation, tagged with the
//!   role ([`Fault`]) it was supplied for
//! - everything else is a message-carrying variant of [`PlyError`]

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the workspace.
pub type PlyResult<T> = Result<T, PlyError>;

/// Top-level error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlyError {
    /// Malformed notation text.
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    /// Invalid access to graph state (e.g. a grid coordinate with no node).
    #[error("{0}")]
    Runtime(String),

    /// A derived property or feature that has no implementation.
    #[error("Feature {0} is not yet implemented.")]
    NotImplemented(String),

    /// A recognised property rejected the requested value.
    #[error("{0}")]
    Property(String),

    /// Command misuse (double execute, revert before execute, empty history).
    #[error("{0}")]
    Command(String),

    /// A host-supplied case or solver failed validation.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A deep merge refused its input.
    #[error("{0}")]
    Merge(String),

    /// Dequeue or peek on an empty queue.
    #[error("queue is empty")]
    QueueEmpty,

    /// A user-supplied collaborator raised while being called.
    #[error("{0}")]
    Script(String),
}

impl PlyError {
    /// Create a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        PlyError::Runtime(msg.into())
    }

    /// Create a not-implemented error for the named feature.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        PlyError::NotImplemented(feature.into())
    }

    /// Create a property rejection error.
    pub fn property(msg: impl Into<String>) -> Self {
        PlyError::Property(msg.into())
    }

    /// Create a command misuse error.
    pub fn command(msg: impl Into<String>) -> Self {
        PlyError::Command(msg.into())
    }

    /// Create a script error.
    pub fn script(msg: impl Into<String>) -> Self {
        PlyError::Script(msg.into())
    }

    /// Create a merge error.
    pub fn merge(msg: impl Into<String>) -> Self {
        PlyError::Merge(msg.into())
    }
}

/// Malformed notation.
///
/// `line` and `column` are 1-based. A column of 0 means the position inside the
/// line is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
    /// 1-based line number in the source text.
    pub line: usize,
    /// 1-based column, 0 when unknown.
    pub column: usize,
    /// What went wrong.
    pub message: String,
    /// A line of valid syntax for the failing construct.
    pub example: Option<String>,
}

impl ParsingError {
    /// Create a parsing error at a 1-based line and column.
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            example: None,
        }
    }

    /// Attach an example of valid syntax.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsing error at line {}, col {}: {}.",
            self.line, self.column, self.message
        )?;
        if let Some(example) = &self.example {
            write!(f, " EXAMPLE SYNTAX: \"{}\".", example)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParsingError {}

/// Which host-supplied program a build failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fault {
    /// The rules program (case).
    Case,
    /// The solver program.
    Solver,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Case => write!(f, "case"),
            Fault::Solver => write!(f, "solver"),
        }
    }
}

/// A host-supplied program was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Error evaluating {fault} code: {message}")]
pub struct BuildError {
    /// The role that failed.
    pub fault: Fault,
    /// Why it failed.
    pub message: String,
}

impl BuildError {
    /// Create a build error for the given role.
    pub fn new(fault: Fault, message: impl Into<String>) -> Self {
        Self {
            fault,
            message: message.into(),
        }
    }
}
