use std::{fmt, io, result, time::Duration};
use thiserror;

/// Errors from the job coordinator itself, as opposed to the outcome of a job.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No such job is in flight")]
    NotFound,
    #[error("Job coordinator exited")]
    CoordinatorExited,
}

pub type Result<T> = result::Result<T, Error>;

/// Failure categories a finished job can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ArtifactCreationError,
    SpawnError,
    CompileError,
    CompileTimeout,
    RuntimeError,
    ExecutionTimeout,
    OutputLimitExceeded,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ArtifactCreationError => "ArtifactCreationError",
            ErrorKind::SpawnError => "SpawnError",
            ErrorKind::CompileError => "CompileError",
            ErrorKind::CompileTimeout => "CompileTimeout",
            ErrorKind::RuntimeError => "RuntimeError",
            ErrorKind::ExecutionTimeout => "ExecutionTimeout",
            ErrorKind::OutputLimitExceeded => "OutputLimitExceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a job. The message is meant for the submitter.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn artifact(err: io::Error) -> Self {
        Self::new(
            ErrorKind::ArtifactCreationError,
            format!("Error: Unable to create program file: {}", err),
        )
    }

    /// Map a runner error from the compile step.
    pub(crate) fn compile(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { .. } => Self::new(ErrorKind::SpawnError, err.to_string()),
            ProcessError::Timeout(deadline) => Self::new(
                ErrorKind::CompileTimeout,
                format!(
                    "Error: Compilation timed out. Your code took too long to compile, exceeded {} seconds.",
                    seconds(deadline)
                ),
            ),
            // compile runs uncapped, but keep the mapping total
            ProcessError::OutputLimit { .. } | ProcessError::Failed(_) | ProcessError::Io(_) => {
                Self::new(ErrorKind::CompileError, diagnostics(err))
            }
        }
    }

    /// Map a runner error from the execute step.
    pub(crate) fn execute(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { .. } => Self::new(ErrorKind::SpawnError, err.to_string()),
            ProcessError::Timeout(deadline) => Self::new(
                ErrorKind::ExecutionTimeout,
                format!(
                    "Error: Execution timed out. Your code took too long to execute, exceeded {} seconds.",
                    seconds(deadline)
                ),
            ),
            ProcessError::OutputLimit { limit } => Self::new(
                ErrorKind::OutputLimitExceeded,
                format!(
                    "Error: Output limit exceeded. Your program wrote more than {} bytes.",
                    limit
                ),
            ),
            ProcessError::Failed(_) | ProcessError::Io(_) => {
                Self::new(ErrorKind::RuntimeError, diagnostics(err))
            }
        }
    }
}

/// Collected stderr is passed through untouched; anything else gets its display text.
fn diagnostics(err: ProcessError) -> String {
    match err {
        ProcessError::Failed(stderr) => stderr,
        other => other.to_string(),
    }
}

/// `10s` -> "10", `1500ms` -> "1.5"
pub(crate) fn seconds(duration: Duration) -> String {
    duration.as_secs_f64().to_string()
}

/// Why a supervised process did not produce a usable stdout.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("Error: Unable to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    /// Carries the collected stderr, or a description of the exit status when stderr was empty.
    #[error("{0}")]
    Failed(String),
    #[error("deadline of {0:?} exceeded")]
    Timeout(Duration),
    #[error("stdout exceeded {limit} bytes")]
    OutputLimit { limit: usize },
    #[error("i/o error while supervising process: {0}")]
    Io(#[from] io::Error),
}

/// Logged when workspace removal fails. Never returned to a caller.
#[derive(thiserror::Error, Debug)]
#[error("failed to remove {path}: {source}")]
pub struct CleanupError {
    pub path: String,
    #[source]
    pub source: io::Error,
}
