use std::ffi::OsString;

use thiserror::Error;

/// Failures of the wrapper itself, as opposed to the child's own exit status.
#[derive(Debug, Error)]
pub enum LineTimerError {
    #[error("no command given")]
    EmptyCommand,
    #[error("failed to spawn `{}`: {source}", program.to_string_lossy())]
    Spawn {
        program: OsString,
        #[source]
        source: std::io::Error,
    },
    #[error("internal error: missing stdout pipe")]
    MissingStdout,
    #[error("internal error: missing stderr pipe")]
    MissingStderr,
    #[error("error running command: {0}")]
    Wait(#[source] std::io::Error),
    #[error("error copying stdout: {0}")]
    StdoutCopy(#[source] std::io::Error),
    #[error("error copying stderr: {0}")]
    StderrCopy(#[source] std::io::Error),
}
