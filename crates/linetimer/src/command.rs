use std::{
    ffi::OsString,
    io,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    process::Command,
};
use tracing::{debug, warn};

use crate::clock::{Clock, Stopwatch};
use crate::defaults::READ_BUFFER_CAPACITY;
use crate::error::LineTimerError;
use crate::prefix::LinePrefixer;
use crate::pump::{pump, StreamKind};

/// Result of a child run that the wrapper itself completed without failure.
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    pub status: ExitStatus,
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Exit code the wrapper should report for this child.
    pub fn exit_code(&self) -> i32 {
        exit_code(self.status)
    }
}

/// Maps a child's exit status to the wrapper's own exit code.
///
/// Signal-terminated children on Unix map to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Destinations for the child's prefixed stdout and stderr.
pub struct Sinks<O, E> {
    pub stdout: O,
    pub stderr: E,
}

/// Builder and runner for a child command whose output is time-prefixed.
#[derive(Debug, Clone)]
pub struct TimedCommand {
    program: OsString,
    args: Vec<OsString>,
    total_marker: bool,
    buffer_capacity: usize,
}

impl TimedCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            total_marker: true,
            buffer_capacity: READ_BUFFER_CAPACITY,
        }
    }

    /// Builds a command from `[program, args...]`.
    pub fn from_argv<I, S>(argv: I) -> Result<Self, LineTimerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().ok_or(LineTimerError::EmptyCommand)?;
        Ok(Self::new(program).args(argv))
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Print a final `[M:SS] ` line on stdout after the child exits.
    pub fn total_marker(mut self, enabled: bool) -> Self {
        self.total_marker = enabled;
        self
    }

    /// Size of each raw read from the child's pipes.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Runs the child with prefixed output sent to this process's stdout and
    /// stderr, timed by a [`Stopwatch`].
    pub async fn run(&self) -> Result<RunOutcome, LineTimerError> {
        let sinks = Sinks {
            stdout: tokio::io::stdout(),
            stderr: tokio::io::stderr(),
        };
        self.run_with(sinks, Stopwatch::start).await
    }

    /// Runs the child, writing prefixed output into `sinks`.
    ///
    /// `start_clock` is invoked once, immediately after the child has been
    /// spawned. Stdin is inherited untouched.
    pub async fn run_with<O, E, C, F>(
        &self,
        sinks: Sinks<O, E>,
        start_clock: F,
    ) -> Result<RunOutcome, LineTimerError>
    where
        O: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
        C: Clock,
        F: FnOnce() -> C,
    {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| LineTimerError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let clock = start_clock();
        debug!(program = ?self.program, pid = ?child.id(), "child started");

        let stdout = child.stdout.take().ok_or(LineTimerError::MissingStdout)?;
        let stderr = child.stderr.take().ok_or(LineTimerError::MissingStderr)?;

        let Sinks {
            stdout: mut stdout_sink,
            stderr: stderr_sink,
        } = sinks;

        let stdout_pump = pump(
            LinePrefixer::with_capacity(stdout, clock, self.buffer_capacity),
            &mut stdout_sink,
            StreamKind::Stdout,
        );
        let stderr_pump = pump(
            LinePrefixer::with_capacity(stderr, clock, self.buffer_capacity),
            stderr_sink,
            StreamKind::Stderr,
        );
        let (stdout_res, stderr_res, wait_res) =
            tokio::join!(stdout_pump, stderr_pump, child.wait());

        let elapsed = clock.elapsed();
        if self.total_marker {
            if let Err(err) = write_total_marker(&mut stdout_sink, clock).await {
                warn!(error = %err, "failed to write total elapsed marker");
            }
        }

        let status = wait_res.map_err(LineTimerError::Wait)?;
        debug!(%status, ?elapsed, "child exited");
        let outcome = RunOutcome { status, elapsed };
        if !status.success() {
            return Ok(outcome);
        }
        stdout_res.map_err(LineTimerError::StdoutCopy)?;
        stderr_res.map_err(LineTimerError::StderrCopy)?;
        Ok(outcome)
    }
}

async fn write_total_marker<W, C>(sink: &mut W, clock: C) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    C: Clock,
{
    let line = format!("{}\n", clock.stamp());
    sink.write_all(line.as_bytes()).await?;
    sink.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_argv_splits_program_and_args() {
        let command = TimedCommand::from_argv(["make", "-j4", "test"]).unwrap();
        assert_eq!(command.program(), "make");
        assert_eq!(command.args, vec![OsString::from("-j4"), OsString::from("test")]);
        assert!(command.total_marker);
        assert_eq!(command.buffer_capacity, READ_BUFFER_CAPACITY);
    }

    #[test]
    fn from_argv_rejects_empty_argv() {
        let err = TimedCommand::from_argv(Vec::<OsString>::new()).unwrap_err();
        assert!(matches!(err, LineTimerError::EmptyCommand));
    }

    #[test]
    fn buffer_capacity_is_at_least_one() {
        let command = TimedCommand::new("true").buffer_capacity(0);
        assert_eq!(command.buffer_capacity, 1);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_maps_codes_and_signals() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // Raw wait status 9 = killed by SIGKILL.
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
