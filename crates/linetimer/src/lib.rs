#![forbid(unsafe_code)]
//! Run a command and prefix every line of its stdout and stderr with the time
//! elapsed since it started, e.g. `[1:23] compiling...`.
//!
//! - [`LinePrefixer`] turns a raw async byte stream into a prefixed one, one
//!   read at a time, without buffering whole lines. Line-start state carries
//!   across reads; a newline that ends a read is prefixed on the next read.
//! - [`pump`] drains a prefixer into a sink. Stdout and stderr each get their
//!   own pump and run concurrently; they share only the start instant.
//! - [`TimedCommand`] spawns the child with stdin inherited, drives both pumps,
//!   optionally prints a final `[M:SS] ` total line, and reports the child's
//!   exit status.
//!
//! ```rust,no_run
//! use linetimer::TimedCommand;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = TimedCommand::new("make").arg("test").run().await?;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

pub mod cli;
mod clock;
mod command;
mod defaults;
mod error;
mod prefix;
mod pump;

pub use clock::{Clock, Elapsed, FixedClock, Stopwatch};
pub use command::{exit_code, RunOutcome, Sinks, TimedCommand};
pub use error::LineTimerError;
pub use prefix::{LineCursor, LinePrefixer};
pub use pump::{pump, StreamKind};
