use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches, Parser};
use tracing_subscriber::EnvFilter;

use crate::command::TimedCommand;
use crate::defaults::log_filter_value;

#[derive(Debug, Parser)]
#[command(version, about = "Prefix each line of a command's output with the elapsed time")]
pub struct Cli {
    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

/// Which wrapper flavor is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Prints a trailing total-elapsed line on stdout.
    LineTimer,
    /// Only prefixes the child's lines.
    StdTimer,
}

impl Variant {
    pub fn bin_name(self) -> &'static str {
        match self {
            Variant::LineTimer => "linetimer",
            Variant::StdTimer => "stdtimer",
        }
    }

    fn total_marker(self) -> bool {
        matches!(self, Variant::LineTimer)
    }
}

pub fn parse_args<I, T>(variant: Variant, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = Cli::command()
        .name(variant.bin_name())
        .bin_name(variant.bin_name())
        .try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}

/// Installs a stderr subscriber when `LINETIMER_LOG` holds a filter.
///
/// Without it nothing is logged, so the child's prefixed stderr stays clean.
pub fn init_tracing() {
    let Some(directives) = log_filter_value() else {
        return;
    };
    let filter = EnvFilter::new(directives.to_string_lossy());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

/// Entry point shared by the binaries. Returns the process exit code.
pub fn main_with(variant: Variant) -> i32 {
    init_tracing();

    let cli = match parse_args(variant, std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 1 } else { 0 };
        }
    };

    let command = match TimedCommand::from_argv(cli.command) {
        Ok(command) => command.total_marker(variant.total_marker()),
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return 1;
        }
    };

    match runtime.block_on(command.run()) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn captures_command_and_its_flags_verbatim() {
        let cli = parse_args(
            Variant::LineTimer,
            ["linetimer", "cargo", "test", "-q", "--release"],
        )
        .unwrap();
        assert_eq!(
            cli.command,
            ["cargo", "test", "-q", "--release"]
                .iter()
                .map(OsString::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn child_help_flag_is_not_ours() {
        let cli = parse_args(Variant::StdTimer, ["stdtimer", "ls", "--help"]).unwrap();
        assert_eq!(cli.command, vec![OsString::from("ls"), OsString::from("--help")]);
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        let err = parse_args(Variant::LineTimer, ["linetimer"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
        assert!(err.to_string().contains("Usage: linetimer"));
    }

    #[test]
    fn only_linetimer_prints_total() {
        assert!(Variant::LineTimer.total_marker());
        assert!(!Variant::StdTimer.total_marker());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
