use anyhow::{Context, Result};
use argh::FromArgs;
use matrix_calc::banner::{write_intro, write_outro};
use matrix_calc::io_adapters::ReaderLines;
use matrix_calc::registry::DEFAULT_MATRIX_NAMES;
use matrix_calc::{Interpreter, Registry, SessionEnd, SessionOptions};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::Level;

#[derive(FromArgs)]
/// Interactive calculator for named 4x4 matrices. Reads one instruction per line
/// from standard input until `stop`.
struct Args {
    #[argh(switch, short = 'q')]
    /// do not print the welcome and goodbye banners.
    quiet: bool,

    #[argh(switch, short = 'e')]
    /// echo every input line after the prompt, for readable transcripts of redirected input.
    echo: bool,

    #[argh(switch, short = 'v')]
    /// log parsing and dispatch decisions to standard error.
    verbose: bool,

    #[argh(option, long = "matrix")]
    /// name of a matrix slot; repeat to define several. Defaults to MAT_A through MAT_F.
    matrices: Vec<String>,
}

fn main() -> Result<ExitCode> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let registry = if args.matrices.is_empty() {
        Registry::new(DEFAULT_MATRIX_NAMES)
    } else {
        Registry::new(args.matrices)
    }
    .context("invalid --matrix names")?;

    let options = SessionOptions {
        echo: args.echo,
        ..SessionOptions::default()
    };
    let mut calc = Interpreter::new(registry, options);

    if !args.quiet {
        write_intro(&mut io::stdout(), calc.registry())?;
    }

    let end = if io::stdin().is_terminal() {
        calc.repl()?
    } else {
        let mut lines = ReaderLines::new(io::stdin().lock());
        calc.run(&mut lines, &mut io::stdout())?
    };

    if end == SessionEnd::Stopped && !args.quiet {
        write_outro(&mut io::stdout())?;
    }
    Ok(exit_code(end))
}

/// Only a session closed by `stop` counts as success.
fn exit_code(end: SessionEnd) -> ExitCode {
    match end {
        SessionEnd::Stopped => ExitCode::SUCCESS,
        SessionEnd::EndOfInput => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_follows_session_end() {
        assert_eq!(exit_code(SessionEnd::Stopped), ExitCode::SUCCESS);
        assert_eq!(exit_code(SessionEnd::EndOfInput), ExitCode::FAILURE);
    }
}
