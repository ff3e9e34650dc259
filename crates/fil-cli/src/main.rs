// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! fil shading toolchain command-line interface.
//!
//! This is the main entry point for the `filc` command.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use fil_cli::commands;
use fil_cli::config::Overrides;
use fil_cli::console::{Console, DiagnosticStyle};
use miette::Result;
use tracing_subscriber::EnvFilter;

/// filc: front end and SPIR-V back end for the fil shading language
#[derive(Debug, Parser)]
#[command(name = "filc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// How compiler messages are rendered
    #[arg(long, value_enum, default_value_t, global = true)]
    diagnostics: DiagnosticStyle,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the token stream of a source file
    Tokens {
        /// Source file to tokenize
        path: Utf8PathBuf,

        /// Expand includes before printing
        #[arg(long)]
        expand: bool,
    },

    /// Check a source file for errors
    Check {
        /// Source file to check
        path: Utf8PathBuf,
    },

    /// Print the syntax tree of a source file
    Ast {
        /// Source file to parse
        path: Utf8PathBuf,
    },

    /// Translate a FIL binary to SPIR-V
    Transpile {
        /// FIL binary to translate
        input: Utf8PathBuf,

        /// Output file (default: the input with a .spv extension)
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Dump the contents of a FIL binary
    Il {
        /// FIL binary to dump
        path: Utf8PathBuf,
    },
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let mut console = Console::stdio(cli.diagnostics);
    let overrides = &cli.overrides;
    let result = match &cli.command {
        Command::Tokens { path, expand } => {
            commands::tokens::run(path, *expand, overrides, &mut console)
        }
        Command::Check { path } => commands::check::run(path, overrides, &mut console),
        Command::Ast { path } => commands::ast::run(path, overrides, &mut console),
        Command::Transpile { input, output } => {
            commands::transpile::run(input, output.as_deref(), overrides, &mut console)
        }
        Command::Il { path } => commands::il::run(path, overrides, &mut console),
    };

    // Exit with appropriate code
    match result {
        Ok(status) => std::process::exit(i32::from(status.exit_code())),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Targets are module paths: the binary is `filc`, its library `fil_cli`.
    match v {
        0 => "filc=info,fil_cli=info,fil_core=info",
        1 => "filc=debug,fil_cli=debug,fil_core=debug",
        _ => "filc=trace,fil_cli=trace,fil_core=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn directive_defaults() {
        assert_eq!(
            directive_for_verbosity(0),
            "filc=info,fil_cli=info,fil_core=info"
        );
        assert_eq!(
            directive_for_verbosity(1),
            "filc=debug,fil_cli=debug,fil_core=debug"
        );
        assert_eq!(
            directive_for_verbosity(5),
            "filc=trace,fil_cli=trace,fil_core=trace"
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides_before_subcommand() {
        let cli = Cli::try_parse_from([
            "filc", "-I", "inc", "-D", "A=a.fsl", "--strict", "-vv", "check", "main.fsl",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.overrides.include, [Utf8PathBuf::from("inc")]);
        assert_eq!(cli.overrides.define, ["A=a.fsl"]);
        assert!(cli.overrides.strict);
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn transpile_output_flag() {
        let cli = Cli::try_parse_from(["filc", "transpile", "in.fil", "-o", "out.spv"]).unwrap();
        let Command::Transpile { output, .. } = cli.command else {
            panic!("expected transpile");
        };
        assert_eq!(output, Some(Utf8PathBuf::from("out.spv")));
    }

    #[test]
    fn overrides_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["filc", "ast", "main.fsl", "--comments", "-I", "inc"]).unwrap();
        assert!(cli.overrides.comments);
        assert_eq!(cli.overrides.include, [Utf8PathBuf::from("inc")]);
    }
}
