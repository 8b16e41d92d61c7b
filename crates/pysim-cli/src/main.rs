//! pysim - run lesson snippets through the line interpreter.
//!
//! `pysim run` executes one snippet from a file, `-e` or stdin.
//! `pysim serve` answers newline-delimited JSON requests on stdio, standing in
//! for the server action the lesson pages call.

mod config;
mod serve;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pysim_eval::{action, ExecutionResult, Limits};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pysim")]
#[command(about = "Simulated Python runner for lesson snippets")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    limits: LimitArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct LimitArgs {
    /// Reject sources larger than this many bytes
    #[arg(long, global = true, value_name = "BYTES")]
    max_source_bytes: Option<usize>,

    /// Fail runs that print more than this many lines
    #[arg(long, global = true, value_name = "LINES")]
    max_output_lines: Option<usize>,

    /// Fail runs that bind more than this many names
    #[arg(long, global = true, value_name = "NAMES")]
    max_bindings: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a snippet and print its output
    Run {
        /// Source file (reads stdin when omitted)
        #[arg(value_name = "FILE", conflicts_with = "eval")]
        input: Option<PathBuf>,

        /// Run the given code directly
        #[arg(short = 'e', long, value_name = "CODE")]
        eval: Option<String>,

        /// Print the result record as JSON
        #[arg(long)]
        json: bool,

        /// Print the final variables as JSON to stderr
        #[arg(long)]
        dump_env: bool,
    },

    /// Serve JSON requests on stdin/stdout
    Serve,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("pysim: {:#}", e);
            1
        }
    };
    process::exit(code);
}

fn dispatch(cli: Cli) -> Result<i32> {
    let limits = config::apply_overrides(
        config::limits_from_env()?,
        cli.limits.max_source_bytes,
        cli.limits.max_output_lines,
        cli.limits.max_bindings,
    );

    match cli.command {
        Command::Run {
            input,
            eval,
            json,
            dump_env,
        } => {
            let source = read_source(input, eval)?;
            Ok(run_snippet(&source, &limits, json, dump_env))
        }
        Command::Serve => {
            tracing::info!("Starting pysim server on stdio");
            let runtime = tokio::runtime::Runtime::new().context("cannot start runtime")?;
            runtime.block_on(serve::serve(tokio::io::stdin(), tokio::io::stdout(), limits))?;
            Ok(0)
        }
    }
}

fn read_source(input: Option<PathBuf>, eval: Option<String>) -> Result<String> {
    if let Some(code) = eval {
        return Ok(code);
    }
    match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            Ok(buffer)
        }
    }
}

/// Run one snippet and report it. Returns the process exit code.
fn run_snippet(source: &str, limits: &Limits, json: bool, dump_env: bool) -> i32 {
    let outcome = action::run_code(source, limits);
    if dump_env {
        if let Ok(execution) = &outcome {
            match serde_json::to_string_pretty(&execution.environment) {
                Ok(text) => eprintln!("{}", text),
                Err(e) => tracing::warn!("cannot encode variables: {}", e),
            }
        }
    }
    let result = ExecutionResult::from(outcome);

    if json {
        match serde_json::to_string(&result) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("pysim: cannot encode result: {}", e);
                return 1;
            }
        }
    } else if result.success {
        println!("{}", result.output);
    } else if let Some(error) = &result.error {
        eprintln!("{}", error);
    }

    if result.success {
        0
    } else {
        1
    }
}
