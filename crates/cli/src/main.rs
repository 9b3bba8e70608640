mod commands;
mod config;
mod runner;
mod tap;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Lacuna partial-data decision evaluator.
#[derive(Parser)]
#[command(name = "lacuna", version, about = "Lacuna partial-data decision evaluator")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a lacuna.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a program description against the JSON Schema
    Validate {
        /// Path to the program description (defaults to the configured program)
        program: Option<PathBuf>,
    },

    /// Evaluate a decision function over a payload
    Eval {
        /// Qualified name of the decision function
        function: String,
        /// Path to the payload JSON file ('-' for stdin)
        #[arg(long)]
        payload: PathBuf,
        /// Path to the program description
        #[arg(long)]
        program: Option<PathBuf>,
        /// Locale for diagnostic questions (en, fr)
        #[arg(long)]
        locale: Option<String>,
        /// Attach a localized question to every missing element
        #[arg(long)]
        rich: bool,
    },

    /// Run a scenario suite and report TAP
    Test {
        /// Path to the scenario suite directory
        #[arg(default_value = "conformance")]
        suite_dir: PathBuf,
        /// Locale for diagnostic questions (en, fr)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Interactively supply missing data until the function completes
    Explore {
        /// Qualified name of the decision function
        function: String,
        /// Path to the program description
        #[arg(long)]
        program: Option<PathBuf>,
        /// Partial payload to start from
        #[arg(long)]
        payload: Option<PathBuf>,
        /// Write the final payload to this file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Locale for questions (en, fr)
        #[arg(long)]
        locale: Option<String>,
        /// Stop after this many evaluation rounds
        #[arg(long)]
        max_rounds: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };
    init_tracing(&config);

    match cli.command {
        Commands::Validate { program } => {
            let program = resolve_program(&config, program, cli.output, cli.quiet);
            commands::validate::cmd_validate(&program, cli.output, cli.quiet);
        }
        Commands::Eval {
            function,
            payload,
            program,
            locale,
            rich,
        } => {
            let program = resolve_program(&config, program, cli.output, cli.quiet);
            commands::eval::cmd_eval(
                commands::eval::EvalArgs {
                    program: &program,
                    function: &function,
                    payload: &payload,
                    locale: config.locale(locale.as_deref()),
                    rich,
                },
                cli.output,
                cli.quiet,
            );
        }
        Commands::Test { suite_dir, locale } => {
            commands::test::cmd_test(&suite_dir, config.locale(locale.as_deref()));
        }
        Commands::Explore {
            function,
            program,
            payload,
            save,
            locale,
            max_rounds,
        } => {
            let program = resolve_program(&config, program, cli.output, cli.quiet);
            commands::explore::cmd_explore(
                commands::explore::ExploreArgs {
                    program: &program,
                    function: &function,
                    seed: payload.as_deref(),
                    save: save.as_deref(),
                    locale: config.locale(locale.as_deref()),
                    max_rounds: config.max_rounds(max_rounds),
                },
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Install the log subscriber: `LACUNA_LOG`, then the config `log`, then `warn`.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("LACUNA_LOG")
        .or_else(|_| EnvFilter::try_new(config.log.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_program(
    config: &Config,
    flag: Option<PathBuf>,
    output: OutputFormat,
    quiet: bool,
) -> PathBuf {
    match config.program(flag.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
