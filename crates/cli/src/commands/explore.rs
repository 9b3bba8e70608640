//! `lacuna explore` -- answer missing-data questions until the function
//! completes.
//!
//! Every round evaluates the current payload and asks one question per
//! missing element. An empty line, `quit` or end of input stops the
//! session; the partial payload can be saved and used as a seed later.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use lacuna_eval::{ExploratorySession, Locale, Prompter, Question, SessionEnd};

use crate::{report_error, OutputFormat};

pub(crate) struct ExploreArgs<'a> {
    pub program: &'a Path,
    pub function: &'a str,
    pub seed: Option<&'a Path>,
    pub save: Option<&'a Path>,
    pub locale: Locale,
    pub max_rounds: usize,
}

/// Reads answers line by line and echoes questions as a prompt.
pub(crate) struct LinePrompter<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub(crate) fn new(input: R, out: W) -> Self {
        LinePrompter { input, out }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, question: &Question) -> Option<String> {
        write!(self.out, "{}\n> ", question.text).ok()?;
        self.out.flush().ok()?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let answer = line.trim();
                if answer.is_empty() || answer.eq_ignore_ascii_case("quit") {
                    None
                } else {
                    Some(answer.to_string())
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot read answer");
                None
            }
        }
    }
}

pub(crate) fn cmd_explore(args: ExploreArgs<'_>, output: OutputFormat, quiet: bool) {
    let catalog = match super::load_catalog(args.program) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let mut session = match ExploratorySession::new(&catalog, args.function, args.locale) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    if let Some(seed) = args.seed {
        match super::read_json(seed) {
            Ok(payload) => session = session.with_payload(payload),
            Err(e) => {
                report_error(&format!("error: {}", e), output, quiet);
                process::exit(1);
            }
        }
    }

    if !quiet && output == OutputFormat::Text {
        println!();
        println!("  Lacuna explore: {}", args.function);
        println!("  Answer each question; an empty line or 'quit' stops.");
        println!();
    }

    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());
    let end = session.play(&mut prompter, args.max_rounds);

    if let Some(path) = args.save {
        let text = serde_json::to_string_pretty(session.payload()).unwrap_or_default();
        if let Err(e) = std::fs::write(path, text + "\n") {
            report_error(
                &format!("error: cannot write {}: {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }

    let exit_code = match output {
        OutputFormat::Json => {
            let (status, outcome, code) = match &end {
                SessionEnd::Completed(ev) => ("completed", ev.to_json(&catalog, false), 0),
                SessionEnd::Abandoned { pending } => (
                    "abandoned",
                    serde_json::json!({
                        "pending": pending
                            .iter()
                            .map(|q| serde_json::json!({"element": q.element, "question": q.text}))
                            .collect::<Vec<_>>()
                    }),
                    0,
                ),
                SessionEnd::RoundLimit { rounds } => {
                    ("round_limit", serde_json::json!({"rounds": rounds}), 1)
                }
                SessionEnd::Failed(outcome) => ("failed", outcome.to_json(), 1),
            };
            let json = serde_json::json!({
                "status": status,
                "outcome": outcome,
                "payload": session.payload(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
            code
        }
        OutputFormat::Text => match &end {
            SessionEnd::Completed(ev) => {
                println!();
                super::eval::print_evaluation(ev, &catalog, false, quiet);
                0
            }
            SessionEnd::Abandoned { pending } => {
                if !quiet {
                    println!();
                    println!("stopped with {} open question(s):", pending.len());
                    for q in pending {
                        println!("  - {}", q.element);
                    }
                }
                0
            }
            SessionEnd::RoundLimit { rounds } => {
                report_error(
                    &format!("error: no completion after {} rounds", rounds),
                    output,
                    quiet,
                );
                1
            }
            SessionEnd::Failed(outcome) => {
                report_error(
                    &format!("error: {}", outcome.to_json()["message"].as_str().unwrap_or("")),
                    output,
                    quiet,
                );
                1
            }
        },
    };

    if exit_code != 0 {
        process::exit(exit_code);
    }
}
