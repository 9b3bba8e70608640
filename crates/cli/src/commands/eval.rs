use std::path::Path;
use std::process;

use lacuna_eval::{Catalog, Evaluation, Locale, Outcome};

use crate::{report_error, OutputFormat};

pub(crate) struct EvalArgs<'a> {
    pub program: &'a Path,
    pub function: &'a str,
    pub payload: &'a Path,
    pub locale: Locale,
    pub rich: bool,
}

/// Evaluate one function over a payload file.
///
/// Exit code 0 for `Completed` and `MissingData`, 1 for errors.
pub(crate) fn cmd_eval(args: EvalArgs<'_>, output: OutputFormat, quiet: bool) {
    let catalog = match super::load_catalog(args.program) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let payload = match super::read_json(args.payload) {
        Ok(v) => v,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let evaluation = match lacuna_eval::evaluate(&catalog, args.function, &payload, args.locale) {
        Ok(ev) => ev,
        Err(e) => {
            match output {
                OutputFormat::Json => {
                    let json = Outcome::PreEvaluationError(e).to_json();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
                OutputFormat::Text => {
                    report_error(&format!("pre-evaluation error: {}", e), output, quiet)
                }
            }
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let json = evaluation.to_json(&catalog, args.rich);
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
        OutputFormat::Text => print_evaluation(&evaluation, &catalog, args.rich, quiet),
    }

    if let Outcome::DecisionLogicError(_) = evaluation.outcome {
        process::exit(1);
    }
}

/// Human-readable rendering of an evaluation, shared with `explore`.
pub(crate) fn print_evaluation(evaluation: &Evaluation, catalog: &Catalog, rich: bool, quiet: bool) {
    match &evaluation.outcome {
        Outcome::Completed(done) => {
            if !quiet {
                println!("completed: {}", evaluation.result_type);
            }
            let value = lacuna_eval::types::value_to_json(&done.value);
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_default()
            );
        }
        Outcome::MissingData(elements) => {
            if !quiet {
                println!("missing data ({}):", elements.len());
            }
            for element in elements {
                println!("  - {}", element);
                if rich {
                    println!(
                        "    {}",
                        lacuna_eval::locale::question(element, catalog, evaluation.locale)
                    );
                }
            }
        }
        Outcome::PreEvaluationError(e) => eprintln!("pre-evaluation error: {}", e),
        Outcome::DecisionLogicError(e) => eprintln!("decision logic error: {}", e),
    }
}
