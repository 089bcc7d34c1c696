//! Subcommand implementations. Each returns the text to print on stdout.

use crate::args::{CheckArgs, CliArgs, Command, ConvertArgs, OptionArgs, TargetArgs};
use anyhow::{Context, Result};
use asyncify_model::printer::print_program;
use asyncify_model::project::load_project;
use asyncify_model::{Program, SymbolId};
use asyncify_refactor::planner::ConversionPlanner;
use asyncify_refactor::{ConvertOptions, ConvertToAsyncAction};
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

pub fn run(args: &CliArgs) -> Result<String> {
    match &args.command {
        Command::Convert(convert_args) => convert(convert_args),
        Command::Plan(target) => plan(target),
        Command::Check(target) => check(target),
        Command::Print { project } => Ok(print_program(&load_program(project)?)),
    }
}

pub fn load_program(path: &Path) -> Result<Program> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project {}", path.display()))?;
    load_project(&text).with_context(|| format!("failed to load project {}", path.display()))
}

/// Options file first, then command-line overrides.
pub fn load_options(args: &OptionArgs) -> Result<ConvertOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read options {}", path.display()))?;
            ConvertOptions::from_json(&text)
                .with_context(|| format!("failed to parse options {}", path.display()))?
        }
        None => ConvertOptions::default(),
    };
    if let Some(suffix) = &args.suffix {
        options.async_suffix = suffix.clone();
    }
    if let Some(task_type) = &args.task_type {
        options.task_type = task_type.clone();
    }
    if let Some(scope) = args.scope {
        options.search_scope = scope.into();
    }
    if let Some(counterpart) = args.counterpart {
        options.counterpart = counterpart.into();
    }
    if args.no_rollback {
        options.rollback_on_abort = false;
    }
    debug!(?options, "conversion options");
    Ok(options)
}

fn resolve(program: &Program, method: &str) -> Result<SymbolId> {
    program
        .resolve_method(method)
        .with_context(|| format!("cannot convert `{method}`"))
}

fn convert(args: &ConvertArgs) -> Result<String> {
    let options = load_options(&args.options)?;
    let mut program = load_program(&args.target.project)?;
    let symbol = resolve(&program, &args.target.method)?;

    let action = ConvertToAsyncAction::new(options);
    let report = action
        .execute(&mut program, symbol)
        .with_context(|| format!("{} failed", ConvertToAsyncAction::NAME))?;

    if args.report || args.target.json {
        let mut json = report.to_json()?;
        json.push('\n');
        Ok(json)
    } else {
        Ok(print_program(&program))
    }
}

fn plan(args: &TargetArgs) -> Result<String> {
    let program = load_program(&args.project)?;
    let symbol = resolve(&program, &args.method)?;
    let plan = ConversionPlanner::new(&program).plan(symbol);

    if args.json {
        let mut json = serde_json::to_string_pretty(&plan)?;
        json.push('\n');
        return Ok(json);
    }
    let mut out = String::new();
    for (step, id) in plan.order.iter().enumerate() {
        let missing = program
            .symbol(*id)
            .is_some_and(|s| s.declarations.is_empty());
        let note = if missing { "  (no declaration)" } else { "" };
        writeln!(out, "{}. {}{note}", step + 1, program.qualified_name(*id))?;
    }
    Ok(out)
}

fn check(args: &CheckArgs) -> Result<String> {
    let options = load_options(&args.options)?;
    let program = load_program(&args.target.project)?;
    let symbol = resolve(&program, &args.target.method)?;
    let available = ConvertToAsyncAction::new(options).is_available(&program, symbol);

    if args.target.json {
        let value = serde_json::json!({
            "method": program.qualified_name(symbol),
            "available": available,
        });
        return Ok(format!("{value}\n"));
    }
    let verdict = if available {
        "available"
    } else {
        "not available"
    };
    Ok(format!("{}: {verdict}\n", program.qualified_name(symbol)))
}
