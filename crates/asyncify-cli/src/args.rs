use asyncify_refactor::{CounterpartPolicy, SearchScope};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the asyncify binary.
#[derive(Parser, Debug)]
#[command(
    name = "asyncify",
    version,
    about = "Convert a method to async across its override hierarchy and call sites"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a method and print the rewritten project.
    Convert(ConvertArgs),
    /// Show the order in which methods would be converted.
    Plan(TargetArgs),
    /// Tell whether the conversion is offered for a method.
    Check(CheckArgs),
    /// Print a project as source.
    Print {
        /// Project file (JSON).
        project: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Project file (JSON).
    pub project: PathBuf,

    /// Method to convert: `Type.Method` or an explicit overload key.
    #[arg(short = 'm', long)]
    pub method: String,

    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub options: OptionArgs,

    /// Print the conversion report instead of the rewritten project.
    #[arg(long)]
    pub report: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub options: OptionArgs,
}

/// Conversion options shared by `convert` and `check`.
#[derive(Args, Debug)]
pub struct OptionArgs {
    /// Options file (JSON); flags below override it.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Suffix appended to converted method names.
    #[arg(long)]
    pub suffix: Option<String>,

    /// Name of the async-completion type.
    #[arg(long = "task-type")]
    pub task_type: Option<String>,

    /// Where to look for call sites.
    #[arg(long, value_enum)]
    pub scope: Option<Scope>,

    /// How body invocations are matched to async counterparts.
    #[arg(long, value_enum)]
    pub counterpart: Option<Counterpart>,

    /// Keep a partial conversion when the pass aborts.
    #[arg(long = "no-rollback")]
    pub no_rollback: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scope {
    Solution,
    #[value(name = "declaring-module")]
    DeclaringModule,
}

impl From<Scope> for SearchScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Solution => SearchScope::Solution,
            Scope::DeclaringModule => SearchScope::DeclaringModule,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Counterpart {
    Strict,
    #[value(name = "name-only")]
    NameOnly,
    Off,
}

impl From<Counterpart> for CounterpartPolicy {
    fn from(counterpart: Counterpart) -> Self {
        match counterpart {
            Counterpart::Strict => CounterpartPolicy::Strict,
            Counterpart::NameOnly => CounterpartPolicy::NameOnly,
            Counterpart::Off => CounterpartPolicy::Off,
        }
    }
}
