use anyhow::Result;
use asyncify_cli::args::CliArgs;
use asyncify_cli::{driver, tracing_config};
use clap::Parser;

fn main() -> Result<()> {
    // Only when ASYNCIFY_LOG or RUST_LOG is set; see tracing_config.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let output = driver::run(&args)?;
    print!("{output}");
    Ok(())
}
