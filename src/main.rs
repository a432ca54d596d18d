use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod genotyping;
mod output;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Progress goes to stderr so stdout only carries the run summary
    let filter = if cli.verbose {
        EnvFilter::new("genotype_matrix=debug,info")
    } else {
        EnvFilter::new("genotype_matrix=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Analyze(args) => {
            cli::analyze::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
