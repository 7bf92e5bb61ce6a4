use clap::Parser;
use tracing_subscriber::EnvFilter;

use te_counter::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("te_counter=debug,info")
    } else {
        EnvFilter::new("te_counter=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Count(args) => {
            cli::count::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Tally(args) => {
            cli::tally::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Uniqueness(args) => {
            cli::uniqueness::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
