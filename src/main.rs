mod cli;

use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();

    init_tracing(args.verbose);

    let config_path = Path::new(&args.config);

    let result = match &args.command {
        Commands::Log {
            entity,
            actor,
            action,
            since,
            last,
        } => cli::commands::log::execute(
            config_path,
            entity.as_deref(),
            actor.as_deref(),
            action.map(Into::into),
            since.as_deref(),
            *last,
        ),
        Commands::Status => cli::commands::status::execute(config_path),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `--verbose` selects debug.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
