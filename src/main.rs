use clap::{CommandFactory, FromArgMatches};
use stackls::cli::{self, commands, Cli};
use std::process;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let log_level = if cli.verbose { "warn,stackls=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    debug!("Starting stackls v{}", stackls::VERSION);

    let namespace_explicit = cli::namespace_explicit(&matches);

    let result = match cli.command {
        Some(command) => {
            commands::handle_command(command, &cli.connection, namespace_explicit).await
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
