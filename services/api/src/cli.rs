use crate::commands::{run_listings, run_reserve, ListingsArgs, ReserveArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use stayfinder::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Stayfinder",
    about = "Browse short-term rental listings and reserve a stay",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List catalog listings matching the given filters
    Listings(ListingsArgs),
    /// Attempt a reservation and print the outcome
    Reserve(ReserveArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Listings(args) => run_listings(args),
        Command::Reserve(args) => run_reserve(args),
    }
}
