use crate::commands::{
    run_import, run_recommend_events, run_recommend_magazine, ImportArgs, RecommendEventsArgs,
    StoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use roro::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "RORO Recommendations",
    about = "Serve and inspect RORO event and magazine recommendations",
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
    /// Print a ranking computed from the configured database
    Recommend {
        #[command(subcommand)]
        command: RecommendCommand,
    },
    /// Load CSV exports of events, favourites, and page views into the database
    Import(ImportArgs),
}

#[derive(Subcommand, Debug)]
enum RecommendCommand {
    /// Rank visible events for an optional member
    Events(RecommendEventsArgs),
    /// Rank magazine pages by views
    Magazine(StoreArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured SQLite database path
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Recommend {
            command: RecommendCommand::Events(args),
        } => run_recommend_events(args),
        Command::Recommend {
            command: RecommendCommand::Magazine(args),
        } => run_recommend_magazine(args),
        Command::Import(args) => run_import(args),
    }
}
