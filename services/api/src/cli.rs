use crate::demo::{run_consensus_file, run_demo, ConsensusArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use review_consensus::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Review Consensus",
    about = "Score reviewer evaluations and classify consensus from the command line",
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
    /// Score evaluations from a JSON file and print the consensus report
    Consensus(ConsensusArgs),
    /// Walk a sample application through every review stage
    Demo(DemoArgs),
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
        Command::Consensus(args) => run_consensus_file(args),
        Command::Demo(args) => run_demo(args),
    }
}
