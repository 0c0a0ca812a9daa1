use crate::demo::{
    run_demo, run_generate, run_ministry, run_score, DemoArgs, GenerateArgs, MinistryArgs,
    ScoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use salmeen::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Salmeen",
    about = "Score driving behaviour, predict risk, and coach drivers from the command line",
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
    /// Print a driver report for a CSV trip log
    Score(ScoreArgs),
    /// Print the fleet-wide ministry overview
    Ministry(MinistryArgs),
    /// Write a synthetic, profile-labelled trip log as CSV
    Generate(GenerateArgs),
    /// Run an end-to-end demo on synthetic data
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
        Command::Score(args) => run_score(args),
        Command::Ministry(args) => run_ministry(args),
        Command::Generate(args) => run_generate(args),
        Command::Demo(args) => run_demo(args),
    }
}
