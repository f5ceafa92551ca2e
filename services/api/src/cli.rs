use crate::demo::{run_classify, run_demo, run_eligibility, ClassifyArgs, DemoArgs, EligibilityArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use medicare_quiz::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Medicare Plan Quiz",
    about = "Serve and exercise the Medicare plan-fit quiz engine from the command line",
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
    /// Classify a finished answer set into a result category
    Classify(ClassifyArgs),
    /// Check the Initial Enrollment Period and age band for a birth month and year
    Eligibility(EligibilityArgs),
    /// Walk sample respondents through the quiz and lead submission
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
        Command::Classify(args) => run_classify(args),
        Command::Eligibility(args) => run_eligibility(args),
        Command::Demo(args) => run_demo(args),
    }
}
