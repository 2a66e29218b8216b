use crate::commands::{run_batch, run_jobs, run_rank, BatchArgs, JobsArgs, RankArgs};
use crate::server;
use candidate_rank::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "candidate-rank",
    about = "Rank retrieved candidate pools against job criteria",
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
    /// Rank one candidate pool against a single job
    Rank(RankArgs),
    /// Rank a candidate pool against every job in the catalog
    Batch(BatchArgs),
    /// List the jobs in the catalog
    Jobs(JobsArgs),
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
        Command::Rank(args) => run_rank(args),
        Command::Batch(args) => run_batch(args),
        Command::Jobs(args) => run_jobs(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn rank_requires_a_job_source() {
        let parsed = Cli::try_parse_from(["candidate-rank", "rank", "--candidates", "pool.csv"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "candidate-rank",
            "rank",
            "--job",
            "tax_lawyer",
            "--candidates",
            "pool.csv",
            "--shortlist-size",
            "5",
        ])
        .expect("rank arguments parse");
        match parsed.command {
            Some(Command::Rank(args)) => {
                assert_eq!(args.job.as_deref(), Some("tax_lawyer"));
                assert_eq!(args.shortlist_size, Some(5));
            }
            other => panic!("expected rank command, got {other:?}"),
        }
    }

    #[test]
    fn serve_is_the_default_command() {
        let parsed = Cli::try_parse_from(["candidate-rank"]).expect("no arguments parse");
        assert!(parsed.command.is_none());
    }
}
