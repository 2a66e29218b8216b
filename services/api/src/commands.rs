use crate::infra::{load_catalog, load_job_file};
use candidate_rank::config::AppConfig;
use candidate_rank::error::AppError;
use candidate_rank::ranking::{
    evaluate_batch, CandidatePoolImporter, FilterReport, InMemoryCandidateSource,
    RankingCoordinator, RankingOutcome,
};
use candidate_rank::telemetry;
use clap::{ArgGroup, Args};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("job_source").required(true).args(["job", "job_file"])))]
pub(crate) struct RankArgs {
    /// Catalog key of the job to rank against
    #[arg(long)]
    pub(crate) job: Option<String>,
    /// JSON file holding a single job configuration
    #[arg(long)]
    pub(crate) job_file: Option<PathBuf>,
    /// Candidate pool as CSV or JSON
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Job catalog to look `--job` up in
    #[arg(long)]
    pub(crate) jobs_file: Option<PathBuf>,
    /// Override the configured shortlist size
    #[arg(long)]
    pub(crate) shortlist_size: Option<usize>,
    /// Print the full outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Candidate pool shared by every job, as CSV or JSON
    #[arg(long)]
    pub(crate) candidates: PathBuf,
    /// Job catalog to run instead of the configured one
    #[arg(long)]
    pub(crate) jobs_file: Option<PathBuf>,
    /// Override the configured shortlist size
    #[arg(long)]
    pub(crate) shortlist_size: Option<usize>,
    /// Write the filter analysis report here
    #[arg(long)]
    pub(crate) report: Option<PathBuf>,
    /// Write the submission document here
    #[arg(long)]
    pub(crate) submission: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct JobsArgs {
    /// Job catalog to list instead of the configured one
    #[arg(long)]
    pub(crate) jobs_file: Option<PathBuf>,
}

fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let shortlist_size = args.shortlist_size.unwrap_or(config.ranking.shortlist_size);

    let job = match (&args.job_file, &args.job) {
        (Some(path), _) => load_job_file(path)?,
        (None, key) => {
            let catalog = load_catalog(&config.ranking, args.jobs_file.as_deref())?;
            catalog.get(key.as_deref().unwrap_or_default())?.clone()
        }
    };

    let pool = CandidatePoolImporter::from_path(&args.candidates)?;
    info!(job = %job.key, candidates = pool.len(), "ranking candidate pool");

    let coordinator = RankingCoordinator::new(job, config.ranking.reference_year)?;
    let outcome = coordinator.evaluate(&pool, shortlist_size)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let shortlist_size = args.shortlist_size.unwrap_or(config.ranking.shortlist_size);

    let catalog = load_catalog(&config.ranking, args.jobs_file.as_deref())?;
    let pool = CandidatePoolImporter::from_path(&args.candidates)?;
    let source = InMemoryCandidateSource::new(pool);

    let outcome = evaluate_batch(
        &catalog,
        &source,
        shortlist_size,
        config.ranking.reference_year,
    );

    let submission = outcome.submission();
    for warning in submission.validate(catalog.keys().as_slice(), shortlist_size)? {
        warn!(%warning, "submission warning");
    }

    let report = FilterReport::from_runs(&outcome.statistics());
    for recommendation in &report.recommendations {
        warn!(
            job = %recommendation.job,
            filter_rate = recommendation.filter_rate,
            "{}",
            recommendation.advice
        );
    }

    if let Some(path) = &args.report {
        write_json(path, &report)?;
    }
    if let Some(path) = &args.submission {
        write_json(path, &submission)?;
    }

    println!("{}", serde_json::to_string_pretty(&outcome.summaries())?);
    Ok(())
}

pub(crate) fn run_jobs(args: JobsArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let catalog = load_catalog(&config.ranking, args.jobs_file.as_deref())?;

    for job in catalog.jobs() {
        let criteria: Vec<String> = job.hard_criteria.iter().map(|c| c.name()).collect();
        println!("{:<28} {}", job.key, job.title);
        if !criteria.is_empty() {
            println!("{:<28} requires: {}", "", criteria.join(", "));
        }
    }
    for (key, error) in catalog.invalid() {
        println!("{key:<28} INVALID: {error}");
    }
    Ok(())
}

fn print_outcome(outcome: &RankingOutcome) {
    let stats = &outcome.statistics;
    println!(
        "{}: {} of {} candidates passed hard filters",
        stats.job, stats.admitted, stats.pool_size
    );

    for (rank, scored) in outcome.shortlist.iter().enumerate() {
        let years = scored
            .facts
            .years_experience
            .map(|years| format!("{years:.0}y"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {:<24} {:>5.2} {:>4}  {}",
            rank + 1,
            scored.id().as_str(),
            scored.composite_score,
            years,
            scored.candidate.headline
        );
    }

    if let Some(shortfall) = stats.shortfall {
        println!(
            "shortfall: returned {} of {} requested",
            shortfall.returned, shortfall.requested
        );
    }
    for reason in &stats.failure_reasons {
        println!("rejected by {}: {}", reason.criterion, reason.count);
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}
