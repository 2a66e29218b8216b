use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, info};

use super::catalog::JobCatalog;
use super::coordinator::{RankingCoordinator, RankingOutcome, RunStatistics};
use super::criteria::CriteriaError;
use super::source::{CandidateSource, SourceError};
use super::submission::Submission;

/// Why a single job produced no outcome.
#[derive(Debug, thiserror::Error)]
pub enum JobFailure {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Results of every catalog job, keyed by job name.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completed: BTreeMap<String, RankingOutcome>,
    pub failed: BTreeMap<String, JobFailure>,
}

/// Serialisable summary of one job in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobSummary {
    Completed { shortlisted: usize, statistics: RunStatistics },
    Failed { error: String },
}

impl BatchOutcome {
    pub fn statistics(&self) -> Vec<RunStatistics> {
        self.completed
            .values()
            .map(|outcome| outcome.statistics.clone())
            .collect()
    }

    pub fn submission(&self) -> Submission {
        Submission::from_outcomes(&self.completed)
    }

    pub fn summaries(&self) -> BTreeMap<String, JobSummary> {
        let completed = self.completed.iter().map(|(job, outcome)| {
            (
                job.clone(),
                JobSummary::Completed {
                    shortlisted: outcome.shortlist.len(),
                    statistics: outcome.statistics.clone(),
                },
            )
        });
        let failed = self.failed.iter().map(|(job, failure)| {
            (
                job.clone(),
                JobSummary::Failed {
                    error: failure.to_string(),
                },
            )
        });
        completed.chain(failed).collect()
    }
}

/// Run every job in the catalog independently. One job's failure never stops the others.
pub fn evaluate_batch<S>(
    catalog: &JobCatalog,
    source: &S,
    shortlist_size: usize,
    reference_year: i32,
) -> BatchOutcome
where
    S: CandidateSource + ?Sized,
{
    let mut outcome = BatchOutcome::default();

    for key in catalog.keys() {
        match run_job(catalog, source, key, shortlist_size, reference_year) {
            Ok(result) => {
                outcome.completed.insert(key.to_string(), result);
            }
            Err(failure) => {
                error!(job = key, error = %failure, "job skipped");
                outcome.failed.insert(key.to_string(), failure);
            }
        }
    }

    info!(
        completed = outcome.completed.len(),
        failed = outcome.failed.len(),
        "batch evaluation finished"
    );
    outcome
}

fn run_job<S>(
    catalog: &JobCatalog,
    source: &S,
    key: &str,
    shortlist_size: usize,
    reference_year: i32,
) -> Result<RankingOutcome, JobFailure>
where
    S: CandidateSource + ?Sized,
{
    let job = catalog.get(key)?;
    let coordinator = RankingCoordinator::new(job.clone(), reference_year)?;
    let pool = source.candidates(job)?;
    Ok(coordinator.evaluate(&pool, shortlist_size)?)
}
