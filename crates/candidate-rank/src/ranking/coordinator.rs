//! Extraction, filtering and scoring over one candidate pool for one job.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::criteria::{CriteriaError, JobCriteria};
use super::domain::{CandidateId, RawCandidate, ScoredCandidate};
use super::extraction::AttributeExtractor;
use super::filter::{self, FilterFailure, FilterVerdict};
use super::scoring::{self, rank_order};

/// Fewer admitted candidates than requested. Reported, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub requested: usize,
    pub returned: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ScoreDistribution {
    fn from_scores(scores: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for score in scores {
            count += 1;
            min = min.min(score);
            max = max.max(score);
            sum += score;
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub criterion: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub candidate: CandidateId,
    pub failure: FilterFailure,
}

/// Per-run diagnostics for logging and analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    pub job: String,
    pub pool_size: usize,
    pub admitted: usize,
    pub rejected: usize,
    pub pass_rate: f64,
    /// Over every admitted candidate, not only the shortlist.
    pub score_distribution: Option<ScoreDistribution>,
    pub shortfall: Option<Shortfall>,
    /// Most common first.
    pub failure_reasons: Vec<FailureReason>,
    pub rejections: Vec<Rejection>,
}

impl RunStatistics {
    pub fn filter_rate(&self) -> f64 {
        if self.pool_size == 0 {
            0.0
        } else {
            self.rejected as f64 / self.pool_size as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingOutcome {
    pub shortlist: Vec<ScoredCandidate>,
    pub statistics: RunStatistics,
}

/// Evaluates pools against one validated job. Holds no per-run state.
#[derive(Debug, Clone)]
pub struct RankingCoordinator {
    job: JobCriteria,
    extractor: AttributeExtractor,
}

impl RankingCoordinator {
    pub fn new(job: JobCriteria, reference_year: i32) -> Result<Self, CriteriaError> {
        job.validate()?;
        let extractor = AttributeExtractor::new(&job.vocabulary(reference_year));
        Ok(Self { job, extractor })
    }

    pub fn job(&self) -> &JobCriteria {
        &self.job
    }

    pub fn evaluate(
        &self,
        pool: &[RawCandidate],
        shortlist_size: usize,
    ) -> Result<RankingOutcome, CriteriaError> {
        if shortlist_size == 0 {
            return Err(CriteriaError::InvalidShortlistSize);
        }

        let mut admitted = Vec::new();
        let mut rejections = Vec::new();

        for candidate in pool {
            let facts = self.extractor.extract_candidate(candidate);
            match filter::evaluate(&facts, &self.job.hard_criteria) {
                FilterVerdict::Admitted => {
                    let score = scoring::score(&facts, &self.job.soft_criteria);
                    admitted.push(ScoredCandidate {
                        candidate: candidate.clone(),
                        facts,
                        composite_score: score.composite,
                        per_category_scores: score.per_category,
                    });
                }
                FilterVerdict::Rejected(failure) => rejections.push(Rejection {
                    candidate: candidate.id.clone(),
                    failure,
                }),
            }
        }

        admitted.sort_by(rank_order);

        let statistics = self.statistics(pool.len(), &admitted, rejections, shortlist_size);
        info!(
            job = %self.job.key,
            pool = statistics.pool_size,
            admitted = statistics.admitted,
            pass_rate = statistics.pass_rate,
            "ranking run complete"
        );
        if let Some(shortfall) = statistics.shortfall {
            warn!(
                job = %self.job.key,
                requested = shortfall.requested,
                returned = shortfall.returned,
                missing = shortfall.missing,
                "shortlist shortfall"
            );
        }
        for (position, scored) in admitted.iter().take(3).enumerate() {
            debug!(
                job = %self.job.key,
                rank = position + 1,
                candidate = %scored.id(),
                score = scored.composite_score,
                years = ?scored.facts.years_experience,
                "top candidate"
            );
        }

        admitted.truncate(shortlist_size);
        Ok(RankingOutcome {
            shortlist: admitted,
            statistics,
        })
    }

    fn statistics(
        &self,
        pool_size: usize,
        admitted: &[ScoredCandidate],
        rejections: Vec<Rejection>,
        shortlist_size: usize,
    ) -> RunStatistics {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for rejection in &rejections {
            *counts.entry(rejection.failure.criterion.as_str()).or_default() += 1;
        }
        let mut failure_reasons: Vec<FailureReason> = counts
            .into_iter()
            .map(|(criterion, count)| FailureReason {
                criterion: criterion.to_string(),
                count,
            })
            .collect();
        failure_reasons.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.criterion.cmp(&right.criterion))
        });

        let shortfall = (admitted.len() < shortlist_size).then(|| Shortfall {
            requested: shortlist_size,
            returned: admitted.len(),
            missing: shortlist_size - admitted.len(),
        });

        RunStatistics {
            job: self.job.key.clone(),
            pool_size,
            admitted: admitted.len(),
            rejected: rejections.len(),
            pass_rate: if pool_size == 0 {
                0.0
            } else {
                admitted.len() as f64 / pool_size as f64
            },
            score_distribution: ScoreDistribution::from_scores(
                admitted.iter().map(|scored| scored.composite_score),
            ),
            shortfall,
            failure_reasons,
            rejections,
        }
    }
}

/// One-shot evaluation with "present" resolved against the current calendar year.
///
/// Open-ended date ranges make experience estimates depend on the clock, so the same pool
/// can rank differently after a year boundary. Use [`evaluate_at`] for reproducible runs.
pub fn evaluate(
    pool: &[RawCandidate],
    job: &JobCriteria,
    shortlist_size: usize,
) -> Result<RankingOutcome, CriteriaError> {
    evaluate_at(pool, job, shortlist_size, current_year())
}

/// One-shot evaluation against a fixed reference year.
pub fn evaluate_at(
    pool: &[RawCandidate],
    job: &JobCriteria,
    shortlist_size: usize,
    reference_year: i32,
) -> Result<RankingOutcome, CriteriaError> {
    RankingCoordinator::new(job.clone(), reference_year)?.evaluate(pool, shortlist_size)
}

pub(crate) fn current_year() -> i32 {
    chrono::Local::now().year()
}
