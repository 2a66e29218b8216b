//! Cross-job hard-filter analysis built from run statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use super::coordinator::RunStatistics;

/// Filter rate above which a job's hard criteria are considered too strict.
pub const HIGH_FILTER_RATE: f64 = 0.8;
/// Filter rate below which a job's hard criteria are considered too permissive.
pub const LOW_FILTER_RATE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallFilterStats {
    pub processed: usize,
    pub passed: usize,
    pub failures: usize,
    pub filter_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFilterPerformance {
    pub pool_size: usize,
    pub admitted: usize,
    pub rejected: usize,
    pub filter_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterIssue {
    HighFilterRate,
    LowFilterRate,
}

impl FilterIssue {
    pub fn advice(&self) -> &'static str {
        match self {
            FilterIssue::HighFilterRate => {
                "consider relaxing hard criteria: most candidates are filtered out"
            }
            FilterIssue::LowFilterRate => {
                "consider tightening hard criteria: filters admit nearly everyone"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterRecommendation {
    pub job: String,
    pub issue: FilterIssue,
    pub filter_rate: f64,
    pub advice: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterReport {
    pub overall: OverallFilterStats,
    /// Rejections per criterion across all jobs.
    pub failure_breakdown: BTreeMap<String, usize>,
    pub job_performance: BTreeMap<String, JobFilterPerformance>,
    pub recommendations: Vec<FilterRecommendation>,
}

impl FilterReport {
    pub fn from_runs(runs: &[RunStatistics]) -> Self {
        let mut failure_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        let mut job_performance: BTreeMap<String, JobFilterPerformance> = BTreeMap::new();

        for run in runs {
            for reason in &run.failure_reasons {
                *failure_breakdown.entry(reason.criterion.clone()).or_default() += reason.count;
            }

            let entry = job_performance
                .entry(run.job.clone())
                .or_insert(JobFilterPerformance {
                    pool_size: 0,
                    admitted: 0,
                    rejected: 0,
                    filter_rate: 0.0,
                });
            entry.pool_size += run.pool_size;
            entry.admitted += run.admitted;
            entry.rejected += run.rejected;
        }

        for performance in job_performance.values_mut() {
            performance.filter_rate = rate(performance.rejected, performance.pool_size);
        }

        let processed: usize = runs.iter().map(|run| run.pool_size).sum();
        let passed: usize = runs.iter().map(|run| run.admitted).sum();
        let failures: usize = runs.iter().map(|run| run.rejected).sum();

        let recommendations = job_performance
            .iter()
            .filter(|(_, performance)| performance.pool_size > 0)
            .filter_map(|(job, performance)| {
                let issue = if performance.filter_rate > HIGH_FILTER_RATE {
                    FilterIssue::HighFilterRate
                } else if performance.filter_rate < LOW_FILTER_RATE {
                    FilterIssue::LowFilterRate
                } else {
                    return None;
                };
                Some(FilterRecommendation {
                    job: job.clone(),
                    issue,
                    filter_rate: performance.filter_rate,
                    advice: issue.advice(),
                })
            })
            .collect();

        Self {
            overall: OverallFilterStats {
                processed,
                passed,
                failures,
                filter_rate: rate(processed - passed, processed),
            },
            failure_breakdown,
            job_performance,
            recommendations,
        }
    }

    /// Criteria with the most rejections, most frequent first.
    pub fn top_failures(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut failures: Vec<(&str, usize)> = self
            .failure_breakdown
            .iter()
            .map(|(criterion, count)| (criterion.as_str(), *count))
            .collect();
        failures.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        failures.truncate(limit);
        failures
    }
}

fn rate(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
