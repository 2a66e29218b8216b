use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinator::RankingOutcome;
use super::domain::CandidateId;

/// Ordered shortlist ids per job, in the shape the grading service expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub config_candidates: BTreeMap<String, Vec<CandidateId>>,
}

/// Non-fatal problems found while validating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionWarning {
    MissingJob { job: String },
    ShortList { job: String, count: usize, expected: usize },
}

impl fmt::Display for SubmissionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionWarning::MissingJob { job } => write!(f, "job `{job}` has no shortlist"),
            SubmissionWarning::ShortList {
                job,
                count,
                expected,
            } => write!(f, "job `{job}` has {count} candidates (expected {expected})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("job `{job}` candidate {position} has a blank id")]
    BlankId { job: String, position: usize },
    #[error("job `{job}` lists candidate `{id}` more than once")]
    DuplicateId { job: String, id: CandidateId },
    #[error("job `{job}` lists {count} candidates, more than the shortlist size {limit}")]
    Oversized {
        job: String,
        count: usize,
        limit: usize,
    },
}

impl Submission {
    pub fn from_outcomes(outcomes: &BTreeMap<String, RankingOutcome>) -> Self {
        let config_candidates = outcomes
            .iter()
            .map(|(job, outcome)| {
                let ids = outcome
                    .shortlist
                    .iter()
                    .map(|scored| scored.id().clone())
                    .collect();
                (job.clone(), ids)
            })
            .collect();
        Self { config_candidates }
    }

    pub fn total_candidates(&self) -> usize {
        self.config_candidates.values().map(Vec::len).sum()
    }

    /// Reject structurally broken lists, warn about missing jobs and short lists.
    pub fn validate<S: AsRef<str>>(
        &self,
        expected_jobs: &[S],
        shortlist_size: usize,
    ) -> Result<Vec<SubmissionWarning>, SubmissionError> {
        for (job, ids) in &self.config_candidates {
            if ids.len() > shortlist_size {
                return Err(SubmissionError::Oversized {
                    job: job.clone(),
                    count: ids.len(),
                    limit: shortlist_size,
                });
            }
            let mut seen = HashSet::with_capacity(ids.len());
            for (index, id) in ids.iter().enumerate() {
                if id.as_str().trim().is_empty() {
                    return Err(SubmissionError::BlankId {
                        job: job.clone(),
                        position: index + 1,
                    });
                }
                if !seen.insert(id) {
                    return Err(SubmissionError::DuplicateId {
                        job: job.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        let mut warnings: Vec<SubmissionWarning> = expected_jobs
            .iter()
            .map(AsRef::as_ref)
            .filter(|job| !self.config_candidates.contains_key(*job))
            .map(|job| SubmissionWarning::MissingJob {
                job: job.to_string(),
            })
            .collect();

        warnings.extend(
            self.config_candidates
                .iter()
                .filter(|(_, ids)| ids.len() < shortlist_size)
                .map(|(job, ids)| SubmissionWarning::ShortList {
                    job: job.clone(),
                    count: ids.len(),
                    expected: shortlist_size,
                }),
        );

        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(entries: &[(&str, &[&str])]) -> Submission {
        Submission {
            config_candidates: entries
                .iter()
                .map(|(job, ids)| {
                    (
                        job.to_string(),
                        ids.iter().map(|id| CandidateId::from(*id)).collect(),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn warns_about_missing_jobs_and_short_lists() {
        let submission = submission(&[("tax_lawyer", &["a", "b"]), ("radiology", &["c", "d", "e"])]);

        let warnings = submission
            .validate(&["tax_lawyer", "radiology", "bankers"], 3)
            .expect("structurally valid");

        assert_eq!(
            warnings,
            vec![
                SubmissionWarning::MissingJob {
                    job: "bankers".to_string()
                },
                SubmissionWarning::ShortList {
                    job: "tax_lawyer".to_string(),
                    count: 2,
                    expected: 3
                },
            ]
        );
    }

    #[test]
    fn blank_ids_are_errors() {
        let submission = submission(&[("tax_lawyer", &["a", " "])]);
        assert_eq!(
            submission.validate(&["tax_lawyer"], 10),
            Err(SubmissionError::BlankId {
                job: "tax_lawyer".to_string(),
                position: 2
            })
        );
    }

    #[test]
    fn serialises_with_grading_field_name() {
        let submission = submission(&[("bankers", &["x"])]);
        let json = serde_json::to_value(&submission).expect("serialises");
        assert_eq!(json["config_candidates"]["bankers"][0], "x");
    }
}
