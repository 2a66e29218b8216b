//! Weighted soft scoring on a 0-10 scale.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::criteria::{SignalKind, SoftCriteria};
use super::domain::{ExtractedFacts, ScoredCandidate};

/// Upper bound of the composite score.
pub const SCORE_SCALE: f64 = 10.0;

/// Composite score plus the normalised [0, 1] signal of every weighted category.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftScore {
    pub composite: f64,
    pub per_category: BTreeMap<String, f64>,
}

/// Score facts against weighted preferences. Jobs without factors score 0 for everyone.
pub fn score(facts: &ExtractedFacts, criteria: &SoftCriteria) -> SoftScore {
    let per_category: BTreeMap<String, f64> = criteria
        .factors
        .iter()
        .map(|factor| {
            let signal = match &factor.signal {
                SignalKind::Keywords { expected_hits } => keyword_signal(
                    facts.hits(&factor.category),
                    *expected_hits,
                ),
                SignalKind::Experience => {
                    experience_signal(facts.years_experience, criteria.preferred_experience)
                }
                SignalKind::Prestige => {
                    if facts.prestigious_institution {
                        criteria.prestige_bonus.clamp(0.0, 1.0)
                    } else {
                        0.0
                    }
                }
            };
            (factor.category.clone(), signal)
        })
        .collect();

    let total_weight = criteria.total_weight();
    let composite = if total_weight > 0.0 {
        let weighted: f64 = criteria
            .factors
            .iter()
            .map(|factor| factor.weight * per_category.get(&factor.category).copied().unwrap_or(0.0))
            .sum();
        (weighted / total_weight * SCORE_SCALE).clamp(0.0, SCORE_SCALE)
    } else {
        0.0
    };

    SoftScore {
        composite,
        per_category,
    }
}

fn keyword_signal(hits: u32, expected_hits: u32) -> f64 {
    if expected_hits == 0 {
        return if hits > 0 { 1.0 } else { 0.0 };
    }
    (f64::from(hits) / f64::from(expected_hits)).min(1.0)
}

fn experience_signal(years: Option<f64>, preferred: Option<f64>) -> f64 {
    match (years, preferred) {
        (Some(years), Some(preferred)) if preferred > 0.0 => (years / preferred).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Shortlist order: composite descending, then years descending with unknown last, then id.
pub fn rank_order(left: &ScoredCandidate, right: &ScoredCandidate) -> Ordering {
    right
        .composite_score
        .total_cmp(&left.composite_score)
        .then_with(|| {
            match (left.facts.years_experience, right.facts.years_experience) {
                (Some(left), Some(right)) => right.total_cmp(&left),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| left.id().cmp(right.id()))
}
