//! Conjunctive hard-criteria gate.

use serde::Serialize;

use super::criteria::{required_keyword_category, HardCriterion};
use super::domain::ExtractedFacts;

/// First criterion a rejected candidate did not meet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterFailure {
    pub criterion: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum FilterVerdict {
    Admitted,
    Rejected(FilterFailure),
}

impl FilterVerdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, FilterVerdict::Admitted)
    }
}

/// True iff every criterion holds. An empty list admits everyone.
pub fn passes(facts: &ExtractedFacts, criteria: &[HardCriterion]) -> bool {
    criteria.iter().all(|criterion| check(facts, criterion).is_ok())
}

/// Same decision as [`passes`], reporting the first failing criterion in evaluation order.
pub fn evaluate(facts: &ExtractedFacts, criteria: &[HardCriterion]) -> FilterVerdict {
    criteria
        .iter()
        .find_map(|criterion| check(facts, criterion).err())
        .map_or(FilterVerdict::Admitted, FilterVerdict::Rejected)
}

fn check(facts: &ExtractedFacts, criterion: &HardCriterion) -> Result<(), FilterFailure> {
    let failure = |expected: String, actual: String| FilterFailure {
        criterion: criterion.name(),
        expected,
        actual,
    };

    match criterion {
        HardCriterion::MinYearsExperience { years } => match facts.years_experience {
            Some(actual) if actual >= *years => Ok(()),
            actual => Err(failure(format!(">= {years} years"), describe_years(actual))),
        },
        // Unknown experience cannot exceed a ceiling.
        HardCriterion::MaxYearsExperience { years } => match facts.years_experience {
            Some(actual) if actual > *years => Err(failure(
                format!("<= {years} years"),
                describe_years(Some(actual)),
            )),
            _ => Ok(()),
        },
        HardCriterion::HasDegree => {
            if facts.degrees.is_empty() {
                Err(failure("any degree".to_string(), "none".to_string()))
            } else {
                Ok(())
            }
        }
        HardCriterion::RequiredDegree { degree } => {
            if facts.has_degree(*degree) {
                Ok(())
            } else {
                Err(failure(degree.label().to_string(), describe_degrees(facts)))
            }
        }
        HardCriterion::AnyDegreeOf { degrees } => {
            if degrees.iter().any(|degree| facts.has_degree(*degree)) {
                Ok(())
            } else {
                let expected = degrees
                    .iter()
                    .map(|degree| degree.label())
                    .collect::<Vec<_>>()
                    .join(" or ");
                Err(failure(expected, describe_degrees(facts)))
            }
        }
        HardCriterion::MinKeywordHits { category, hits } => {
            let actual = facts.hits(category);
            if actual >= *hits {
                Ok(())
            } else {
                Err(failure(format!(">= {hits} hits"), format!("{actual} hits")))
            }
        }
        HardCriterion::RequiredKeywords { terms } => {
            let missing: Vec<&str> = terms
                .iter()
                .filter(|term| facts.hits(&required_keyword_category(term)) == 0)
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                Ok(())
            } else {
                Err(failure(
                    format!("all of: {}", terms.join(", ")),
                    format!("missing: {}", missing.join(", ")),
                ))
            }
        }
        HardCriterion::PrestigiousInstitution => {
            if facts.prestigious_institution {
                Ok(())
            } else {
                Err(failure(
                    "prestigious institution".to_string(),
                    "not detected".to_string(),
                ))
            }
        }
    }
}

fn describe_years(years: Option<f64>) -> String {
    years.map_or_else(|| "unknown".to_string(), |years| format!("{years} years"))
}

fn describe_degrees(facts: &ExtractedFacts) -> String {
    if facts.degrees.is_empty() {
        return "none".to_string();
    }
    facts
        .degrees
        .iter()
        .map(|degree| degree.label())
        .collect::<Vec<_>>()
        .join(", ")
}
