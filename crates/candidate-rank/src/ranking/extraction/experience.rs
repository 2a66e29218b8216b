use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::OnceLock;

/// Upper bound for a believable years-of-experience figure; larger values are noise.
pub const MAX_PLAUSIBLE_YEARS: f64 = 60.0;

/// Earliest start year accepted when reading employment date ranges.
const EARLIEST_RANGE_YEAR: i32 = 1980;

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

static EXPLICIT: OnceLock<Regex> = OnceLock::new();
static BARE: OnceLock<Regex> = OnceLock::new();
static SPAN: OnceLock<Regex> = OnceLock::new();

fn explicit_pattern() -> &'static Regex {
    EXPLICIT.get_or_init(|| {
        Regex::new(
            r"\b(\d{1,3}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\.?\s+(?:of\s+)?(?:(?:professional|relevant|work|working|industry|practice|practical|legal|clinical)\s+)?experience\b",
        )
        .expect("explicit experience pattern compiles")
    })
}

fn bare_pattern() -> &'static Regex {
    BARE.get_or_init(|| {
        Regex::new(r"\b(\d{1,3}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\b")
            .expect("bare year-count pattern compiles")
    })
}

fn span_pattern() -> &'static Regex {
    SPAN.get_or_init(|| {
        let year = format!(r"(?:\b{MONTH}\s*'?(\d{{4}}|\d{{2}})|'(\d{{2}})|\b(\d{{4}}))\b");
        let pattern = format!(
            r"{year}\s*(?:-|to|until|through)\s*(?:{year}|\b(present|current|now|today|date)\b)"
        );
        Regex::new(&pattern).expect("date span pattern compiles")
    })
}

/// One named way of estimating years of experience from normalised profile text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceRule {
    /// "10+ years of experience", "7 yrs professional experience".
    ExplicitStatement,
    /// Merged employment ranges such as "2015-2019" or "Mar 2020 - present".
    DateSpanArithmetic { reference_year: i32 },
    /// Any other "N years" mention.
    BareYearCount,
}

impl ExperienceRule {
    pub fn name(&self) -> &'static str {
        match self {
            ExperienceRule::ExplicitStatement => "explicit_statement",
            ExperienceRule::DateSpanArithmetic { .. } => "date_span_arithmetic",
            ExperienceRule::BareYearCount => "bare_year_count",
        }
    }

    /// Apply the rule to lowercased text, returning the largest plausible value it finds.
    pub fn apply(&self, text: &str) -> Option<f64> {
        match self {
            ExperienceRule::ExplicitStatement => max_plausible(explicit_pattern(), text),
            ExperienceRule::BareYearCount => max_plausible(bare_pattern(), text),
            ExperienceRule::DateSpanArithmetic { reference_year } => {
                span_years(text, *reference_year)
            }
        }
    }
}

/// Result of the rule chain, naming the rule that produced the figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExperienceEstimate {
    pub years: f64,
    pub rule: &'static str,
}

/// Ordered fallback over [`ExperienceRule`]s: the first rule yielding a value wins, so
/// an explicit statement always beats inferred date arithmetic.
#[derive(Debug, Clone)]
pub struct ExperienceRuleChain {
    rules: Vec<ExperienceRule>,
}

impl ExperienceRuleChain {
    pub fn standard(reference_year: i32) -> Self {
        Self {
            rules: vec![
                ExperienceRule::ExplicitStatement,
                ExperienceRule::DateSpanArithmetic { reference_year },
                ExperienceRule::BareYearCount,
            ],
        }
    }

    pub fn estimate(&self, text: &str) -> Option<ExperienceEstimate> {
        if text.trim().is_empty() {
            return None;
        }

        self.rules.iter().find_map(|rule| {
            rule.apply(text).map(|years| ExperienceEstimate {
                years,
                rule: rule.name(),
            })
        })
    }
}

fn plausible(value: f64) -> bool {
    value.is_finite() && (0.0..=MAX_PLAUSIBLE_YEARS).contains(&value)
}

fn max_plausible(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
        .filter(|value| plausible(*value))
        .fold(None, |best: Option<f64>, value| match best {
            Some(current) if current >= value => Some(current),
            _ => Some(value),
        })
}

fn span_years(text: &str, reference_year: i32) -> Option<f64> {
    let mut ranges: Vec<(i32, i32)> = span_pattern()
        .captures_iter(text)
        .filter_map(|caps| span_from_captures(&caps, reference_year))
        .filter(|(start, end)| {
            EARLIEST_RANGE_YEAR <= *start && start < end && *end <= reference_year
        })
        .collect();

    if ranges.is_empty() {
        return None;
    }

    ranges.sort_unstable();

    let mut merged: Vec<(i32, i32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let total: i32 = merged.iter().map(|(start, end)| end - start).sum();
    let total = f64::from(total);
    plausible(total).then_some(total)
}

fn span_from_captures(caps: &Captures<'_>, reference_year: i32) -> Option<(i32, i32)> {
    let start = first_year(caps, 1..=3, reference_year)?;
    let end = if caps.get(7).is_some() {
        reference_year
    } else {
        first_year(caps, 4..=6, reference_year)?
    };
    Some((start, end))
}

fn first_year(
    caps: &Captures<'_>,
    groups: std::ops::RangeInclusive<usize>,
    reference_year: i32,
) -> Option<i32> {
    let raw = groups.filter_map(|idx| caps.get(idx)).next()?.as_str();
    let value: i32 = raw.parse().ok()?;
    if raw.len() == 2 {
        let modern = 2000 + value;
        Some(if modern <= reference_year {
            modern
        } else {
            1900 + value
        })
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE_YEAR: i32 = 2025;

    fn span(text: &str) -> Option<f64> {
        ExperienceRule::DateSpanArithmetic {
            reference_year: REFERENCE_YEAR,
        }
        .apply(text)
    }

    #[test]
    fn explicit_statement_reads_plus_suffix() {
        let rule = ExperienceRule::ExplicitStatement;
        assert_eq!(
            rule.apply("10+ years of experience in tax law"),
            Some(10.0)
        );
        assert_eq!(rule.apply("over 7 yrs professional experience"), Some(7.0));
    }

    #[test]
    fn explicit_statement_takes_maximum_and_drops_noise() {
        let rule = ExperienceRule::ExplicitStatement;
        let text = "3 years of experience in audit; 12 years experience overall; 99 years of experience joke";
        assert_eq!(rule.apply(text), Some(12.0));
    }

    #[test]
    fn explicit_statement_ignores_unrelated_years() {
        assert_eq!(
            ExperienceRule::ExplicitStatement.apply("joined the firm 3 years ago"),
            None
        );
    }

    #[test]
    fn span_arithmetic_merges_overlapping_ranges() {
        let text = "associate 2012-2016; counsel 2015 - 2020; clerk 2008 to 2009";
        assert_eq!(span(text), Some(9.0));
    }

    #[test]
    fn span_arithmetic_closes_open_ranges_with_reference_year() {
        assert_eq!(span("staff physician mar 2019 - present"), Some(6.0));
    }

    #[test]
    fn span_arithmetic_reads_apostrophe_years() {
        assert_eq!(span("analyst '98 - '02"), Some(4.0));
        assert_eq!(span("engineer jan '18 to dec '21"), Some(3.0));
    }

    #[test]
    fn span_arithmetic_ignores_bare_two_digit_ranges() {
        assert_eq!(span("managed teams of 10-15 people"), None);
    }

    #[test]
    fn span_arithmetic_rejects_future_and_inverted_ranges() {
        assert_eq!(span("projected 2024-2030"), None);
        assert_eq!(span("2019-2015"), None);
    }

    #[test]
    fn chain_prefers_explicit_statement_over_dates() {
        let chain = ExperienceRuleChain::standard(REFERENCE_YEAR);
        let estimate = chain
            .estimate("4 years of experience. partner 2001-2021")
            .expect("estimate");
        assert_eq!(estimate.years, 4.0);
        assert_eq!(estimate.rule, "explicit_statement");
    }

    #[test]
    fn chain_falls_back_to_bare_counts() {
        let chain = ExperienceRuleChain::standard(REFERENCE_YEAR);
        let estimate = chain.estimate("practising for 6 years").expect("estimate");
        assert_eq!(estimate.years, 6.0);
        assert_eq!(estimate.rule, "bare_year_count");
    }

    #[test]
    fn chain_returns_none_for_empty_text() {
        let chain = ExperienceRuleChain::standard(REFERENCE_YEAR);
        assert!(chain.estimate("").is_none());
        assert!(chain.estimate("no numbers here").is_none());
    }
}
