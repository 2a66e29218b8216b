//! Structured-attribute extraction from free-text candidate profiles.
//!
//! Extraction is total: unrecognised or empty text yields the default value for each field
//! rather than an error. Output depends only on the input text and the vocabulary, so the
//! same candidate extracted twice produces identical facts.

mod degrees;
mod experience;
pub(crate) mod text;

pub use experience::{
    ExperienceEstimate, ExperienceRule, ExperienceRuleChain, MAX_PLAUSIBLE_YEARS,
};

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{trace, warn};

use super::domain::{ExtractedFacts, RawCandidate};

/// Institutions flagged as prestigious when a job does not configure its own list.
pub const DEFAULT_PRESTIGE_INSTITUTIONS: &[&str] = &[
    "harvard",
    "stanford",
    "mit",
    "yale",
    "princeton",
    "columbia",
    "ucla",
    "berkeley",
    "uchicago",
    "university of chicago",
    "penn",
    "upenn",
    "university of pennsylvania",
    "northwestern",
    "johns hopkins",
    "duke",
    "cornell",
    "nyu",
    "new york university",
    "harvard business school",
    "stanford graduate school of business",
    "wharton",
    "kellogg",
    "booth",
    "columbia business school",
    "mit sloan",
];

/// Job-specific terms the extractor looks for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionVocabulary {
    pub keyword_categories: BTreeMap<String, Vec<String>>,
    pub prestige_institutions: Vec<String>,
    /// Closes open-ended ranges ("2019 - present") during date arithmetic.
    pub reference_year: i32,
}

/// Compiled matcher set for one vocabulary.
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    experience: ExperienceRuleChain,
    keyword_patterns: Vec<(String, Vec<Regex>)>,
    prestige_patterns: Vec<Regex>,
}

impl AttributeExtractor {
    pub fn new(vocabulary: &ExtractionVocabulary) -> Self {
        let keyword_patterns = vocabulary
            .keyword_categories
            .iter()
            .map(|(category, terms)| {
                let patterns = terms
                    .iter()
                    .filter_map(|term| compile_term(category, term))
                    .collect();
                (category.clone(), patterns)
            })
            .collect();

        let prestige_patterns = vocabulary
            .prestige_institutions
            .iter()
            .map(|name| text::clean_words(name))
            .filter_map(|name| compile_term("prestige", &name))
            .collect();

        Self {
            experience: ExperienceRuleChain::standard(vocabulary.reference_year),
            keyword_patterns,
            prestige_patterns,
        }
    }

    /// Extract facts from profile text (headline and body) plus the education block.
    pub fn extract(&self, raw_text: &str, education_text: &str) -> ExtractedFacts {
        let profile = text::normalize(raw_text);
        let education = text::normalize(education_text);
        let full = match (profile.is_empty(), education.is_empty()) {
            (true, true) => return self.empty_facts(),
            (false, true) => profile.clone(),
            (true, false) => education.clone(),
            (false, false) => format!("{profile} {education}"),
        };

        let years_experience = self.experience.estimate(&profile).map(|estimate| {
            trace!(years = estimate.years, rule = estimate.rule, "experience estimated");
            estimate.years
        });

        let degrees = degrees::detect_degrees(&full);

        let prestige_source = if education_text.trim().is_empty() {
            text::clean_words(raw_text)
        } else {
            text::clean_words(education_text)
        };
        let prestigious_institution = self
            .prestige_patterns
            .iter()
            .any(|pattern| pattern.is_match(&prestige_source));

        let keyword_hits = self
            .keyword_patterns
            .iter()
            .map(|(category, patterns)| {
                let hits = patterns
                    .iter()
                    .map(|pattern| pattern.find_iter(&full).count() as u32)
                    .sum();
                (category.clone(), hits)
            })
            .collect();

        ExtractedFacts {
            years_experience,
            degrees,
            prestigious_institution,
            keyword_hits,
        }
    }

    pub fn extract_candidate(&self, candidate: &RawCandidate) -> ExtractedFacts {
        let raw_text = format!("{}\n{}", candidate.headline, candidate.profile);
        self.extract(&raw_text, &candidate.education)
    }

    fn empty_facts(&self) -> ExtractedFacts {
        ExtractedFacts {
            keyword_hits: self
                .keyword_patterns
                .iter()
                .map(|(category, _)| (category.clone(), 0))
                .collect(),
            ..ExtractedFacts::default()
        }
    }
}

fn compile_term(category: &str, term: &str) -> Option<Regex> {
    match text::term_pattern(term)? {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            warn!(category, term, error = %err, "skipping keyword that does not compile");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::domain::DegreeType;

    fn vocabulary() -> ExtractionVocabulary {
        let mut keyword_categories = BTreeMap::new();
        keyword_categories.insert(
            "irs_experience".to_string(),
            vec!["irs audit".to_string(), "tax controversy".to_string()],
        );
        keyword_categories.insert(
            "big_four".to_string(),
            vec!["deloitte".to_string(), "ey".to_string(), "kpmg".to_string()],
        );
        ExtractionVocabulary {
            keyword_categories,
            prestige_institutions: vec!["Harvard".to_string(), "MIT".to_string()],
            reference_year: 2025,
        }
    }

    #[test]
    fn extracts_tax_lawyer_profile() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let facts = extractor.extract(
            "10+ years of experience in tax law, JD from Harvard Law School",
            "",
        );

        assert_eq!(facts.years_experience, Some(10.0));
        assert_eq!(facts.degrees.iter().copied().collect::<Vec<_>>(), vec![DegreeType::Jd]);
        assert!(facts.prestigious_institution);
    }

    #[test]
    fn empty_text_yields_defaults_with_zeroed_categories() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let facts = extractor.extract("   ", "");

        assert_eq!(facts.years_experience, None);
        assert!(facts.degrees.is_empty());
        assert!(!facts.prestigious_institution);
        assert_eq!(facts.hits("irs_experience"), 0);
        assert_eq!(facts.keyword_hits.len(), 2);
    }

    #[test]
    fn counts_keyword_occurrences_per_category() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let facts = extractor.extract(
            "Led IRS audit defence and tax controversy work. Another IRS Audit in 2019. Keyed at KPMG.",
            "",
        );

        assert_eq!(facts.hits("irs_experience"), 3);
        // "ey" must not fire inside "Keyed".
        assert_eq!(facts.hits("big_four"), 1);
    }

    #[test]
    fn prestige_reads_education_block_when_present() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let facts = extractor.extract("Visiting lecturer at Harvard", "B.A., State University");
        assert!(!facts.prestigious_institution);

        let facts = extractor.extract("Engineer", "S.M., MIT (2012)");
        assert!(facts.prestigious_institution);
    }

    #[test]
    fn experience_ignores_education_dates() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let facts = extractor.extract("Associate", "J.D. 2010-2013");
        assert_eq!(facts.years_experience, None);
        assert!(facts.has_degree(DegreeType::Jd));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = AttributeExtractor::new(&vocabulary());
        let candidate = RawCandidate::new(
            "c-1",
            "Tax Controversy Counsel",
            "Deloitte 2012-2016, KPMG 2016 - present. IRS audit lead.",
            "JD, Harvard; LL.M. Taxation, NYU",
        );

        let first = extractor.extract_candidate(&candidate);
        let second = extractor.extract_candidate(&candidate);
        assert_eq!(first, second);
        assert_eq!(first.years_experience, Some(13.0));
    }
}
