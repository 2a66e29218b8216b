//! Typed job configuration.
//!
//! Jobs arrive as loosely structured JSON mappings ([`RawJobCriteria`]) and are converted
//! into [`JobCriteria`] once, at load time. Every configuration problem (unknown criterion
//! kinds, non-positive weights, weighted categories without keywords) surfaces here as a
//! [`CriteriaError`] instead of during scoring.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::domain::DegreeType;
use super::extraction::{ExtractionVocabulary, DEFAULT_PRESTIGE_INSTITUTIONS};

/// Weighted category fed by the years-of-experience ramp.
pub const EXPERIENCE_CATEGORY: &str = "experience";
/// Weighted category fed by the prestige flag.
pub const PRESTIGE_CATEGORY: &str = "prestige";
/// Keyword hits at which a category saturates when no per-category value is configured.
pub const DEFAULT_EXPECTED_HITS: u32 = 3;
/// Weight given to the experience ramp when a job sets `preferred_experience` without
/// weighting it explicitly.
pub const IMPLICIT_EXPERIENCE_WEIGHT: f64 = 2.0;
/// Keyword category filled by `preferred_keywords`.
pub const PREFERRED_CATEGORY: &str = "preferred";
/// Weight of the preferred-keywords category unless `weight_factors` overrides it.
pub const IMPLICIT_PREFERRED_WEIGHT: f64 = 1.0;

/// Non-negotiable gate a candidate must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HardCriterion {
    MinYearsExperience { years: f64 },
    MaxYearsExperience { years: f64 },
    HasDegree,
    RequiredDegree { degree: DegreeType },
    AnyDegreeOf { degrees: Vec<DegreeType> },
    MinKeywordHits { category: String, hits: u32 },
    /// Every term must appear at least once.
    RequiredKeywords { terms: Vec<String> },
    PrestigiousInstitution,
}

impl HardCriterion {
    /// Stable name used in failure diagnostics and statistics.
    pub fn name(&self) -> String {
        match self {
            HardCriterion::MinYearsExperience { .. } => "min_years_experience".to_string(),
            HardCriterion::MaxYearsExperience { .. } => "max_years_experience".to_string(),
            HardCriterion::HasDegree => "has_degree".to_string(),
            HardCriterion::RequiredDegree { degree } => {
                format!("required_degree.{}", degree_key(*degree))
            }
            HardCriterion::AnyDegreeOf { .. } => "any_degree_of".to_string(),
            HardCriterion::MinKeywordHits { category, .. } => {
                format!("min_keyword_hits.{category}")
            }
            HardCriterion::RequiredKeywords { .. } => "required_keywords".to_string(),
            HardCriterion::PrestigiousInstitution => "prestigious_institution".to_string(),
        }
    }

    /// Evaluation order: cheap numeric gates first, then degrees, keywords, prestige.
    fn precedence(&self) -> u8 {
        match self {
            HardCriterion::MinYearsExperience { .. } => 0,
            HardCriterion::MaxYearsExperience { .. } => 1,
            HardCriterion::HasDegree => 2,
            HardCriterion::RequiredDegree { .. } => 3,
            HardCriterion::AnyDegreeOf { .. } => 4,
            HardCriterion::MinKeywordHits { .. } => 5,
            HardCriterion::RequiredKeywords { .. } => 6,
            HardCriterion::PrestigiousInstitution => 7,
        }
    }
}

fn degree_key(degree: DegreeType) -> &'static str {
    match degree {
        DegreeType::Jd => "jd",
        DegreeType::Md => "md",
        DegreeType::Phd => "phd",
        DegreeType::Mba => "mba",
        DegreeType::Llm => "llm",
        DegreeType::Master => "master",
        DegreeType::Bachelor => "bachelor",
        DegreeType::Other => "other",
        DegreeType::None => "none",
    }
}

/// Source of the normalised [0, 1] signal behind a weighted category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SignalKind {
    Keywords { expected_hits: u32 },
    Experience,
    Prestige,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFactor {
    pub category: String,
    pub weight: f64,
    #[serde(flatten)]
    pub signal: SignalKind,
}

/// Weighted preferences used to rank admitted candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftCriteria {
    pub factors: Vec<WeightFactor>,
    pub keyword_categories: BTreeMap<String, Vec<String>>,
    pub preferred_experience: Option<f64>,
    /// Fraction of the prestige category awarded to flagged candidates.
    pub prestige_bonus: f64,
}

impl Default for SoftCriteria {
    fn default() -> Self {
        Self {
            factors: Vec::new(),
            keyword_categories: BTreeMap::new(),
            preferred_experience: None,
            prestige_bonus: 1.0,
        }
    }
}

impl SoftCriteria {
    pub fn total_weight(&self) -> f64 {
        self.factors.iter().map(|factor| factor.weight).sum()
    }

    pub fn weight_of(&self, category: &str) -> Option<f64> {
        self.factors
            .iter()
            .find(|factor| factor.category == category)
            .map(|factor| factor.weight)
    }
}

/// Validated configuration for one job role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobCriteria {
    pub key: String,
    pub title: String,
    pub query: String,
    pub hard_criteria: Vec<HardCriterion>,
    pub soft_criteria: SoftCriteria,
    pub prestige_institutions: Vec<String>,
}

impl JobCriteria {
    /// Build and validate a job from typed parts, using the default prestige list.
    pub fn new(
        key: impl Into<String>,
        hard_criteria: Vec<HardCriterion>,
        soft_criteria: SoftCriteria,
    ) -> Result<Self, CriteriaError> {
        let key = key.into();
        let mut job = Self {
            title: key.clone(),
            key,
            query: String::new(),
            hard_criteria,
            soft_criteria,
            prestige_institutions: default_prestige_institutions(),
        };
        job.canonicalize();
        job.validate()?;
        Ok(job)
    }

    /// Convert the JSON mapping form into a validated job.
    pub fn from_raw(key: &str, raw: RawJobCriteria) -> Result<Self, CriteriaError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CriteriaError::MissingField {
                job: String::new(),
                field: "name".to_string(),
            });
        }

        let hard_criteria = parse_hard_criteria(key, &raw.hard_criteria)?;
        let soft_criteria = parse_soft_criteria(key, &raw.soft_criteria)?;

        let mut job = Self {
            key: key.to_string(),
            title: raw
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| key.to_string()),
            query: raw.query.unwrap_or_default(),
            hard_criteria,
            soft_criteria,
            prestige_institutions: raw
                .prestige_institutions
                .unwrap_or_else(default_prestige_institutions),
        };
        job.canonicalize();
        job.validate()?;
        Ok(job)
    }

    /// Check internal consistency. Called by every constructor and again by the coordinator.
    pub fn validate(&self) -> Result<(), CriteriaError> {
        let job = self.key.as_str();
        if job.trim().is_empty() {
            return Err(CriteriaError::MissingField {
                job: String::new(),
                field: "name".to_string(),
            });
        }

        let mut min_years = None;
        let mut max_years = None;
        for criterion in &self.hard_criteria {
            match criterion {
                HardCriterion::MinYearsExperience { years } => {
                    ensure_years(job, criterion, *years)?;
                    min_years = Some(*years);
                }
                HardCriterion::MaxYearsExperience { years } => {
                    ensure_years(job, criterion, *years)?;
                    max_years = Some(*years);
                }
                HardCriterion::RequiredDegree {
                    degree: DegreeType::None,
                } => {
                    return Err(invalid(job, criterion, "`none` cannot be required"));
                }
                HardCriterion::AnyDegreeOf { degrees } if degrees.is_empty() => {
                    return Err(invalid(job, criterion, "needs at least one degree"));
                }
                HardCriterion::RequiredKeywords { terms }
                    if terms.is_empty() || terms.iter().any(|term| term.trim().is_empty()) =>
                {
                    return Err(invalid(job, criterion, "needs non-blank terms"));
                }
                HardCriterion::MinKeywordHits { category, .. }
                    if !self.soft_criteria.keyword_categories.contains_key(category) =>
                {
                    return Err(CriteriaError::MissingKeywords {
                        job: job.to_string(),
                        category: category.clone(),
                    });
                }
                _ => {}
            }
        }

        if let (Some(min), Some(max)) = (min_years, max_years) {
            if min > max {
                return Err(CriteriaError::InvalidCriterion {
                    job: job.to_string(),
                    criterion: "max_years_experience".to_string(),
                    reason: format!("maximum {max} is below minimum {min}"),
                });
            }
        }

        let soft = &self.soft_criteria;
        if !soft.prestige_bonus.is_finite() || soft.prestige_bonus <= 0.0 || soft.prestige_bonus > 1.0
        {
            return Err(CriteriaError::InvalidSoftCriterion {
                job: job.to_string(),
                field: "prestige_bonus".to_string(),
                reason: format!("must be in (0, 1], got {}", soft.prestige_bonus),
            });
        }

        let mut seen = BTreeSet::new();
        for factor in &soft.factors {
            if !seen.insert(factor.category.as_str()) {
                return Err(CriteriaError::InvalidSoftCriterion {
                    job: job.to_string(),
                    field: "weight_factors".to_string(),
                    reason: format!("category `{}` weighted twice", factor.category),
                });
            }
            if !factor.weight.is_finite() || factor.weight <= 0.0 {
                return Err(CriteriaError::InvalidWeight {
                    job: job.to_string(),
                    category: factor.category.clone(),
                    weight: factor.weight,
                });
            }
            match &factor.signal {
                SignalKind::Keywords { expected_hits } => {
                    let has_terms = soft
                        .keyword_categories
                        .get(&factor.category)
                        .map(|terms| terms.iter().any(|term| !term.trim().is_empty()))
                        .unwrap_or(false);
                    if !has_terms {
                        return Err(CriteriaError::MissingKeywords {
                            job: job.to_string(),
                            category: factor.category.clone(),
                        });
                    }
                    if *expected_hits == 0 {
                        return Err(CriteriaError::InvalidSoftCriterion {
                            job: job.to_string(),
                            field: "expected_hits".to_string(),
                            reason: format!("`{}` must saturate at one hit or more", factor.category),
                        });
                    }
                }
                SignalKind::Experience => match soft.preferred_experience {
                    Some(years) if years.is_finite() && years > 0.0 => {}
                    Some(years) => {
                        return Err(CriteriaError::InvalidSoftCriterion {
                            job: job.to_string(),
                            field: "preferred_experience".to_string(),
                            reason: format!("must be a positive number of years, got {years}"),
                        });
                    }
                    None => {
                        return Err(CriteriaError::MissingField {
                            job: job.to_string(),
                            field: "preferred_experience".to_string(),
                        });
                    }
                },
                SignalKind::Prestige => {}
            }
        }

        Ok(())
    }

    /// Vocabulary the extractor needs for this job. Each required keyword is counted in
    /// its own category so the filter can check terms individually.
    pub fn vocabulary(&self, reference_year: i32) -> ExtractionVocabulary {
        let mut keyword_categories = self.soft_criteria.keyword_categories.clone();
        for criterion in &self.hard_criteria {
            if let HardCriterion::RequiredKeywords { terms } = criterion {
                for term in terms {
                    keyword_categories.insert(required_keyword_category(term), vec![term.clone()]);
                }
            }
        }
        ExtractionVocabulary {
            keyword_categories,
            prestige_institutions: self.prestige_institutions.clone(),
            reference_year,
        }
    }

    fn canonicalize(&mut self) {
        self.hard_criteria.sort_by_key(HardCriterion::precedence);
        self.soft_criteria
            .factors
            .sort_by(|left, right| left.category.cmp(&right.category));
    }
}

/// Category under which a required keyword's hits are counted.
pub(crate) fn required_keyword_category(term: &str) -> String {
    format!("required_keywords.{}", term.trim().to_lowercase())
}

fn default_prestige_institutions() -> Vec<String> {
    DEFAULT_PRESTIGE_INSTITUTIONS
        .iter()
        .map(|name| name.to_string())
        .collect()
}

fn ensure_years(job: &str, criterion: &HardCriterion, years: f64) -> Result<(), CriteriaError> {
    if years.is_finite() && years >= 0.0 {
        Ok(())
    } else {
        Err(invalid(job, criterion, "years must be a non-negative number"))
    }
}

fn invalid(job: &str, criterion: &HardCriterion, reason: &str) -> CriteriaError {
    CriteriaError::InvalidCriterion {
        job: job.to_string(),
        criterion: criterion.name(),
        reason: reason.to_string(),
    }
}

/// Untyped job configuration as written in catalogs and API requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawJobCriteria {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub hard_criteria: Map<String, Value>,
    #[serde(default)]
    pub soft_criteria: Map<String, Value>,
    #[serde(default)]
    pub prestige_institutions: Option<Vec<String>>,
}

fn parse_hard_criteria(
    job: &str,
    raw: &Map<String, Value>,
) -> Result<Vec<HardCriterion>, CriteriaError> {
    let mut criteria = Vec::new();

    for (name, value) in raw {
        let shape_error = |reason: &str| CriteriaError::InvalidCriterion {
            job: job.to_string(),
            criterion: name.clone(),
            reason: reason.to_string(),
        };

        match name.as_str() {
            "min_years_experience" => {
                if let Some(years) = optional_number(value).map_err(|_| shape_error("expected a number"))? {
                    criteria.push(HardCriterion::MinYearsExperience { years });
                }
            }
            "max_years_experience" => {
                if let Some(years) = optional_number(value).map_err(|_| shape_error("expected a number"))? {
                    criteria.push(HardCriterion::MaxYearsExperience { years });
                }
            }
            "has_degree" => {
                if value.as_bool().ok_or_else(|| shape_error("expected a boolean"))? {
                    criteria.push(HardCriterion::HasDegree);
                }
            }
            "prestigious_institution" => {
                if value.as_bool().ok_or_else(|| shape_error("expected a boolean"))? {
                    criteria.push(HardCriterion::PrestigiousInstitution);
                }
            }
            "required_degree" => {
                let degree = value
                    .as_str()
                    .and_then(DegreeType::parse)
                    .ok_or_else(|| shape_error("expected a degree name such as \"jd\""))?;
                criteria.push(HardCriterion::RequiredDegree { degree });
            }
            "any_degree_of" => {
                let degrees = parse_degree_list(value).map_err(|reason| shape_error(&reason))?;
                criteria.push(HardCriterion::AnyDegreeOf { degrees });
            }
            "required_education" => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| shape_error("expected an object of degree flags"))?;
                for (flag, required) in entries {
                    if flag == "any_of" {
                        let degrees =
                            parse_degree_list(required).map_err(|reason| shape_error(&reason))?;
                        criteria.push(HardCriterion::AnyDegreeOf { degrees });
                        continue;
                    }
                    let degree = DegreeType::parse(flag)
                        .ok_or_else(|| shape_error(&format!("unknown degree flag `{flag}`")))?;
                    if required
                        .as_bool()
                        .ok_or_else(|| shape_error(&format!("`{flag}` must be a boolean")))?
                    {
                        criteria.push(HardCriterion::RequiredDegree { degree });
                    }
                }
            }
            "required_keywords" => {
                let terms = parse_terms(value)
                    .ok_or_else(|| shape_error("expected a list of terms"))?;
                let terms: Vec<String> = terms.into_iter().filter(|term| !term.is_empty()).collect();
                if !terms.is_empty() {
                    criteria.push(HardCriterion::RequiredKeywords { terms });
                }
            }
            "min_keyword_hits" => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| shape_error("expected an object of category counts"))?;
                for (category, hits) in entries {
                    let hits = hits
                        .as_u64()
                        .and_then(|hits| u32::try_from(hits).ok())
                        .ok_or_else(|| {
                            shape_error(&format!("`{category}` must be a non-negative integer"))
                        })?;
                    criteria.push(HardCriterion::MinKeywordHits {
                        category: category.clone(),
                        hits,
                    });
                }
            }
            _ => {
                return Err(CriteriaError::UnknownCriterion {
                    job: job.to_string(),
                    criterion: name.clone(),
                });
            }
        }
    }

    Ok(criteria)
}

fn optional_number(value: &Value) -> Result<Option<f64>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => number.as_f64().map(Some).ok_or(()),
        _ => Err(()),
    }
}

fn parse_degree_list(value: &Value) -> Result<Vec<DegreeType>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "expected a list of degree names".to_string())?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .and_then(DegreeType::parse)
                .ok_or_else(|| format!("unrecognised degree `{item}`"))
        })
        .collect()
}

fn parse_soft_criteria(job: &str, raw: &Map<String, Value>) -> Result<SoftCriteria, CriteriaError> {
    let field_error = |field: &str, reason: &str| CriteriaError::InvalidSoftCriterion {
        job: job.to_string(),
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let mut weights: BTreeMap<String, f64> = BTreeMap::new();
    let mut keyword_categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut expected_hits: BTreeMap<String, u32> = BTreeMap::new();
    let mut default_expected_hits = DEFAULT_EXPECTED_HITS;
    let mut preferred_experience = None;
    let mut prestige_bonus = 1.0;
    let mut has_preferred_keywords = false;

    for (field, value) in raw {
        match field.as_str() {
            "weight_factors" => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| field_error(field, "expected an object of weights"))?;
                for (category, weight) in entries {
                    let weight = weight.as_f64().ok_or_else(|| {
                        field_error(field, &format!("weight for `{category}` must be a number"))
                    })?;
                    weights.insert(category.clone(), weight);
                }
            }
            "keyword_categories" => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| field_error(field, "expected an object of term lists"))?;
                for (category, terms) in entries {
                    let terms = parse_terms(terms).ok_or_else(|| {
                        field_error(field, &format!("`{category}` must be a list of strings"))
                    })?;
                    keyword_categories.entry(category.clone()).or_default().extend(terms);
                }
            }
            "expected_hits" => {
                let entries = value
                    .as_object()
                    .ok_or_else(|| field_error(field, "expected an object of counts"))?;
                for (category, hits) in entries {
                    let hits = hits
                        .as_u64()
                        .and_then(|hits| u32::try_from(hits).ok())
                        .ok_or_else(|| {
                            field_error(field, &format!("`{category}` must be a positive integer"))
                        })?;
                    expected_hits.insert(category.clone(), hits);
                }
            }
            "default_expected_hits" => {
                default_expected_hits = value
                    .as_u64()
                    .and_then(|hits| u32::try_from(hits).ok())
                    .ok_or_else(|| field_error(field, "expected a positive integer"))?;
            }
            "preferred_experience" => {
                preferred_experience = optional_number(value)
                    .map_err(|_| field_error(field, "expected a number of years"))?;
            }
            "prestige_bonus" => {
                prestige_bonus = value
                    .as_f64()
                    .ok_or_else(|| field_error(field, "expected a fraction"))?;
            }
            "preferred_keywords" => {
                let terms = parse_terms(value)
                    .ok_or_else(|| field_error(field, "expected a list of strings"))?;
                has_preferred_keywords = terms.iter().any(|term| !term.is_empty());
                keyword_categories
                    .entry(PREFERRED_CATEGORY.to_string())
                    .or_default()
                    .extend(terms);
            }
            other => match other.strip_suffix("_keywords") {
                Some(category) if !category.is_empty() => {
                    let terms = parse_terms(value)
                        .ok_or_else(|| field_error(field, "expected a list of strings"))?;
                    keyword_categories
                        .entry(category.to_string())
                        .or_default()
                        .extend(terms);
                }
                _ => return Err(field_error(field, "unrecognised soft criterion")),
            },
        }
    }

    if preferred_experience.is_some() && !weights.contains_key(EXPERIENCE_CATEGORY) {
        weights.insert(EXPERIENCE_CATEGORY.to_string(), IMPLICIT_EXPERIENCE_WEIGHT);
    }
    if has_preferred_keywords {
        weights
            .entry(PREFERRED_CATEGORY.to_string())
            .or_insert(IMPLICIT_PREFERRED_WEIGHT);
        // Any single preferred term earns the full category.
        expected_hits.entry(PREFERRED_CATEGORY.to_string()).or_insert(1);
    }

    let factors = weights
        .into_iter()
        .map(|(category, weight)| {
            let signal = match category.as_str() {
                EXPERIENCE_CATEGORY => SignalKind::Experience,
                PRESTIGE_CATEGORY => SignalKind::Prestige,
                _ => SignalKind::Keywords {
                    expected_hits: expected_hits
                        .get(&category)
                        .copied()
                        .unwrap_or(default_expected_hits),
                },
            };
            WeightFactor {
                category,
                weight,
                signal,
            }
        })
        .collect();

    Ok(SoftCriteria {
        factors,
        keyword_categories,
        preferred_experience,
        prestige_bonus,
    })
}

fn parse_terms(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|term| term.as_str().map(|term| term.trim().to_string()))
        .collect()
}

/// Configuration problems. Fatal to the job they belong to, never to a whole batch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("job `{job}`: unknown hard criterion `{criterion}`")]
    UnknownCriterion { job: String, criterion: String },
    #[error("job `{job}`: hard criterion `{criterion}` is invalid: {reason}")]
    InvalidCriterion {
        job: String,
        criterion: String,
        reason: String,
    },
    #[error("job `{job}`: weight for `{category}` must be a positive number, got {weight}")]
    InvalidWeight {
        job: String,
        category: String,
        weight: f64,
    },
    #[error("job `{job}`: category `{category}` has no keyword terms")]
    MissingKeywords { job: String, category: String },
    #[error("job `{job}`: missing required field `{field}`")]
    MissingField { job: String, field: String },
    #[error("job `{job}`: soft criterion `{field}` is invalid: {reason}")]
    InvalidSoftCriterion {
        job: String,
        field: String,
        reason: String,
    },
    #[error("shortlist size must be at least 1")]
    InvalidShortlistSize,
    #[error("unknown job `{0}`")]
    UnknownJob(String),
    #[error("job `{job}` is not a valid configuration object: {reason}")]
    MalformedJob { job: String, reason: String },
}

impl CriteriaError {
    /// Job the error belongs to, when it belongs to one.
    pub fn job(&self) -> Option<&str> {
        match self {
            CriteriaError::UnknownCriterion { job, .. }
            | CriteriaError::InvalidCriterion { job, .. }
            | CriteriaError::InvalidWeight { job, .. }
            | CriteriaError::MissingKeywords { job, .. }
            | CriteriaError::MissingField { job, .. }
            | CriteriaError::InvalidSoftCriterion { job, .. }
            | CriteriaError::MalformedJob { job, .. } => Some(job.as_str()),
            CriteriaError::UnknownJob(job) => Some(job.as_str()),
            CriteriaError::InvalidShortlistSize => None,
        }
    }
}
