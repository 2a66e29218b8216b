use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for retrieved candidate profiles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Profile as supplied by the retrieval collaborator. Never modified by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub id: CandidateId,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub education: String,
}

impl RawCandidate {
    pub fn new(
        id: impl Into<String>,
        headline: impl Into<String>,
        profile: impl Into<String>,
        education: impl Into<String>,
    ) -> Self {
        Self {
            id: CandidateId(id.into()),
            headline: headline.into(),
            profile: profile.into(),
            education: education.into(),
        }
    }

    /// Headline, profile body, and education joined for whole-profile scans.
    pub fn full_text(&self) -> String {
        [
            self.headline.as_str(),
            self.profile.as_str(),
            self.education.as_str(),
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Degree classes recognised in education text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeType {
    Jd,
    Md,
    Phd,
    Mba,
    Llm,
    Master,
    Bachelor,
    Other,
    None,
}

impl DegreeType {
    pub fn label(&self) -> &'static str {
        match self {
            DegreeType::Jd => "JD",
            DegreeType::Md => "MD",
            DegreeType::Phd => "PhD",
            DegreeType::Mba => "MBA",
            DegreeType::Llm => "LL.M.",
            DegreeType::Master => "Master",
            DegreeType::Bachelor => "Bachelor",
            DegreeType::Other => "Other",
            DegreeType::None => "None",
        }
    }

    /// Accepts configuration spellings such as `jd`, `has_jd`, `ph.d.` or `masters`.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        let key = lowered.strip_prefix("has_").unwrap_or(&lowered);
        let compact: String = key.chars().filter(|ch| ch.is_ascii_alphanumeric()).collect();
        let degree = match compact.as_str() {
            "jd" => DegreeType::Jd,
            "md" => DegreeType::Md,
            "phd" | "doctorate" => DegreeType::Phd,
            "mba" => DegreeType::Mba,
            "llm" => DegreeType::Llm,
            "master" | "masters" => DegreeType::Master,
            "bachelor" | "bachelors" => DegreeType::Bachelor,
            "other" => DegreeType::Other,
            "none" => DegreeType::None,
            _ => return None,
        };
        Some(degree)
    }

    /// Rank used by [`ExtractedFacts::highest_degree`]; professional doctorates first.
    fn seniority(&self) -> u8 {
        match self {
            DegreeType::Phd => 8,
            DegreeType::Md => 7,
            DegreeType::Jd => 6,
            DegreeType::Mba => 5,
            DegreeType::Llm => 4,
            DegreeType::Master => 3,
            DegreeType::Bachelor => 2,
            DegreeType::Other => 1,
            DegreeType::None => 0,
        }
    }
}

impl fmt::Display for DegreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed facts derived from one candidate's text for one job vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFacts {
    pub years_experience: Option<f64>,
    pub degrees: BTreeSet<DegreeType>,
    pub prestigious_institution: bool,
    pub keyword_hits: BTreeMap<String, u32>,
}

impl ExtractedFacts {
    pub fn has_degree(&self, degree: DegreeType) -> bool {
        self.degrees.contains(&degree)
    }

    pub fn hits(&self, category: &str) -> u32 {
        self.keyword_hits.get(category).copied().unwrap_or(0)
    }

    pub fn highest_degree(&self) -> DegreeType {
        self.degrees
            .iter()
            .copied()
            .max_by_key(DegreeType::seniority)
            .unwrap_or(DegreeType::None)
    }
}

/// Candidate admitted through the hard filter together with its soft score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: RawCandidate,
    pub facts: ExtractedFacts,
    pub composite_score: f64,
    pub per_category_scores: BTreeMap<String, f64>,
}

impl ScoredCandidate {
    pub fn id(&self) -> &CandidateId {
        &self.candidate.id
    }
}
