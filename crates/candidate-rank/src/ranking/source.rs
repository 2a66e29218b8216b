use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::criteria::JobCriteria;
use super::domain::{CandidateId, RawCandidate};

/// Supplier of the candidate pool for a job. Retrieval services implement this seam.
pub trait CandidateSource {
    fn candidates(&self, job: &JobCriteria) -> Result<Vec<RawCandidate>, SourceError>;
}

/// Fixed pools held in memory: an optional pool per job key, falling back to a shared pool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCandidateSource {
    shared: Vec<RawCandidate>,
    per_job: BTreeMap<String, Vec<RawCandidate>>,
}

impl InMemoryCandidateSource {
    pub fn new(shared: Vec<RawCandidate>) -> Self {
        Self {
            shared,
            per_job: BTreeMap::new(),
        }
    }

    pub fn with_job_pool(mut self, job: impl Into<String>, pool: Vec<RawCandidate>) -> Self {
        self.per_job.insert(job.into(), pool);
        self
    }
}

impl CandidateSource for InMemoryCandidateSource {
    fn candidates(&self, job: &JobCriteria) -> Result<Vec<RawCandidate>, SourceError> {
        Ok(self
            .per_job
            .get(&job.key)
            .unwrap_or(&self.shared)
            .clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read candidate pool: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid candidate JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("candidate record {row} has no id")]
    MissingId { row: usize },
    #[error("candidate id `{0}` appears more than once")]
    DuplicateId(CandidateId),
    #[error("candidate pool unavailable for job `{job}`: {reason}")]
    Unavailable { job: String, reason: String },
}

/// Reads candidate pools from CSV (`id,headline,profile,education`) or JSON arrays.
pub struct CandidatePoolImporter;

impl CandidatePoolImporter {
    /// Format is chosen by extension: `.json` is JSON, anything else CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawCandidate>, SourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_reader(file)
        } else {
            Self::from_csv_reader(file)
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<RawCandidate>, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut candidates = Vec::new();
        for record in csv_reader.deserialize::<CandidateRow>() {
            let row = record?;
            candidates.push(RawCandidate::new(
                row.id.unwrap_or_default(),
                row.headline.unwrap_or_default(),
                row.profile.unwrap_or_default(),
                row.education.unwrap_or_default(),
            ));
        }

        validate_pool(&candidates)?;
        Ok(candidates)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Vec<RawCandidate>, SourceError> {
        let candidates: Vec<RawCandidate> = serde_json::from_reader(reader)?;
        validate_pool(&candidates)?;
        Ok(candidates)
    }
}

/// Every candidate needs a non-blank id, unique within the pool.
pub fn validate_pool(candidates: &[RawCandidate]) -> Result<(), SourceError> {
    let mut seen = HashSet::with_capacity(candidates.len());
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.id.as_str().trim().is_empty() {
            return Err(SourceError::MissingId { row: index + 1 });
        }
        if !seen.insert(&candidate.id) {
            return Err(SourceError::DuplicateId(candidate.id.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    headline: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    profile: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    education: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
