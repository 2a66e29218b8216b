//! Job catalogs keyed by job name.
//!
//! Each job is validated on its own. A job that fails validation stays in the catalog as a
//! recorded [`CriteriaError`] so batch runs can report it without losing the other jobs.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use super::criteria::{CriteriaError, JobCriteria, RawJobCriteria};

const BUILTIN_CATALOG: &str = include_str!("../../assets/job_catalog.json");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read job catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("job catalog must be a JSON object of job configurations: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    jobs: BTreeMap<String, JobCriteria>,
    invalid: BTreeMap<String, CriteriaError>,
}

impl JobCatalog {
    /// The ten roles shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_reader(BUILTIN_CATALOG.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let entries: BTreeMap<String, Value> = serde_json::from_reader(reader)?;
        let mut catalog = Self::default();

        for (key, value) in entries {
            let job = serde_json::from_value::<RawJobCriteria>(value)
                .map_err(|err| CriteriaError::MalformedJob {
                    job: key.clone(),
                    reason: err.to_string(),
                })
                .and_then(|raw| JobCriteria::from_raw(&key, raw));
            catalog.insert(key, job);
        }

        Ok(catalog)
    }

    pub fn from_jobs(jobs: impl IntoIterator<Item = JobCriteria>) -> Self {
        Self {
            jobs: jobs.into_iter().map(|job| (job.key.clone(), job)).collect(),
            invalid: BTreeMap::new(),
        }
    }

    /// Record a job or its configuration error under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: String, job: Result<JobCriteria, CriteriaError>) {
        match job {
            Ok(job) => {
                self.invalid.remove(&key);
                self.jobs.insert(key, job);
            }
            Err(err) => {
                warn!(job = %key, error = %err, "job configuration rejected");
                self.jobs.remove(&key);
                self.invalid.insert(key, err);
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<&JobCriteria, CriteriaError> {
        if let Some(job) = self.jobs.get(key) {
            return Ok(job);
        }
        match self.invalid.get(key) {
            Some(err) => Err(err.clone()),
            None => Err(CriteriaError::UnknownJob(key.to_string())),
        }
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobCriteria> {
        self.jobs.values()
    }

    pub fn invalid(&self) -> &BTreeMap<String, CriteriaError> {
        &self.invalid
    }

    /// Every key in the catalog, valid or not, in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .jobs
            .keys()
            .chain(self.invalid.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.jobs.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::criteria::HardCriterion;
    use crate::ranking::domain::DegreeType;

    #[test]
    fn builtin_catalog_ships_ten_valid_roles() {
        let catalog = JobCatalog::builtin().expect("builtin catalog parses");

        assert_eq!(catalog.len(), 10);
        assert!(catalog.invalid().is_empty(), "{:?}", catalog.invalid());

        let tax = catalog.get("tax_lawyer").expect("tax lawyer present");
        assert_eq!(tax.title, "Tax Lawyer");
        assert!(tax.hard_criteria.contains(&HardCriterion::AnyDegreeOf {
            degrees: vec![DegreeType::Jd, DegreeType::Llm]
        }));
    }

    #[test]
    fn invalid_job_is_kept_as_failure() {
        let json = r#"{
            "good": {"hard_criteria": {"min_years_experience": 2}},
            "bad": {"hard_criteria": {"min_gpa": 3.5}},
            "worse": {"hard_criteria": []}
        }"#;
        let catalog = JobCatalog::from_reader(json.as_bytes()).expect("catalog parses");

        assert_eq!(catalog.keys(), vec!["bad", "good", "worse"]);
        assert!(catalog.get("good").is_ok());
        assert!(matches!(
            catalog.get("bad"),
            Err(CriteriaError::UnknownCriterion { .. })
        ));
        assert!(matches!(
            catalog.get("worse"),
            Err(CriteriaError::MalformedJob { .. })
        ));
        assert_eq!(
            catalog.get("missing").expect_err("unknown"),
            CriteriaError::UnknownJob("missing".to_string())
        );
    }

    #[test]
    fn non_object_catalog_is_malformed() {
        let err = JobCatalog::from_reader("[1, 2]".as_bytes()).expect_err("not an object");
        assert!(matches!(err, CatalogError::Malformed(_)));
    }
}
