use candidate_rank::config::RankingConfig;
use candidate_rank::error::AppError;
use candidate_rank::ranking::{JobCatalog, JobCriteria, RawJobCriteria};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog from an explicit path, then `RANK_JOBS_PATH`, then the built-in roles.
pub(crate) fn load_catalog(
    config: &RankingConfig,
    override_path: Option<&Path>,
) -> Result<JobCatalog, AppError> {
    let path: Option<PathBuf> = override_path
        .map(Path::to_path_buf)
        .or_else(|| config.jobs_path.clone());

    let catalog = match path {
        Some(path) => {
            info!(path = %path.display(), "loading job catalog");
            JobCatalog::from_path(&path)?
        }
        None => JobCatalog::builtin()?,
    };
    Ok(catalog)
}

/// A single job described by a JSON file in the raw configuration format.
pub(crate) fn load_job_file(path: &Path) -> Result<JobCriteria, AppError> {
    let file = std::fs::File::open(path)?;
    let raw: RawJobCriteria = serde_json::from_reader(file)?;
    let key = raw
        .name
        .clone()
        .or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "adhoc".to_string());
    Ok(JobCriteria::from_raw(&key, raw)?)
}
