//! Candidate ranking workflow: extraction, hard filtering, soft scoring and coordination.
//!
//! The core path (`extraction` → `filter` → `scoring` → `coordinator`) is synchronous and
//! performs no I/O. Catalog and pool loading, batch runs, reporting and the HTTP router
//! sit around it.

pub mod batch;
pub mod catalog;
pub mod coordinator;
pub mod criteria;
pub mod domain;
pub mod extraction;
pub mod filter;
pub mod report;
pub mod router;
pub mod scoring;
pub mod source;
pub mod submission;

#[cfg(test)]
mod tests;

pub use batch::{evaluate_batch, BatchOutcome, JobFailure, JobSummary};
pub use catalog::{CatalogError, JobCatalog};
pub use coordinator::{
    evaluate, evaluate_at, FailureReason, RankingCoordinator, RankingOutcome, Rejection, RunStatistics,
    ScoreDistribution, Shortfall,
};
pub use criteria::{
    CriteriaError, HardCriterion, JobCriteria, RawJobCriteria, SignalKind, SoftCriteria,
    WeightFactor,
};
pub use domain::{CandidateId, DegreeType, ExtractedFacts, RawCandidate, ScoredCandidate};
pub use extraction::{AttributeExtractor, ExtractionVocabulary};
pub use filter::{passes, FilterFailure, FilterVerdict};
pub use report::FilterReport;
pub use router::{ranking_router, RankingService};
pub use scoring::{rank_order, SoftScore};
pub use source::{CandidatePoolImporter, CandidateSource, InMemoryCandidateSource, SourceError};
pub use submission::{Submission, SubmissionError, SubmissionWarning};
