use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::ranking::{
    JobCatalog, JobCriteria, RankingCoordinator, RankingService, RawCandidate, RawJobCriteria,
};

pub(super) const REFERENCE_YEAR: i32 = 2025;

pub(super) fn raw_tax_lawyer() -> RawJobCriteria {
    serde_json::from_value(json!({
        "name": "Tax Lawyer",
        "query": "tax attorney irs audit",
        "hard_criteria": {
            "required_education": {"any_of": ["has_jd", "has_llm"]},
            "min_years_experience": 3
        },
        "soft_criteria": {
            "preferred_experience": 5,
            "weight_factors": {
                "irs_experience": 3.0,
                "big_four_experience": 2.0
            },
            "irs_experience_keywords": ["irs audit", "tax controversy", "tax dispute"],
            "big_four_experience_keywords": ["deloitte", "ey", "ernst & young", "pwc", "kpmg"]
        }
    }))
    .expect("raw tax lawyer parses")
}

pub(super) fn tax_lawyer() -> JobCriteria {
    JobCriteria::from_raw("tax_lawyer", raw_tax_lawyer()).expect("tax lawyer is valid")
}

pub(super) fn coordinator() -> RankingCoordinator {
    RankingCoordinator::new(tax_lawyer(), REFERENCE_YEAR).expect("coordinator builds")
}

pub(super) fn candidate(id: &str, profile: &str, education: &str) -> RawCandidate {
    RawCandidate::new(id, "", profile, education)
}

/// Five candidates of which exactly `senior` and `mid` clear the tax lawyer gate.
pub(super) fn pool_of_five() -> Vec<RawCandidate> {
    vec![
        candidate(
            "senior",
            "12 years of experience leading IRS audit and tax controversy matters at KPMG.",
            "J.D., Harvard Law School",
        ),
        candidate(
            "mid",
            "4 years of experience in tax dispute resolution at Deloitte.",
            "LL.M. in Taxation, NYU",
        ),
        candidate(
            "junior",
            "1 year of experience as a tax associate.",
            "J.D., Georgetown",
        ),
        candidate(
            "accountant",
            "15 years of experience in IRS audit support.",
            "B.S. Accounting, Ohio State",
        ),
        candidate("blank", "", ""),
    ]
}

pub(super) fn service() -> Arc<RankingService> {
    let catalog = JobCatalog::from_jobs([tax_lawyer()]);
    Arc::new(RankingService::new(catalog, 10, REFERENCE_YEAR))
}

pub(super) fn candidates_json(candidates: &[RawCandidate]) -> Value {
    serde_json::to_value(candidates).expect("candidates serialise")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
