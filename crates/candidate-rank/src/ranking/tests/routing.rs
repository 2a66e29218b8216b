use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::ranking::ranking_router;

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("payload serialises")))
        .expect("request builds")
}

#[tokio::test]
async fn adhoc_ranking_returns_shortlist_and_statistics() {
    let router = ranking_router(service());
    let payload = json!({
        "job": raw_tax_lawyer(),
        "candidates": candidates_json(&pool_of_five()),
        "shortlist_size": 3
    });

    let response = router
        .oneshot(post_json("/api/v1/rankings", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["shortlist"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["shortlist"][0]["candidate"]["id"], "senior");
    assert_eq!(body["statistics"]["shortfall"]["missing"], 1);
    assert_eq!(body["statistics"]["job"], "Tax Lawyer");
}

#[tokio::test]
async fn invalid_job_configuration_is_unprocessable() {
    let router = ranking_router(service());
    let payload = json!({
        "job": {"hard_criteria": {"min_gpa": 3.5}},
        "candidates": []
    });

    let response = router
        .oneshot(post_json("/api/v1/rankings", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .map(|message| message.contains("min_gpa"))
        .unwrap_or(false));
}

#[tokio::test]
async fn duplicate_candidate_ids_are_bad_requests() {
    let router = ranking_router(service());
    let payload = json!({
        "candidates": [{"id": "a"}, {"id": "a"}]
    });

    let response = router
        .oneshot(post_json("/api/v1/jobs/tax_lawyer/rankings", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_job_ranking_uses_default_shortlist_size() {
    let router = ranking_router(service());
    let payload = json!({ "candidates": candidates_json(&pool_of_five()) });

    let response = router
        .oneshot(post_json("/api/v1/jobs/tax_lawyer/rankings", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["statistics"]["shortfall"]["requested"], 10);
    assert_eq!(body["statistics"]["shortfall"]["missing"], 8);
}

#[tokio::test]
async fn unknown_catalog_job_is_not_found() {
    let router = ranking_router(service());
    let payload = json!({ "candidates": [] });

    let response = router
        .oneshot(post_json("/api/v1/jobs/astronaut/rankings", &payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn jobs_endpoint_lists_catalog() {
    let router = ranking_router(service());

    let response = router
        .oneshot(
            Request::get("/api/v1/jobs")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["jobs"][0]["key"], "tax_lawyer");
    assert_eq!(body["jobs"][0]["title"], "Tax Lawyer");
    assert_eq!(body["invalid"], json!([]));
}
