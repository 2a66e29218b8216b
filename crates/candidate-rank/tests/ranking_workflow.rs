use std::collections::BTreeMap;

use candidate_rank::ranking::{
    evaluate, passes, rank_order, AttributeExtractor, CandidateId, DegreeType, ExtractedFacts,
    ExtractionVocabulary, HardCriterion, JobCriteria, RawCandidate, RawJobCriteria,
    ScoredCandidate,
};
use serde_json::json;

fn vocabulary() -> ExtractionVocabulary {
    ExtractionVocabulary {
        keyword_categories: BTreeMap::new(),
        prestige_institutions: vec!["Harvard".to_string()],
        reference_year: 2025,
    }
}

#[test]
fn tax_lawyer_profile_extracts_and_passes() {
    let extractor = AttributeExtractor::new(&vocabulary());
    let facts = extractor.extract(
        "10+ years of experience in tax law, JD from Harvard Law School",
        "",
    );

    assert_eq!(facts.years_experience, Some(10.0));
    assert_eq!(
        facts.degrees.iter().copied().collect::<Vec<_>>(),
        vec![DegreeType::Jd]
    );
    assert!(facts.prestigious_institution);

    let raw: RawJobCriteria = serde_json::from_value(json!({
        "hard_criteria": {"min_years_experience": 3, "has_degree": true}
    }))
    .expect("raw job parses");
    let job = JobCriteria::from_raw("tax_lawyer", raw).expect("job is valid");
    assert!(passes(&facts, &job.hard_criteria));
}

#[test]
fn extraction_is_idempotent() {
    let extractor = AttributeExtractor::new(&vocabulary());
    let text = "Staff radiologist Mar 2015 - present; fellowship 2013-2015. M.D., Johns Hopkins.";

    assert_eq!(extractor.extract(text, ""), extractor.extract(text, ""));
}

#[test]
fn exact_minimum_years_passes() {
    let facts = ExtractedFacts {
        years_experience: Some(3.0),
        ..ExtractedFacts::default()
    };
    assert!(passes(
        &facts,
        &[HardCriterion::MinYearsExperience { years: 3.0 }]
    ));
}

#[test]
fn equal_scores_rank_more_experienced_candidate_first() {
    let scored = |id: &str, years: f64| ScoredCandidate {
        candidate: RawCandidate::new(id, "", "", ""),
        facts: ExtractedFacts {
            years_experience: Some(years),
            ..ExtractedFacts::default()
        },
        composite_score: 7.5,
        per_category_scores: BTreeMap::new(),
    };

    let mut ranked = vec![scored("five", 5.0), scored("eight", 8.0)];
    ranked.sort_by(rank_order);

    assert_eq!(ranked[0].id(), &CandidateId::from("eight"));
}

#[test]
fn one_shot_evaluate_flags_shortfall() {
    let raw: RawJobCriteria = serde_json::from_value(json!({
        "hard_criteria": {"required_degree": "md", "min_years_experience": 2},
        "soft_criteria": {
            "preferred_experience": 4,
            "weight_factors": {"outpatient": 3.0},
            "outpatient_keywords": ["outpatient", "primary care"]
        }
    }))
    .expect("raw job parses");
    let job = JobCriteria::from_raw("doctors_md", raw).expect("job is valid");

    let pool = vec![
        RawCandidate::new(
            "doc-1",
            "Physician",
            "6 years of experience in outpatient primary care.",
            "M.D., UCSF",
        ),
        RawCandidate::new(
            "doc-2",
            "Physician",
            "3 years of experience in emergency medicine.",
            "Doctor of Medicine, Duke",
        ),
        RawCandidate::new("nurse", "Nurse", "8 years of experience", "B.S. Nursing"),
        RawCandidate::new("resident", "Resident", "1 year of experience", "MD, Yale"),
        RawCandidate::new("empty", "", "", ""),
    ];

    let outcome = evaluate(&pool, &job, 10).expect("evaluation succeeds");
    let ids: Vec<&str> = outcome
        .shortlist
        .iter()
        .map(|scored| scored.id().as_str())
        .collect();

    assert_eq!(ids, vec!["doc-1", "doc-2"]);
    assert_eq!(
        outcome.statistics.shortfall.map(|shortfall| shortfall.missing),
        Some(8)
    );
    assert_eq!(outcome.statistics.rejections.len(), 3);
}
