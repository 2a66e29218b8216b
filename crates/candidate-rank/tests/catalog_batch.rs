use candidate_rank::ranking::report::FilterIssue;
use candidate_rank::ranking::{
    evaluate_batch, CandidatePoolImporter, FilterReport, InMemoryCandidateSource, JobCatalog,
};

const POOL_CSV: &str = "id,headline,profile,education\n\
tax-1,Tax Controversy Counsel,\"8 years of experience handling IRS audit and tax controversy matters at Deloitte.\",\"J.D., Georgetown\"\n\
mech-1,Mechanical Engineer,\"6 years of experience in product development and prototyping with SolidWorks and ANSYS.\",\"B.S. Mechanical Engineering, Purdue\"\n\
rad-1,Radiologist,\"Attending radiologist 2014 - present; board certified; AI image analysis research.\",\"M.D., Johns Hopkins\"\n\
quant-1,Quant Researcher,\"5 years of experience in derivatives pricing and risk modeling at a hedge fund using Python and C++.\",\"Ph.D. Physics, MIT\"\n\
bio-1,Research Scientist,\"Published peer reviewed work on CRISPR screens and sequencing.\",\"Ph.D. Molecular Biology, Stanford\"\n";

#[test]
fn builtin_catalog_runs_every_role() {
    let catalog = JobCatalog::builtin().expect("builtin catalog loads");
    let pool = CandidatePoolImporter::from_csv_reader(POOL_CSV.as_bytes()).expect("pool parses");
    let source = InMemoryCandidateSource::new(pool);

    let outcome = evaluate_batch(&catalog, &source, 10, 2025);

    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.completed.len(), 10);

    let first = |job: &str| {
        outcome.completed[job]
            .shortlist
            .first()
            .map(|scored| scored.id().as_str().to_string())
    };
    assert_eq!(first("tax_lawyer").as_deref(), Some("tax-1"));
    assert_eq!(first("mechanical_engineers").as_deref(), Some("mech-1"));
    assert_eq!(first("radiology").as_deref(), Some("rad-1"));
    assert_eq!(first("biology_expert").as_deref(), Some("bio-1"));

    for (job, result) in &outcome.completed {
        assert!(result.shortlist.len() <= 10, "{job} exceeds shortlist size");
        assert!(result.statistics.shortfall.is_some(), "{job} should fall short");
    }
}

#[test]
fn filter_report_covers_every_job() {
    let catalog = JobCatalog::builtin().expect("builtin catalog loads");
    let pool = CandidatePoolImporter::from_csv_reader(POOL_CSV.as_bytes()).expect("pool parses");
    let outcome = evaluate_batch(&catalog, &InMemoryCandidateSource::new(pool), 10, 2025);

    let report = FilterReport::from_runs(&outcome.statistics());

    assert_eq!(report.job_performance.len(), 10);
    assert_eq!(report.overall.processed, 50);
    assert!(report.overall.passed < report.overall.processed);

    // Nobody in the pool holds a master's degree, so the banker gate rejects everyone.
    let flagged: Vec<&str> = report
        .recommendations
        .iter()
        .map(|recommendation| recommendation.job.as_str())
        .collect();
    assert_eq!(flagged, vec!["bankers"]);
    assert_eq!(report.recommendations[0].issue, FilterIssue::HighFilterRate);
}
