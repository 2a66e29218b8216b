//! Candidate evaluation engine.
//!
//! Turns a retrieved pool of raw candidate profiles into a ranked shortlist for one job:
//! attribute extraction, a conjunctive hard-filter gate, weighted soft scoring, and a
//! coordinator that orders, truncates, and reports statistics.

pub mod config;
pub mod error;
pub mod ranking;
pub mod telemetry;
