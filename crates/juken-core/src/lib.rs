//! juken-core: answer judgment, grading engine, and reports.
//!
//! This crate defines the answer normalizer and the three-verdict match
//! classifier, plus the answer key model, grading engine, statistics, and
//! report types that the `juken` CLI builds on.

pub mod config;
pub mod engine;
pub mod error;
pub mod judge;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod results;
pub mod statistics;

pub use judge::{judge, judge_default, Judge, JudgeOptions, JudgmentResult, MatchRule, Verdict};
pub use model::AnswerInput;
pub use normalize::{normalize, Normalized, ParseMode};
