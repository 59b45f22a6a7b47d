//! Core data model types for juken.
//!
//! These are the fundamental types used to represent answers, problems,
//! answer keys, and the answer sheets students hand in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw answer supplied by a student or by the answer key.
///
/// Deserializes untagged: a TOML/JSON number becomes `Number`, a string
/// becomes `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Number(f64),
    Text(String),
}

impl AnswerInput {
    /// An empty text answer, used for problems the student left blank.
    pub fn blank() -> Self {
        AnswerInput::Text(String::new())
    }

    /// Trimmed textual form of the answer.
    ///
    /// Numbers use their shortest display form, so `4.8` becomes `"4.8"`
    /// and `10.0` becomes `"10"`.
    pub fn textual_form(&self) -> String {
        match self {
            AnswerInput::Number(n) => n.to_string(),
            AnswerInput::Text(s) => s.trim().to_string(),
        }
    }

    /// Returns `true` for text answers that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        matches!(self, AnswerInput::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for AnswerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerInput::Number(n) => write!(f, "{n}"),
            AnswerInput::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for AnswerInput {
    fn from(n: f64) -> Self {
        AnswerInput::Number(n)
    }
}

impl From<i64> for AnswerInput {
    fn from(n: i64) -> Self {
        AnswerInput::Number(n as f64)
    }
}

impl From<i32> for AnswerInput {
    fn from(n: i32) -> Self {
        AnswerInput::Number(f64::from(n))
    }
}

impl From<&str> for AnswerInput {
    fn from(s: &str) -> Self {
        AnswerInput::Text(s.to_string())
    }
}

impl From<String> for AnswerInput {
    fn from(s: String) -> Self {
        AnswerInput::Text(s)
    }
}

/// A single problem in an answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Unique identifier within the answer key.
    pub id: String,
    /// The question shown to the student.
    #[serde(default)]
    pub prompt: String,
    /// The expected answer.
    pub answer: AnswerInput,
    /// Per-problem tolerance override.
    #[serde(default)]
    pub tolerance: Option<f64>,
    /// Tags for filtering (e.g. "speed", "fractions").
    #[serde(default)]
    pub tags: Vec<String>,
    /// Points awarded for a correct answer.
    #[serde(default = "default_points")]
    pub points: f64,
}

fn default_points() -> f64 {
    1.0
}

/// A collection of problems with their expected answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Unique identifier for this answer key.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of the drill.
    #[serde(default)]
    pub description: String,
    /// Tolerance for problems that don't specify one. Falls back to the
    /// configured tolerance when absent.
    #[serde(default)]
    pub default_tolerance: Option<f64>,
    /// The problems in this key.
    #[serde(default)]
    pub problems: Vec<Problem>,
}

impl AnswerKey {
    /// Look up a problem by id.
    pub fn problem(&self, id: &str) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id == id)
    }

    /// Tolerance for a problem: its own override, then the key default,
    /// then `fallback`.
    pub fn tolerance_for(&self, problem: &Problem, fallback: f64) -> f64 {
        problem
            .tolerance
            .or(self.default_tolerance)
            .unwrap_or(fallback)
    }

    /// Sum of points over all problems.
    pub fn max_points(&self) -> f64 {
        self.problems.iter().map(|p| p.points).sum()
    }
}

/// One student's answer to one problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The problem being answered.
    pub problem_id: String,
    /// The submitted answer; `None` when left blank.
    #[serde(default)]
    pub answer: Option<AnswerInput>,
}

/// A student's submissions for one answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSheet {
    /// Student identifier.
    pub student: String,
    /// The answer key this sheet was written against.
    pub key_id: String,
    /// Submitted responses.
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl AnswerSheet {
    /// The submitted answer for a problem, if any.
    pub fn answer_for(&self, problem_id: &str) -> Option<&AnswerInput> {
        self.responses
            .iter()
            .find(|r| r.problem_id == problem_id)
            .and_then(|r| r.answer.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textual_form_of_numbers() {
        assert_eq!(AnswerInput::Number(4.8).textual_form(), "4.8");
        assert_eq!(AnswerInput::Number(10.0).textual_form(), "10");
        assert_eq!(AnswerInput::Number(0.0).textual_form(), "0");
        assert_eq!(AnswerInput::from(" 4.8 ").textual_form(), "4.8");
    }

    #[test]
    fn untagged_deserialization() {
        let n: AnswerInput = serde_json::from_str("4.8").unwrap();
        assert_eq!(n, AnswerInput::Number(4.8));
        let t: AnswerInput = serde_json::from_str("\"速さ\"").unwrap();
        assert_eq!(t, AnswerInput::Text("速さ".into()));
    }

    #[test]
    fn blank_detection() {
        assert!(AnswerInput::blank().is_blank());
        assert!(AnswerInput::from("   ").is_blank());
        assert!(!AnswerInput::Number(0.0).is_blank());
    }

    #[test]
    fn answer_key_lookup() {
        let key = AnswerKey {
            id: "k".into(),
            name: "Key".into(),
            description: String::new(),
            default_tolerance: Some(0.01),
            problems: vec![Problem {
                id: "p1".into(),
                prompt: "2 + 2".into(),
                answer: AnswerInput::Number(4.0),
                tolerance: None,
                tags: vec![],
                points: 2.0,
            }],
        };
        assert!(key.problem("p1").is_some());
        assert!(key.problem("p2").is_none());
        assert_eq!(key.max_points(), 2.0);
        assert_eq!(key.tolerance_for(&key.problems[0], 0.0001), 0.01);
    }

    #[test]
    fn tolerance_precedence() {
        let mut problem = Problem {
            id: "p".into(),
            prompt: String::new(),
            answer: AnswerInput::Number(1.0),
            tolerance: Some(0.5),
            tags: vec![],
            points: 1.0,
        };
        let mut key = AnswerKey {
            id: "k".into(),
            name: "Key".into(),
            description: String::new(),
            default_tolerance: Some(0.1),
            problems: vec![],
        };
        assert_eq!(key.tolerance_for(&problem, 0.0001), 0.5);
        problem.tolerance = None;
        assert_eq!(key.tolerance_for(&problem, 0.0001), 0.1);
        key.default_tolerance = None;
        assert_eq!(key.tolerance_for(&problem, 0.0001), 0.0001);
    }
}
