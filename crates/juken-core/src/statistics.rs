//! Aggregate grading statistics.
//!
//! Summarizes judgments per student (score, verdict counts) and per problem
//! (how often it was answered correctly or closely).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::judge::Verdict;
use crate::model::AnswerKey;
use crate::results::ProblemJudgment;

/// Aggregate statistics across all judgments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-student statistics.
    pub per_student: HashMap<String, StudentStats>,
    /// Per-problem statistics.
    pub per_problem: HashMap<String, ProblemStats>,
}

/// Statistics for a single student across all problems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentStats {
    /// Student identifier.
    pub student: String,
    /// Points awarded.
    pub total_credit: f64,
    /// Points available.
    pub max_credit: f64,
    /// `total_credit / max_credit`.
    pub score: f64,
    pub correct: usize,
    pub close: usize,
    pub incorrect: usize,
    /// Fraction of judged problems answered correctly.
    pub accuracy: f64,
}

/// Statistics for a single problem across all students.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemStats {
    /// Problem identifier.
    pub problem_id: String,
    /// Number of students judged on this problem.
    pub attempts: usize,
    /// Fraction judged correct.
    pub correct_rate: f64,
    /// Fraction judged close.
    pub close_rate: f64,
}

fn count(js: &[&ProblemJudgment], verdict: Verdict) -> usize {
    js.iter().filter(|j| j.verdict() == verdict).count()
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Compute aggregate statistics from all judgments.
///
/// Every problem in `key` gets an entry, even when nobody was judged on it.
pub fn compute_aggregate_stats(judgments: &[ProblemJudgment], key: &AnswerKey) -> AggregateStats {
    let mut student_judgments: HashMap<&str, Vec<&ProblemJudgment>> = HashMap::new();
    let mut problem_judgments: HashMap<&str, Vec<&ProblemJudgment>> = HashMap::new();
    for j in judgments {
        student_judgments.entry(&j.student).or_default().push(j);
        problem_judgments.entry(&j.problem_id).or_default().push(j);
    }

    let mut per_student = HashMap::new();
    for (student, js) in &student_judgments {
        let total_credit: f64 = js.iter().map(|j| j.credit).sum();
        let max_credit: f64 = js.iter().map(|j| j.points).sum();
        let correct = count(js, Verdict::Correct);

        per_student.insert(
            student.to_string(),
            StudentStats {
                student: student.to_string(),
                total_credit,
                max_credit,
                score: if max_credit > 0.0 {
                    total_credit / max_credit
                } else {
                    0.0
                },
                correct,
                close: count(js, Verdict::Close),
                incorrect: count(js, Verdict::Incorrect),
                accuracy: ratio(correct, js.len()),
            },
        );
    }

    let mut per_problem = HashMap::new();
    for problem in &key.problems {
        let js = problem_judgments
            .get(problem.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        per_problem.insert(
            problem.id.clone(),
            ProblemStats {
                problem_id: problem.id.clone(),
                attempts: js.len(),
                correct_rate: ratio(count(js, Verdict::Correct), js.len()),
                close_rate: ratio(count(js, Verdict::Close), js.len()),
            },
        );
    }

    AggregateStats {
        per_student,
        per_problem,
    }
}
