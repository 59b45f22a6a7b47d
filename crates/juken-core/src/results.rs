//! Grading result types.

use serde::{Deserialize, Serialize};

use crate::judge::{JudgmentResult, Verdict};
use crate::model::AnswerInput;

/// The judged outcome of one student's answer to one problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemJudgment {
    /// Problem that was answered.
    pub problem_id: String,
    /// Student who answered.
    pub student: String,
    /// The answer as submitted; `None` when left blank.
    pub submitted: Option<AnswerInput>,
    /// The expected answer from the key.
    pub expected: AnswerInput,
    /// Judgment of the submitted answer.
    pub judgment: JudgmentResult,
    /// Points available for this problem.
    pub points: f64,
    /// Points awarded.
    pub credit: f64,
}

impl ProblemJudgment {
    pub fn verdict(&self) -> Verdict {
        self.judgment.verdict()
    }

    /// Awarded credit as a fraction of the available points.
    pub fn credit_ratio(&self) -> f64 {
        if self.points <= 0.0 {
            0.0
        } else {
            self.credit / self.points
        }
    }
}

/// Points awarded for a verdict.
///
/// `close_credit` is the fraction of `points` given for a close answer.
pub fn credit_for(verdict: Verdict, points: f64, close_credit: f64) -> f64 {
    match verdict {
        Verdict::Correct => points,
        Verdict::Close => points * close_credit,
        Verdict::Incorrect => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::judge_default;

    #[test]
    fn credit_per_verdict() {
        assert_eq!(credit_for(Verdict::Correct, 2.0, 0.5), 2.0);
        assert_eq!(credit_for(Verdict::Close, 2.0, 0.5), 1.0);
        assert_eq!(credit_for(Verdict::Incorrect, 2.0, 0.5), 0.0);
        assert_eq!(credit_for(Verdict::Close, 2.0, 0.0), 0.0);
    }

    #[test]
    fn credit_ratio_handles_zero_points() {
        let judgment = ProblemJudgment {
            problem_id: "p".into(),
            student: "s".into(),
            submitted: Some(AnswerInput::Number(1.0)),
            expected: AnswerInput::Number(1.0),
            judgment: judge_default(1.0, 1.0),
            points: 0.0,
            credit: 0.0,
        };
        assert_eq!(judgment.credit_ratio(), 0.0);
        assert_eq!(judgment.verdict(), Verdict::Correct);
    }
}
