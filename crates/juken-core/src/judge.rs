//! Answer judgment.
//!
//! Classifies a submitted answer against the expected one into one of three
//! verdicts by walking an ordered list of rules. The first rule that fires
//! decides the verdict:
//!
//! 1. textual match of the trimmed forms: `correct`
//! 2. both numeric and `|s - c| < tolerance`: `correct`
//! 3. both numeric, `c != 0`, and `|s - c| / |c| <= 0.05`: `close`
//! 4. anything else: `incorrect`
//!
//! Judging is total: every input resolves to a verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::AnswerInput;
use crate::normalize::{normalize, Normalized, ParseMode};

/// Default absolute tolerance for numeric answers.
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Relative error at or below which a numeric miss counts as `close`.
pub const CLOSE_RELATIVE_ERROR: f64 = 0.05;

/// Three-way outcome of judging an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Correct,
    Close,
    Incorrect,
}

impl Verdict {
    /// Only `Correct` is an exact match.
    pub fn is_exact_match(self) -> bool {
        self == Verdict::Correct
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Correct => write!(f, "correct"),
            Verdict::Close => write!(f, "close"),
            Verdict::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// The rule that decided a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    TextualMatch,
    WithinTolerance,
    WithinRelativeError,
    Fallback,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::TextualMatch => write!(f, "textual_match"),
            MatchRule::WithinTolerance => write!(f, "within_tolerance"),
            MatchRule::WithinRelativeError => write!(f, "within_relative_error"),
            MatchRule::Fallback => write!(f, "fallback"),
        }
    }
}

/// Learner-facing messages, one per verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feedback {
    pub correct: String,
    pub close: String,
    pub incorrect: String,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            correct: "正解です！".to_string(),
            close: "惜しい！もう少しです。".to_string(),
            incorrect: "不正解です。もう一度考えてみましょう。".to_string(),
        }
    }
}

impl Feedback {
    /// The message for a verdict.
    pub fn message(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Correct => &self.correct,
            Verdict::Close => &self.close,
            Verdict::Incorrect => &self.incorrect,
        }
    }
}

/// The output of one judgment.
///
/// Only constructed by [`Judge`], so `is_exact_match()` always agrees with
/// the verdict. Deserialization rejects records where they disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "JudgmentRecord", try_from = "JudgmentRecord")]
pub struct JudgmentResult {
    verdict: Verdict,
    rule: MatchRule,
    feedback: String,
    explanation: String,
}

impl JudgmentResult {
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn is_exact_match(&self) -> bool {
        self.verdict.is_exact_match()
    }

    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Wire form of a [`JudgmentResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentRecord {
    is_exact_match: bool,
    verdict: Verdict,
    rule: MatchRule,
    feedback: String,
    explanation: String,
}

impl From<JudgmentResult> for JudgmentRecord {
    fn from(r: JudgmentResult) -> Self {
        Self {
            is_exact_match: r.is_exact_match(),
            verdict: r.verdict,
            rule: r.rule,
            feedback: r.feedback,
            explanation: r.explanation,
        }
    }
}

impl TryFrom<JudgmentRecord> for JudgmentResult {
    type Error = String;

    fn try_from(r: JudgmentRecord) -> Result<Self, Self::Error> {
        if r.is_exact_match != r.verdict.is_exact_match() {
            return Err(format!(
                "is_exact_match={} contradicts verdict '{}'",
                r.is_exact_match, r.verdict
            ));
        }
        Ok(Self {
            verdict: r.verdict,
            rule: r.rule,
            feedback: r.feedback,
            explanation: r.explanation,
        })
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Both sides of a judgment, normalized once and shared by every rule.
#[derive(Debug, Clone)]
pub struct Comparison {
    student_text: String,
    correct_text: String,
    student: Normalized,
    correct: Normalized,
    tolerance: f64,
}

impl Comparison {
    pub fn new(
        student: &AnswerInput,
        correct: &AnswerInput,
        tolerance: f64,
        mode: ParseMode,
    ) -> Self {
        Self {
            student_text: student.textual_form(),
            correct_text: correct.textual_form(),
            student: normalize(student, mode),
            correct: normalize(correct, mode),
            tolerance,
        }
    }

    /// Both values when both sides normalized to numbers.
    fn numbers(&self) -> Option<(f64, f64)> {
        Some((self.student.as_number()?, self.correct.as_number()?))
    }
}

/// What a rule decided, before feedback is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub verdict: Verdict,
    pub explanation: String,
}

/// A named step in the judgment cascade.
pub struct Rule {
    kind: MatchRule,
    apply: fn(&Comparison) -> Option<RuleOutcome>,
}

impl Rule {
    pub fn kind(&self) -> MatchRule {
        self.kind
    }

    /// Run this rule alone. `None` means the rule doesn't apply.
    pub fn evaluate(&self, comparison: &Comparison) -> Option<RuleOutcome> {
        (self.apply)(comparison)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("kind", &self.kind).finish()
    }
}

static RULES: [Rule; 3] = [
    Rule {
        kind: MatchRule::TextualMatch,
        apply: textual_match,
    },
    Rule {
        kind: MatchRule::WithinTolerance,
        apply: within_tolerance,
    },
    Rule {
        kind: MatchRule::WithinRelativeError,
        apply: within_relative_error,
    },
];

/// The conditional judgment rules in priority order.
///
/// A comparison none of them accepts ends in [`MatchRule::Fallback`].
pub fn rules() -> &'static [Rule] {
    &RULES
}

fn textual_match(c: &Comparison) -> Option<RuleOutcome> {
    (c.student_text == c.correct_text).then(|| RuleOutcome {
        verdict: Verdict::Correct,
        explanation: format!("answers match as written: \"{}\"", c.correct_text),
    })
}

fn within_tolerance(c: &Comparison) -> Option<RuleOutcome> {
    let (student, correct) = c.numbers()?;
    let difference = (student - correct).abs();
    (difference < c.tolerance).then(|| RuleOutcome {
        verdict: Verdict::Correct,
        explanation: format!(
            "difference {difference} is below tolerance {}",
            c.tolerance
        ),
    })
}

fn within_relative_error(c: &Comparison) -> Option<RuleOutcome> {
    let (student, correct) = c.numbers()?;
    // Relative error is undefined against a zero answer.
    if correct == 0.0 {
        return None;
    }
    let difference = (student - correct).abs();
    let relative_error = difference / correct.abs();
    (relative_error <= CLOSE_RELATIVE_ERROR).then(|| RuleOutcome {
        verdict: Verdict::Close,
        explanation: format!(
            "relative error {:.2}% is within {:.0}% (difference {difference})",
            relative_error * 100.0,
            CLOSE_RELATIVE_ERROR * 100.0
        ),
    })
}

fn fallback(c: &Comparison) -> RuleOutcome {
    let explanation = match c.numbers() {
        Some((student, correct)) if correct == 0.0 => format!(
            "difference {} exceeds tolerance {} and the answer is zero",
            (student - correct).abs(),
            c.tolerance
        ),
        Some((student, correct)) => {
            let difference = (student - correct).abs();
            format!(
                "relative error {:.2}% exceeds {:.0}% (difference {difference})",
                difference / correct.abs() * 100.0,
                CLOSE_RELATIVE_ERROR * 100.0
            )
        }
        None => format!("{} does not match {}", c.student, c.correct),
    };
    RuleOutcome {
        verdict: Verdict::Incorrect,
        explanation,
    }
}

// ---------------------------------------------------------------------------
// Judge
// ---------------------------------------------------------------------------

/// Settings for a [`Judge`].
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeOptions {
    /// Absolute tolerance for numeric equality (strict `<`).
    pub tolerance: f64,
    /// How numeric-looking text is parsed.
    pub parse_mode: ParseMode,
    /// Messages attached to each verdict.
    pub feedback: Feedback,
}

impl Default for JudgeOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            parse_mode: ParseMode::Strict,
            feedback: Feedback::default(),
        }
    }
}

impl JudgeOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Judges answers with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Judge {
    options: JudgeOptions,
}

impl Judge {
    pub fn new(options: JudgeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &JudgeOptions {
        &self.options
    }

    /// Judge `student` against `correct` with the configured tolerance.
    pub fn judge(&self, student: &AnswerInput, correct: &AnswerInput) -> JudgmentResult {
        self.judge_with_tolerance(student, correct, self.options.tolerance)
    }

    /// Judge with an explicit tolerance, e.g. a per-problem override.
    pub fn judge_with_tolerance(
        &self,
        student: &AnswerInput,
        correct: &AnswerInput,
        tolerance: f64,
    ) -> JudgmentResult {
        let comparison = Comparison::new(student, correct, tolerance, self.options.parse_mode);
        tracing::debug!(
            "judging {} against {} (tolerance {tolerance})",
            comparison.student,
            comparison.correct
        );

        let (rule, outcome) = match RULES
            .iter()
            .find_map(|r| r.evaluate(&comparison).map(|o| (r.kind, o)))
        {
            Some(hit) => hit,
            None => (MatchRule::Fallback, fallback(&comparison)),
        };

        tracing::debug!("verdict {} via {rule}: {}", outcome.verdict, outcome.explanation);

        JudgmentResult {
            verdict: outcome.verdict,
            rule,
            feedback: self.options.feedback.message(outcome.verdict).to_string(),
            explanation: outcome.explanation,
        }
    }
}

/// Judge a student answer against the correct answer.
///
/// Uses strict number parsing and the default feedback messages.
pub fn judge(
    student: impl Into<AnswerInput>,
    correct: impl Into<AnswerInput>,
    tolerance: f64,
) -> JudgmentResult {
    Judge::default().judge_with_tolerance(&student.into(), &correct.into(), tolerance)
}

/// [`judge`] with the default tolerance of `0.0001`.
pub fn judge_default(
    student: impl Into<AnswerInput>,
    correct: impl Into<AnswerInput>,
) -> JudgmentResult {
    judge(student, correct, DEFAULT_TOLERANCE)
}
