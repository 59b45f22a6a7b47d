//! Grading report types with JSON persistence and regression detection.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::results::ProblemJudgment;
use crate::statistics::AggregateStats;

/// A complete grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the answer key.
    pub answer_key: AnswerKeySummary,
    /// Students graded, in sheet order.
    pub students: Vec<String>,
    /// Individual judgments.
    pub judgments: Vec<ProblemJudgment>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of an answer key (without the problems themselves).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerKeySummary {
    pub id: String,
    pub name: String,
    pub problem_count: usize,
    pub max_points: f64,
}

impl GradingReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradingReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline to detect regressions.
    ///
    /// Scores are credit ratios per (problem, student) pair.
    pub fn compare(&self, baseline: &GradingReport, threshold: f64) -> RegressionReport {
        let score_map = |report: &GradingReport| -> HashMap<(String, String), f64> {
            let mut map: HashMap<(String, String), f64> = HashMap::new();
            for j in &report.judgments {
                let key = (j.problem_id.clone(), j.student.clone());
                let entry = map.entry(key).or_insert(0.0);
                if j.credit_ratio() > *entry {
                    *entry = j.credit_ratio();
                }
            }
            map
        };

        let baseline_scores = score_map(baseline);
        let current_scores = score_map(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_entries = 0usize;

        for (key, &current) in &current_scores {
            if let Some(&baseline_val) = baseline_scores.get(key) {
                let delta = current - baseline_val;
                let change = ScoreChange {
                    problem_id: key.0.clone(),
                    student: key.1.clone(),
                    baseline_score: baseline_val,
                    current_score: current,
                    delta,
                };
                if delta < -threshold {
                    regressions.push(change);
                } else if delta > threshold {
                    improvements.push(change);
                } else {
                    unchanged += 1;
                }
            } else {
                new_entries += 1;
            }
        }

        let removed_entries = baseline_scores
            .keys()
            .filter(|k| !current_scores.contains_key(k))
            .count();

        let by_pair = |a: &ScoreChange, b: &ScoreChange| {
            (&a.problem_id, &a.student).cmp(&(&b.problem_id, &b.student))
        };
        regressions.sort_by(by_pair);
        improvements.sort_by(by_pair);

        RegressionReport {
            regressions,
            improvements,
            unchanged,
            new_entries,
            removed_entries,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Pairs where the score went down.
    pub regressions: Vec<ScoreChange>,
    /// Pairs where the score went up.
    pub improvements: Vec<ScoreChange>,
    /// Pairs with no significant change.
    pub unchanged: usize,
    /// Pairs in current but not baseline.
    pub new_entries: usize,
    /// Pairs in baseline but not current.
    pub removed_entries: usize,
}

/// A score change for one student on one problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
    pub problem_id: String,
    pub student: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let sections = [
            ("Regressions", &self.regressions),
            ("Improvements", &self.improvements),
        ];
        for (title, changes) in sections {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Problem | Student | Baseline | Current | Delta |\n");
            md.push_str("|---------|---------|----------|---------|-------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {} | {:.1}% | {:.1}% | {:+.1}% |\n",
                    c.problem_id,
                    c.student,
                    c.baseline_score * 100.0,
                    c.current_score * 100.0,
                    c.delta * 100.0
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}
