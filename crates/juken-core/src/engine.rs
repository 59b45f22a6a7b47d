//! Grading engine.
//!
//! Judges every problem of an answer key for each answer sheet, and loads
//! sheet files concurrently when grading from disk.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::config::JukenConfig;
use crate::judge::{Judge, JudgeOptions};
use crate::model::{AnswerInput, AnswerKey, AnswerSheet};
use crate::parser::{parse_answer_sheet_str, validate_answer_sheet};
use crate::report::{AnswerKeySummary, GradingReport};
use crate::results::{credit_for, ProblemJudgment};
use crate::statistics::compute_aggregate_stats;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    /// Options passed to the judge.
    pub judge: JudgeOptions,
    /// Fraction of points awarded for a close answer.
    pub close_credit: f64,
    /// Max sheet files loaded concurrently.
    pub parallelism: usize,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            judge: JudgeOptions::default(),
            close_credit: 0.5,
            parallelism: 4,
        }
    }
}

impl From<&JukenConfig> for GradingConfig {
    fn from(config: &JukenConfig) -> Self {
        Self {
            judge: config.judge_options(),
            close_credit: config.close_credit,
            parallelism: config.parallelism,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_sheet_start(&self, student: &str);
    fn on_sheet_complete(&self, student: &str, judgments: &[ProblemJudgment]);
    fn on_sheet_error(&self, source: &str, error: &str);
    fn on_grading_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_sheet_start(&self, _: &str) {}
    fn on_sheet_complete(&self, _: &str, _: &[ProblemJudgment]) {}
    fn on_sheet_error(&self, _: &str, _: &str) {}
    fn on_grading_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The grading engine.
pub struct GradingEngine {
    judge: Judge,
    config: GradingConfig,
}

impl GradingEngine {
    pub fn new(config: GradingConfig) -> Self {
        Self {
            judge: Judge::new(config.judge.clone()),
            config,
        }
    }

    /// Judge every problem in `key` against one sheet.
    ///
    /// Problems without a response are judged as blank text.
    pub fn grade_sheet(&self, key: &AnswerKey, sheet: &AnswerSheet) -> Vec<ProblemJudgment> {
        for w in validate_answer_sheet(sheet, key) {
            match &w.problem_id {
                Some(id) => tracing::warn!("{} [{id}]: {}", sheet.student, w.message),
                None => tracing::warn!("{}: {}", sheet.student, w.message),
            }
        }

        key.problems
            .iter()
            .map(|problem| {
                let submitted = sheet.answer_for(&problem.id).cloned();
                let answer = submitted.clone().unwrap_or_else(AnswerInput::blank);
                let tolerance = key.tolerance_for(problem, self.config.judge.tolerance);
                let judgment = self
                    .judge
                    .judge_with_tolerance(&answer, &problem.answer, tolerance);
                let credit = credit_for(judgment.verdict(), problem.points, self.config.close_credit);

                ProblemJudgment {
                    problem_id: problem.id.clone(),
                    student: sheet.student.clone(),
                    submitted,
                    expected: problem.answer.clone(),
                    judgment,
                    points: problem.points,
                    credit,
                }
            })
            .collect()
    }

    /// Grade in-memory answer sheets.
    ///
    /// Only the first sheet per student is graded; later ones are reported
    /// through [`ProgressReporter::on_sheet_error`] and skipped.
    pub fn grade(
        &self,
        key: &AnswerKey,
        sheets: &[AnswerSheet],
        progress: &dyn ProgressReporter,
    ) -> GradingReport {
        let start = Instant::now();
        let unique = unique_sheets(sheets, progress);
        let judgments = self.grade_all(key, &unique, progress);
        let elapsed = start.elapsed();
        let skipped = sheets.len() - unique.len();
        progress.on_grading_complete(sheets.len(), unique.len(), skipped, elapsed);

        build_report(key, &unique, judgments, elapsed)
    }

    /// Load answer sheet files concurrently, then grade them.
    ///
    /// A sheet that fails to load, or repeats a student already loaded from
    /// an earlier path, is reported and skipped.
    pub async fn grade_files(
        &self,
        key: &AnswerKey,
        paths: &[PathBuf],
        progress: &dyn ProgressReporter,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();
        for (index, path) in paths.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let path = path.clone();

            futures.push(async move {
                let inner = async {
                    let _permit = semaphore
                        .acquire()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                    let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                        anyhow::anyhow!("failed to read answer sheet file {}: {e}", path.display())
                    })?;
                    parse_answer_sheet_str(&content, &path)
                };
                let result: Result<AnswerSheet> = inner.await;
                (index, path, result)
            });
        }

        let mut loaded = Vec::new();
        let mut failed = 0usize;
        while let Some((index, path, result)) = futures.next().await {
            match result {
                Ok(sheet) => loaded.push((index, sheet)),
                Err(e) => {
                    tracing::error!("failed to load {}: {e:#}", path.display());
                    progress.on_sheet_error(&path.display().to_string(), &format!("{e:#}"));
                    failed += 1;
                }
            }
        }

        // Keep report order stable regardless of load completion order.
        loaded.sort_by_key(|(index, _)| *index);
        let sheets: Vec<AnswerSheet> = loaded.into_iter().map(|(_, sheet)| sheet).collect();

        let unique = unique_sheets(&sheets, progress);
        failed += sheets.len() - unique.len();

        let judgments = self.grade_all(key, &unique, progress);
        let elapsed = start.elapsed();
        progress.on_grading_complete(paths.len(), unique.len(), failed, elapsed);

        Ok(build_report(key, &unique, judgments, elapsed))
    }

    fn grade_all(
        &self,
        key: &AnswerKey,
        sheets: &[&AnswerSheet],
        progress: &dyn ProgressReporter,
    ) -> Vec<ProblemJudgment> {
        let mut judgments = Vec::new();
        for sheet in sheets {
            progress.on_sheet_start(&sheet.student);
            let sheet_judgments = self.grade_sheet(key, sheet);
            progress.on_sheet_complete(&sheet.student, &sheet_judgments);
            judgments.extend(sheet_judgments);
        }
        judgments
    }
}

/// Keep the first sheet of each student.
fn unique_sheets<'a>(
    sheets: &'a [AnswerSheet],
    progress: &dyn ProgressReporter,
) -> Vec<&'a AnswerSheet> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        if seen.insert(sheet.student.as_str()) {
            unique.push(sheet);
        } else {
            tracing::warn!("duplicate answer sheet for {}, skipping", sheet.student);
            progress.on_sheet_error(
                &sheet.student,
                "duplicate answer sheet for this student; only the first is graded",
            );
        }
    }
    unique
}

fn build_report(
    key: &AnswerKey,
    sheets: &[&AnswerSheet],
    judgments: Vec<ProblemJudgment>,
    elapsed: Duration,
) -> GradingReport {
    let aggregate = compute_aggregate_stats(&judgments, key);
    GradingReport {
        id: Uuid::new_v4(),
        created_at: chrono::Utc::now(),
        answer_key: AnswerKeySummary {
            id: key.id.clone(),
            name: key.name.clone(),
            problem_count: key.problems.len(),
            max_points: key.max_points(),
        },
        students: sheets.iter().map(|s| s.student.clone()).collect(),
        judgments,
        aggregate,
        duration_ms: elapsed.as_millis() as u64,
    }
}
