//! The `juken grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use juken_core::config::load_config_from;
use juken_core::engine::{GradingConfig, GradingEngine, ProgressReporter};
use juken_core::parser;
use juken_core::report::GradingReport;
use juken_core::results::ProblemJudgment;
use juken_core::Verdict;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_sheet_start(&self, student: &str) {
        eprintln!("  Grading: {student}");
    }

    fn on_sheet_complete(&self, student: &str, judgments: &[ProblemJudgment]) {
        let correct = judgments
            .iter()
            .filter(|j| j.verdict() == Verdict::Correct)
            .count();
        let close = judgments
            .iter()
            .filter(|j| j.verdict() == Verdict::Close)
            .count();
        let credit: f64 = judgments.iter().map(|j| j.credit).sum();
        let points: f64 = judgments.iter().map(|j| j.points).sum();
        eprintln!(
            "  Done: {student} correct {correct}/{}, close {close} ({credit}/{points} pts)",
            judgments.len()
        );
    }

    fn on_sheet_error(&self, source: &str, error: &str) {
        eprintln!("  ERROR: {source}: {error}");
    }

    fn on_grading_complete(&self, total: usize, graded: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {graded}/{total} sheets graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    key_path: PathBuf,
    sheets_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(parallelism) = parallelism {
        config.parallelism = parallelism;
    }
    config.validate()?;

    let key = parser::parse_answer_key(&key_path)?;
    for w in parser::validate_answer_key(&key) {
        let id = w.problem_id.as_deref().unwrap_or("-");
        eprintln!("Warning: [{id}] {}", w.message);
    }

    let sheet_paths = if sheets_path.is_dir() {
        parser::toml_files(&sheets_path)?
    } else {
        vec![sheets_path]
    };
    anyhow::ensure!(
        !sheet_paths.is_empty(),
        "no answer sheets found to grade"
    );

    eprintln!(
        "juken v{} - Grading {} answer sheet(s) against '{}' ({} problems)",
        env!("CARGO_PKG_VERSION"),
        sheet_paths.len(),
        key.name,
        key.problems.len()
    );
    eprintln!();

    tracing::debug!(
        "grading with tolerance {} ({} parsing), close credit {}",
        config.tolerance,
        config.parse_mode,
        config.close_credit
    );
    let engine = GradingEngine::new(GradingConfig::from(&config));
    let report = engine
        .grade_files(&key, &sheet_paths, &ConsoleReporter)
        .await?;

    print_summary(&report);

    match format.as_str() {
        "text" => print_judgments(&report),
        "json" => {
            let output = output.unwrap_or(config.output_dir);
            std::fs::create_dir_all(&output)?;
            let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
            let path = output.join(format!("report-{timestamp}.json"));
            report.save_json(&path)?;
            eprintln!("Results saved to: {}", path.display());
        }
        other => anyhow::bail!("unknown format '{other}' (expected json or text)"),
    }

    Ok(())
}

fn print_judgments(report: &GradingReport) {
    for student in &report.students {
        println!("{student}");
        for j in report.judgments.iter().filter(|j| &j.student == student) {
            let submitted = j
                .submitted
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "(blank)".to_string());
            println!(
                "  {}: {} [{}] {} -> {}",
                j.problem_id,
                j.verdict(),
                j.judgment.rule(),
                submitted,
                j.judgment.explanation()
            );
        }
    }
}

fn print_summary(report: &GradingReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student", "Score", "Points", "Correct", "Close", "Incorrect",
    ]);

    for student in &report.students {
        let Some(stats) = report.aggregate.per_student.get(student) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(student),
            Cell::new(format!("{:.1}%", stats.score * 100.0)),
            Cell::new(format!("{}/{}", stats.total_credit, stats.max_credit)),
            Cell::new(stats.correct),
            Cell::new(stats.close),
            Cell::new(stats.incorrect),
        ]);
    }

    eprintln!("\n{table}");
}
