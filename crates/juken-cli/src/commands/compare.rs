//! The `juken compare` command.

use std::path::PathBuf;

use anyhow::Result;

use juken_core::report::{GradingReport, ScoreChange};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0.0 and 1.0"
    );

    let baseline = GradingReport::load_json(&baseline_path)?;
    let current = GradingReport::load_json(&current_path)?;

    if baseline.answer_key.id != current.answer_key.id {
        eprintln!(
            "Warning: comparing reports for different answer keys ('{}' vs '{}')",
            baseline.answer_key.id, current.answer_key.id
        );
    }

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => {
            println!("Baseline: {}", describe(&baseline));
            println!("Current:  {}", describe(&current));

            print_changes("Regressions", &report.regressions);
            print_changes("Improvements", &report.improvements);

            println!(
                "\nUnchanged: {}, new: {}, removed: {} (threshold {:.0}%)",
                report.unchanged,
                report.new_entries,
                report.removed_entries,
                threshold * 100.0
            );
        }
        other => anyhow::bail!("unknown format '{other}' (expected text, json or markdown)"),
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

fn describe(report: &GradingReport) -> String {
    format!(
        "{} graded {} ({} students)",
        report.answer_key.name,
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.students.len()
    )
}

fn print_changes(title: &str, changes: &[ScoreChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title} ({}):", changes.len());
    for c in changes {
        println!(
            "  {} / {}: {:.1}% -> {:.1}% ({:+.1}%)",
            c.student,
            c.problem_id,
            c.baseline_score * 100.0,
            c.current_score * 100.0,
            c.delta * 100.0
        );
    }
}
