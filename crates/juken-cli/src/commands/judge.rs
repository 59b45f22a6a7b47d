//! The `juken judge` command.

use std::path::PathBuf;

use anyhow::Result;

use juken_core::config::load_config_from;
use juken_core::error::check_tolerance;
use juken_core::{AnswerInput, Judge, ParseMode};

pub fn execute(
    student: String,
    correct: String,
    tolerance: Option<f64>,
    lax: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut options = config.judge_options();
    if let Some(tolerance) = tolerance {
        options.tolerance = check_tolerance(tolerance)?;
    }
    if lax {
        options.parse_mode = ParseMode::Lax;
    }

    let judge = Judge::new(options);
    let result = judge.judge(&AnswerInput::Text(student), &AnswerInput::Text(correct));

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "text" => {
            let exact = if result.is_exact_match() {
                " (exact match)"
            } else {
                ""
            };
            println!("Verdict:     {}{exact}", result.verdict());
            println!("Rule:        {}", result.rule());
            println!("Feedback:    {}", result.feedback());
            println!("Explanation: {}", result.explanation());
        }
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }

    Ok(())
}
