//! The `juken validate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use juken_core::model::AnswerKey;
use juken_core::normalize::{normalize, ParseMode};
use juken_core::parser;

pub fn execute(key_path: PathBuf) -> Result<()> {
    let keys = if key_path.is_dir() {
        parser::load_answer_key_directory(&key_path)?
    } else {
        vec![parser::parse_answer_key(&key_path)?]
    };
    anyhow::ensure!(!keys.is_empty(), "no answer keys found in {}", key_path.display());

    let mut total_warnings = 0;

    for key in &keys {
        print_key(key);

        let warnings = parser::validate_answer_key(key);
        for w in &warnings {
            match &w.problem_id {
                Some(id) => println!("  warning [{id}]: {}", w.message),
                None => println!("  warning: {}", w.message),
            }
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("\n{} answer key(s) checked, no warnings.", keys.len());
    } else {
        println!(
            "\n{} answer key(s) checked, {total_warnings} warning(s) found.",
            keys.len()
        );
    }

    Ok(())
}

fn print_key(key: &AnswerKey) {
    println!(
        "{} [{}]: {} problems, {} points",
        key.name,
        key.id,
        key.problems.len(),
        key.max_points()
    );

    let numeric = key
        .problems
        .iter()
        .filter(|p| normalize(&p.answer, ParseMode::Strict).as_number().is_some())
        .count();
    println!(
        "  answers: {numeric} numeric, {} text",
        key.problems.len() - numeric
    );

    if let Some(tolerance) = key.default_tolerance {
        println!("  default tolerance: {tolerance}");
    }

    let mut tags: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in key.problems.iter().flat_map(|p| &p.tags) {
        *tags.entry(tag.as_str()).or_default() += 1;
    }
    if !tags.is_empty() {
        let counts: Vec<String> = tags
            .iter()
            .map(|(tag, count)| format!("{tag} {count}"))
            .collect();
        println!("  tags: {}", counts.join(", "));
    }
}
