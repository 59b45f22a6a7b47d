//! TOML answer key and answer sheet parser.
//!
//! Loads answer keys and answer sheets from TOML files and directories, and
//! validates them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerInput, AnswerKey, AnswerSheet, Problem, Response};

/// Intermediate TOML structure for answer key files.
#[derive(Debug, Deserialize)]
struct TomlAnswerKeyFile {
    answer_key: TomlAnswerKeyHeader,
    #[serde(default)]
    problems: Vec<TomlProblem>,
}

#[derive(Debug, Deserialize)]
struct TomlAnswerKeyHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_tolerance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TomlProblem {
    id: String,
    #[serde(default)]
    prompt: String,
    answer: AnswerInput,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default = "default_points")]
    points: f64,
}

fn default_points() -> f64 {
    1.0
}

/// Intermediate TOML structure for answer sheet files.
#[derive(Debug, Deserialize)]
struct TomlAnswerSheetFile {
    sheet: TomlSheetHeader,
    #[serde(default)]
    responses: Vec<TomlResponse>,
}

#[derive(Debug, Deserialize)]
struct TomlSheetHeader {
    student: String,
    key_id: String,
}

#[derive(Debug, Deserialize)]
struct TomlResponse {
    problem_id: String,
    #[serde(default)]
    answer: Option<AnswerInput>,
}

/// Parse a single TOML file into an `AnswerKey`.
pub fn parse_answer_key(path: &Path) -> Result<AnswerKey> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer key file: {}", path.display()))?;

    parse_answer_key_str(&content, path)
}

/// Parse a TOML string into an `AnswerKey` (useful for testing).
pub fn parse_answer_key_str(content: &str, source_path: &Path) -> Result<AnswerKey> {
    let parsed: TomlAnswerKeyFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let problems = parsed
        .problems
        .into_iter()
        .map(|p| Problem {
            id: p.id,
            prompt: p.prompt,
            answer: p.answer,
            tolerance: p.tolerance,
            tags: p.tags,
            points: p.points,
        })
        .collect();

    Ok(AnswerKey {
        id: parsed.answer_key.id,
        name: parsed.answer_key.name,
        description: parsed.answer_key.description,
        default_tolerance: parsed.answer_key.default_tolerance,
        problems,
    })
}

/// Parse a single TOML file into an `AnswerSheet`.
pub fn parse_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet file: {}", path.display()))?;

    parse_answer_sheet_str(&content, path)
}

/// Parse a TOML string into an `AnswerSheet`.
pub fn parse_answer_sheet_str(content: &str, source_path: &Path) -> Result<AnswerSheet> {
    let parsed: TomlAnswerSheetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(AnswerSheet {
        student: parsed.sheet.student,
        key_id: parsed.sheet.key_id,
        responses: parsed
            .responses
            .into_iter()
            .map(|r| Response {
                problem_id: r.problem_id,
                answer: r.answer,
            })
            .collect(),
    })
}

/// Recursively load all `.toml` answer key files from a directory.
pub fn load_answer_key_directory(dir: &Path) -> Result<Vec<AnswerKey>> {
    let mut keys = Vec::new();

    for path in toml_files(dir)? {
        match parse_answer_key(&path) {
            Ok(key) => keys.push(key),
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
            }
        }
    }

    Ok(keys)
}

/// Recursively collect `.toml` files under a directory, sorted by path.
pub fn toml_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            files.extend(toml_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// A warning from answer key or answer sheet validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The problem ID (if applicable).
    pub problem_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an answer key for common issues.
pub fn validate_answer_key(key: &AnswerKey) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(tolerance) = key.default_tolerance {
        if tolerance < 0.0 || !tolerance.is_finite() {
            warnings.push(ValidationWarning {
                problem_id: None,
                message: format!("default_tolerance {tolerance} disables the tolerance rule"),
            });
        }
    }

    let mut seen_ids = HashSet::new();
    for problem in &key.problems {
        if !seen_ids.insert(&problem.id) {
            warnings.push(ValidationWarning {
                problem_id: Some(problem.id.clone()),
                message: format!("duplicate problem ID: {}", problem.id),
            });
        }
    }

    for problem in &key.problems {
        if problem.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                problem_id: Some(problem.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        if problem.answer.is_blank() {
            warnings.push(ValidationWarning {
                problem_id: Some(problem.id.clone()),
                message: "answer is blank; unanswered responses would be judged correct".into(),
            });
        }

        if let Some(tolerance) = problem.tolerance {
            if tolerance < 0.0 || !tolerance.is_finite() {
                warnings.push(ValidationWarning {
                    problem_id: Some(problem.id.clone()),
                    message: format!("tolerance {tolerance} disables the tolerance rule"),
                });
            }
        }

        if problem.points <= 0.0 {
            warnings.push(ValidationWarning {
                problem_id: Some(problem.id.clone()),
                message: format!("points must be positive, got {}", problem.points),
            });
        }
    }

    warnings
}

/// Validate an answer sheet against the key it was written for.
pub fn validate_answer_sheet(sheet: &AnswerSheet, key: &AnswerKey) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if sheet.key_id != key.id {
        warnings.push(ValidationWarning {
            problem_id: None,
            message: format!(
                "sheet is for answer key '{}' but was graded against '{}'",
                sheet.key_id, key.id
            ),
        });
    }

    let mut seen_ids = HashSet::new();
    for response in &sheet.responses {
        if key.problem(&response.problem_id).is_none() {
            warnings.push(ValidationWarning {
                problem_id: Some(response.problem_id.clone()),
                message: "response to unknown problem".into(),
            });
        }
        if !seen_ids.insert(response.problem_id.as_str()) {
            warnings.push(ValidationWarning {
                problem_id: Some(response.problem_id.clone()),
                message: "duplicate response; only the first is graded".into(),
            });
        }
    }

    for problem in &key.problems {
        if sheet.answer_for(&problem.id).is_none() {
            warnings.push(ValidationWarning {
                problem_id: Some(problem.id.clone()),
                message: "unanswered".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_KEY: &str = r#"
[answer_key]
id = "speed-basics"
name = "速さの基本"
description = "Distance, speed, and time"
default_tolerance = 0.0001

[[problems]]
id = "speed-1"
prompt = "12km を 2.5時間で歩いた。時速は何kmですか。"
answer = 4.8
tags = ["speed"]

[[problems]]
id = "term-1"
prompt = "「道のり ÷ 時間」で求めるものは何ですか。"
answer = "速さ"
points = 2

[[problems]]
id = "time-1"
prompt = "時速 40km で 100km 進むと何時間かかりますか。"
answer = "2.5"
tolerance = 0.01
"#;

    fn path() -> PathBuf {
        PathBuf::from("key.toml")
    }

    #[test]
    fn parse_valid_key() {
        let key = parse_answer_key_str(VALID_KEY, &path()).unwrap();
        assert_eq!(key.id, "speed-basics");
        assert_eq!(key.problems.len(), 3);
        assert_eq!(key.problems[0].answer, AnswerInput::Number(4.8));
        assert_eq!(key.problems[1].answer, AnswerInput::Text("速さ".into()));
        assert_eq!(key.problems[1].points, 2.0);
        assert_eq!(key.problems[2].tolerance, Some(0.01));
        assert!(validate_answer_key(&key).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[answer_key]
id = "minimal"
name = "Minimal"

[[problems]]
id = "p1"
answer = 3
"#;
        let key = parse_answer_key_str(toml, &path()).unwrap();
        assert_eq!(key.default_tolerance, None);
        assert_eq!(key.problems[0].answer, AnswerInput::Number(3.0));
        assert_eq!(key.problems[0].points, 1.0);
        assert!(key.problems[0].tags.is_empty());
    }

    #[test]
    fn parse_missing_answer_fails() {
        let toml = r#"
[answer_key]
id = "broken"
name = "Broken"

[[problems]]
id = "p1"
prompt = "No answer here"
"#;
        assert!(parse_answer_key_str(toml, &path()).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_answer_key_str(bad, &path()).is_err());
    }

    #[test]
    fn validate_key_issues() {
        let toml = r#"
[answer_key]
id = "issues"
name = "Issues"

[[problems]]
id = "same"
prompt = "first"
answer = 1

[[problems]]
id = "same"
prompt = ""
answer = "  "
tolerance = -1.0
points = 0
"#;
        let key = parse_answer_key_str(toml, &path()).unwrap();
        let warnings = validate_answer_key(&key);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("prompt is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("blank")));
        assert!(warnings.iter().any(|w| w.message.contains("tolerance -1")));
        assert!(warnings.iter().any(|w| w.message.contains("points")));
    }

    #[test]
    fn parse_and_validate_sheet() {
        let key = parse_answer_key_str(VALID_KEY, &path()).unwrap();
        let toml = r#"
[sheet]
student = "taro"
key_id = "speed-basics"

[[responses]]
problem_id = "speed-1"
answer = "4.8"

[[responses]]
problem_id = "speed-1"
answer = 5

[[responses]]
problem_id = "ghost"
answer = "?"
"#;
        let sheet = parse_answer_sheet_str(toml, &PathBuf::from("taro.toml")).unwrap();
        assert_eq!(sheet.student, "taro");
        assert_eq!(sheet.responses.len(), 3);
        assert_eq!(sheet.answer_for("speed-1"), Some(&AnswerInput::Text("4.8".into())));

        let warnings = validate_answer_sheet(&sheet, &key);
        assert!(warnings.iter().any(|w| w.message.contains("unknown problem")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate response")));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.message == "unanswered")
                .count(),
            2
        );
    }

    #[test]
    fn sheet_for_other_key_warns() {
        let key = parse_answer_key_str(VALID_KEY, &path()).unwrap();
        let sheet = AnswerSheet {
            student: "hanako".into(),
            key_id: "fractions".into(),
            responses: vec![],
        };
        let warnings = validate_answer_sheet(&sheet, &key);
        assert!(warnings.iter().any(|w| w.message.contains("'fractions'")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("speed.toml"), VALID_KEY).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let keys = load_answer_key_directory(dir.path()).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id, "speed-basics");
    }

    #[test]
    fn toml_files_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.toml"), "").unwrap();
        std::fs::write(dir.path().join("nested").join("a.toml"), "").unwrap();

        let files = toml_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(toml_files(&dir.path().join("b.toml")).is_err());
    }
}
