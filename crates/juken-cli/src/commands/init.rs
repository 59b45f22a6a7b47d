//! The `juken init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("juken.toml").exists() {
        println!("juken.toml already exists, skipping.");
    } else {
        std::fs::write("juken.toml", SAMPLE_CONFIG)?;
        println!("Created juken.toml");
    }

    std::fs::create_dir_all("answer-keys")?;
    let example_path = std::path::Path::new("answer-keys/example.toml");
    if example_path.exists() {
        println!("answer-keys/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_ANSWER_KEY)?;
        println!("Created answer-keys/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit answer-keys/example.toml with your problems");
    println!("  2. Run: juken validate --key answer-keys/example.toml");
    println!("  3. Run: juken grade --key answer-keys/example.toml --sheets answer-sheets/");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# juken configuration

# Absolute tolerance for numeric answers
tolerance = 0.0001

# "strict" accepts only whole numeric strings; "lax" also reads the
# leading number of answers like "4.8cm"
parse_mode = "strict"

# Fraction of a problem's points awarded for a close answer
close_credit = 0.5

parallelism = 4
output_dir = "./juken-results"

[feedback]
correct = "正解です！"
close = "惜しい！もう少しです。"
incorrect = "不正解です。もう一度考えてみましょう。"
"#;

const EXAMPLE_ANSWER_KEY: &str = r#"[answer_key]
id = "example"
name = "Example Drill"
description = "A small drill to get started"

[[problems]]
id = "speed-1"
prompt = "12km を 2.5 時間で進むときの速さ (km/h)"
answer = 4.8
tags = ["speed"]

[[problems]]
id = "area-1"
prompt = "半径 1 の円の面積 (小数第二位まで)"
answer = 3.14
tolerance = 0.005
tags = ["geometry"]

[[problems]]
id = "term-1"
prompt = "道のり ÷ 時間 で求められる量"
answer = "速さ"
tags = ["vocabulary"]
"#;
