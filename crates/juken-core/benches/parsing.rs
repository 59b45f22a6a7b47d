use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use juken_core::normalize::{normalize, ParseMode};
use juken_core::parser::parse_answer_key_str;
use juken_core::AnswerInput;

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let inputs = [
        ("number", AnswerInput::Number(4.8)),
        ("numeric_text", AnswerInput::Text("  4.8 ".into())),
        ("exponent", AnswerInput::Text("1.25e-3".into())),
        ("word", AnswerInput::Text("速さ".into())),
        ("trailing_garbage", AnswerInput::Text("4.8km".into())),
    ];

    for (name, input) in &inputs {
        for mode in [ParseMode::Strict, ParseMode::Lax] {
            group.bench_function(format!("{name}/{mode}"), |b| {
                b.iter(|| normalize(black_box(input), black_box(mode)))
            });
        }
    }

    group.finish();
}

fn bench_parse_answer_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_answer_key");

    let mut key = String::from("[answer_key]\nid = \"bench\"\nname = \"Bench\"\n");
    for i in 0..200 {
        key.push_str(&format!(
            "\n[[problems]]\nid = \"p{i}\"\nprompt = \"problem {i}\"\nanswer = {}\n",
            i as f64 * 0.25
        ));
    }
    let path = PathBuf::from("bench.toml");

    group.bench_function("200 problems", |b| {
        b.iter(|| parse_answer_key_str(black_box(&key), &path))
    });

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_parse_answer_key);
criterion_main!(benches);
