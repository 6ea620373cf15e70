use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rsm_gll::gll::{GllConfig, GllParser, RecoveryMode};
use rsm_gll::input::LinearInput;
use rsm_gll::rsm::{Rsm, RsmBuilder, read_rsm_from_str, write_rsm_to_string};
use std::hint::black_box;
use std::sync::Arc;

/// S -> '(' S ')' S | epsilon
fn dyck() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, true);
    let q1 = builder.state(s, false, false);
    let q2 = builder.state(s, false, false);
    let q3 = builder.state(s, false, false);
    let q4 = builder.state(s, false, true);
    builder
        .terminal_edge(q0, "(", q1)
        .nonterminal_edge(q1, s, q2)
        .terminal_edge(q2, ")", q3)
        .nonterminal_edge(q3, s, q4);
    Arc::new(builder.build(s).unwrap())
}

/// S -> S S | 'a'
fn ambiguous_pairs() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, false);
    let q1 = builder.state(s, false, true);
    let q2 = builder.state(s, false, false);
    let q3 = builder.state(s, false, true);
    builder
        .terminal_edge(q0, "a", q1)
        .nonterminal_edge(q0, s, q2)
        .nonterminal_edge(q2, s, q3);
    Arc::new(builder.build(s).unwrap())
}

fn nested(depth: usize) -> String {
    let mut text = String::new();
    for _ in 0..depth {
        text.push_str("(()");
    }
    for _ in 0..depth {
        text.push(')');
    }
    text
}

fn bench_exact_parse(c: &mut Criterion) {
    let rsm = dyck();
    let mut group = c.benchmark_group("dyck_exact");
    for depth in [8, 32, 128] {
        let text = nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &text, |b, text| {
            b.iter(|| {
                let mut parser = GllParser::new(Arc::clone(&rsm), LinearInput::from_chars(text));
                black_box(parser.parse());
            });
        });
    }
    group.finish();
}

fn bench_ambiguous_parse(c: &mut Criterion) {
    let rsm = ambiguous_pairs();
    let text = "a".repeat(24);
    c.bench_function("ambiguous_pairs_24", |b| {
        b.iter(|| {
            let mut parser = GllParser::new(Arc::clone(&rsm), LinearInput::from_chars(&text));
            black_box(parser.parse());
        });
    });
}

fn bench_recovery(c: &mut Criterion) {
    let rsm = dyck();
    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    // Drop the final closing bracket
    let mut text = nested(16);
    text.pop();

    c.bench_function("dyck_recovery_missing_bracket", |b| {
        b.iter(|| {
            let mut parser = GllParser::with_config(
                Arc::clone(&rsm),
                LinearInput::from_chars(&text),
                config.clone(),
            );
            black_box(parser.parse());
        });
    });
}

fn bench_incremental_append(c: &mut Criterion) {
    let rsm = dyck();
    let mut text = nested(32);
    let last = text.pop().map(String::from).unwrap_or_default();

    c.bench_function("dyck_append_closing_bracket", |b| {
        b.iter_batched(
            || {
                let mut parser = GllParser::new(Arc::clone(&rsm), LinearInput::from_chars(&text));
                parser.parse();
                parser
            },
            |mut parser| {
                let end = parser.input().last_vertex();
                let next = parser.input_mut().add_vertex();
                parser.input_mut().add_edge(end, Some(last.as_str().into()), next);
                black_box(parser.parse_from(end));
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_rsm_text(c: &mut Criterion) {
    let text = write_rsm_to_string(&dyck());
    c.bench_function("rsm_text_read", |b| {
        b.iter(|| black_box(read_rsm_from_str(black_box(&text)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_exact_parse,
    bench_ambiguous_parse,
    bench_recovery,
    bench_incremental_append,
    bench_rsm_text
);
criterion_main!(benches);
