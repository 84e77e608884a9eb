use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::Value;
use submission_core::codec::{flatten, simplify};
use submission_core::intent::{self, InsertPayload, ReorderPayload};
use submission_core::{parse, FormData, Intent, Resolution, SubmissionError};

// ============================================================================
// Test Data: Varying Field Counts
// ============================================================================

fn generate_form(rows: usize) -> FormData {
    let mut body = FormData::new();
    body.append("title", "Quarterly order");
    for row in 0..rows {
        body.append(format!("lines[{row}].sku"), format!("SKU-{row}"));
        body.append(format!("lines[{row}].qty"), row.to_string());
        body.append("tags", format!("tag-{}", row % 7));
    }
    body
}

fn generate_form_with_intents(rows: usize) -> FormData {
    let mut body = generate_form(rows);
    let intents: Vec<Intent> = vec![
        intent::validate("title"),
        intent::insert(InsertPayload {
            path: "lines".to_string(),
            default_value: None,
            index: Some(0),
        }),
        intent::reorder(ReorderPayload {
            path: "lines".to_string(),
            from: 0,
            to: rows,
        }),
    ];
    body.set_intents(&intents).unwrap();
    body
}

fn resolve(payload: &Value, _intents: Option<&[Intent]>) -> Result<Resolution<Value, String>, SubmissionError> {
    Ok(Resolution::value(payload.clone()))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_submit_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_by_rows");
    for rows in [1, 10, 100, 1000] {
        let body = generate_form(rows);
        group.throughput(Throughput::Elements(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &body, |b, body| {
            b.iter(|| parse(black_box(body), resolve))
        });
    }
    group.finish();
}

fn bench_update_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_by_rows");
    for rows in [1, 10, 100, 1000] {
        let body = generate_form_with_intents(rows);
        group.throughput(Throughput::Elements(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &body, |b, body| {
            b.iter(|| parse(black_box(body), resolve))
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let body = generate_form(500);
    let payload = parse(&body, resolve).unwrap().payload;

    c.bench_function("flatten_leaves_500", |b| {
        b.iter(|| flatten(black_box(&payload), "", |value| value.as_str().map(str::to_string)))
    });
    c.bench_function("simplify_500", |b| b.iter(|| simplify(black_box(payload.clone()))));
}

criterion_group!(benches, bench_submit_scaling, bench_update_scaling, bench_codec);
criterion_main!(benches);
