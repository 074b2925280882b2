use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use faultwire_core::logging::LogContext;
use faultwire_core::security::{Scrubber, DEFAULT_SCRUB_FIELDS};
use faultwire_core::truncation::{EncodedPayload, Truncation};
use serde_json::{json, Value};

/// Request-shaped payload with `frame_count` frames and a few sensitive fields.
fn sample_payload(frame_count: usize) -> Value {
    let frames: Vec<Value> = (0..frame_count)
        .map(|i| {
            json!({
                "filename": format!("src/handlers/mod_{}.rs", i % 17),
                "lineno": i,
                "method": format!("handler_{}", i),
                "code": "let response = client.send(request).await?;".repeat(8),
            })
        })
        .collect();

    json!({
        "access_token": "abcdef0123456789abcdef0123456789",
        "data": {
            "environment": "production",
            "body": {"trace": {"frames": frames, "exception": {"class": "IoError", "message": "broken pipe"}}},
            "request": {
                "url": "https://example.com/login?user=ann&password=hunter2&next=%2Fhome",
                "headers": {"Cookie": "session=abc", "X-Auth-Token": "t0k3n"},
                "POST": {"password": "hunter2", "confirm_password": "hunter2", "remember": true}
            },
            "custom": {"nested": {"secret": "s", "list": [{"auth_token": "a"}, {"ok": 1}]}}
        }
    })
}

fn scrubber() -> Scrubber {
    let fields: Vec<String> = DEFAULT_SCRUB_FIELDS.iter().map(|f| f.to_string()).collect();
    Scrubber::new(&fields, &["(?i)token$".to_string()], &[], '*').expect("valid scrubber")
}

fn bench_scrub(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrub");
    let scrubber = scrubber();
    let ctx = LogContext::new("bench");

    for frame_count in [10usize, 100, 1000] {
        let payload = sample_payload(frame_count);
        group.throughput(Throughput::Elements(frame_count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frame_count), &payload, |b, payload| {
            b.iter(|| scrubber.scrub(black_box(payload), &ctx));
        });
    }

    group.finish();
}

fn bench_truncate(c: &mut Criterion) {
    let mut group = c.benchmark_group("truncate");
    let truncation = Truncation::default();
    let ctx = LogContext::new("bench");

    for frame_count in [100usize, 2000, 5000] {
        let payload = EncodedPayload::new(sample_payload(frame_count)).expect("encodes");
        group.bench_with_input(BenchmarkId::from_parameter(frame_count), &payload, |b, payload| {
            b.iter(|| truncation.truncate(black_box(payload.clone()), &ctx).expect("truncates"));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scrub, bench_truncate);
criterion_main!(benches);
