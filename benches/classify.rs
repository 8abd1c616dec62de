use std::path::Path;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use rmsforms::classify::Classifier;
use rmsforms::driver::Driver;
use rmsforms::forms::ParserContext;
use rmsforms::model::raw::RawMessage;

fn fixture_messages() -> Vec<Arc<RawMessage>> {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("exercise.mbox");
    rmsforms::parser::load_messages(&fixture_path, None)
        .unwrap()
        .into_iter()
        .map(Arc::new)
        .collect()
}

/// The fixture repeated until there are `n` messages.
fn corpus(n: usize) -> Vec<Arc<RawMessage>> {
    fixture_messages().into_iter().cycle().take(n).collect()
}

fn bench_classify(c: &mut Criterion) {
    let messages = corpus(1000);
    let classifier = Classifier::new(Arc::new(ParserContext::default()));

    c.bench_function("classify_1000", |b| {
        b.iter(|| messages.iter().map(|m| classifier.classify(m)).count())
    });
}

fn bench_driver(c: &mut Criterion) {
    let messages = corpus(1000);
    let serial = Driver::new(Arc::new(ParserContext::default()));
    let parallel = Driver::new(Arc::new(ParserContext::default())).with_workers(0);

    c.bench_function("drive_1000_serial", |b| b.iter(|| serial.run(&messages).len()));
    c.bench_function("drive_1000_parallel", |b| b.iter(|| parallel.run(&messages).len()));
}

criterion_group!(benches, bench_classify, bench_driver);
criterion_main!(benches);
