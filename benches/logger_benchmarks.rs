//! Criterion benchmarks for nlog

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use nlog::formatters::{ConsoleFormatter, FormatterConfig, JsonFormatter};
use nlog::prelude::*;
use nlog::writers::IoSink;
use std::sync::Arc;

fn null_sink() -> IoSink<std::io::Sink> {
    IoSink::new(std::io::sink())
}

fn console_logger(level: Level) -> Logger {
    Logger::builder()
        .min_level(level)
        .formatter(ConsoleFormatter::new(
            FormatterConfig::builder()
                .level(Level::Debug)
                .writer(null_sink(), Level::Debug)
                .build(),
        ))
        .build()
}

fn json_logger() -> Logger {
    Logger::builder()
        .formatter(JsonFormatter::new(
            FormatterConfig::builder()
                .level(Level::Debug)
                .writer(null_sink(), Level::Debug)
                .build(),
        ))
        .build()
}

// ============================================================================
// Filtered Statements
// ============================================================================

fn bench_disabled(c: &mut Criterion) {
    let mut group = c.benchmark_group("disabled");
    group.throughput(Throughput::Elements(1));
    let logger = console_logger(Level::Error);

    group.bench_function("item_with_fields", |b| {
        b.iter(|| {
            logger
                .debug()
                .str("user", black_box("alice"))
                .int("n", black_box(42i64))
                .msg("filtered");
        });
    });

    group.bench_function("formatted", |b| {
        b.iter(|| logger.debugf(format_args!("filtered {}", black_box(42))));
    });

    group.finish();
}

// ============================================================================
// Rendering
// ============================================================================

fn bench_console(c: &mut Criterion) {
    let mut group = c.benchmark_group("console");
    group.throughput(Throughput::Elements(1));
    let logger = console_logger(Level::Debug);

    group.bench_function("message_only", |b| {
        b.iter(|| logger.info().msg(black_box("hello")));
    });

    group.bench_function("five_fields", |b| {
        b.iter(|| {
            logger
                .info()
                .str("user", "alice")
                .int("attempt", 3i32)
                .bool("admin", false)
                .float64("latency", 1.25)
                .ints("codes", &[200i32, 404, 500])
                .msg(black_box("request"));
        });
    });

    group.bench_function("formatted", |b| {
        b.iter(|| logger.infof(format_args!("user {} attempt {}", black_box("alice"), 3)));
    });

    group.finish();
}

fn bench_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("json");
    group.throughput(Throughput::Elements(1));
    let logger = json_logger();

    group.bench_function("five_fields", |b| {
        b.iter(|| {
            logger
                .info()
                .str("user", "alice \"the admin\"")
                .int("attempt", 3i32)
                .bool("admin", true)
                .float64("latency", 1.25)
                .strs("roles", &["a", "b"])
                .msg(black_box("request"));
        });
    });

    group.bench_function("with_object", |b| {
        let payload = serde_json::json!({"id": 7, "tags": ["x", "y"]});
        b.iter(|| logger.info().with_object("payload", &payload).msg("object"));
    });

    group.finish();
}

// ============================================================================
// Buffers
// ============================================================================

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    let pool = Arc::new(BufferPool::new());

    group.bench_function("pool_get_put", |b| {
        b.iter(|| {
            let mut buf = pool.get();
            buf.append_str(black_box("key"), true).append_i64(black_box(12345));
            pool.put(buf);
        });
    });

    group.bench_function("append_quoted", |b| {
        let mut buf = Buffer::with_capacity(256);
        b.iter(|| {
            buf.reset();
            buf.append_str(black_box("needs \"escaping\"\n and more"), true);
        });
    });

    group.finish();
}

// ============================================================================
// Queued Writers
// ============================================================================

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_writer");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .formatter(ConsoleFormatter::new(
            FormatterConfig::builder()
                .level(Level::Debug)
                .parallel_writer(null_sink(), 4096, Level::Debug)
                .build(),
        ))
        .build();

    group.bench_function("enqueue", |b| {
        b.iter(|| logger.info().int("i", black_box(1i64)).msg("queued"));
    });

    group.finish();
    let _ = logger.flush();
}

criterion_group!(
    benches,
    bench_disabled,
    bench_console,
    bench_json,
    bench_buffer,
    bench_parallel
);
criterion_main!(benches);
