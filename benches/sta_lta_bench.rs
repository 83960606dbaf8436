use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fast_trigger::detectors::sta_lta::{sta_lta, sta_lta_batch, StaLtaInput, StaLtaParams};

fn gen_trace(len: usize) -> Vec<f64> {
    let mut v = vec![0.0; len];
    for i in 0..len {
        let x = i as f64;
        v[i] = (x * 0.001).sin() + 0.0001 * x;
    }
    // One strong arrival midway keeps the ratio path non-degenerate.
    if len > 2 {
        v[len / 2] += 50.0;
    }
    v
}

fn gen_batch(n_traces: usize, n_samples: usize) -> Vec<f64> {
    let mut flat = Vec::with_capacity(n_traces * n_samples);
    for trace in 0..n_traces {
        let mut row = gen_trace(n_samples);
        let shift = trace as f64 * 0.01;
        for s in row.iter_mut() {
            *s += shift;
        }
        flat.extend_from_slice(&row);
    }
    flat
}

fn benchmark_sta_lta(c: &mut Criterion) {
    let params = StaLtaParams {
        sta_len: Some(50),
        lta_len: Some(1000),
    };

    let mut group = c.benchmark_group("sta_lta_single");
    for &len in &[10_000usize, 100_000, 1_000_000] {
        let trace = gen_trace(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &trace, |b, trace| {
            b.iter(|| {
                let input = StaLtaInput::from_slice(black_box(trace), params.clone());
                sta_lta(&input).expect("bench input must be valid")
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("sta_lta_batch");
    for &(n_traces, n_samples) in &[(16usize, 10_000usize), (64, 10_000), (256, 4_096)] {
        let batch = gen_batch(n_traces, n_samples);
        let id = format!("{}x{}", n_traces, n_samples);
        group.bench_with_input(BenchmarkId::from_parameter(id), &batch, |b, batch| {
            b.iter(|| {
                sta_lta_batch(black_box(batch), n_traces, n_samples, &params)
                    .expect("bench input must be valid")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_sta_lta);
criterion_main!(benches);
