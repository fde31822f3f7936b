// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use lutmap::cut_enumeration::{cut_enumeration, CutEnumerationParams};
use lutmap::depth_view::DepthView;
use lutmap::lut_mapping::{lut_mapping, LutMappingParams};
use lutmap::mapping_view::MappingView;
use lutmap::test_utils::setup_adder_chain;

fn cut_enumeration_benchmark(c: &mut Criterion) {
    let adder = setup_adder_chain(32);
    for cut_size in [4, 6] {
        let params = CutEnumerationParams {
            cut_size,
            ..Default::default()
        };
        c.bench_function(&format!("cut_enumeration_adder32_k{}", cut_size), |b| {
            b.iter(|| black_box(cut_enumeration(&adder.ntk, &params).total_cuts()))
        });
    }
}

fn lut_mapping_benchmark(c: &mut Criterion) {
    let adder = setup_adder_chain(32);
    let params = LutMappingParams::default();
    c.bench_function("lut_mapping_adder32", |b| {
        b.iter_batched(
            || MappingView::new(DepthView::new(&adder.ntk)),
            |mut view| black_box(lut_mapping(&mut view, &params)),
            BatchSize::SmallInput,
        )
    });
    c.bench_function("lut_mapping_adder32_with_functions", |b| {
        b.iter_batched(
            || MappingView::with_functions(&adder.ntk),
            |mut view| black_box(lut_mapping(&mut view, &params)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, cut_enumeration_benchmark, lut_mapping_benchmark);
criterion_main!(benches);
