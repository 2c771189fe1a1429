//! Adapter latency benchmarks.
//!
//! Measures input assembly and the adapter overhead around a trivial engine.

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use gg_decode::engine::{
    build_mask, AdapterSettings, CacheHandle, ContextWindow, DataType, DecodeOptions,
    DecodingAdapter, DimRange, EngineDescriptor, EngineError, FeatureDescription, FeatureMap,
    FeatureNames, InferenceBackend, MaskKind, MultiArray, PaddedWindowAdapter, ShapeConstraint,
    TensorData, TokenTensor,
};

const VOCAB: usize = 256;

/// Engine that returns zero logits of the right shape.
struct NullEngine {
    descriptor: EngineDescriptor,
}

#[async_trait]
impl InferenceBackend for NullEngine {
    fn descriptor(&self) -> &EngineDescriptor {
        &self.descriptor
    }

    fn make_state(&self) -> Result<CacheHandle, EngineError> {
        Ok(CacheHandle::new(()))
    }

    async fn predict(
        &self,
        inputs: FeatureMap,
        _state: Option<&mut CacheHandle>,
    ) -> Result<FeatureMap, EngineError> {
        let len = inputs.get("input_ids").map(|t| t.shape()[1]).unwrap_or(1);
        let logits = MultiArray::new(vec![1, len, VOCAB], TensorData::Float32(vec![0.0; len * VOCAB]))?;
        let mut outputs = FeatureMap::new();
        outputs.insert("logits".to_string(), logits);
        Ok(outputs)
    }
}

fn padded_engine(length: usize) -> Arc<NullEngine> {
    Arc::new(NullEngine {
        descriptor: EngineDescriptor {
            inputs: vec![
                FeatureDescription::new(
                    "input_ids",
                    DataType::Int32,
                    ShapeConstraint::Fixed { shape: vec![1, length] },
                ),
                FeatureDescription::new("attention_mask", DataType::Int32, ShapeConstraint::Unspecified),
            ],
            outputs: vec![FeatureDescription::new("logits", DataType::Float32, ShapeConstraint::Unspecified)],
            states: vec![],
        },
    })
}

fn stateful_engine(length: usize) -> Arc<NullEngine> {
    let unspecified = |name: &str| {
        FeatureDescription::new(name, DataType::Float16, ShapeConstraint::Unspecified)
    };
    Arc::new(NullEngine {
        descriptor: EngineDescriptor {
            inputs: vec![
                FeatureDescription::new(
                    "input_ids",
                    DataType::Int32,
                    ShapeConstraint::Range {
                        dims: vec![DimRange { lower: Some(1), upper: Some(length) }],
                    },
                ),
                unspecified("causal_mask"),
            ],
            outputs: vec![unspecified("logits")],
            states: vec![unspecified("keyCache"), unspecified("valueCache")],
        },
    })
}

fn bench_padded_input_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("padded_input_assembly");

    for window in [128usize, 512, 2048] {
        let window_range = ContextWindow::new(window, window).unwrap();
        let adapter = PaddedWindowAdapter::new(padded_engine(window), window_range, FeatureNames::default());
        let tokens: TokenTensor = (0..(window / 2) as i32).collect();
        let options = DecodeOptions::default();

        group.throughput(Throughput::Elements(window as u64));
        group.bench_with_input(BenchmarkId::new("window", window), &tokens, |b, t| {
            b.iter(|| adapter.build_inputs(black_box(t), &options))
        });
    }

    group.finish();
}

fn bench_mask_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_building");

    for width in [128usize, 2048] {
        group.bench_function(BenchmarkId::new("padding", width), |b| {
            b.iter(|| build_mask(black_box(&[1, width]), MaskKind::Padding { valid_len: width / 2 }).unwrap())
        });
        group.bench_function(BenchmarkId::new("zeros", width), |b| {
            b.iter(|| build_mask(black_box(&[1, 1, 1, width]), MaskKind::Zeros).unwrap())
        });
    }

    group.finish();
}

fn bench_stateful_extend(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut adapter = DecodingAdapter::load(stateful_engine(4096), &AdapterSettings::default()).unwrap();
    adapter.reset_state().unwrap();
    let options = DecodeOptions::default();
    let mut tokens: TokenTensor = (0..64).collect();
    runtime
        .block_on(adapter.predict_next_token_scores(&tokens, &options))
        .unwrap();
    tokens.push(1);

    c.bench_function("stateful_extend_step", |b| {
        b.iter(|| runtime.block_on(adapter.predict_next_token_scores(black_box(&tokens), &options)))
    });
}

criterion_group!(
    benches,
    bench_padded_input_assembly,
    bench_mask_building,
    bench_stateful_extend,
);
criterion_main!(benches);
