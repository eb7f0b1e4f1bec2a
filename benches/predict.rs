//! Benchmarks for the prediction pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stresscast::artifact::{ModelArtifact, ARTIFACT_VERSION};
use stresscast::encoder::{EncoderRegistry, LabelEncoder, TARGET_COLUMN};
use stresscast::features::{Medians, RawRecord, NUMERIC_COLUMNS};
use stresscast::fuzzy::{fuzzify, NumericInputs, DEGREE_NAMES};
use stresscast::model::{DecisionTree, TreeEnsemble, TreeNode};
use stresscast::service::InferenceService;

fn bench_artifact() -> ModelArtifact {
    let mut encoders = EncoderRegistry::new();
    encoders.insert("Gender", LabelEncoder::fit(["Female", "Male"]));
    encoders.insert(
        "BMI Category",
        LabelEncoder::fit(["Normal", "Obese", "Overweight"]),
    );
    encoders.insert(
        "Sleep Disorder",
        LabelEncoder::fit(["Insomnia", "Nothing", "Sleep Apnea"]),
    );
    encoders.insert(TARGET_COLUMN, LabelEncoder::fit(["High", "Low", "Medium"]));

    let mut columns: Vec<String> = vec![
        "Gender".into(),
        "BMI Category".into(),
        "Sleep Disorder".into(),
    ];
    columns.extend(NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
    columns.extend(DEGREE_NAMES.iter().map(|c| c.to_string()));

    // A small but non-trivial forest splitting on age, heart rate, and a
    // couple of fuzzy degree columns
    let tree = |feature: usize, threshold: f64| DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { class: 1 },
            TreeNode::Split {
                feature: 3,
                threshold: 45.0,
                left: 3,
                right: 4,
            },
            TreeNode::Leaf { class: 2 },
            TreeNode::Leaf { class: 0 },
        ],
    };

    ModelArtifact {
        version: ARTIFACT_VERSION,
        columns: columns.clone(),
        encoders,
        medians: Medians {
            age: 42.0,
            sleep_duration: 7.2,
            quality_of_sleep: 7.0,
            heart_rate: 70.0,
            daily_steps: 7000.0,
        },
        ensemble: TreeEnsemble {
            n_features: columns.len(),
            n_classes: 3,
            trees: vec![
                tree(3, 40.0),
                tree(6, 72.0),
                tree(8, 0.5),
                tree(14, 0.3),
                tree(20, 0.6),
            ],
        },
    }
}

fn bench_record() -> RawRecord {
    RawRecord {
        gender: "Male".into(),
        age: Some(33.0),
        sleep_duration: Some(7.5),
        quality_of_sleep: Some(8.0),
        bmi_category: "Normal".into(),
        heart_rate: Some(75.0),
        daily_steps: Some(8000.0),
        sleep_disorder: Some("Nothing".into()),
    }
}

fn bench_fuzzify(c: &mut Criterion) {
    let inputs = NumericInputs {
        age: 33.0,
        sleep_duration: 7.5,
        quality_of_sleep: 8.0,
        heart_rate: 75.0,
        daily_steps: 8000.0,
    };

    c.bench_function("fuzzify_record", |b| {
        b.iter(|| fuzzify(black_box(&inputs)))
    });
}

fn bench_predict(c: &mut Criterion) {
    let service = InferenceService::new(bench_artifact());
    let record = bench_record();

    c.bench_function("predict_single", |b| {
        b.iter(|| service.predict(black_box(&record)).unwrap())
    });

    let batch: Vec<RawRecord> = (0..100)
        .map(|i| {
            let mut r = bench_record();
            r.age = Some(20.0 + (i as f64) * 0.4);
            r
        })
        .collect();

    c.bench_function("predict_batch_100", |b| {
        b.iter(|| service.predict_batch(black_box(&batch)))
    });
}

criterion_group!(benches, bench_fuzzify, bench_predict);
criterion_main!(benches);
