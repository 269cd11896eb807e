use std::sync::Arc;

use cardio_infer::{
    interpret, render_error, render_verdict, Pipeline, PipelineError, RiskLabel, Stage,
};
use cardio_model::{ClassLabel, ClassProbabilities};
use cardio_schema::{validate, ValidationErrorKind};
use pretty_assertions::assert_eq;
use tests::{init_logging, reference_patient, StubModel};

#[test]
fn reference_patient_gets_a_low_risk_verdict() {
    init_logging();
    let stub = Arc::new(StubModel::new(0, 0.7, 0.3));
    let pipeline = Pipeline::new(stub.clone()).expect("stub passes the startup check");

    let verdict = pipeline.run(&reference_patient()).expect("verdict");
    assert_eq!(verdict.risk_label(), RiskLabel::Low);
    assert!((verdict.confidence() - 0.70).abs() < 1e-9);
    assert_eq!(verdict.record().age(), 50);
    assert_eq!(verdict.record().thalassemia(), 2);
    assert_eq!(
        render_verdict(&verdict),
        "Low Risk of Heart Disease (70.00% confidence)"
    );
    assert!(stub.calls() > 0);
}

#[test]
fn missing_cholesterol_never_reaches_the_model() {
    init_logging();
    let stub = Arc::new(StubModel::new(1, 0.1, 0.9));
    let pipeline = Pipeline::new(stub.clone()).unwrap();

    let mut raw = reference_patient();
    raw.remove("chol");
    let err = pipeline.run(&raw).unwrap_err();

    let PipelineError::Validation(ref e) = err else {
        panic!("expected a validation failure, got {err:?}");
    };
    assert_eq!(e.field, "chol");
    assert_eq!(e.reason, ValidationErrorKind::Missing);
    assert_eq!(err.reached(), Stage::Received);
    assert_eq!(stub.calls(), 0);
    assert!(render_error(&err).contains("Serum Cholesterol"));
}

#[test]
fn out_of_domain_values_name_their_field() {
    let pipeline = Pipeline::new(Arc::new(StubModel::new(0, 0.5, 0.5))).unwrap();
    for (key, value) in [("age", 150), ("cp", 9), ("thal", 3), ("trestbps", 79)] {
        let raw = reference_patient().with(key, value);
        match pipeline.run(&raw) {
            Err(PipelineError::Validation(e)) => assert_eq!(e.field, key),
            other => panic!("{key}={value}: expected validation failure, got {other:?}"),
        }
    }
}

#[test]
fn interpret_uses_the_predicted_class_probability() {
    let record = validate(&reference_patient()).unwrap();

    let high = interpret(
        ClassLabel(1),
        &ClassProbabilities::binary(0.18, 0.82),
        record.clone(),
    )
    .unwrap();
    assert_eq!(high.risk_label(), RiskLabel::High);
    assert!((high.confidence() - 0.82).abs() < 1e-12);
    assert_eq!(high.confidence_percent(), 82.0);

    let low = interpret(
        ClassLabel(0),
        &ClassProbabilities::binary(0.95, 0.05),
        record,
    )
    .unwrap();
    assert_eq!(low.risk_label(), RiskLabel::Low);
    assert!((low.confidence() - 0.95).abs() < 1e-12);
}

#[test]
fn concurrent_requests_agree() {
    let pipeline = Pipeline::new(Arc::new(StubModel::new(1, 0.25, 0.75))).unwrap();
    let raw = reference_patient();
    let expected = pipeline.run(&raw).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| (0..50).map(|_| pipeline.run(&raw).unwrap()).collect::<Vec<_>>()))
            .collect();
        for handle in handles {
            for verdict in handle.join().unwrap() {
                assert_eq!(verdict, expected);
            }
        }
    });
}
