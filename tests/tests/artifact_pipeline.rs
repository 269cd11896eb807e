use std::sync::Arc;

use cardio_infer::{top_contributions, Pipeline, PipelineError, RiskLabel, VerdictReport};
use cardio_model::{
    instantiate, load_artifact, ClassLabel, ModelArtifact, ModelError, ModelType,
};
use cardio_schema::{build, defaults, field_order, validate, Field};
use pretty_assertions::assert_eq;
use tests::{heart_forest, heart_logistic, init_logging, metadata, reference_patient};

#[test]
fn logistic_artifact_from_disk_drives_the_pipeline() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heart-lr.json");
    ModelArtifact::logistic(metadata("heart-lr", ModelType::Logistic), &heart_logistic())
        .unwrap()
        .write(&path)
        .unwrap();

    let pipeline = Pipeline::new(load_artifact(&path).unwrap()).unwrap();

    // logit = 1.5 + 1.2 + 1.8 + 0.8 - 3.75 + 0.55 + 1.2 - 1.5 = 1.8
    let verdict = pipeline.run(&reference_patient()).unwrap();
    let expected = 1.0 / (1.0 + (-1.8_f64).exp());
    assert_eq!(verdict.risk_label(), RiskLabel::High);
    assert!((verdict.confidence() - expected).abs() < 1e-9);

    let vector = build(verdict.record());
    let top = top_contributions(pipeline.model(), &vector, 3).unwrap();
    let fields: Vec<Field> = top.iter().map(|c| c.field).collect();
    assert_eq!(
        fields,
        vec![Field::MaxHeartRate, Field::RestingBloodPressure, Field::Age]
    );

    let report = VerdictReport::new(&verdict).with_contributions(top);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["risk"], "HIGH");
    assert_eq!(json["contributions"][0]["field"], "thalach");
}

#[test]
fn forest_artifact_averages_its_trees() {
    let artifact =
        ModelArtifact::forest(metadata("heart-rf", ModelType::TreeEnsemble), &heart_forest())
            .unwrap();
    let pipeline = Pipeline::new(instantiate(&artifact).unwrap()).unwrap();

    // ca = 0 -> [0.7, 0.3]; thalach = 150 -> [0.75, 0.25]
    let verdict = pipeline.run(&reference_patient()).unwrap();
    assert_eq!(verdict.risk_label(), RiskLabel::Low);
    assert!((verdict.confidence() - 0.725).abs() < 1e-12);

    // ca = 3 -> [0.2, 0.8]; thalach = 120 -> [0.35, 0.65]
    let sick = reference_patient().with("ca", 3).with("thalach", 120);
    let verdict = pipeline.run(&sick).unwrap();
    assert_eq!(verdict.risk_label(), RiskLabel::High);
    assert!((verdict.confidence() - 0.725).abs() < 1e-12);

    let vector = build(verdict.record());
    assert!(top_contributions(pipeline.model(), &vector, 3)
        .unwrap()
        .is_empty());
}

#[test]
fn reordered_feature_names_fail_the_startup_check() {
    let mut names: Vec<String> = field_order().iter().map(|s| s.to_string()).collect();
    names.swap(11, 12);
    let meta = metadata("heart-lr", ModelType::Logistic).with_feature_names(names);
    let artifact = ModelArtifact::logistic(meta, &heart_logistic()).unwrap();

    let err = Pipeline::new(instantiate(&artifact).unwrap()).unwrap_err();
    assert!(matches!(err, PipelineError::SchemaMismatch(_)));
    assert!(err.to_string().contains("`thal`"));
}

#[test]
fn undersized_models_are_rejected() {
    let mut params = heart_logistic();
    params.coefficients.truncate(12);
    let meta = metadata("short", ModelType::Logistic).with_feature_names(Vec::<String>::new());
    let model = instantiate(&ModelArtifact::logistic(meta, &params).unwrap()).unwrap();
    assert!(matches!(
        Pipeline::new(model.clone()),
        Err(PipelineError::SchemaMismatch(_))
    ));

    // Called directly, the adapter refuses the full-length vector.
    let vector = build(&validate(&defaults()).unwrap());
    assert!(matches!(
        model.classify(&vector),
        Err(ModelError::DimensionMismatch {
            expected: 12,
            found: 13
        })
    ));
}

#[test]
fn custom_model_types_are_unavailable() {
    let artifact = ModelArtifact {
        metadata: metadata("svm", ModelType::Custom("svm".into())),
        parameters: serde_json::json!({}),
    };
    assert!(matches!(
        instantiate(&artifact),
        Err(ModelError::Unavailable(_))
    ));
}

#[test]
fn shared_model_serves_several_pipelines() {
    let model = instantiate(
        &ModelArtifact::logistic(metadata("heart-lr", ModelType::Logistic), &heart_logistic())
            .unwrap(),
    )
    .unwrap();
    let a = Pipeline::new(Arc::clone(&model)).unwrap();
    let b = Pipeline::new(model).unwrap();
    let raw = reference_patient();
    assert_eq!(a.run(&raw).unwrap(), b.run(&raw).unwrap());
    assert_eq!(
        a.run(&raw).unwrap().risk_label().class(),
        ClassLabel::DISEASE
    );
}
