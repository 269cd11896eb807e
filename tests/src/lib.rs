//! Shared fixtures for the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use cardio_model::backends::{DecisionTree, Node};
use cardio_model::{
    check_dimension, ClassLabel, ClassProbabilities, ForestParameters, LogisticParameters,
    ModelBackend, ModelError, ModelMetadata, ModelType, ModelVersion,
};
use cardio_schema::{field_order, FeatureVector, Field, RawFields, FEATURE_COUNT};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The reference patient: a 50 year old man with otherwise unremarkable values.
pub fn reference_patient() -> RawFields {
    RawFields::new()
        .with("age", 50)
        .with("sex", 1)
        .with("cp", 0)
        .with("trestbps", 120)
        .with("chol", 200)
        .with("fbs", 0)
        .with("restecg", 0)
        .with("thalach", 150)
        .with("exang", 0)
        .with("oldpeak", 1.0)
        .with("slope", 1)
        .with("ca", 0)
        .with("thal", 2)
}

/// A model that always answers the same way and counts how often it is asked.
pub struct StubModel {
    label: ClassLabel,
    probabilities: ClassProbabilities,
    calls: AtomicUsize,
}

impl StubModel {
    pub fn new(label: u32, p0: f64, p1: f64) -> Self {
        Self {
            label: ClassLabel(label),
            probabilities: ClassProbabilities::binary(p0, p1),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelBackend for StubModel {
    fn load_model(&mut self, _: &[u8], _: &ModelMetadata) -> Result<(), ModelError> {
        Ok(())
    }

    fn classify(&self, vector: &FeatureVector) -> Result<ClassLabel, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_dimension(FEATURE_COUNT, vector)?;
        Ok(self.label)
    }

    fn class_probabilities(
        &self,
        vector: &FeatureVector,
    ) -> Result<ClassProbabilities, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        check_dimension(FEATURE_COUNT, vector)?;
        Ok(self.probabilities.clone())
    }

    fn backend_name(&self) -> &str {
        "stub"
    }

    fn is_loaded(&self) -> bool {
        true
    }

    fn input_size(&self) -> Option<usize> {
        Some(FEATURE_COUNT)
    }

    fn metadata(&self) -> Option<&ModelMetadata> {
        None
    }
}

pub fn metadata(id: &str, model_type: ModelType) -> ModelMetadata {
    ModelMetadata::new(id, id, ModelVersion::new(1, 0, 0), model_type)
        .with_feature_names(field_order())
}

/// Logistic weights loosely shaped like a model fitted on the Cleveland data.
pub fn heart_logistic() -> LogisticParameters {
    let mut w = vec![0.0; FEATURE_COUNT];
    w[Field::Age.index()] = 0.03;
    w[Field::Sex.index()] = 1.2;
    w[Field::ChestPainType.index()] = -0.8;
    w[Field::RestingBloodPressure.index()] = 0.015;
    w[Field::SerumCholesterol.index()] = 0.004;
    w[Field::MaxHeartRate.index()] = -0.025;
    w[Field::ExerciseAngina.index()] = 0.9;
    w[Field::StDepression.index()] = 0.55;
    w[Field::MajorVessels.index()] = 0.85;
    w[Field::Thalassemia.index()] = 0.6;
    LogisticParameters::new(w, -1.5)
}

/// Two shallow trees on major vessel count and maximum heart rate.
pub fn heart_forest() -> ForestParameters {
    let split = |feature: Field, threshold: f64, low: [f64; 2], high: [f64; 2]| DecisionTree {
        nodes: vec![
            Node::Split {
                feature: feature.index(),
                threshold,
                left: 1,
                right: 2,
            },
            Node::Leaf { value: low },
            Node::Leaf { value: high },
        ],
    };
    ForestParameters {
        n_features: FEATURE_COUNT,
        trees: vec![
            split(Field::MajorVessels, 0.5, [70.0, 30.0], [20.0, 80.0]),
            split(Field::MaxHeartRate, 140.0, [35.0, 65.0], [75.0, 25.0]),
        ],
    }
}
