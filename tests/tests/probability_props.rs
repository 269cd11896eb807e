use cardio_infer::{Pipeline, PROBABILITY_TOLERANCE};
use cardio_model::{instantiate, ClassLabel, ModelArtifact, ModelBackend, ModelType};
use cardio_schema::{build, fields, validate, Domain, RawFields, RawValue};
use proptest::prelude::*;
use std::sync::Arc;
use tests::{heart_forest, heart_logistic, metadata};

fn in_domain(domain: Domain) -> BoxedStrategy<RawValue> {
    match domain {
        Domain::IntRange { min, max } => (min..=max).prop_map(RawValue::Int).boxed(),
        Domain::FloatRange { min, max } => (min..=max).prop_map(RawValue::Float).boxed(),
        Domain::Codes { codes } => proptest::sample::select(codes.to_vec())
            .prop_map(RawValue::Int)
            .boxed(),
    }
}

fn patient() -> impl Strategy<Value = RawFields> {
    let values: Vec<BoxedStrategy<RawValue>> =
        fields().iter().map(|spec| in_domain(spec.domain)).collect();
    values.prop_map(|values| {
        fields()
            .iter()
            .zip(values)
            .map(|(spec, v)| (spec.key().to_string(), v))
            .collect::<RawFields>()
    })
}

fn models() -> Vec<Arc<dyn ModelBackend>> {
    let lr = ModelArtifact::logistic(metadata("lr", ModelType::Logistic), &heart_logistic())
        .expect("logistic artifact");
    let rf = ModelArtifact::forest(metadata("rf", ModelType::TreeEnsemble), &heart_forest())
        .expect("forest artifact");
    vec![
        instantiate(&lr).expect("logistic model"),
        instantiate(&rf).expect("forest model"),
    ]
}

proptest! {
    #[test]
    fn probabilities_sum_to_one(raw in patient()) {
        let vector = build(&validate(&raw).expect("in-domain patient"));
        for model in models() {
            let probs = model.class_probabilities(&vector).unwrap();
            prop_assert!((probs.total() - 1.0).abs() <= PROBABILITY_TOLERANCE);
            prop_assert!(probs.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn confidence_is_the_predicted_class_probability(raw in patient()) {
        for model in models() {
            let vector = build(&validate(&raw).unwrap());
            let label = model.classify(&vector).unwrap();
            let p = model.class_probabilities(&vector).unwrap().get(label).unwrap();

            let verdict = Pipeline::new(model).unwrap().run(&raw).unwrap();
            prop_assert_eq!(verdict.risk_label().class(), label);
            prop_assert_eq!(verdict.confidence().to_bits(), p.to_bits());
            prop_assert!(label == ClassLabel::NO_DISEASE || label == ClassLabel::DISEASE);
        }
    }
}
