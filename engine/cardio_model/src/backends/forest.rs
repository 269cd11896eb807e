//! Tree ensemble backend (random-forest style).
//!
//! Each tree is a flat node array rooted at index 0. A split sends
//! `x[feature] <= threshold` to `left`, everything else to `right`. Leaves hold
//! per-class weights which are normalized before averaging across trees.

use cardio_schema::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::backend::{check_declared_features, check_dimension, not_loaded, ModelBackend, ModelError};
use crate::label::{ClassLabel, ClassProbabilities};
use crate::metadata::ModelMetadata;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class weights `[no_disease, disease]`, e.g. training sample counts.
        value: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Children must point strictly forward, which rules out cycles and
    /// guarantees every walk ends at a leaf.
    fn check(&self, tree: usize, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Load(format!("tree {tree} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(ModelError::Load(format!(
                            "tree {tree} node {i} splits on feature {feature} of {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Load(format!(
                            "tree {tree} node {i} has a non-finite threshold"
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ModelError::Load(format!(
                                "tree {tree} node {i} has invalid child {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
                        return Err(ModelError::Load(format!(
                            "tree {tree} leaf {i} has invalid class weights {value:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `x`.
    fn leaf_distribution(&self, x: &[f64]) -> [f64; 2] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { value } => {
                    let total = value[0] + value[1];
                    return [value[0] / total, value[1] / total];
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParameters {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl ForestParameters {
    fn check(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::Load("tree ensemble declares zero features".into()));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Load("tree ensemble has no trees".into()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.check(t, self.n_features)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForestBackend {
    params: Option<ForestParameters>,
    metadata: Option<ModelMetadata>,
}

impl ForestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parameters(
        params: ForestParameters,
        metadata: ModelMetadata,
    ) -> Result<Self, ModelError> {
        let bytes = serde_json::to_vec(&params)?;
        let mut backend = Self::new();
        backend.load_model(&bytes, &metadata)?;
        Ok(backend)
    }

    fn averaged(&self, vector: &FeatureVector) -> Result<[f64; 2], ModelError> {
        let params = self.params.as_ref().ok_or_else(|| not_loaded("tree ensemble"))?;
        check_dimension(params.n_features, vector)?;
        let x = vector.as_slice();
        let mut sum = [0.0, 0.0];
        for tree in &params.trees {
            let d = tree.leaf_distribution(x);
            sum[0] += d[0];
            sum[1] += d[1];
        }
        let n = params.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

impl ModelBackend for ForestBackend {
    fn load_model(
        &mut self,
        model_bytes: &[u8],
        metadata: &ModelMetadata,
    ) -> Result<(), ModelError> {
        let params: ForestParameters = serde_json::from_slice(model_bytes)?;
        params.check()?;
        check_declared_features(metadata, params.n_features)?;
        log::debug!(
            "loaded tree ensemble `{}` v{} with {} trees",
            metadata.id,
            metadata.version,
            params.trees.len()
        );
        self.params = Some(params);
        self.metadata = Some(metadata.clone());
        Ok(())
    }

    fn classify(&self, vector: &FeatureVector) -> Result<ClassLabel, ModelError> {
        let [p0, p1] = self.averaged(vector)?;
        Ok(if p1 > p0 {
            ClassLabel::DISEASE
        } else {
            ClassLabel::NO_DISEASE
        })
    }

    fn class_probabilities(
        &self,
        vector: &FeatureVector,
    ) -> Result<ClassProbabilities, ModelError> {
        let [p0, p1] = self.averaged(vector)?;
        Ok(ClassProbabilities::binary(p0, p1))
    }

    fn backend_name(&self) -> &str {
        "tree_ensemble"
    }

    fn is_loaded(&self) -> bool {
        self.params.is_some()
    }

    fn input_size(&self) -> Option<usize> {
        self.params.as_ref().map(|p| p.n_features)
    }

    fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }
}
