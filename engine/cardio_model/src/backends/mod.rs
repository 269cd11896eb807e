//! Concrete classifier backends

pub mod forest;
pub mod logistic;

pub use forest::{DecisionTree, ForestBackend, ForestParameters, Node};
pub use logistic::{LogisticBackend, LogisticParameters, StandardScaler};
