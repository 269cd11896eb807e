//! Inference pipeline for cardiac risk prediction.
//!
//! [`Pipeline`] validates raw input, assembles the feature vector, calls the
//! injected classifier and interprets its output as a [`Verdict`]. The
//! [`present`] module turns verdicts and failures into text or JSON.

pub mod explain;
pub mod interpret;
pub mod pipeline;
pub mod present;
pub mod verdict;

pub use explain::{explain, top_contributions, FeatureContribution};
pub use interpret::{interpret, InterpretError};
pub use pipeline::{verify_model, Pipeline, PipelineError, Stage, PROBABILITY_TOLERANCE};
pub use present::{
    input_summary, render_contributions, render_error, render_summary, render_verdict,
    SummaryRow, VerdictReport,
};
pub use verdict::{round_percent, RiskLabel, Verdict};
