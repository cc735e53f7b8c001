// Offline training: CSV dataset → cleaned text → stratified split → fitted
// model + held-out evaluation → persisted artifacts.

pub mod dataset;
pub mod metrics;
pub mod pipeline;
pub mod split;

pub use dataset::{Dataset, DatasetError, LabeledText};
pub use metrics::EvaluationReport;
pub use pipeline::{persist, train, TrainingError, TrainingOptions, TrainingOutcome};
