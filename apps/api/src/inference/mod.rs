// Online path: uploaded document -> ranked role list.
// The loaded model is read-only; every request shares it through AppState.

pub mod handlers;
pub mod service;
pub mod top_k;

pub use service::{InferenceService, PredictError, PredictionResult, RankedRole, TOP_K};
