use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::cleaning::clean;
use crate::extraction::{extract, Document, ExtractError};
use crate::inference::top_k::top_k;
use crate::model::ModelArtifacts;

/// Number of roles returned per prediction.
pub const TOP_K: usize = 5;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Uploaded file is empty.")]
    EmptyInput,

    #[error("Unsupported file format '{0}'. Only .pdf, .doc, .docx supported.")]
    UnsupportedFormat(String),

    #[error("Error processing file: {0}")]
    Extraction(#[source] ExtractError),

    #[error("Prediction error: {0}")]
    Inference(String),
}

impl From<ExtractError> for PredictError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::EmptyInput => PredictError::EmptyInput,
            ExtractError::UnsupportedFormat(tag) => PredictError::UnsupportedFormat(tag),
            other => PredictError::Extraction(other),
        }
    }
}

/// One ranked role. Serializes as `["Role name", 0.731]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRole {
    pub role: String,
    pub probability: f64,
}

impl Serialize for RankedRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.role, self.probability).serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub roles: Vec<RankedRole>,
}

/// Runs the document → ranked roles pipeline against a loaded model.
///
/// Holds no mutable state; share it behind an `Arc` across requests.
#[derive(Debug)]
pub struct InferenceService {
    artifacts: ModelArtifacts,
}

impl InferenceService {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    pub fn predict(&self, document: &Document) -> Result<PredictionResult, PredictError> {
        if document.is_empty() {
            return Err(PredictError::EmptyInput);
        }
        let text = extract(document.content(), document.filename())?;
        self.rank_text(&text)
    }

    /// Ranks already-extracted text: clean, vectorize, classify, select.
    pub fn rank_text(&self, extracted: &str) -> Result<PredictionResult, PredictError> {
        let cleaned = clean(extracted);
        let features = self.artifacts.vectorizer().transform(&cleaned);
        debug!(
            "Vectorized {} chars into {} non-zero features",
            cleaned.len(),
            features.entries().len()
        );

        let probabilities = self
            .artifacts
            .classifier()
            .predict_proba(&features)
            .map_err(|e| PredictError::Inference(e.to_string()))?;

        let roles = top_k(&probabilities, TOP_K)
            .into_iter()
            .map(|(class_id, p)| {
                let role = self
                    .artifacts
                    .labels()
                    .decode(class_id)
                    .map_err(|e| PredictError::Inference(e.to_string()))?;
                Ok(RankedRole {
                    role: role.to_string(),
                    probability: round3(p),
                })
            })
            .collect::<Result<Vec<_>, PredictError>>()?;

        Ok(PredictionResult { roles })
    }
}

fn round3(p: f64) -> f64 {
    (p * 1000.0).round() / 1000.0
}
