// Fitted model state: TF-IDF vocabulary, Naive Bayes parameters, label encoding,
// plus their persisted form and the stores they are read from / written to.

pub mod artifacts;
pub mod labels;
pub mod naive_bayes;
pub mod stop_words;
pub mod store;
pub mod vectorizer;

use thiserror::Error;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use labels::{LabelCodec, LabelError};
pub use naive_bayes::MultinomialNb;
pub use store::{ArtifactStore, LocalArtifactStore, S3ArtifactStore, StoreError};
pub use vectorizer::{SparseVector, TfidfVectorizer, DEFAULT_MAX_FEATURES};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot fit on an empty corpus")]
    EmptyCorpus,

    #[error("No terms left after tokenization and stop-word removal")]
    EmptyVocabulary,

    #[error("Class {0} has no training rows")]
    EmptyClass(usize),

    #[error("Label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("Feature dimension mismatch: model expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Probability computation produced non-finite values")]
    NonFinite,
}
