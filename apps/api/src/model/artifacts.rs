//! Versioned JSON schema for persisted model state.
//!
//! One training run writes three independent artifacts that share a
//! `model_id`:
//!
//! | file              | body                                                |
//! |-------------------|-----------------------------------------------------|
//! | `vocabulary.json` | `tokens` (index order) + parallel `idf` weights     |
//! | `classifier.json` | `class_log_prior` + `feature_log_prob[class][feat]` |
//! | `labels.json`     | `names`, indexed by class id                        |
//!
//! Loading reads all three, checks the envelope and cross-artifact shapes,
//! and only then returns a handle. There is no partially-loaded state.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::model::labels::LabelCodec;
use crate::model::naive_bayes::MultinomialNb;
use crate::model::store::{ArtifactStore, StoreError};
use crate::model::vectorizer::TfidfVectorizer;

pub const SCHEMA_VERSION: u32 = 1;

pub const VOCABULARY_ARTIFACT: &str = "vocabulary.json";
pub const CLASSIFIER_ARTIFACT: &str = "classifier.json";
pub const LABELS_ARTIFACT: &str = "labels.json";
pub const REPORT_ARTIFACT: &str = "report.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Artifact '{name}' is not valid JSON for its schema: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode artifact '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Artifact '{name}' has schema version {found}, expected {expected}")]
    SchemaVersion {
        name: String,
        found: u32,
        expected: u32,
    },

    #[error("Artifact '{name}' has kind {found:?}, expected {expected:?}")]
    KindMismatch {
        name: String,
        found: ArtifactKind,
        expected: ArtifactKind,
    },

    #[error("Artifacts come from different training runs ({0} vs {1})")]
    ModelIdMismatch(Uuid, Uuid),

    #[error("Artifact '{name}' is inconsistent: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Vocabulary,
    Classifier,
    Labels,
    Report,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub schema_version: u32,
    pub kind: ArtifactKind,
    pub model_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub body: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyBody {
    pub tokens: Vec<String>,
    pub idf: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierBody {
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsBody {
    pub names: Vec<String>,
}

pub fn encode_envelope<T: Serialize>(
    name: &str,
    kind: ArtifactKind,
    model_id: Uuid,
    created_at: DateTime<Utc>,
    body: &T,
) -> Result<Vec<u8>, ArtifactError> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        kind,
        model_id,
        created_at,
        body,
    };
    serde_json::to_vec_pretty(&envelope).map_err(|source| ArtifactError::Encode {
        name: name.to_string(),
        source,
    })
}

pub fn decode_envelope<T: DeserializeOwned>(
    name: &str,
    expected: ArtifactKind,
    bytes: &[u8],
) -> Result<Envelope<T>, ArtifactError> {
    // Check the version before the body so a newer schema reports as such
    // rather than as a body decode failure.
    #[derive(Deserialize)]
    struct Header {
        schema_version: u32,
        kind: ArtifactKind,
    }
    let decode_err = |source| ArtifactError::Decode {
        name: name.to_string(),
        source,
    };

    let header: Header = serde_json::from_slice(bytes).map_err(decode_err)?;
    if header.schema_version != SCHEMA_VERSION {
        return Err(ArtifactError::SchemaVersion {
            name: name.to_string(),
            found: header.schema_version,
            expected: SCHEMA_VERSION,
        });
    }
    if header.kind != expected {
        return Err(ArtifactError::KindMismatch {
            name: name.to_string(),
            found: header.kind,
            expected,
        });
    }
    serde_json::from_slice(bytes).map_err(decode_err)
}

/// The complete fitted model, immutable once constructed.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    model_id: Uuid,
    created_at: DateTime<Utc>,
    vectorizer: TfidfVectorizer,
    classifier: MultinomialNb,
    labels: LabelCodec,
}

impl ModelArtifacts {
    /// Bundles freshly fitted components under a new model id.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: MultinomialNb,
        labels: LabelCodec,
    ) -> Result<Self, ArtifactError> {
        let artifacts = Self {
            model_id: Uuid::new_v4(),
            created_at: Utc::now(),
            vectorizer,
            classifier,
            labels,
        };
        artifacts.check_consistency()?;
        Ok(artifacts)
    }

    /// Loads and validates all three artifacts. Any failure is fatal to the caller.
    pub async fn load(store: &dyn ArtifactStore) -> Result<Self, ArtifactError> {
        let vocabulary = store.load(VOCABULARY_ARTIFACT).await?;
        let classifier = store.load(CLASSIFIER_ARTIFACT).await?;
        let labels = store.load(LABELS_ARTIFACT).await?;
        let artifacts = Self::from_bytes(&vocabulary, &classifier, &labels)?;

        info!(
            "Loaded model {} from {} ({} features, {} classes)",
            artifacts.model_id,
            store.location(),
            artifacts.vectorizer.len(),
            artifacts.labels.len()
        );
        Ok(artifacts)
    }

    pub fn from_bytes(
        vocabulary: &[u8],
        classifier: &[u8],
        labels: &[u8],
    ) -> Result<Self, ArtifactError> {
        let vocabulary: Envelope<VocabularyBody> =
            decode_envelope(VOCABULARY_ARTIFACT, ArtifactKind::Vocabulary, vocabulary)?;
        let classifier: Envelope<ClassifierBody> =
            decode_envelope(CLASSIFIER_ARTIFACT, ArtifactKind::Classifier, classifier)?;
        let labels: Envelope<LabelsBody> =
            decode_envelope(LABELS_ARTIFACT, ArtifactKind::Labels, labels)?;

        for other in [classifier.model_id, labels.model_id] {
            if other != vocabulary.model_id {
                return Err(ArtifactError::ModelIdMismatch(vocabulary.model_id, other));
            }
        }

        let invalid = |name: &str, reason: String| ArtifactError::Invalid {
            name: name.to_string(),
            reason,
        };
        let vectorizer =
            TfidfVectorizer::from_parts(vocabulary.body.tokens, vocabulary.body.idf)
                .map_err(|e| invalid(VOCABULARY_ARTIFACT, e.to_string()))?;
        let nb = MultinomialNb::from_parts(
            classifier.body.class_log_prior,
            classifier.body.feature_log_prob,
        )
        .map_err(|e| invalid(CLASSIFIER_ARTIFACT, e.to_string()))?;
        let codec = LabelCodec::from_names(labels.body.names)
            .map_err(|e| invalid(LABELS_ARTIFACT, e.to_string()))?;

        let artifacts = Self {
            model_id: vocabulary.model_id,
            created_at: vocabulary.created_at,
            vectorizer,
            classifier: nb,
            labels: codec,
        };
        artifacts.check_consistency()?;
        Ok(artifacts)
    }

    pub async fn save(&self, store: &dyn ArtifactStore) -> Result<(), ArtifactError> {
        let [vocabulary, classifier, labels] = self.to_bytes()?;
        store.save(VOCABULARY_ARTIFACT, vocabulary).await?;
        store.save(CLASSIFIER_ARTIFACT, classifier).await?;
        store.save(LABELS_ARTIFACT, labels).await?;
        Ok(())
    }

    /// Encodes `[vocabulary, classifier, labels]`.
    pub fn to_bytes(&self) -> Result<[Vec<u8>; 3], ArtifactError> {
        let vocabulary = encode_envelope(
            VOCABULARY_ARTIFACT,
            ArtifactKind::Vocabulary,
            self.model_id,
            self.created_at,
            &VocabularyBody {
                tokens: self.vectorizer.tokens().to_vec(),
                idf: self.vectorizer.idf().to_vec(),
            },
        )?;
        let classifier = encode_envelope(
            CLASSIFIER_ARTIFACT,
            ArtifactKind::Classifier,
            self.model_id,
            self.created_at,
            &ClassifierBody {
                class_log_prior: self.classifier.class_log_prior().to_vec(),
                feature_log_prob: self.classifier.feature_log_prob().to_vec(),
            },
        )?;
        let labels = encode_envelope(
            LABELS_ARTIFACT,
            ArtifactKind::Labels,
            self.model_id,
            self.created_at,
            &LabelsBody {
                names: self.labels.names().to_vec(),
            },
        )?;
        Ok([vocabulary, classifier, labels])
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        if self.classifier.num_features() != self.vectorizer.len() {
            return Err(ArtifactError::Invalid {
                name: CLASSIFIER_ARTIFACT.to_string(),
                reason: format!(
                    "classifier has {} features but vocabulary has {} tokens",
                    self.classifier.num_features(),
                    self.vectorizer.len()
                ),
            });
        }
        if self.classifier.num_classes() != self.labels.len() {
            return Err(ArtifactError::Invalid {
                name: LABELS_ARTIFACT.to_string(),
                reason: format!(
                    "classifier has {} classes but encoding has {} labels",
                    self.classifier.num_classes(),
                    self.labels.len()
                ),
            });
        }
        Ok(())
    }

    pub fn model_id(&self) -> Uuid {
        self.model_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &MultinomialNb {
        &self.classifier
    }

    pub fn labels(&self) -> &LabelCodec {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::store::LocalArtifactStore;
    use crate::test_support::fixture_artifacts;

    #[tokio::test]
    async fn test_save_then_load_preserves_model() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        let original = fixture_artifacts();
        original.save(&store).await.unwrap();

        let loaded = ModelArtifacts::load(&store).await.unwrap();
        assert_eq!(loaded.model_id(), original.model_id());
        assert_eq!(loaded.labels(), original.labels());
        assert_eq!(loaded.vectorizer().tokens(), original.vectorizer().tokens());
        let text = "rust backend engineer kubernetes";
        assert_eq!(
            loaded.vectorizer().transform(text),
            original.vectorizer().transform(text)
        );
    }

    #[tokio::test]
    async fn test_missing_artifact_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());
        fixture_artifacts().save(&store).await.unwrap();
        std::fs::remove_file(dir.path().join(LABELS_ARTIFACT)).unwrap();
        assert!(matches!(
            ModelArtifacts::load(&store).await,
            Err(ArtifactError::Store(_))
        ));
    }

    #[test]
    fn test_mixed_training_runs_rejected() {
        let a = fixture_artifacts().to_bytes().unwrap();
        let b = fixture_artifacts().to_bytes().unwrap();
        assert!(matches!(
            ModelArtifacts::from_bytes(&a[0], &a[1], &b[2]),
            Err(ArtifactError::ModelIdMismatch(..))
        ));
    }

    #[test]
    fn test_wrong_kind_and_version_rejected() {
        let [vocabulary, classifier, labels] = fixture_artifacts().to_bytes().unwrap();
        assert!(matches!(
            ModelArtifacts::from_bytes(&classifier, &vocabulary, &labels),
            Err(ArtifactError::KindMismatch { .. })
        ));

        let mut value: serde_json::Value = serde_json::from_slice(&labels).unwrap();
        value["schema_version"] = serde_json::json!(99);
        let future = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            ModelArtifacts::from_bytes(&vocabulary, &classifier, &future),
            Err(ArtifactError::SchemaVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let [vocabulary, classifier, labels] = fixture_artifacts().to_bytes().unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&labels).unwrap();
        value["body"]["names"].as_array_mut().unwrap().pop();
        let short = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            ModelArtifacts::from_bytes(&vocabulary, &classifier, &short),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let [vocabulary, classifier, _] = fixture_artifacts().to_bytes().unwrap();
        assert!(matches!(
            ModelArtifacts::from_bytes(&vocabulary, &classifier, b"not json"),
            Err(ArtifactError::Decode { .. })
        ));
    }
}
