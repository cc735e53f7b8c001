use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{info, warn};

use crate::cleaning::clean;
use crate::config::TrainingConfig;
use crate::inference::TOP_K;
use crate::model::artifacts::{encode_envelope, ArtifactKind, REPORT_ARTIFACT};
use crate::model::{
    ArtifactError, ArtifactStore, LabelCodec, LabelError, ModelArtifacts, ModelError,
    MultinomialNb, TfidfVectorizer, DEFAULT_MAX_FEATURES,
};
use crate::training::dataset::{Dataset, DatasetError, LabeledText};
use crate::training::metrics::{accuracy, per_class_metrics, top_k_accuracy, EvaluationReport};
use crate::training::split::{stratified_split, Split};

/// Labels with fewer rows than this are removed before fitting.
pub const MIN_ROWS_PER_LABEL: usize = 2;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Model fitting failed: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("Not enough data to train: {0}")]
    NotEnoughData(String),
}

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub label_column: String,
    pub test_size: f64,
    pub seed: u64,
    pub max_features: usize,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            label_column: "Title".to_string(),
            test_size: 0.2,
            seed: 42,
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

impl From<&TrainingConfig> for TrainingOptions {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            label_column: config.label_column.clone(),
            test_size: config.test_size,
            seed: config.random_seed,
            max_features: config.max_features,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: ModelArtifacts,
    pub report: EvaluationReport,
    /// Indices into the filtered example list.
    pub split: Split,
}

/// Removes examples whose label occurs fewer than [`MIN_ROWS_PER_LABEL`]
/// times. Returns the kept examples and the dropped labels, sorted.
pub fn filter_rare_labels(examples: Vec<LabeledText>) -> (Vec<LabeledText>, Vec<String>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for example in &examples {
        *counts.entry(example.label.as_str()).or_insert(0) += 1;
    }
    let dropped: BTreeSet<String> = counts
        .into_iter()
        .filter(|&(_, n)| n < MIN_ROWS_PER_LABEL)
        .map(|(label, _)| label.to_string())
        .collect();

    let kept = examples
        .into_iter()
        .filter(|e| !dropped.contains(&e.label))
        .collect();
    (kept, dropped.into_iter().collect())
}

/// Fits vectorizer, classifier and label encoding on `dataset` and evaluates
/// them on a held-out stratified partition.
pub fn train(dataset: &Dataset, options: &TrainingOptions) -> Result<TrainingOutcome, TrainingError> {
    let examples = dataset.labeled_texts(&options.label_column)?;
    let (examples, dropped_labels) = filter_rare_labels(examples);
    if !dropped_labels.is_empty() {
        warn!(
            "Dropped {} labels with fewer than {MIN_ROWS_PER_LABEL} rows: {:?}",
            dropped_labels.len(),
            dropped_labels
        );
    }
    if examples.is_empty() {
        return Err(TrainingError::NotEnoughData(format!(
            "no label in '{}' has at least {MIN_ROWS_PER_LABEL} rows",
            options.label_column
        )));
    }

    let texts: Vec<String> = examples.iter().map(|e| clean(&e.text)).collect();
    let codec = LabelCodec::fit(examples.iter().map(|e| e.label.as_str()));
    let targets = examples
        .iter()
        .map(|e| codec.encode(&e.label))
        .collect::<Result<Vec<usize>, LabelError>>()?;

    let split = stratified_split(&targets, codec.len(), options.test_size, options.seed);
    info!(
        "Split {} examples into {} train / {} test across {} classes",
        examples.len(),
        split.train.len(),
        split.test.len(),
        codec.len()
    );

    let train_texts: Vec<&str> = split.train.iter().map(|&i| texts[i].as_str()).collect();
    let test_texts: Vec<&str> = split.test.iter().map(|&i| texts[i].as_str()).collect();
    let train_targets: Vec<usize> = split.train.iter().map(|&i| targets[i]).collect();
    let test_targets: Vec<usize> = split.test.iter().map(|&i| targets[i]).collect();

    let vectorizer = TfidfVectorizer::fit(&train_texts, options.max_features)?;
    info!("Fitted vocabulary with {} terms", vectorizer.len());
    let train_rows = vectorizer.transform_all(&train_texts);
    let test_rows = vectorizer.transform_all(&test_texts);

    let classifier = MultinomialNb::fit(&train_rows, &train_targets, codec.len())?;

    let mut scores = Vec::with_capacity(test_rows.len());
    let mut predicted = Vec::with_capacity(test_rows.len());
    for row in &test_rows {
        predicted.push(classifier.predict(row)?);
        scores.push(classifier.predict_proba(row)?);
    }
    let train_classes: Vec<usize> = train_targets
        .iter()
        .copied()
        .collect::<BTreeSet<usize>>()
        .into_iter()
        .collect();

    let report = EvaluationReport {
        accuracy: accuracy(&test_targets, &predicted),
        top_k_accuracy: top_k_accuracy(&test_targets, &scores, TOP_K, &train_classes),
        k: TOP_K,
        train_size: split.train.len(),
        test_size: split.test.len(),
        num_classes: codec.len(),
        dropped_labels,
        per_class: per_class_metrics(&test_targets, &predicted, codec.names()),
    };
    for class in &report.per_class {
        info!(
            "{:<32} precision={:.2} recall={:.2} f1={:.2} support={}",
            class.label, class.precision, class.recall, class.f1, class.support
        );
    }

    let artifacts = ModelArtifacts::new(vectorizer, classifier, codec)?;
    Ok(TrainingOutcome {
        artifacts,
        report,
        split,
    })
}

/// Writes the three model artifacts and the evaluation report.
pub async fn persist(
    outcome: &TrainingOutcome,
    store: &dyn ArtifactStore,
) -> Result<(), TrainingError> {
    outcome.artifacts.save(store).await?;
    let report = encode_envelope(
        REPORT_ARTIFACT,
        ArtifactKind::Report,
        outcome.artifacts.model_id(),
        outcome.artifacts.created_at(),
        &outcome.report,
    )?;
    store
        .save(REPORT_ARTIFACT, report)
        .await
        .map_err(ArtifactError::from)?;

    info!(
        "Persisted model {} to {}",
        outcome.artifacts.model_id(),
        store.location()
    );
    Ok(())
}
