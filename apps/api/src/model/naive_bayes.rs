//! Multinomial Naive Bayes with Laplace smoothing (α = 1).

use crate::model::vectorizer::SparseVector;
use crate::model::ModelError;

const ALPHA: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct MultinomialNb {
    class_log_prior: Vec<f64>,
    /// `[class][feature]` log P(feature | class).
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fits on rows labelled with class ids in `[0, n_classes)`.
    ///
    /// Every class must own at least one row; the training split guarantees
    /// this for every class that survived the rare-label filter.
    pub fn fit(
        rows: &[SparseVector],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self, ModelError> {
        if rows.len() != labels.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let n_features = match rows.first() {
            Some(row) => row.dim(),
            None => return Err(ModelError::EmptyCorpus),
        };

        let mut class_counts = vec![0usize; n_classes];
        let mut feature_counts = vec![vec![0.0_f64; n_features]; n_classes];
        for (row, &label) in rows.iter().zip(labels) {
            if label >= n_classes {
                return Err(ModelError::LabelOutOfRange { label, n_classes });
            }
            if row.dim() != n_features {
                return Err(ModelError::DimensionMismatch {
                    expected: n_features,
                    actual: row.dim(),
                });
            }
            class_counts[label] += 1;
            for &(i, v) in row.entries() {
                feature_counts[label][i] += v;
            }
        }
        if let Some(empty) = class_counts.iter().position(|&c| c == 0) {
            return Err(ModelError::EmptyClass(empty));
        }

        let n_rows = rows.len() as f64;
        let class_log_prior = class_counts
            .iter()
            .map(|&c| (c as f64 / n_rows).ln())
            .collect();

        let feature_log_prob = feature_counts
            .into_iter()
            .map(|counts| {
                let denom = (counts.iter().sum::<f64>() + ALPHA * n_features as f64).ln();
                counts.into_iter().map(|c| (c + ALPHA).ln() - denom).collect()
            })
            .collect();

        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Rebuilds a fitted model from persisted parameters.
    pub fn from_parts(
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    ) -> Result<Self, ModelError> {
        if class_log_prior.is_empty() || class_log_prior.len() != feature_log_prob.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} class priors but {} likelihood rows",
                class_log_prior.len(),
                feature_log_prob.len()
            )));
        }
        let n_features = feature_log_prob[0].len();
        if feature_log_prob.iter().any(|row| row.len() != n_features) {
            return Err(ModelError::ShapeMismatch(
                "likelihood rows have differing lengths".to_string(),
            ));
        }
        let all_finite = class_log_prior
            .iter()
            .chain(feature_log_prob.iter().flatten())
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(ModelError::InvalidParameter(
                "classifier parameters contain non-finite values".to_string(),
            ));
        }
        Ok(Self {
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Class probability distribution, normalized in log space.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<Vec<f64>, ModelError> {
        let joint = self.joint_log_likelihood(x)?;
        let max = joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + joint.iter().map(|j| (j - max).exp()).sum::<f64>().ln();
        let probabilities: Vec<f64> = joint.iter().map(|j| (j - log_norm).exp()).collect();
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        Ok(probabilities)
    }

    /// Most likely class; ties go to the lowest class id.
    pub fn predict(&self, x: &SparseVector) -> Result<usize, ModelError> {
        let joint = self.joint_log_likelihood(x)?;
        let mut best = 0;
        for (class, &score) in joint.iter().enumerate().skip(1) {
            if score > joint[best] {
                best = class;
            }
        }
        Ok(best)
    }

    fn joint_log_likelihood(&self, x: &SparseVector) -> Result<Vec<f64>, ModelError> {
        if x.dim() != self.num_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.num_features(),
                actual: x.dim(),
            });
        }
        Ok(self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_prob)| {
                prior
                    + x.entries()
                        .iter()
                        .map(|&(i, v)| v * log_prob[i])
                        .sum::<f64>()
            })
            .collect())
    }

    pub fn num_classes(&self) -> usize {
        self.class_log_prior.len()
    }

    pub fn num_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    pub fn class_log_prior(&self) -> &[f64] {
        &self.class_log_prior
    }

    pub fn feature_log_prob(&self) -> &[Vec<f64>] {
        &self.feature_log_prob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vectorizer::TfidfVectorizer;

    fn fitted() -> (TfidfVectorizer, MultinomialNb) {
        let docs = [
            "rust backend kubernetes",
            "rust services backend",
            "nurse patient care",
            "patient ward nurse",
            "ledger audit tax",
        ];
        let labels = [0, 0, 1, 1, 2];
        let v = TfidfVectorizer::fit(&docs, 100).unwrap();
        let nb = MultinomialNb::fit(&v.transform_all(&docs), &labels, 3).unwrap();
        (v, nb)
    }

    #[test]
    fn test_priors_follow_class_frequency() {
        let (_, nb) = fitted();
        let priors: Vec<f64> = nb.class_log_prior().iter().map(|p| p.exp()).collect();
        assert!((priors[0] - 0.4).abs() < 1e-12);
        assert!((priors[1] - 0.4).abs() < 1e-12);
        assert!((priors[2] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_likelihood_rows_are_distributions() {
        let (_, nb) = fitted();
        for row in nb.feature_log_prob() {
            let total: f64 = row.iter().map(|l| l.exp()).sum();
            assert!((total - 1.0).abs() < 1e-9, "row sums to {total}");
        }
    }

    #[test]
    fn test_predict_proba_sums_to_one() {
        let (v, nb) = fitted();
        for text in ["rust backend", "nurse", "", "audit tax ledger rust"] {
            let p = nb.predict_proba(&v.transform(text)).unwrap();
            assert_eq!(p.len(), 3);
            assert!(p.iter().all(|x| *x >= 0.0));
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_predicts_matching_class() {
        let (v, nb) = fitted();
        assert_eq!(nb.predict(&v.transform("kubernetes rust backend")).unwrap(), 0);
        assert_eq!(nb.predict(&v.transform("ward patient")).unwrap(), 1);
        assert_eq!(nb.predict(&v.transform("tax audit")).unwrap(), 2);
    }

    #[test]
    fn test_no_underflow_on_extreme_scores() {
        let nb = MultinomialNb::from_parts(vec![-1.0, -1.0], vec![vec![-2000.0], vec![-1.0]])
            .unwrap();
        let v = TfidfVectorizer::from_parts(vec!["aa".into()], vec![1.0]).unwrap();
        let p = nb.predict_proba(&v.transform("aa")).unwrap();
        assert!((p[1] - 1.0).abs() < 1e-12);
        assert!(p[0] >= 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let (_, nb) = fitted();
        let other = TfidfVectorizer::from_parts(vec!["aa".into()], vec![1.0]).unwrap();
        assert!(matches!(
            nb.predict_proba(&other.transform("aa")),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_class_without_rows() {
        let v = TfidfVectorizer::fit(&["rust go"], 10).unwrap();
        let rows = v.transform_all(&["rust go"]);
        assert!(matches!(
            MultinomialNb::fit(&rows, &[0], 2),
            Err(ModelError::EmptyClass(1))
        ));
        assert!(matches!(
            MultinomialNb::fit(&rows, &[5], 2),
            Err(ModelError::LabelOutOfRange { label: 5, .. })
        ));
    }
}
