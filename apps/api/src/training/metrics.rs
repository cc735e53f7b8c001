//! Held-out evaluation of a fitted model.

use serde::{Deserialize, Serialize};

use crate::inference::top_k::top_k;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub top_k_accuracy: f64,
    pub k: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub num_classes: usize,
    /// Labels removed by the minimum-support filter before fitting.
    pub dropped_labels: Vec<String>,
    pub per_class: Vec<ClassMetrics>,
}

/// Fraction of exact matches. An empty set scores 0.
pub fn accuracy(truth: &[usize], predicted: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

/// Fraction of rows whose true class is among the `k` best-scored classes,
/// ranking only over the classes in `labels`.
///
/// Scores of classes outside `labels` are ignored, and a row whose true class
/// is outside `labels` counts as a miss.
pub fn top_k_accuracy(truth: &[usize], scores: &[Vec<f64>], k: usize, labels: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth
        .iter()
        .zip(scores)
        .filter(|(t, row)| {
            let restricted: Vec<f64> = labels.iter().map(|&c| row[c]).collect();
            top_k(&restricted, k)
                .iter()
                .any(|&(position, _)| labels[position] == **t)
        })
        .count();
    hits as f64 / truth.len() as f64
}

/// Precision, recall and F1 per class; undefined ratios are reported as 0.
/// Only classes that occur in `truth` or `predicted` are listed.
pub fn per_class_metrics(
    truth: &[usize],
    predicted: &[usize],
    label_names: &[String],
) -> Vec<ClassMetrics> {
    let n = label_names.len();
    let mut tp = vec![0usize; n];
    let mut predicted_count = vec![0usize; n];
    let mut support = vec![0usize; n];
    for (&t, &p) in truth.iter().zip(predicted) {
        support[t] += 1;
        predicted_count[p] += 1;
        if t == p {
            tp[t] += 1;
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    (0..n)
        .filter(|&c| support[c] > 0 || predicted_count[c] > 0)
        .map(|c| {
            let precision = ratio(tp[c], predicted_count[c]);
            let recall = ratio(tp[c], support[c]);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                label: label_names[c].clone(),
                precision,
                recall,
                f1,
                support: support[c],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 2, 1], &[0, 1, 1, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_top_k_accuracy_counts_hits_within_k() {
        let scores = vec![vec![0.5, 0.3, 0.2], vec![0.6, 0.3, 0.1]];
        assert_eq!(top_k_accuracy(&[1, 2], &scores, 2, &[0, 1, 2]), 0.5);
        assert_eq!(top_k_accuracy(&[1, 2], &scores, 3, &[0, 1, 2]), 1.0);
    }

    #[test]
    fn test_top_k_accuracy_restricted_to_given_labels() {
        let scores = vec![vec![0.5, 0.3, 0.2]];
        // Class 0 is excluded, so class 2 moves into the top 2.
        assert_eq!(top_k_accuracy(&[2], &scores, 2, &[1, 2]), 1.0);
        // A true class outside the label set is a miss.
        assert_eq!(top_k_accuracy(&[0], &scores, 2, &[1, 2]), 0.0);
    }

    #[test]
    fn test_per_class_metrics_zero_division() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let report = per_class_metrics(&[0, 0, 1], &[0, 1, 1], &names);
        assert_eq!(report.len(), 2, "class c never appears");
        assert_eq!(report[0].label, "a");
        assert_eq!(report[0].precision, 1.0);
        assert_eq!(report[0].recall, 0.5);
        assert_eq!(report[1].precision, 0.5);
        assert_eq!(report[1].recall, 1.0);
        assert_eq!(report[1].support, 1);

        let never_hit = per_class_metrics(&[0], &[1], &names);
        assert_eq!(never_hit[0].f1, 0.0);
        assert_eq!(never_hit[1].precision, 0.0);
    }
}
