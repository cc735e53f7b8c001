//! Tabular training data read from CSV.
//!
//! The first row is the header. A column is treated as textual when at least
//! one non-empty cell is neither numeric nor boolean, the same way a
//! dataframe would infer an object column.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Label column '{column}' not found (columns: {available})")]
    MissingLabelColumn { column: String, available: String },
}

#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One training example: combined text (not yet cleaned) plus its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledText {
    pub text: String,
    pub label: String,
}

impl Dataset {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let dataset = Self::from_csv(reader)?;
        info!(
            "Loaded dataset {} with {} rows and columns {:?}",
            path.display(),
            dataset.rows.len(),
            dataset.headers
        );
        Ok(dataset)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, DatasetError> {
        Self::from_csv(ReaderBuilder::new().flexible(true).from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            // Short rows are padded so every row has one cell per header.
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of textual columns, in header order.
    pub fn text_columns(&self) -> Vec<usize> {
        (0..self.headers.len())
            .filter(|&col| {
                self.rows
                    .iter()
                    .map(|row| row[col].trim())
                    .any(|cell| !cell.is_empty() && !is_scalar(cell))
            })
            .collect()
    }

    /// Builds one example per row: all textual columns except the label,
    /// space-joined, with the label cell as ground truth. Labels are taken
    /// verbatim, so `" Chef"` and `"Chef"` are distinct classes. Rows whose
    /// label is empty or whitespace are skipped.
    pub fn labeled_texts(&self, label_column: &str) -> Result<Vec<LabeledText>, DatasetError> {
        let label_idx = self
            .headers
            .iter()
            .position(|h| h == label_column)
            .ok_or_else(|| DatasetError::MissingLabelColumn {
                column: label_column.to_string(),
                available: self.headers.join(", "),
            })?;
        let text_columns: Vec<usize> = self
            .text_columns()
            .into_iter()
            .filter(|&c| c != label_idx)
            .collect();
        info!(
            "Combining text columns {:?}",
            text_columns
                .iter()
                .map(|&c| self.headers[c].as_str())
                .collect::<Vec<_>>()
        );

        let mut examples = Vec::with_capacity(self.rows.len());
        let mut skipped = 0usize;
        for row in &self.rows {
            let label = &row[label_idx];
            if label.trim().is_empty() {
                skipped += 1;
                continue;
            }
            let text = text_columns
                .iter()
                .map(|&c| row[c].as_str())
                .collect::<Vec<_>>()
                .join(" ");
            examples.push(LabeledText {
                text,
                label: label.clone(),
            });
        }
        if skipped > 0 {
            warn!("Skipped {skipped} rows with an empty '{label_column}' cell");
        }
        Ok(examples)
    }
}

fn is_scalar(cell: &str) -> bool {
    cell.parse::<f64>().is_ok() || cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("false")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
ID,Title,Skills,Years,Summary
1,Chef,\"Pastry, menus\",4,Kitchen lead
2,Nurse,,7,Ward care
3,,Accounting,2,
4,Chef,Grill,true
";

    #[test]
    fn test_detects_textual_columns() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let names: Vec<&str> = ds
            .text_columns()
            .into_iter()
            .map(|c| ds.headers()[c].as_str())
            .collect();
        assert_eq!(names, vec!["Title", "Skills", "Summary"]);
    }

    #[test]
    fn test_labeled_texts_exclude_label_and_fill_missing() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let examples = ds.labeled_texts("Title").unwrap();
        assert_eq!(examples.len(), 3, "row with empty label is skipped");
        assert_eq!(
            examples[0],
            LabeledText {
                text: "Pastry, menus Kitchen lead".to_string(),
                label: "Chef".to_string(),
            }
        );
        assert_eq!(examples[1].text, " Ward care");
        assert_eq!(examples[2].text, "Grill ");
    }

    #[test]
    fn test_labels_keep_surrounding_whitespace() {
        let csv = "Title,Summary\nChef,Kitchen lead\n Chef,Line cook\n  ,Unlabelled\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let labels: Vec<_> = ds
            .labeled_texts("Title")
            .unwrap()
            .into_iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Chef".to_string(), " Chef".to_string()]);
    }

    #[test]
    fn test_missing_label_column() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert!(matches!(
            ds.labeled_texts("Role"),
            Err(DatasetError::MissingLabelColumn { .. })
        ));
    }
}
