use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Unknown class id {id} (encoding has {len} classes)")]
    UnknownId { id: usize, len: usize },

    #[error("Unknown label '{0}'")]
    UnknownName(String),

    #[error("Duplicate label '{0}' in encoding")]
    Duplicate(String),
}

/// Bijection between role names and dense class ids.
///
/// Ids follow ascending lexicographic order of the distinct names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCodec {
    names: Vec<String>,
    ids: HashMap<String, usize>,
}

impl LabelCodec {
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().to_string())
            .collect();
        let names: Vec<String> = distinct.into_iter().collect();
        let ids = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();
        Self { names, ids }
    }

    /// Rebuilds an encoding from names ordered by class id.
    pub fn from_names(names: Vec<String>) -> Result<Self, LabelError> {
        let mut ids = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            if ids.insert(name.clone(), id).is_some() {
                return Err(LabelError::Duplicate(name.clone()));
            }
        }
        Ok(Self { names, ids })
    }

    pub fn encode(&self, name: &str) -> Result<usize, LabelError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| LabelError::UnknownName(name.to_string()))
    }

    pub fn decode(&self, id: usize) -> Result<&str, LabelError> {
        self.names
            .get(id)
            .map(String::as_str)
            .ok_or(LabelError::UnknownId {
                id,
                len: self.names.len(),
            })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
