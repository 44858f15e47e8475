//! Labeled sample × gene matrices.

mod reader;
mod writer;

pub use self::{
    reader::{read, ReadError},
    writer::Writer,
};

use std::collections::HashSet;

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("duplicate sample ID: {0}")]
    DuplicateSampleId(String),
    #[error("duplicate gene ID: {0}")]
    DuplicateGeneId(String),
}

/// A matrix of values with sample (row) and gene (column) IDs.
#[derive(Clone, Debug, PartialEq)]
pub struct CountMatrix {
    sample_ids: Vec<String>,
    gene_ids: Vec<String>,
    values: Array2<f64>,
}

impl CountMatrix {
    /// Creates a matrix.
    ///
    /// `values` must have one row per sample ID and one column per gene ID. Sample IDs and gene
    /// IDs must each be unique.
    pub fn new(
        sample_ids: Vec<String>,
        gene_ids: Vec<String>,
        values: Array2<f64>,
    ) -> Result<Self, ValidationError> {
        let expected = (sample_ids.len(), gene_ids.len());
        let actual = values.dim();

        if actual != expected {
            return Err(ValidationError::ShapeMismatch { expected, actual });
        }

        if let Some(id) = find_duplicate(&sample_ids) {
            return Err(ValidationError::DuplicateSampleId(id.into()));
        }

        if let Some(id) = find_duplicate(&gene_ids) {
            return Err(ValidationError::DuplicateGeneId(id.into()));
        }

        Ok(Self {
            sample_ids,
            gene_ids,
            values,
        })
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Returns a matrix with the same IDs but different values.
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self, ValidationError> {
        Self::new(self.sample_ids.clone(), self.gene_ids.clone(), values)
    }
}

fn find_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .find(|id| !seen.insert(id.as_str()))
        .map(|id| id.as_str())
}
