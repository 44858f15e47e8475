//! Transcripts per million (TPM).

use ndarray::Array2;

use super::{cpm, validate, Error, GeneLengthSource};
use crate::CountMatrix;

/// TPM normalization.
#[derive(Debug)]
pub struct Tpm {
    source: GeneLengthSource,
}

impl Tpm {
    pub fn new(source: GeneLengthSource) -> Self {
        Self { source }
    }

    /// Returns counts divided by gene length in kilobases, scaled so that each sample sums to
    /// one million.
    ///
    /// Genes without a known length are NaN and excluded from the sample sums.
    pub fn transform(&self, counts: &CountMatrix) -> Result<Array2<f64>, Error> {
        validate(counts.values())?;

        let lengths = self.source.resolve(counts.gene_ids())?;
        let mut length_normalized_counts = counts.values().to_owned();

        for mut row in length_normalized_counts.rows_mut() {
            for (n, &length) in row.iter_mut().zip(&lengths) {
                *n = *n / length * 1e3;
            }
        }

        Ok(cpm::normalize_nan(length_normalized_counts.view()))
    }
}
