//! Upper quartile (UQ).
//!
//! A small fraction of genes that are extremely overexpressed in some samples inflates their
//! library sizes, making every other gene look undersampled. The upper quartile factor uses
//! the 75th percentile of counts instead of the total as a sample's scaling basis. See
//! "[Evaluation of statistical methods for normalization and differential expression in
//! mRNA-Seq experiments](https://doi.org/10.1186/1471-2105-11-94)" (2010) by Bullard et al.
//!
//! Factors match edgeR's `calcNormFactors(method = "upperquartile")`.

use ndarray::{Array1, Array2, ArrayView2};
use tracing::debug;

use super::{
    geometric_mean, library_size, quantile, remove_zero_genes, scale_by_effective_library_size,
    validate, validate_gene_count, Error, Fit, Transform,
};

const UPPER_QUARTILE: f64 = 0.75;

#[derive(Debug)]
struct State {
    gene_count: usize,
    geometric_mean: f64,
}

/// Upper quartile normalization.
///
/// The transformed values are counts per million using the effective library size, i.e., the
/// library size multiplied by the normalization factor.
#[derive(Debug, Default)]
pub struct Uq {
    state: Option<State>,
}

impl Uq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the geometric mean of the unscaled factors of the fitted samples.
    pub fn geometric_mean(&self) -> Option<f64> {
        self.state.as_ref().map(|state| state.geometric_mean)
    }

    fn state(&self) -> Result<&State, Error> {
        self.state.as_ref().ok_or(Error::NotFitted)
    }
}

impl Fit for Uq {
    fn fit(&mut self, counts: ArrayView2<'_, f64>) -> Result<&mut Self, Error> {
        self.state = None;

        validate(counts)?;

        let factors = calculate_unscaled_factors(counts);
        let geometric_mean = geometric_mean(factors.view());
        debug!(geometric_mean, "fit upper quartile factors");

        self.state = Some(State {
            gene_count: counts.ncols(),
            geometric_mean,
        });

        Ok(self)
    }
}

impl Transform for Uq {
    fn norm_factors(&self, counts: ArrayView2<'_, f64>) -> Result<Array1<f64>, Error> {
        let state = self.state()?;
        validate_gene_count(counts, state.gene_count)?;
        Ok(calculate_unscaled_factors(counts) / state.geometric_mean)
    }

    fn transform(&self, counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error> {
        let factors = self.norm_factors(counts)?;
        Ok(scale_by_effective_library_size(counts, factors.view()))
    }
}

// A sample with no counts has a 0 / 0 factor, which is left as NaN.
fn calculate_unscaled_factors(counts: ArrayView2<'_, f64>) -> Array1<f64> {
    let counts = remove_zero_genes(counts);
    let library_sizes = library_size(counts.view());

    counts
        .rows()
        .into_iter()
        .zip(&library_sizes)
        .map(|(row, &library_size)| quantile(row, UPPER_QUARTILE) / library_size)
        .collect()
}
