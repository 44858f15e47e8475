//! Count normalization methods.
//!
//! Within-sample methods ([`cpm`], [`Fpkm`], [`Tpm`]) are stateless. Between-sample methods
//! ([`Uq`], [`Tmm`], [`Cuf`], [`Ctf`]) are estimators: [`Fit::fit`] learns data-dependent
//! state from a count matrix, and [`Transform`] applies it to the same or another matrix
//! with the same genes.
//!
//! All count matrices are samples × genes.

pub mod cpm;
pub mod ctf;
pub mod cuf;
pub mod fpkm;
mod gene_lengths;
mod method;
pub mod tmm;
pub mod tpm;
pub mod uq;

pub use self::{
    ctf::Ctf, cuf::Cuf, fpkm::Fpkm, gene_lengths::GeneLengthSource, method::Method, tmm::Tmm,
    tpm::Tpm, uq::Uq,
};

use std::{io, path::PathBuf};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("input is empty")]
    EmptyInput,
    #[error("input contains NaN or infinite values")]
    NonFiniteValue,
    #[error("input contains negative values")]
    NegativeValue,
    #[error("estimator is not fitted")]
    NotFitted,
    #[error("gene count mismatch: expected {expected}, got {actual}")]
    GeneCountMismatch { expected: usize, actual: usize },
    #[error("invalid trim: expected a value in [0, 0.5), got {0}")]
    InvalidTrim(f64),
    #[error("one and only one of gtf or gene lengths should be provided")]
    AmbiguousGeneLengthSource,
    #[error("annotations should have a .gtf or .gtf.gz extension: {0}")]
    InvalidAnnotationsExtension(PathBuf),
    #[error("none of the genes in the count matrix are in the {0}")]
    MissingGeneLengths(&'static str),
    #[error("could not open file: {1}")]
    OpenAnnotations(#[source] io::Error, PathBuf),
    #[error("invalid annotations")]
    ReadAnnotations(#[source] crate::ReadFeaturesError),
}

/// An estimator that learns normalization state from a count matrix.
pub trait Fit {
    /// Discards any previously learned state and fits to `counts`.
    fn fit(&mut self, counts: ArrayView2<'_, f64>) -> Result<&mut Self, Error>;
}

/// A fitted estimator that produces normalization factors and normalized values.
pub trait Transform {
    /// Returns one normalization factor per sample (row) of `counts`.
    fn norm_factors(&self, counts: ArrayView2<'_, f64>) -> Result<Array1<f64>, Error>;

    /// Returns the normalized values of `counts`.
    fn transform(&self, counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error>;
}

/// Fits `normalizer` to `counts` and transforms the same counts.
pub fn fit_transform<N>(
    normalizer: &mut N,
    counts: ArrayView2<'_, f64>,
) -> Result<Array2<f64>, Error>
where
    N: Fit + Transform,
{
    normalizer.fit(counts)?.transform(counts)
}

/// Checks that `counts` is nonempty and only contains finite, nonnegative values.
pub fn validate(counts: ArrayView2<'_, f64>) -> Result<(), Error> {
    if counts.is_empty() {
        return Err(Error::EmptyInput);
    }

    for &n in counts {
        if !n.is_finite() {
            return Err(Error::NonFiniteValue);
        } else if n < 0.0 {
            return Err(Error::NegativeValue);
        }
    }

    Ok(())
}

pub(crate) fn validate_gene_count(
    counts: ArrayView2<'_, f64>,
    expected: usize,
) -> Result<(), Error> {
    validate(counts)?;

    let actual = counts.ncols();

    if actual == expected {
        Ok(())
    } else {
        Err(Error::GeneCountMismatch { expected, actual })
    }
}

/// Returns the sum of counts of each sample.
pub fn library_size(counts: ArrayView2<'_, f64>) -> Array1<f64> {
    counts.sum_axis(Axis(1))
}

/// Returns the sum of counts of each sample, skipping NaN values.
pub fn library_size_nan(counts: ArrayView2<'_, f64>) -> Array1<f64> {
    counts
        .rows()
        .into_iter()
        .map(|row| row.iter().filter(|n| !n.is_nan()).sum())
        .collect()
}

/// Returns `counts` without the genes that have a zero count in every sample.
pub fn remove_zero_genes(counts: ArrayView2<'_, f64>) -> Array2<f64> {
    let indices = nonzero_gene_indices(counts);
    counts.select(Axis(1), &indices)
}

pub(crate) fn nonzero_gene_indices(counts: ArrayView2<'_, f64>) -> Vec<usize> {
    counts
        .columns()
        .into_iter()
        .enumerate()
        .filter(|(_, column)| column.sum() > 0.0)
        .map(|(i, _)| i)
        .collect()
}

// https://en.wikipedia.org/wiki/Geometric_mean#Formulation_using_logarithms
pub fn geometric_mean(values: ArrayView1<'_, f64>) -> f64 {
    let sum: f64 = values.iter().map(|n| n.ln()).sum();
    let mean = sum / (values.len() as f64);
    mean.exp()
}

/// Computes the quantile at the given probability `p`.
///
/// This linearly interpolates between the closest order statistics, i.e., R's default
/// (type 7), which is what edgeR uses for upper quartiles:
///
/// ```text
/// h = (n - 1) * p
/// Q(p) = x[⌊h⌋] + (h - ⌊h⌋) * (x[⌊h⌋ + 1] - x[⌊h⌋])
/// ```
///
/// An empty input has no quantile and yields NaN.
pub fn quantile(values: ArrayView1<'_, f64>, p: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&p));

    if values.is_empty() {
        return f64::NAN;
    }

    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));

    let h = (x.len() - 1) as f64 * p;
    let i = h.floor() as usize;
    let gamma = h - h.floor();

    match x.get(i + 1) {
        Some(next) => x[i] + gamma * (next - x[i]),
        None => x[i],
    }
}

/// Assigns 1-based ranks to `values`, averaging the ranks of ties.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut indices: Vec<_> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;

    while i < indices.len() {
        let value = values[indices[i]];
        let mut j = i + 1;

        while j < indices.len() && values[indices[j]] == value {
            j += 1;
        }

        // mean of the ranks i + 1..=j
        let rank = (i + 1 + j) as f64 / 2.0;

        for &k in &indices[i..j] {
            ranks[k] = rank;
        }

        i = j;
    }

    ranks
}

/// Divides each sample by its effective library size (library size × factor) and scales
/// to one million.
pub(crate) fn scale_by_effective_library_size(
    counts: ArrayView2<'_, f64>,
    factors: ArrayView1<'_, f64>,
) -> Array2<f64> {
    let library_sizes = library_size(counts);
    let mut values = counts.to_owned();

    for ((mut row, &library_size), &factor) in values
        .rows_mut()
        .into_iter()
        .zip(&library_sizes)
        .zip(factors)
    {
        let effective_library_size = library_size * factor;
        row.mapv_inplace(|n| n / effective_library_size * 1e6);
    }

    values
}

/// Divides each sample by its factor.
pub(crate) fn rescale_counts(
    counts: ArrayView2<'_, f64>,
    factors: ArrayView1<'_, f64>,
) -> Array2<f64> {
    let mut values = counts.to_owned();

    for (mut row, &factor) in values.rows_mut().into_iter().zip(factors) {
        row /= factor;
    }

    values
}
