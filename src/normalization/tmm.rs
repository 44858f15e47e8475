//! Trimmed mean of M-values (TMM).
//!
//! Trimmed mean of M-values (TMM) is the normalization method used in [edgeR].
//! See "[A scaling normalization method for differential expression analysis of
//! RNA-seq data][10.1186/gb-2010-11-3-r25]" (2010) by Robinson and Oshlack for
//! more details.
//!
//! Each sample is compared against a reference sample. Per gene, the log-fold change (M) and
//! the mean log abundance (A) are computed; genes in the tails of either are trimmed, and the
//! factor is the precision-weighted mean of the remaining M values.
//!
//! Factors match edgeR's `calcNormFactors(method = "TMM")`.
//!
//! [edgeR]: https://bioconductor.org/packages/release/bioc/html/edgeR.html
//! [10.1186/gb-2010-11-3-r25]: https://doi.org/10.1186/gb-2010-11-3-r25

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use super::{
    geometric_mean, library_size, nonzero_gene_indices, rank, scale_by_effective_library_size,
    validate, validate_gene_count, Error, Fit, Transform, Uq,
};

/// The default trim of M values on each side.
pub const DEFAULT_M_TRIM: f64 = 0.3;

/// The default trim of A values on each side.
pub const DEFAULT_A_TRIM: f64 = 0.05;

#[derive(Debug)]
struct State {
    reference_index: usize,
    reference: Array1<f64>,
    geometric_mean: f64,
}

/// Trimmed mean of M-values normalization.
///
/// The transformed values are counts per million using the effective library size.
#[derive(Debug)]
pub struct Tmm {
    m_trim: f64,
    a_trim: f64,
    state: Option<State>,
}

impl Tmm {
    /// Creates a TMM estimator.
    ///
    /// `m_trim` and `a_trim` are the fractions of genes trimmed from each side of the M and A
    /// value distributions, respectively. Both must be in [0, 0.5).
    pub fn new(m_trim: f64, a_trim: f64) -> Result<Self, Error> {
        for trim in [m_trim, a_trim] {
            if !(0.0..0.5).contains(&trim) {
                return Err(Error::InvalidTrim(trim));
            }
        }

        Ok(Self {
            m_trim,
            a_trim,
            state: None,
        })
    }

    pub fn m_trim(&self) -> f64 {
        self.m_trim
    }

    pub fn a_trim(&self) -> f64 {
        self.a_trim
    }

    /// Returns the index of the reference sample in the fitted count matrix.
    pub fn reference_index(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.reference_index)
    }

    /// Returns the counts of the reference sample.
    pub fn reference(&self) -> Option<ArrayView1<'_, f64>> {
        self.state.as_ref().map(|state| state.reference.view())
    }

    /// Returns the geometric mean of the unscaled factors of the fitted samples.
    pub fn geometric_mean(&self) -> Option<f64> {
        self.state.as_ref().map(|state| state.geometric_mean)
    }

    fn state(&self) -> Result<&State, Error> {
        self.state.as_ref().ok_or(Error::NotFitted)
    }

    fn calculate_unscaled_factors(
        &self,
        counts: ArrayView2<'_, f64>,
        reference: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        // Genes removed here are all zero and do not contribute to the reference's library size.
        let reference_library_size = reference.sum();

        let indices = nonzero_gene_indices(counts);
        let counts = counts.select(Axis(1), &indices);
        let reference = reference.select(Axis(0), &indices);

        let library_sizes = library_size(counts.view());

        counts
            .rows()
            .into_iter()
            .zip(&library_sizes)
            .map(|(row, &library_size)| {
                LogRatios::new(row, library_size, reference.view(), reference_library_size)
                    .trimmed_mean(self.m_trim, self.a_trim)
                    .exp2()
            })
            .collect()
    }
}

impl Default for Tmm {
    fn default() -> Self {
        Self {
            m_trim: DEFAULT_M_TRIM,
            a_trim: DEFAULT_A_TRIM,
            state: None,
        }
    }
}

impl Fit for Tmm {
    fn fit(&mut self, counts: ArrayView2<'_, f64>) -> Result<&mut Self, Error> {
        self.state = None;

        validate(counts)?;

        let reference_index = find_reference_sample_index(counts)?;
        debug!(reference_index, "found reference sample");

        let reference = counts.row(reference_index).to_owned();

        let factors = self.calculate_unscaled_factors(counts, reference.view());
        let geometric_mean = geometric_mean(factors.view());
        debug!(geometric_mean, "fit TMM factors");

        self.state = Some(State {
            reference_index,
            reference,
            geometric_mean,
        });

        Ok(self)
    }
}

impl Transform for Tmm {
    fn norm_factors(&self, counts: ArrayView2<'_, f64>) -> Result<Array1<f64>, Error> {
        let state = self.state()?;
        validate_gene_count(counts, state.reference.len())?;

        let factors = self.calculate_unscaled_factors(counts, state.reference.view());

        Ok(factors / state.geometric_mean)
    }

    fn transform(&self, counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error> {
        let factors = self.norm_factors(counts)?;
        Ok(scale_by_effective_library_size(counts, factors.view()))
    }
}

// The reference is the sample whose upper quartile factor is closest to the mean upper quartile
// factor.
fn find_reference_sample_index(counts: ArrayView2<'_, f64>) -> Result<usize, Error> {
    let factors = Uq::new().fit(counts)?.norm_factors(counts)?;
    let mean = factors.sum() / (factors.len() as f64);
    Ok(find_closest_item_index(factors.view(), mean))
}

fn find_closest_item_index(haystack: ArrayView1<'_, f64>, needle: f64) -> usize {
    let mut min_delta = f64::MAX;
    let mut i = 0;

    for (j, &n) in haystack.iter().enumerate() {
        let delta = (n - needle).abs();

        if delta < min_delta {
            min_delta = delta;
            i = j;
        }
    }

    i
}

/// Per gene statistics of a sample against the reference.
///
/// All vectors have one entry per gene. Genes with a zero count in either the sample or the
/// reference are missing and hold NaN.
struct LogRatios {
    // log-fold changes (M_g)
    log2_ratios: Vec<f64>,
    // absolute intensities (A_g)
    mean_of_logs: Vec<f64>,
    // asymptotic variances
    variances: Vec<f64>,
}

impl LogRatios {
    fn new(
        counts: ArrayView1<'_, f64>,
        library_size: f64,
        reference: ArrayView1<'_, f64>,
        reference_library_size: f64,
    ) -> Self {
        let n = counts.len();

        let mut log2_ratios = Vec::with_capacity(n);
        let mut mean_of_logs = Vec::with_capacity(n);
        let mut variances = Vec::with_capacity(n);

        for (&count, &reference_count) in counts.iter().zip(reference) {
            let count = zero_to_nan(count);
            let reference_count = zero_to_nan(reference_count);

            let p = count / library_size;
            let reference_p = reference_count / reference_library_size;

            // The ratio and product are taken before the logarithm.
            log2_ratios.push((p / reference_p).log2());
            mean_of_logs.push((p * reference_p).log2() / 2.0);
            variances.push((1.0 - p) / count + (1.0 - reference_p) / reference_count);
        }

        Self {
            log2_ratios,
            mean_of_logs,
            variances,
        }
    }

    /// Returns the weighted mean of the M values that survive both trims.
    ///
    /// Each M value is divided by its variance, as edgeR does. NaN terms are skipped, e.g., a
    /// gene holding all counts of both samples has a variance of 0, giving 0 / 0 and an infinite
    /// weight. If no gene survives, the mean is 0.
    fn trimmed_mean(&self, m_trim: f64, a_trim: f64) -> f64 {
        let indices: Vec<_> = (0..self.log2_ratios.len())
            .filter(|&i| self.log2_ratios[i].is_finite() && self.mean_of_logs[i].is_finite())
            .collect();

        let log2_ratios: Vec<_> = indices.iter().map(|&i| self.log2_ratios[i]).collect();
        let mean_of_logs: Vec<_> = indices.iter().map(|&i| self.mean_of_logs[i]).collect();

        let keep = trim_mask(&log2_ratios, m_trim)
            .into_iter()
            .zip(trim_mask(&mean_of_logs, a_trim))
            .map(|(a, b)| a && b);

        let mut sum = 0.0;
        let mut weight_sum = 0.0;
        let mut hit_count = 0;

        for (&i, keep) in indices.iter().zip(keep) {
            if !keep {
                continue;
            }

            let variance = self.variances[i];
            let term = self.log2_ratios[i] / variance;
            let weight = 1.0 / variance;

            if !term.is_nan() {
                sum += term;
            }

            if !weight.is_nan() {
                weight_sum += weight;
            }

            hit_count += 1;
        }

        if hit_count == 0 {
            0.0
        } else {
            sum / weight_sum
        }
    }
}

fn zero_to_nan(n: f64) -> f64 {
    if n == 0.0 {
        f64::NAN
    } else {
        n
    }
}

// Marks the values whose ranks are within [⌊n * p⌋ + 1, n - ⌊n * p⌋].
fn trim_mask(values: &[f64], p: f64) -> Vec<bool> {
    let n = values.len() as f64;
    let low = (n * p).floor() + 1.0;
    let high = n - low + 1.0;

    rank(values)
        .into_iter()
        .map(|r| low <= r && r <= high)
        .collect()
}
