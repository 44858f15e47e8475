//! Counts adjusted with TMM factors (CTF).
//!
//! See "[Normalization of RNA-seq data using factor analysis of control genes or
//! samples](https://doi.org/10.1186/s13059-021-02568-9)" (2022) by Johnson and Krishnan.

use ndarray::{Array1, Array2, ArrayView2};

use super::{rescale_counts, Error, Fit, Tmm, Transform};

/// Raw counts divided by TMM normalization factors.
#[derive(Debug, Default)]
pub struct Ctf {
    inner: Tmm,
}

impl Ctf {
    /// Creates a CTF estimator with the given M and A value trims.
    ///
    /// See [`Tmm::new`].
    pub fn new(m_trim: f64, a_trim: f64) -> Result<Self, Error> {
        Tmm::new(m_trim, a_trim).map(|inner| Self { inner })
    }

    /// Returns the underlying TMM estimator.
    pub fn tmm(&self) -> &Tmm {
        &self.inner
    }
}

impl Fit for Ctf {
    fn fit(&mut self, counts: ArrayView2<'_, f64>) -> Result<&mut Self, Error> {
        self.inner.fit(counts)?;
        Ok(self)
    }
}

impl Transform for Ctf {
    fn norm_factors(&self, counts: ArrayView2<'_, f64>) -> Result<Array1<f64>, Error> {
        self.inner.norm_factors(counts)
    }

    fn transform(&self, counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error> {
        let factors = self.norm_factors(counts)?;
        Ok(rescale_counts(counts, factors.view()))
    }
}
