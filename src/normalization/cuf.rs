//! Counts adjusted with upper quartile factors (CUF).
//!
//! See "[Normalization of RNA-seq data using factor analysis of control genes or
//! samples](https://doi.org/10.1186/s13059-021-02568-9)" (2022) by Johnson and Krishnan.

use ndarray::{Array1, Array2, ArrayView2};

use super::{rescale_counts, Error, Fit, Transform, Uq};

/// Raw counts divided by upper quartile normalization factors.
#[derive(Debug, Default)]
pub struct Cuf {
    inner: Uq,
}

impl Cuf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Fit for Cuf {
    fn fit(&mut self, counts: ArrayView2<'_, f64>) -> Result<&mut Self, Error> {
        self.inner.fit(counts)?;
        Ok(self)
    }
}

impl Transform for Cuf {
    fn norm_factors(&self, counts: ArrayView2<'_, f64>) -> Result<Array1<f64>, Error> {
        self.inner.norm_factors(counts)
    }

    fn transform(&self, counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error> {
        let factors = self.norm_factors(counts)?;
        Ok(rescale_counts(counts, factors.view()))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::normalization::tests::{assert_all_approx_eq, toy_counts};

    #[test]
    fn test_transform() -> Result<(), Error> {
        let counts = toy_counts();

        let mut cuf = Cuf::new();
        cuf.fit(counts.view())?;

        let factors = cuf.norm_factors(counts.view())?;
        assert_all_approx_eq(&factors, &array![1.0, 1.0, 0.5, 2.0]);

        let values = cuf.transform(counts.view())?;

        let expected = array![
            [200.0, 300.0, 500.0, 2000.0, 7000.0],
            [400.0, 600.0, 1000.0, 4000.0, 14000.0],
            [400.0, 600.0, 1000.0, 4000.0, 34000.0],
            [100.0, 150.0, 250.0, 1000.0, 1000.0],
        ];

        for (actual, expected) in values.iter().zip(&expected) {
            assert!((actual - expected).abs() / expected < 1e-9);
        }

        Ok(())
    }
}
