//! Counts per million (CPM).

use ndarray::{Array1, Array2, ArrayView2};

use super::{library_size, library_size_nan, validate, Error};

/// Divides each sample by its library size and scales to one million.
pub fn normalize(counts: ArrayView2<'_, f64>) -> Result<Array2<f64>, Error> {
    validate(counts)?;
    let library_sizes = library_size(counts);
    Ok(scale(counts, &library_sizes))
}

/// Same as [`normalize`], but NaN values are allowed and excluded from library sizes.
pub fn normalize_nan(counts: ArrayView2<'_, f64>) -> Array2<f64> {
    let library_sizes = library_size_nan(counts);
    scale(counts, &library_sizes)
}

fn scale(counts: ArrayView2<'_, f64>, library_sizes: &Array1<f64>) -> Array2<f64> {
    let mut values = counts.to_owned();

    for (mut row, &library_size) in values.rows_mut().into_iter().zip(library_sizes) {
        row.mapv_inplace(|n| n / library_size * 1e6);
    }

    values
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::normalization::tests::toy_counts;

    #[test]
    fn test_normalize() -> Result<(), Error> {
        let counts = toy_counts();

        let actual = normalize(counts.view())?;

        let expected = array![
            [20000.0, 30000.0, 50000.0, 200000.0, 700000.0],
            [20000.0, 30000.0, 50000.0, 200000.0, 700000.0],
            [10000.0, 15000.0, 25000.0, 100000.0, 850000.0],
            [40000.0, 60000.0, 100000.0, 400000.0, 400000.0],
        ];

        assert_eq!(actual, expected);

        let counts = array![[1.0, f64::NAN]];
        assert!(matches!(
            normalize(counts.view()),
            Err(Error::NonFiniteValue)
        ));

        Ok(())
    }

    #[test]
    fn test_normalize_nan() {
        let counts = array![[1.0, f64::NAN, 3.0]];

        let actual = normalize_nan(counts.view());

        assert_eq!(actual[[0, 0]], 250000.0);
        assert!(actual[[0, 1]].is_nan());
        assert_eq!(actual[[0, 2]], 750000.0);
    }
}
