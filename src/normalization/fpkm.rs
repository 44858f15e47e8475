//! Fragments per kilobase of transcript per million mapped reads (FPKM).

use ndarray::Array2;

use super::{cpm, Error, GeneLengthSource};
use crate::CountMatrix;

/// FPKM normalization.
#[derive(Debug)]
pub struct Fpkm {
    source: GeneLengthSource,
}

impl Fpkm {
    pub fn new(source: GeneLengthSource) -> Self {
        Self { source }
    }

    /// Returns CPM divided by gene length in kilobases.
    ///
    /// Genes without a known length are NaN.
    pub fn transform(&self, counts: &CountMatrix) -> Result<Array2<f64>, Error> {
        let mut values = cpm::normalize(counts.values())?;
        let lengths = self.source.resolve(counts.gene_ids())?;

        for mut row in values.rows_mut() {
            for (n, &length) in row.iter_mut().zip(&lengths) {
                *n = *n / length * 1e3;
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{lengths::GeneLengths, normalization::tests::toy_counts};

    #[test]
    fn test_transform() -> Result<(), Box<dyn std::error::Error>> {
        let counts = CountMatrix::new(
            (1..=4).map(|i| format!("Sample_{i}")).collect(),
            (1..=5).map(|i| format!("Gene_{i}")).collect(),
            toy_counts(),
        )?;

        let lengths: GeneLengths = [
            (String::from("Gene_1"), 200),
            (String::from("Gene_2"), 300),
            (String::from("Gene_3"), 500),
            (String::from("Gene_4"), 1000),
        ]
        .into_iter()
        .collect();

        let fpkm = Fpkm::new(GeneLengthSource::new(None, Some(lengths), "gene_id")?);
        let actual = fpkm.transform(&counts)?;

        let expected = array![
            [100000.0, 100000.0, 100000.0, 200000.0],
            [100000.0, 100000.0, 100000.0, 200000.0],
            [50000.0, 50000.0, 50000.0, 100000.0],
            [200000.0, 200000.0, 200000.0, 400000.0],
        ];

        for (row, expected_row) in actual.rows().into_iter().zip(expected.rows()) {
            for (a, b) in row.iter().zip(&expected_row) {
                assert!((a - b).abs() < 1e-6);
            }

            assert!(row[4].is_nan());
        }

        Ok(())
    }
}
