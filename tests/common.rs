use std::{
    env,
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use ndarray::Array2;
use rnanorm::{matrix, CountMatrix};

pub const COUNTS_SRC: &str = "tests/fixtures/counts.csv";
pub const ANNOTATIONS_SRC: &str = "tests/fixtures/annotations.gtf";
pub const GENE_LENGTHS_SRC: &str = "tests/fixtures/gene_lengths.csv";

/// Creates an empty working directory unique to `name`.
pub fn working_prefix(name: &str) -> io::Result<PathBuf> {
    let prefix = env::temp_dir().join(format!("rnanorm-{name}"));

    if prefix.exists() {
        fs::remove_dir_all(&prefix)?;
    }

    fs::create_dir_all(&prefix)?;

    Ok(prefix)
}

pub fn read_matrix<P>(src: P) -> anyhow::Result<CountMatrix>
where
    P: AsRef<Path>,
{
    let reader = File::open(src).map(BufReader::new)?;
    let matrix = matrix::read(reader)?;
    Ok(matrix)
}

pub fn assert_values_approx_eq(actual: &CountMatrix, expected: &Array2<f64>) {
    assert_eq!(actual.values().dim(), expected.dim());

    for (a, b) in actual.values().iter().zip(expected) {
        assert!((a - b).abs() <= 1e-6 * b.abs().max(1.0), "{a} != {b}");
    }
}
