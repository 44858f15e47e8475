use std::io::Read;

use ndarray::Array2;
use thiserror::Error;

use super::{CountMatrix, ValidationError};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid record")]
    InvalidRecord(#[from] csv::Error),
    #[error("missing header")]
    MissingHeader,
    #[error("missing sample ID at row {0}")]
    MissingSampleId(usize),
    #[error("invalid value for sample {0}, gene {1}: {2:?}")]
    InvalidValue(String, String, String),
    #[error("invalid shape")]
    InvalidShape(#[source] ndarray::ShapeError),
    #[error("invalid matrix")]
    Invalid(#[source] ValidationError),
}

/// Reads a sample × gene matrix from CSV.
///
/// The header is an index name (ignored) followed by gene IDs. Each record is a sample ID
/// followed by one value per gene.
pub fn read<R>(reader: R) -> Result<CountMatrix, ReadError>
where
    R: Read,
{
    const SAMPLE_ID_INDEX: usize = 0;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?;

    if headers.is_empty() {
        return Err(ReadError::MissingHeader);
    }

    let gene_ids: Vec<String> = headers.iter().skip(1).map(String::from).collect();

    let mut sample_ids = Vec::new();
    let mut values = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;

        let sample_id = record
            .get(SAMPLE_ID_INDEX)
            .ok_or(ReadError::MissingSampleId(i))?;

        for (gene_id, raw_value) in gene_ids.iter().zip(record.iter().skip(1)) {
            let value = raw_value.trim().parse().map_err(|_| {
                ReadError::InvalidValue(sample_id.into(), gene_id.clone(), raw_value.into())
            })?;

            values.push(value);
        }

        sample_ids.push(sample_id.into());
    }

    let shape = (sample_ids.len(), gene_ids.len());
    let values = Array2::from_shape_vec(shape, values).map_err(ReadError::InvalidShape)?;

    CountMatrix::new(sample_ids, gene_ids, values).map_err(ReadError::Invalid)
}
