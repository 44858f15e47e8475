use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use ndarray::Array2;
use thiserror::Error;
use tracing::info;

use crate::{
    lengths::{self, GeneLengths},
    matrix::{self, CountMatrix},
    normalization::{
        self, cpm, fit_transform, Ctf, Cuf, Fpkm, GeneLengthSource, Method, Tmm, Tpm, Uq,
    },
};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("I/O error")]
    Io(#[source] io::Error),
    #[error("could not open file: {1}")]
    OpenFile(#[source] io::Error, PathBuf),
    #[error("could not create file: {1}")]
    CreateFile(#[source] io::Error, PathBuf),
    #[error("output file already exists: {0}; use --force to overwrite it")]
    OutputExists(PathBuf),
    #[error("output is a directory: {0}")]
    OutputIsDirectory(PathBuf),
    #[error("invalid counts")]
    ReadCounts(#[source] matrix::ReadError),
    #[error("invalid gene lengths")]
    ReadGeneLengths(#[source] lengths::ReadGeneLengthsError),
    #[error("could not write values")]
    WriteValues(#[source] csv::Error),
    #[error("normalization error")]
    Normalization(#[source] normalization::Error),
    #[error("invalid normalized values")]
    InvalidValues(#[source] matrix::ValidationError),
}

/// A configured normalization method.
#[derive(Debug)]
pub enum Normalizer {
    Cpm,
    Fpkm(Fpkm),
    Tpm(Tpm),
    Uq(Uq),
    Cuf(Cuf),
    Tmm(Tmm),
    Ctf(Ctf),
}

impl Normalizer {
    pub fn method(&self) -> Method {
        match self {
            Self::Cpm => Method::Cpm,
            Self::Fpkm(_) => Method::Fpkm,
            Self::Tpm(_) => Method::Tpm,
            Self::Uq(_) => Method::Uq,
            Self::Cuf(_) => Method::Cuf,
            Self::Tmm(_) => Method::Tmm,
            Self::Ctf(_) => Method::Ctf,
        }
    }

    /// Normalizes `counts`.
    ///
    /// Between-sample methods are fit to and applied on the same matrix.
    pub fn fit_transform(
        &mut self,
        counts: &CountMatrix,
    ) -> Result<Array2<f64>, normalization::Error> {
        let values = counts.values();

        match self {
            Self::Cpm => cpm::normalize(values),
            Self::Fpkm(fpkm) => fpkm.transform(counts),
            Self::Tpm(tpm) => tpm.transform(counts),
            Self::Uq(uq) => fit_transform(uq, values),
            Self::Cuf(cuf) => fit_transform(cuf, values),
            Self::Tmm(tmm) => {
                let values = fit_transform(tmm, values)?;
                log_reference_sample(counts, tmm);
                Ok(values)
            }
            Self::Ctf(ctf) => {
                let values = fit_transform(ctf, values)?;
                log_reference_sample(counts, ctf.tmm());
                Ok(values)
            }
        }
    }
}

fn log_reference_sample(counts: &CountMatrix, tmm: &Tmm) {
    if let Some(i) = tmm.reference_index() {
        let sample_id = counts.sample_ids().get(i).map(String::as_str);
        info!(reference_sample_index = i, ?sample_id, "selected reference sample");
    }
}

/// Builds a gene length source from either an annotations path or a gene lengths table path.
pub fn build_gene_length_source(
    annotations_src: Option<PathBuf>,
    gene_lengths_src: Option<&Path>,
    id: &str,
) -> Result<GeneLengthSource, NormalizeError> {
    let gene_lengths = gene_lengths_src.map(read_gene_lengths).transpose()?;
    GeneLengthSource::new(annotations_src, gene_lengths, id).map_err(NormalizeError::Normalization)
}

/// Normalizes a count matrix.
///
/// The count matrix is read from `src`, or stdin if not set. Normalized values are written to
/// `dst`, or stdout if not set. An existing output file is only overwritten when `force` is
/// set. Missing parent directories of `dst` are created.
pub fn normalize(
    src: Option<&Path>,
    dst: Option<&Path>,
    force: bool,
    mut normalizer: Normalizer,
) -> Result<(), NormalizeError> {
    if let Some(dst) = dst {
        check_destination(dst, force)?;
    }

    info!(?src, "reading counts");

    let counts = match src {
        Some(src) => File::open(src)
            .map(BufReader::new)
            .map_err(|e| NormalizeError::OpenFile(e, src.into()))
            .and_then(read_counts)?,
        None => read_counts(io::stdin().lock())?,
    };

    info!(
        sample_count = counts.sample_ids().len(),
        gene_count = counts.gene_ids().len(),
        "read counts"
    );

    let method = normalizer.method();
    info!(
        %method,
        length_dependent = method.is_length_dependent(),
        "normalizing counts"
    );

    let values = normalizer
        .fit_transform(&counts)
        .map_err(NormalizeError::Normalization)?;

    let normalized_counts = counts
        .with_values(values)
        .map_err(NormalizeError::InvalidValues)?;

    match dst {
        Some(dst) => {
            if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(NormalizeError::Io)?;
            }

            let file = File::create(dst).map_err(|e| NormalizeError::CreateFile(e, dst.into()))?;
            write_values(BufWriter::new(file), &normalized_counts)?;
        }
        None => write_values(io::stdout().lock(), &normalized_counts)?,
    }

    info!(?dst, "wrote normalized values");

    Ok(())
}

fn check_destination(dst: &Path, force: bool) -> Result<(), NormalizeError> {
    if dst.is_dir() {
        Err(NormalizeError::OutputIsDirectory(dst.into()))
    } else if dst.exists() && !force {
        Err(NormalizeError::OutputExists(dst.into()))
    } else {
        Ok(())
    }
}

fn read_counts<R>(reader: R) -> Result<CountMatrix, NormalizeError>
where
    R: Read,
{
    matrix::read(reader).map_err(NormalizeError::ReadCounts)
}

fn read_gene_lengths(src: &Path) -> Result<GeneLengths, NormalizeError> {
    let reader = File::open(src)
        .map(BufReader::new)
        .map_err(|e| NormalizeError::OpenFile(e, src.into()))?;

    info!(?src, "reading gene lengths");

    lengths::read_gene_lengths(reader).map_err(NormalizeError::ReadGeneLengths)
}

fn write_values<W>(writer: W, counts: &CountMatrix) -> Result<(), NormalizeError>
where
    W: Write,
{
    let mut writer = matrix::Writer::new(writer);
    writer
        .write_matrix(counts)
        .map_err(NormalizeError::WriteValues)
}
