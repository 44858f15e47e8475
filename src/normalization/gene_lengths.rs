use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use ndarray::Array1;
use tracing::{info, warn};

use super::Error;
use crate::{
    gtf,
    lengths::{calculate_union_exon_lengths, GeneLengths},
    read_features,
};

const EXON_FEATURE_TYPE: &str = "exon";

/// Where gene lengths come from.
#[derive(Debug)]
pub enum GeneLengthSource {
    /// Union exon lengths computed from a GTF file.
    Annotations { src: PathBuf, id: String },
    /// A gene length table.
    Table(GeneLengths),
}

impl GeneLengthSource {
    /// Creates a gene length source from exactly one of an annotations path or a gene length
    /// table.
    ///
    /// `id` is the GTF attribute used as the gene identifier. Annotations must have a `.gtf` or
    /// `.gtf.gz` extension.
    pub fn new(
        annotations_src: Option<PathBuf>,
        gene_lengths: Option<GeneLengths>,
        id: &str,
    ) -> Result<Self, Error> {
        match (annotations_src, gene_lengths) {
            (Some(src), None) => {
                if gtf::has_gtf_extension(&src) {
                    Ok(Self::Annotations { src, id: id.into() })
                } else {
                    Err(Error::InvalidAnnotationsExtension(src))
                }
            }
            (None, Some(gene_lengths)) => Ok(Self::Table(gene_lengths)),
            _ => Err(Error::AmbiguousGeneLengthSource),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Annotations { .. } => "gtf",
            Self::Table(_) => "gene lengths",
        }
    }

    /// Returns the length of each gene in `gene_ids`, in order.
    ///
    /// Genes without a known length are NaN. It is an error if no gene has a known length.
    pub fn resolve(&self, gene_ids: &[String]) -> Result<Array1<f64>, Error> {
        let gene_lengths = match self {
            Self::Annotations { src, id } => Cow::Owned(read_gene_lengths(src, id)?),
            Self::Table(gene_lengths) => Cow::Borrowed(gene_lengths),
        };

        let lengths: Array1<f64> = gene_ids
            .iter()
            .map(|id| gene_lengths.get(id).map(|n| n as f64).unwrap_or(f64::NAN))
            .collect();

        let missing_count = lengths.iter().filter(|n| n.is_nan()).count();

        if missing_count == gene_ids.len() {
            return Err(Error::MissingGeneLengths(self.name()));
        } else if missing_count > 0 {
            warn!(
                missing_count,
                source = self.name(),
                "count matrix contains genes without lengths; their values will be NaN"
            );
        }

        Ok(lengths)
    }
}

fn read_gene_lengths(src: &Path, id: &str) -> Result<GeneLengths, Error> {
    let mut reader = gtf::open(src).map_err(|e| Error::OpenAnnotations(e, src.into()))?;

    info!(?src, feature_type = EXON_FEATURE_TYPE, feature_id = id, "reading features");

    let features =
        read_features(&mut reader, EXON_FEATURE_TYPE, id).map_err(Error::ReadAnnotations)?;

    info!(feature_count = features.len(), "read features");

    Ok(calculate_union_exon_lengths(&features))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_gene_lengths() -> GeneLengths {
        [(String::from("g0"), 100), (String::from("g1"), 250)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_new() {
        assert!(matches!(
            GeneLengthSource::new(Some(PathBuf::from("a.gtf")), None, "gene_id"),
            Ok(GeneLengthSource::Annotations { .. })
        ));

        assert!(matches!(
            GeneLengthSource::new(None, Some(build_gene_lengths()), "gene_id"),
            Ok(GeneLengthSource::Table(_))
        ));

        assert!(matches!(
            GeneLengthSource::new(Some(PathBuf::from("a.gtf.gz")), None, "gene_id"),
            Ok(GeneLengthSource::Annotations { .. })
        ));

        assert!(matches!(
            GeneLengthSource::new(Some(PathBuf::from("a.gff3")), None, "gene_id"),
            Err(Error::InvalidAnnotationsExtension(_))
        ));

        assert!(matches!(
            GeneLengthSource::new(None, None, "gene_id"),
            Err(Error::AmbiguousGeneLengthSource)
        ));

        assert!(matches!(
            GeneLengthSource::new(
                Some(PathBuf::from("a.gtf")),
                Some(build_gene_lengths()),
                "gene_id"
            ),
            Err(Error::AmbiguousGeneLengthSource)
        ));
    }

    #[test]
    fn test_resolve() -> Result<(), Error> {
        let source = GeneLengthSource::Table(build_gene_lengths());

        let gene_ids = [String::from("g1"), String::from("g0")];
        assert_eq!(source.resolve(&gene_ids)?, Array1::from(vec![250.0, 100.0]));

        let gene_ids = [String::from("g1"), String::from("g2")];
        let lengths = source.resolve(&gene_ids)?;
        assert_eq!(lengths[0], 250.0);
        assert!(lengths[1].is_nan());

        let gene_ids = [String::from("g2"), String::from("g3")];
        assert!(matches!(
            source.resolve(&gene_ids),
            Err(Error::MissingGeneLengths("gene lengths"))
        ));

        Ok(())
    }
}
