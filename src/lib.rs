pub use self::{feature::Feature, matrix::CountMatrix};

pub mod cli;
pub mod commands;
pub mod feature;
pub mod gtf;
pub mod lengths;
pub mod matrix;
pub mod normalization;

pub use self::cli::Cli;

use std::{
    collections::HashMap,
    io::{self, BufRead},
};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReadFeaturesError {
    #[error("invalid record at line {0}")]
    InvalidRecord(usize, #[source] io::Error),
    #[error("missing attribute '{1}' in record at line {0}")]
    MissingAttribute(usize, String),
}

/// Reads features of the given type from a GTF reader, grouped by the value of the
/// `feature_id` attribute.
///
/// Comments and directives are skipped.
pub fn read_features<R>(
    reader: &mut noodles::gtf::Reader<R>,
    feature_type: &str,
    feature_id: &str,
) -> Result<HashMap<String, Vec<Feature>>, ReadFeaturesError>
where
    R: BufRead,
{
    let mut features: HashMap<String, Vec<Feature>> = HashMap::new();

    for (i, result) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = result.map_err(|e| ReadFeaturesError::InvalidRecord(line_number, e))?;

        let noodles::gtf::Line::Record(record) = line else {
            continue;
        };

        if record.ty() != feature_type {
            continue;
        }

        let id = record
            .attributes()
            .iter()
            .find(|e| e.key() == feature_id)
            .map(|e| e.value())
            .ok_or_else(|| ReadFeaturesError::MissingAttribute(line_number, feature_id.into()))?;

        let feature = Feature::new(
            record.reference_sequence_name().into(),
            record.start(),
            record.end(),
            record.strand(),
        );

        features.entry(id.into()).or_default().push(feature);
    }

    info!("read {} unique features", features.len());

    Ok(features)
}

#[cfg(test)]
mod tests {
    use noodles::{core::Position, gtf::record::Strand};

    use super::*;

    #[test]
    fn test_read_features() -> anyhow::Result<()> {
        let data = b"#!genome-build GRCh38.p12
sq0\t.\tgene\t1\t30\t.\t+\t.\tgene_id \"gene0\";
sq0\t.\texon\t1\t10\t.\t+\t.\tgene_id \"gene0\"; transcript_id \"tx0\";
sq0\t.\texon\t21\t30\t.\t+\t.\tgene_id \"gene0\"; transcript_id \"tx0\";
sq1\t.\texon\t41\t50\t.\t-\t.\tgene_id \"gene1\"; transcript_id \"tx1\";
";
        let mut reader = noodles::gtf::Reader::new(&data[..]);

        let features = read_features(&mut reader, "exon", "gene_id")?;

        assert_eq!(features.len(), 2);
        assert_eq!(
            features["gene0"],
            [
                Feature::new(
                    String::from("sq0"),
                    Position::try_from(1)?,
                    Position::try_from(10)?,
                    Some(Strand::Forward)
                ),
                Feature::new(
                    String::from("sq0"),
                    Position::try_from(21)?,
                    Position::try_from(30)?,
                    Some(Strand::Forward)
                ),
            ]
        );
        assert_eq!(
            features["gene1"],
            [Feature::new(
                String::from("sq1"),
                Position::try_from(41)?,
                Position::try_from(50)?,
                Some(Strand::Reverse)
            )]
        );

        Ok(())
    }

    #[test]
    fn test_read_features_with_missing_attribute() {
        let data = b"sq0\t.\tgene\t1\t30\t.\t+\t.\tgene_name \"NDLS\";
sq0\t.\texon\t1\t10\t.\t+\t.\tgene_name \"NDLS\";
";
        let mut reader = noodles::gtf::Reader::new(&data[..]);

        assert!(matches!(
            read_features(&mut reader, "exon", "gene_id"),
            Err(ReadFeaturesError::MissingAttribute(2, _))
        ));
    }

    #[test]
    fn test_read_features_with_invalid_record() {
        let data = b"sq0\t.\texon\t1\t10\t.\t+\t.\tgene_id \"gene0\";
sq0\t.\texon\tone\t10\t.\t+\t.\tgene_id \"gene0\";
";
        let mut reader = noodles::gtf::Reader::new(&data[..]);

        assert!(matches!(
            read_features(&mut reader, "exon", "gene_id"),
            Err(ReadFeaturesError::InvalidRecord(2, _))
        ));
    }
}
