//! Gene lengths.

use std::{collections::HashMap, io::Read};

use thiserror::Error;

use crate::Feature;

/// A map of gene IDs to gene lengths.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GeneLengths(HashMap<String, u64>);

impl GeneLengths {
    pub fn get(&self, id: &str) -> Option<u64> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for GeneLengths {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Error)]
pub enum ReadGeneLengthsError {
    #[error("invalid record")]
    InvalidRecord(#[from] csv::Error),
    #[error("missing length for gene: {0}")]
    MissingLength(String),
    #[error("invalid length for gene {0}: {1}")]
    InvalidLength(String, String),
    #[error("gene lengths should only contain positive numbers: {0}")]
    NonPositiveLength(String),
    #[error("gene lengths should only contain integers: {0}")]
    NonIntegerLength(String),
    #[error("gene lengths should have unique gene IDs: {0}")]
    DuplicateId(String),
}

/// Reads a gene length table.
///
/// The input is CSV with a header. The first column is the gene ID, and the second, the
/// length.
pub fn read_gene_lengths<R>(reader: R) -> Result<GeneLengths, ReadGeneLengthsError>
where
    R: Read,
{
    const ID_INDEX: usize = 0;
    const LENGTH_INDEX: usize = 1;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut lengths = HashMap::new();

    for result in rdr.records() {
        let record = result?;

        let id = record.get(ID_INDEX).unwrap_or_default();

        let raw_length = record
            .get(LENGTH_INDEX)
            .ok_or_else(|| ReadGeneLengthsError::MissingLength(id.into()))?;

        let length = parse_length(id, raw_length)?;

        if lengths.insert(id.to_string(), length).is_some() {
            return Err(ReadGeneLengthsError::DuplicateId(id.into()));
        }
    }

    Ok(GeneLengths(lengths))
}

// Lengths may be written as floats, e.g., "1735.0", but must be integral.
fn parse_length(id: &str, s: &str) -> Result<u64, ReadGeneLengthsError> {
    let n: f64 = s
        .trim()
        .parse()
        .map_err(|_| ReadGeneLengthsError::InvalidLength(id.into(), s.into()))?;

    if !n.is_finite() {
        Err(ReadGeneLengthsError::InvalidLength(id.into(), s.into()))
    } else if n <= 0.0 {
        Err(ReadGeneLengthsError::NonPositiveLength(id.into()))
    } else if n.fract() != 0.0 {
        Err(ReadGeneLengthsError::NonIntegerLength(id.into()))
    } else {
        Ok(n as u64)
    }
}

/// Calculates the union exon length of each gene.
///
/// Exons of a gene are grouped by reference sequence and strand, since some annotations reuse
/// a gene ID on multiple loci. Overlapping exons in a group are merged, and the lengths of all
/// groups of the gene are summed.
pub fn calculate_union_exon_lengths(features: &HashMap<String, Vec<Feature>>) -> GeneLengths {
    features
        .iter()
        .map(|(id, exons)| {
            let len: u64 = group_by_locus(exons)
                .into_iter()
                .map(sum_nonoverlapping_interval_lengths)
                .sum();

            (id.clone(), len)
        })
        .collect()
}

// Groups features by (reference sequence name, strand), in order of first appearance.
fn group_by_locus(features: &[Feature]) -> Vec<Vec<Feature>> {
    let mut groups: Vec<Vec<Feature>> = Vec::new();

    for feature in features {
        let group = groups.iter_mut().find(|group| {
            group.first().map_or(false, |f| {
                f.reference_sequence_name() == feature.reference_sequence_name()
                    && f.strand() == feature.strand()
            })
        });

        match group {
            Some(group) => group.push(feature.clone()),
            None => groups.push(vec![feature.clone()]),
        }
    }

    groups
}

fn sum_nonoverlapping_interval_lengths(features: Vec<Feature>) -> u64 {
    merge_features(features)
        .iter()
        .map(|f| f.len() as u64)
        .sum()
}

// Overlapping and adjacent features are merged.
fn merge_features(mut features: Vec<Feature>) -> Vec<Feature> {
    features.sort_unstable_by_key(|f| f.start());

    let mut merged_features: Vec<Feature> = Vec::with_capacity(features.len());

    for b in features {
        if let Some(a) = merged_features.last_mut() {
            if usize::from(b.start()) <= usize::from(a.end()) + 1 {
                if a.end() < b.end() {
                    *a.end_mut() = b.end();
                }

                continue;
            }
        }

        merged_features.push(b);
    }

    merged_features
}
