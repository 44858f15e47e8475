use noodles::{core::Position, gtf::record::Strand};

/// An annotation interval.
///
/// `start` and `end` are 1-based and inclusive, as written in GTF.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Feature {
    reference_sequence_name: String,
    start: Position,
    end: Position,
    strand: Option<Strand>,
}

impl Feature {
    pub fn new(
        reference_sequence_name: String,
        start: Position,
        end: Position,
        strand: Option<Strand>,
    ) -> Self {
        Self {
            reference_sequence_name,
            start,
            end,
            strand,
        }
    }

    pub fn reference_sequence_name(&self) -> &str {
        &self.reference_sequence_name
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn end_mut(&mut self) -> &mut Position {
        &mut self.end
    }

    /// Returns the strand, if the feature is stranded.
    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    /// Returns the number of bases covered, i.e., `end - start` of the
    /// equivalent half-open interval.
    pub fn len(&self) -> usize {
        (usize::from(self.end) + 1).saturating_sub(usize::from(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_feature() -> Result<Feature, noodles::core::position::TryFromIntError> {
        Ok(Feature::new(
            String::from("chr1"),
            Position::try_from(2001)?,
            Position::try_from(2700)?,
            Some(Strand::Forward),
        ))
    }

    #[test]
    fn test_accessors() -> Result<(), noodles::core::position::TryFromIntError> {
        let feature = build_feature()?;

        assert_eq!(feature.reference_sequence_name(), "chr1");
        assert_eq!(feature.start(), Position::try_from(2001)?);
        assert_eq!(feature.end(), Position::try_from(2700)?);
        assert_eq!(feature.strand(), Some(Strand::Forward));

        Ok(())
    }

    #[test]
    fn test_len() -> Result<(), noodles::core::position::TryFromIntError> {
        let feature = build_feature()?;
        assert_eq!(feature.len(), 700);
        assert!(!feature.is_empty());

        let feature = Feature::new(String::from("chr1"), Position::MIN, Position::MIN, None);
        assert_eq!(feature.len(), 1);
        assert!(!feature.is_empty());

        Ok(())
    }
}
