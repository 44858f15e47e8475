mod normalize;

pub use self::normalize::{build_gene_length_source, normalize, NormalizeError, Normalizer};
