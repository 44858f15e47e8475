use std::fmt;

/// Normalization method
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// counts per million
    Cpm,
    /// fragments per kilobase per million mapped reads
    Fpkm,
    /// transcripts per million
    Tpm,
    /// upper quartile
    Uq,
    /// counts adjusted with upper quartile factors
    Cuf,
    /// trimmed mean of M-values
    Tmm,
    /// counts adjusted with TMM factors
    Ctf,
}

impl Method {
    /// Returns whether the method requires gene lengths.
    pub fn is_length_dependent(self) -> bool {
        matches!(self, Self::Fpkm | Self::Tpm)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cpm => "cpm",
            Self::Fpkm => "fpkm",
            Self::Tpm => "tpm",
            Self::Uq => "uq",
            Self::Cuf => "cuf",
            Self::Tmm => "tmm",
            Self::Ctf => "ctf",
        };

        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt() {
        assert_eq!(Method::Cpm.to_string(), "cpm");
        assert_eq!(Method::Ctf.to_string(), "ctf");
    }

    #[test]
    fn test_is_length_dependent() {
        assert!(Method::Fpkm.is_length_dependent());
        assert!(Method::Tpm.is_length_dependent());
        assert!(!Method::Tmm.is_length_dependent());
    }
}
