//! GTF (GFF2) annotations.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use flate2::read::MultiGzDecoder;
use noodles::gtf;

const EXTENSIONS: [&str; 2] = [".gtf", ".gtf.gz"];

/// Returns whether the path has a GTF extension, i.e., `.gtf` or `.gtf.gz`.
pub fn has_gtf_extension<P>(src: P) -> bool
where
    P: AsRef<Path>,
{
    src.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .unwrap_or(false)
}

/// Opens a GTF file, decompressing it if its extension is `gz`.
pub fn open<P>(src: P) -> io::Result<gtf::Reader<Box<dyn BufRead>>>
where
    P: AsRef<Path>,
{
    let path = src.as_ref();
    let extension = path.extension();
    let file = File::open(path)?;

    match extension.and_then(|ext| ext.to_str()) {
        Some("gz") => {
            let decoder = MultiGzDecoder::new(file);
            let reader = BufReader::new(decoder);
            Ok(gtf::Reader::new(Box::new(reader)))
        }
        _ => {
            let reader = BufReader::new(file);
            Ok(gtf::Reader::new(Box::new(reader)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs};

    use noodles::core::Position;

    use super::*;

    #[test]
    fn test_has_gtf_extension() {
        assert!(has_gtf_extension("annotations.gtf"));
        assert!(has_gtf_extension("data/annotations.gtf.gz"));

        assert!(!has_gtf_extension("annotations.gff3"));
        assert!(!has_gtf_extension("annotations.gz"));
        assert!(!has_gtf_extension("annotations"));
    }

    #[test]
    fn test_open() -> Result<(), Box<dyn std::error::Error>> {
        use std::io::Write;

        use flate2::{write::GzEncoder, Compression};

        let data = "1\thavana\texon\t11869\t12227\t.\t+\t.\tgene_id \"ENSG00000223972\";\n";

        let working_prefix = env::temp_dir().join("rnanorm-gtf-open");
        fs::create_dir_all(&working_prefix)?;

        let src = working_prefix.join("annotations.gtf");
        fs::write(&src, data)?;

        let src_gz = working_prefix.join("annotations.gtf.gz");
        let mut encoder = GzEncoder::new(File::create(&src_gz)?, Compression::default());
        encoder.write_all(data.as_bytes())?;
        encoder.finish()?;

        for src in [src, src_gz] {
            let mut reader = open(&src)?;
            let records: Vec<_> = reader.records().collect::<io::Result<_>>()?;

            assert_eq!(records.len(), 1);

            let record = &records[0];
            assert_eq!(record.reference_sequence_name(), "1");
            assert_eq!(record.ty(), "exon");
            assert_eq!(record.start(), Position::try_from(11869)?);
            assert_eq!(record.end(), Position::try_from(12227)?);
            assert_eq!(record.strand(), Some(gtf::record::Strand::Forward));
        }

        Ok(())
    }
}
