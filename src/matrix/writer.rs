use std::io::Write;

use super::CountMatrix;

/// A sample × gene matrix CSV writer.
///
/// NaN values are written as empty fields.
pub struct Writer<W>
where
    W: Write,
{
    inner: csv::Writer<W>,
}

impl<W> Writer<W>
where
    W: Write,
{
    pub fn new(inner: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(inner),
        }
    }

    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    pub fn write_matrix(&mut self, matrix: &CountMatrix) -> csv::Result<()> {
        let header = std::iter::once("").chain(matrix.gene_ids().iter().map(String::as_str));
        self.inner.write_record(header)?;

        for (sample_id, row) in matrix.sample_ids().iter().zip(matrix.values().rows()) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(sample_id.clone());
            record.extend(row.iter().map(|&n| format_value(n)));
            self.inner.write_record(&record)?;
        }

        self.inner.flush()?;

        Ok(())
    }
}

fn format_value(n: f64) -> String {
    if n.is_nan() {
        String::new()
    } else {
        n.to_string()
    }
}
