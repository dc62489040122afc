use std::io::Write;

use synthtab_core::{Column, to_csv_records};

/// Write the export records of `columns` and return the bytes written.
///
/// Only columns holding values appear; an empty column list writes nothing.
pub fn write_columns_csv<W: Write>(writer: W, columns: &[Column]) -> Result<u64, csv::Error> {
    write_records_csv(writer, &to_csv_records(columns))
}

pub fn write_records_csv<W: Write>(writer: W, records: &[Vec<String>]) -> Result<u64, csv::Error> {
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(counting);

    for record in records {
        writer.write_record(record)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

pub fn to_csv_string(columns: &[Column]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_columns_csv(&mut buffer, columns)?;
    String::from_utf8(buffer).map_err(|err| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// Parse CSV text into raw rows, header included. Rows may be ragged.
pub fn read_csv_rows(text: &str) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect()
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
