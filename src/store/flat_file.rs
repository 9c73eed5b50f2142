//! The flat-file ledger backend, a comma separated file with a header row.
//!
//! Appends are not locked: two processes appending at the same time may
//! interleave their rows.

use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::{
    Error,
    store::columns::{CANONICAL_HEADER, ColumnMap, RawRow},
    transaction::{NewTransaction, Transaction},
};

/// Stores transactions in a CSV file.
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: PathBuf,
}

impl CsvLedger {
    /// Create a ledger backed by the file at `path`.
    ///
    /// The file does not need to exist yet, it is created on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every data row of the file.
    ///
    /// A missing or empty file is an empty ledger. Rows the CSV reader cannot
    /// decode are returned as [Error::MalformedRow] so the caller can skip
    /// them without losing the rest of the file.
    ///
    /// # Errors
    /// Returns [Error::FlatFileError] if the file exists but cannot be opened
    /// or [Error::MissingColumn] if the header lacks a required column.
    pub(super) fn read(&self) -> Result<Vec<Result<RawRow, Error>>, Error> {
        if !self.has_content()? {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let columns = ColumnMap::from_headers(reader.headers()?.iter())?;

        let rows = reader
            .records()
            .enumerate()
            .map(|(index, record)| -> Result<RawRow, Error> {
                let record = record.map_err(|error| Error::MalformedRow {
                    row: index + 1,
                    reason: error.to_string(),
                })?;
                let fields: Vec<&str> = record.iter().collect();

                Ok(RawRow::from_fields(&fields, &columns))
            })
            .collect();

        Ok(rows)
    }

    /// Append one transaction, writing the header first if the file is new.
    ///
    /// When the file already exists the row follows the column order of its
    /// header, so files written by other tools stay consistent.
    ///
    /// # Errors
    /// Returns [Error::FlatFileError] if the file or its parent directory
    /// cannot be created or written, or [Error::MissingColumn] if an existing
    /// header lacks a required column.
    pub(super) fn append(&self, transaction: &NewTransaction) -> Result<(), Error> {
        let transaction = Transaction::from(transaction.clone());
        let has_content = self.has_content()?;

        let columns = if has_content {
            let mut reader = ReaderBuilder::new().from_path(&self.path)?;
            ColumnMap::from_headers(reader.headers()?.iter())?
        } else {
            ColumnMap::from_headers(CANONICAL_HEADER)?
        };

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;

        if !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if !has_content {
            writer.write_record(CANONICAL_HEADER)?;
        }

        writer.write_record(&StringRecord::from(columns.layout(&transaction)))?;
        writer.flush()?;

        Ok(())
    }

    fn has_content(&self) -> Result<bool, Error> {
        match fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len() > 0),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

/// Whether `file` is empty or its last byte is a newline.
///
/// Writes to a file opened in append mode always go to the end, so moving the
/// cursor here does not affect where the next row lands.
fn ends_with_newline(file: &mut File) -> Result<bool, Error> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }

    file.seek(SeekFrom::End(-1))?;

    let mut last_byte = [0u8; 1];
    file.read_exact(&mut last_byte)?;

    Ok(last_byte[0] == b'\n')
}
