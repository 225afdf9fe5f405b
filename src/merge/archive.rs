//! In-memory deflate ZIP writer shared by the `.docx` package and the batch
//! archive.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: Vec<String>,
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
            entries: Vec::new(),
        }
    }

    /// Append one entry. Duplicate names are rejected by the zip writer.
    pub fn add(&mut self, name: &str, content: &[u8]) -> Result<(), zip::result::ZipError> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(content)?;
        self.entries.push(name.to_string());
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn finish(self) -> Result<Vec<u8>, zip::result::ZipError> {
        Ok(self.writer.finish()?.into_inner())
    }
}
