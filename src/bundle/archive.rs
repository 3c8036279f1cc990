//! In-memory ZIP writing.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;

/// A ZIP archive built in memory.
///
/// Entries carry a fixed timestamp, so identical entries always produce
/// identical archives.
pub struct Archive {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<String>,
}

impl Archive {
    /// Start an empty archive.
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
        }
    }

    fn options(path: &str) -> SimpleFileOptions {
        // JPEG and PDF payloads are already compressed
        let method = if path.ends_with(".jpg") || path.ends_with(".pdf") {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    }

    /// Add a file.
    pub fn add(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(path, Self::options(path))?;
        self.zip.write_all(data)?;
        self.entries.push(path.to_string());
        Ok(())
    }

    /// Paths added so far, in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Finish the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_round_trip() {
        let mut archive = Archive::new();
        archive.add("index.html", b"<html></html>").unwrap();
        archive.add("assets/a.jpg", &[0xFF, 0xD8, 0xFF]).unwrap();
        assert_eq!(archive.entries(), ["index.html", "assets/a.jpg"]);
        let bytes = archive.finish().unwrap();

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(zip.len(), 2);
        let mut html = String::new();
        zip.by_name("index.html").unwrap().read_to_string(&mut html).unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[test]
    fn test_deterministic() {
        let build = || {
            let mut a = Archive::new();
            a.add("x.txt", b"same").unwrap();
            a.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
