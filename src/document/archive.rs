//! Office package (zip) access

use crate::domain::{DocmaskError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Largest uncompressed part accepted from a package (64 MiB)
pub const MAX_PART_SIZE: u64 = 64 << 20;

/// A named part read out of a package
///
/// Owned by the rewriter for the duration of one run.
#[derive(Debug, Clone)]
pub struct DocumentPart {
    /// Entry name, e.g. `word/document.xml`
    pub name: String,
    /// Compression method of the original entry
    pub compression: CompressionMethod,
    /// Uncompressed content
    pub data: Vec<u8>,
}

/// An opened `.docx`/`.xlsx` package
pub struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    /// Open a package for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            DocmaskError::Io(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let archive = ZipArchive::new(file).map_err(|e| {
            DocmaskError::Archive(format!("{} is not a valid package: {}", path.display(), e))
        })?;

        Ok(Self { archive })
    }

    /// Read a part, `None` if the package has no such entry
    ///
    /// Parts larger than [`MAX_PART_SIZE`] are rejected with
    /// [`DocmaskError::Archive`]. The declared size in the central directory
    /// is only a hint and never trusted for allocation.
    pub fn read_part(&mut self, name: &str) -> Result<Option<DocumentPart>> {
        self.read_part_bounded(name, MAX_PART_SIZE)
    }

    fn read_part_bounded(&mut self, name: &str, limit: u64) -> Result<Option<DocumentPart>> {
        let entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if entry.size() > limit {
            return Err(DocmaskError::Archive(format!(
                "{name} declares {} bytes, above the {limit} byte limit",
                entry.size()
            )));
        }

        let compression = entry.compression();
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry
            .take(limit + 1)
            .read_to_end(&mut data)
            .map_err(|e| DocmaskError::Archive(format!("Failed to read {name}: {e}")))?;

        if data.len() as u64 > limit {
            return Err(DocmaskError::Archive(format!(
                "{name} exceeds the {limit} byte limit"
            )));
        }

        Ok(Some(DocumentPart {
            name: name.to_string(),
            compression,
            data,
        }))
    }

    /// Write a copy of the package to `output`, replacing the given parts
    ///
    /// Entries keep their original order. Replaced parts are re-compressed
    /// with their original method; every other entry is copied raw. The copy
    /// is staged in a temporary file next to `output` and only moved into
    /// place once complete, so a failure never leaves a file under the final
    /// name.
    pub fn write_with_replacements(
        &mut self,
        output: &Path,
        replacements: &HashMap<String, DocumentPart>,
    ) -> Result<()> {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staging = tempfile::Builder::new()
            .prefix(".docmask-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| {
                DocmaskError::ArchiveWrite(format!(
                    "Failed to create staging file in {}: {}",
                    dir.display(),
                    e
                ))
            })?;

        {
            let mut writer = ZipWriter::new(staging.as_file_mut());

            for index in 0..self.archive.len() {
                let entry = self.archive.by_index_raw(index).map_err(write_error)?;
                let name = entry.name().to_string();

                match replacements.get(&name) {
                    Some(part) => {
                        drop(entry);
                        let options =
                            SimpleFileOptions::default().compression_method(rewrite_method(part.compression));
                        writer.start_file(name.as_str(), options).map_err(write_error)?;
                        writer.write_all(&part.data).map_err(|e| {
                            DocmaskError::ArchiveWrite(format!("Failed to write {name}: {e}"))
                        })?;
                    }
                    None => writer.raw_copy_file(entry).map_err(write_error)?,
                }
            }

            writer.finish().map_err(write_error)?;
        }

        staging.persist(output).map_err(|e| {
            DocmaskError::ArchiveWrite(format!(
                "Failed to move output into place at {}: {}",
                output.display(),
                e.error
            ))
        })?;

        Ok(())
    }
}

fn write_error(err: ZipError) -> DocmaskError {
    DocmaskError::ArchiveWrite(err.to_string())
}

/// Methods this build can write; anything else falls back to deflate
fn rewrite_method(original: CompressionMethod) -> CompressionMethod {
    match original {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}
