//! Merging one run into a content-addressed bundle file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use super::source::SourceDirs;
use crate::asset::{AssetKind, DiagnosticReporter, Minifier};
use crate::error::AggregateError;
use crate::manifest::Entry;
use crate::utils::bom::BomStripReader;
use crate::utils::digest::{DigestAlgorithm, DigestWriter, checksum_name};
use crate::utils::path::relative_path;
use crate::utils::text::{self, EncodingWriter, TextWrite};
use crate::utils::trim::TrimmingWriter;
use crate::debug;

/// Written after every member.
const MEMBER_SEPARATOR: &str = "\n";

/// What a run turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged {
    /// A lone absolute entry, returned as is.
    Unchanged(Entry),
    /// A bundle file was written at `path`.
    Bundle { entry: Entry, path: PathBuf },
    /// The merged text was empty after trimming; nothing was written.
    Empty,
}

/// Everything needed to merge runs of one kind.
pub struct BundleContext<'a> {
    pub kind: AssetKind,
    pub sources: &'a SourceDirs,
    /// Bundle values are relative to this directory.
    pub output_root: &'a Path,
    /// Flat destination replacing the mirrored layout under `output_root`.
    pub alternate_dir: Option<&'a Path>,
    pub minifier: &'a dyn Minifier,
    pub reporter: &'a dyn DiagnosticReporter,
    pub digest: DigestAlgorithm,
    pub encoding: &'static Encoding,
}

impl BundleContext<'_> {
    pub fn merge(&self, run: &[Entry]) -> Result<Merged, AggregateError> {
        let Some(head) = run.first() else {
            return Ok(Merged::Empty);
        };
        if run.len() == 1 && head.is_absolute() {
            return Ok(Merged::Unchanged(head.clone()));
        }

        let extension = self.kind.bundle_extension();
        let work_dir = self.alternate_dir.unwrap_or(self.output_root);
        let temp = tempfile::Builder::new()
            .prefix("working.")
            .suffix(extension)
            .tempfile_in(work_dir)
            .map_err(|e| AggregateError::io(work_dir, e))?;

        let (written, digest) = self.write_members(run, temp.as_file(), temp.path())?;
        if written == 0 {
            // Dropping `temp` removes the working file
            return Ok(Merged::Empty);
        }

        let dest_dir = match self.alternate_dir {
            Some(dir) => dir.to_path_buf(),
            None => self.output_root.join(head.directory()),
        };
        fs::create_dir_all(&dest_dir).map_err(|e| AggregateError::io(&dest_dir, e))?;

        let dest = dest_dir.join(format!("{}{extension}", checksum_name(&digest)));
        match fs::remove_file(&dest) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(AggregateError::io(&dest, e));
            }
            _ => {}
        }
        temp.persist(&dest)
            .map_err(|e| AggregateError::io(&dest, e.error))?;

        let value = relative_path(self.output_root, &dest).map_err(|e| AggregateError::io(&dest, e))?;
        debug!(
            "aggregate";
            "aggregated {} from [{}]",
            value,
            member_list(run)
        );

        Ok(Merged::Bundle {
            entry: self.kind.bundle_entry(value, head),
            path: dest,
        })
    }

    /// Stream every member through trimmer, encoder and digest into `file`.
    ///
    /// Returns the number of characters written and the digest of the bytes.
    fn write_members(
        &self,
        run: &[Entry],
        file: &File,
        file_path: &Path,
    ) -> Result<(usize, Vec<u8>), AggregateError> {
        let sink = DigestWriter::new(BufWriter::new(file), self.digest);
        let mut trimmer = TrimmingWriter::new(EncodingWriter::new(sink, self.encoding));
        let write_err = |e| AggregateError::io(file_path, e);

        for member in run {
            let path = self.sources.find(&member.value)?;
            let content = self.read_member(&path)?;

            if member.compressed {
                trimmer.write_str(&content).map_err(write_err)?;
            } else {
                let source_name = path.display().to_string();
                let minified =
                    self.minifier
                        .compress(self.kind, &source_name, &content, self.reporter)?;
                trimmer.write_str(&minified).map_err(write_err)?;
            }
            trimmer.write_str(MEMBER_SEPARATOR).map_err(write_err)?;
        }

        let written = trimmer.char_count();
        let encoder = trimmer.finish().map_err(write_err)?;
        let (buffered, digest) = encoder.into_inner().finish();
        buffered.into_inner().map_err(|e| write_err(e.into_error()))?;
        Ok((written, digest))
    }

    fn read_member(&self, path: &Path) -> Result<String, AggregateError> {
        let read_err = |e| AggregateError::io(path, e);

        let file = File::open(path).map_err(read_err)?;
        let mut reader = BomStripReader::new(BufReader::new(file));
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(read_err)?;
        if reader.stripped() {
            debug!("aggregate"; "stripped BOM from {}", path.display());
        }
        Ok(text::decode(&bytes, self.encoding))
    }
}

/// `a, b, c` list of member values for log output.
pub fn member_list(run: &[Entry]) -> String {
    run.iter()
        .map(|e| e.value.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
