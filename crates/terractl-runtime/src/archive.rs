//! Backup archive listing with `tar` + `flate2`.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use terractl_core::ports::ArchiveLister;

/// Lists `.tar` and `.tar.gz` archives; gzip is chosen by the `.gz` suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarArchiveLister;

impl ArchiveLister for TarArchiveLister {
    fn list_entries(&self, archive: &Path) -> Result<Vec<String>, String> {
        let file = File::open(archive).map_err(|e| e.to_string())?;
        let reader = BufReader::new(file);
        let gzipped = archive.extension().is_some_and(|ext| ext == "gz");
        if gzipped {
            entries_of(GzDecoder::new(reader))
        } else {
            entries_of(reader)
        }
    }
}

fn entries_of<R: Read>(reader: R) -> Result<Vec<String>, String> {
    let mut archive = tar::Archive::new(reader);
    let entries = archive.entries().map_err(|e| e.to_string())?;
    entries
        .map(|entry| {
            let entry = entry.map_err(|e| e.to_string())?;
            let path = entry.path().map_err(|e| e.to_string())?;
            Ok(path.to_string_lossy().into_owned())
        })
        .collect()
}
