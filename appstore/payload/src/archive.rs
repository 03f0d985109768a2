use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::PatchResult;

/**
    A single named entry of an archive.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
    /// Directory entries carry no data and are dropped when building.
    pub is_dir: bool,
    /// Unix permission bits recorded in the source archive, if any.
    pub unix_mode: Option<u32>,
    /// Modification time recorded in the source archive. Entries without
    /// one are written with the zip epoch, 1980-01-01 00:00:00.
    pub last_modified: Option<DateTime>,
}

impl ArchiveEntry {
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            is_dir: false,
            unix_mode: None,
            last_modified: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
            is_dir: true,
            unix_mode: None,
            last_modified: None,
        }
    }
}

/**
    An ordered set of uniquely-named archive entries, held fully in memory.

    Inserting an entry whose name already exists replaces the content in
    place, so entry order always reflects first insertion.
*/
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
    index: HashMap<String, usize>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Read every entry of a zip archive into memory.
    */
    pub fn open(bytes: &[u8]) -> PatchResult<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))?;
        let mut archive = Self::new();

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            let is_dir = file.is_dir();
            let unix_mode = file.unix_mode();
            let last_modified = file.last_modified();
            let name = file.name().to_owned();

            // The declared size is untrusted, so the buffer grows as data arrives.
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)?;
            }

            archive.insert(ArchiveEntry {
                name,
                data,
                is_dir,
                unix_mode,
                last_modified,
            });
        }

        Ok(archive)
    }

    /**
        Add an entry, replacing the content of any entry with the same name.
    */
    pub fn insert(&mut self, entry: ArchiveEntry) {
        match self.index.get(&entry.name) {
            Some(&position) => self.entries[position] = entry,
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /**
        Add or replace a regular file entry.
    */
    pub fn insert_file(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.insert(ArchiveEntry::file(name, data));
    }

    pub fn get(&self, name: &str) -> Option<&ArchiveEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /**
        Iterate over non-directory entries in archive order.
    */
    pub fn files(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|e| !e.is_dir)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /**
        Serialize to zip bytes. Directory entries are skipped; they are
        implied by the file paths.

        Output depends only on the entries, never on the current time.
    */
    pub fn to_bytes(&self) -> PatchResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in self.files() {
            let mut options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(entry.last_modified.unwrap_or_default())
                .large_file(entry.data.len() as u64 >= u32::MAX as u64);
            if let Some(mode) = entry.unix_mode {
                options = options.unix_permissions(mode);
            }

            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

impl FromIterator<ArchiveEntry> for Archive {
    fn from_iter<I: IntoIterator<Item = ArchiveEntry>>(iter: I) -> Self {
        let mut archive = Self::new();
        for entry in iter {
            archive.insert(entry);
        }
        archive
    }
}
