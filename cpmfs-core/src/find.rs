//! Directory search: host files matching an FCB pattern.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{CpmError, CpmResult};
use crate::fcb::{Fcb, RECORD_SIZE};

/// Records a single directory entry can describe.
const MAX_ENTRY_RECORDS: u64 = 128;

/// A host file that satisfied a search pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindResult {
    /// Path on the host, rooted at the searched directory.
    pub host: PathBuf,
    /// Upper-cased name the guest sees.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

impl FindResult {
    /// Number of 128-byte records the file occupies, rounding up.
    pub fn records(&self) -> u64 {
        self.size.div_ceil(RECORD_SIZE as u64)
    }

    /// Build the directory entry a search call hands back to the guest.
    ///
    /// Drive is 0, the name fields come from the guest name and RC holds
    /// the record count, capped at one full extent. All other bytes are 0.
    pub fn directory_entry(&self) -> Fcb {
        let mut entry = Fcb::new();
        let (name, ext) = match self.name.find('.') {
            Some(pos) => (&self.name[..pos], &self.name[pos + 1..]),
            None => (self.name.as_str(), ""),
        };
        entry.set_name(name);
        entry.set_ext(ext);
        entry.set_rc(self.records().min(MAX_ENTRY_RECORDS) as u8);
        entry
    }
}

impl PartialOrd for FindResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FindResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.host.cmp(&other.host))
    }
}

/// Walk `root` recursively and return every file whose name matches
/// `pattern`, in traversal order.
///
/// Directories are descended into but never returned. Symbolic links are
/// not followed, so a link to a file is not a match and a link to a
/// directory is not descended into. Any traversal error aborts the search;
/// no partial list is returned.
pub fn find_matches(pattern: &Fcb, root: impl AsRef<Path>) -> CpmResult<Vec<FindResult>> {
    let root = root.as_ref();
    let mut results = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|source| CpmError::Traversal {
            root: root.to_path_buf(),
            source,
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_uppercase();
        if !pattern.matches(&name) {
            log::trace!("skip {}", entry.path().display());
            continue;
        }

        let metadata = entry.metadata().map_err(|source| CpmError::Traversal {
            root: root.to_path_buf(),
            source,
        })?;

        log::debug!("{} matches {}", entry.path().display(), pattern.filename());
        results.push(FindResult {
            host: entry.path().to_path_buf(),
            name,
            size: metadata.len(),
        });
    }

    Ok(results)
}
