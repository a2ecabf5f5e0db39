//! Drive letters (A-P) mapped onto host directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CpmError, CpmResult};
use crate::fcb::Fcb;
use crate::find::{find_matches, FindResult};

/// Number of drives CP/M can address.
pub const MAX_DRIVES: u8 = 16;

/// Validate a drive letter and return its index (A=0 .. P=15).
pub fn drive_index(letter: char) -> CpmResult<u8> {
    let upper = letter.to_ascii_uppercase();
    if ('A'..='P').contains(&upper) {
        Ok(upper as u8 - b'A')
    } else {
        Err(CpmError::InvalidDrive(letter))
    }
}

/// Drive letter for an index (0 = A). Indexes past P are rejected.
pub fn drive_letter(index: u8) -> CpmResult<char> {
    if index < MAX_DRIVES {
        Ok(letter_of(index))
    } else {
        let shown = char::from_u32(u32::from(b'A') + u32::from(index)).unwrap_or('?');
        Err(CpmError::InvalidDrive(shown))
    }
}

fn letter_of(index: u8) -> char {
    (b'A' + index) as char
}

/// Explicit `X:` prefix of a command-line filename, if any.
fn drive_prefix(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) => Some(letter),
        _ => None,
    }
}

/// On-disk drive map configuration.
///
/// ```json
/// { "default": "A", "drives": { "A": "/srv/cpm/a", "B": "/srv/cpm/b" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveMapConfig {
    #[serde(default = "default_drive")]
    pub default: char,
    #[serde(default)]
    pub drives: BTreeMap<char, PathBuf>,
}

fn default_drive() -> char {
    'A'
}

/// Host root directory for each mounted drive.
#[derive(Debug, Clone)]
pub struct DriveMap {
    roots: [Option<PathBuf>; MAX_DRIVES as usize],
    default: u8,
}

impl Default for DriveMap {
    fn default() -> Self {
        Self {
            roots: Default::default(),
            default: 0,
        }
    }
}

impl DriveMap {
    /// Create an empty map with A: as the default drive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every drive shares one host directory.
    pub fn single(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut map = Self::new();
        for slot in map.roots.iter_mut() {
            *slot = Some(root.clone());
        }
        map
    }

    /// Each drive lives in a sub-directory named after its letter
    /// (`<root>/A`, `<root>/B`, ...).
    pub fn per_drive(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut map = Self::new();
        for (i, slot) in map.roots.iter_mut().enumerate() {
            *slot = Some(root.join(letter_of(i as u8).to_string()));
        }
        map
    }

    /// Build a map from a parsed configuration.
    pub fn from_config(config: &DriveMapConfig) -> CpmResult<Self> {
        let mut map = Self::new();
        map.set_default(config.default)?;
        for (&letter, root) in &config.drives {
            map.mount(letter, root.clone())?;
        }
        Ok(map)
    }

    /// Load a JSON drive map from disk.
    pub fn load(path: impl AsRef<Path>) -> CpmResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: DriveMapConfig = serde_json::from_str(&text)?;
        log::debug!(
            "loaded {} drive(s) from {}",
            config.drives.len(),
            path.display()
        );
        Self::from_config(&config)
    }

    /// Map a drive letter to a host directory.
    pub fn mount(&mut self, letter: char, root: impl Into<PathBuf>) -> CpmResult<()> {
        let idx = drive_index(letter)?;
        self.roots[idx as usize] = Some(root.into());
        Ok(())
    }

    /// Remove a drive mapping.
    pub fn unmount(&mut self, letter: char) -> CpmResult<()> {
        let idx = drive_index(letter)?;
        self.roots[idx as usize] = None;
        Ok(())
    }

    /// Change the drive used when an FCB names none.
    pub fn set_default(&mut self, letter: char) -> CpmResult<()> {
        self.default = drive_index(letter)?;
        Ok(())
    }

    /// Current default drive letter.
    pub fn default_letter(&self) -> char {
        letter_of(self.default)
    }

    /// Host root for a drive letter.
    pub fn root(&self, letter: char) -> CpmResult<&Path> {
        let idx = drive_index(letter)?;
        self.roots[idx as usize]
            .as_deref()
            .ok_or(CpmError::DriveNotMounted(letter.to_ascii_uppercase()))
    }

    /// Drive letter an FCB's drive byte refers to.
    ///
    /// [`Fcb::parse`] stores `A:` as 0, so a drive byte of 0 means either
    /// an explicit `A:` or no prefix; both go to the default drive. Use
    /// [`DriveMap::find_name`] when the original text is still at hand.
    pub fn letter_for(&self, fcb: &Fcb) -> CpmResult<char> {
        match fcb.drive() {
            0 => Ok(self.default_letter()),
            n => drive_letter(n),
        }
    }

    /// Run a directory search for `pattern` on the drive it names.
    pub fn find(&self, pattern: &Fcb) -> CpmResult<Vec<FindResult>> {
        let letter = self.letter_for(pattern)?;
        self.find_on(letter, pattern)
    }

    /// Parse a command-line pattern and search the drive it names.
    ///
    /// An explicit prefix is taken from the text, so `A:` reaches drive A
    /// even when another drive is the default.
    pub fn find_name(&self, text: &str) -> CpmResult<Vec<FindResult>> {
        let pattern = Fcb::parse(text);
        let letter = match drive_prefix(text) {
            Some(letter) => letter_of(drive_index(letter)?),
            None => self.default_letter(),
        };
        self.find_on(letter, &pattern)
    }

    /// Search drive `letter` for `pattern`, ignoring the FCB's drive byte.
    pub fn find_on(&self, letter: char, pattern: &Fcb) -> CpmResult<Vec<FindResult>> {
        let root = self.root(letter)?;
        log::debug!("searching {}: at {}", letter, root.display());
        find_matches(pattern, root)
    }
}
