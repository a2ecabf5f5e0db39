//! Wildcard matching of host filenames against an FCB pattern.

use super::{Fcb, EXT_LEN, NAME_LEN};

/// Split a host filename into padded 8.3 fields.
/// Returns None for names this system could never have produced.
fn split_candidate(candidate: &str) -> Option<([u8; NAME_LEN], [u8; EXT_LEN])> {
    let upper = candidate.to_uppercase();
    let (base, ext) = match upper.find('.') {
        Some(pos) => (&upper[..pos], &upper[pos + 1..]),
        None => (upper.as_str(), ""),
    };

    if base.len() > NAME_LEN || ext.len() > EXT_LEN {
        return None;
    }

    let mut name = [b' '; NAME_LEN];
    name[..base.len()].copy_from_slice(base.as_bytes());
    let mut typ = [b' '; EXT_LEN];
    typ[..ext.len()].copy_from_slice(ext.as_bytes());
    Some((name, typ))
}

fn fields_match(pattern: &[u8], candidate: &[u8]) -> bool {
    pattern.iter().zip(candidate).all(|(&p, &c)| {
        let p = p & 0x7F;
        p == b'?' || p == c
    })
}

impl Fcb {
    /// Check whether a host filename satisfies this FCB's name pattern.
    ///
    /// The candidate is upper-cased and split on its first dot. Names whose
    /// base exceeds 8 characters or whose extension exceeds 3 never match.
    /// A `?` in the pattern matches any character at that position.
    pub fn matches(&self, candidate: &str) -> bool {
        match split_candidate(candidate) {
            Some((name, ext)) => {
                fields_match(self.raw_name(), &name) && fields_match(self.raw_ext(), &ext)
            }
            None => {
                log::trace!("{} is not an 8.3 name", candidate);
                false
            }
        }
    }
}
