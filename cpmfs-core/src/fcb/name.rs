//! Filename text <-> FCB name fields.

use super::{Fcb, EXT_LEN, NAME_LEN};

/// Encode one name segment into a fixed-width, space-padded field.
/// A `*` turns every remaining position into `?`; excess characters are
/// dropped.
fn encode_segment<const N: usize>(segment: &str) -> [u8; N] {
    let mut field = [b' '; N];
    for (slot, byte) in field.iter_mut().zip(segment.bytes()) {
        if byte == b'*' {
            break;
        }
        *slot = byte;
    }
    if let Some(star) = segment.bytes().position(|b| b == b'*') {
        for slot in field.iter_mut().skip(star) {
            *slot = b'?';
        }
    }
    field
}

fn decode_segment(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| (b & 0x7F) as char)
        .take_while(|&c| c != ' ')
        .collect()
}

impl Fcb {
    /// Parse a command-line filename into a blank FCB.
    ///
    /// Handles formats like `"A:FILE.TXT"`, `"FILE.TXT"`, `"FILE"` and the
    /// `*` wildcard. Nothing is rejected: oversized segments are truncated
    /// and missing ones are left as spaces.
    ///
    /// The drive prefix is stored as a letter index (`A:` = 0, `B:` = 1),
    /// the same numbering the command processor uses for its default-drive
    /// byte. With no prefix the drive byte is 0.
    pub fn parse(text: &str) -> Self {
        let mut fcb = Self::new();
        fcb.parse_filename(text);
        fcb
    }

    /// Parse a filename into this FCB, blanking it first.
    pub fn parse_filename(&mut self, filename: &str) {
        self.blank();

        let upper = filename.to_uppercase();
        let mut s = upper.as_str();

        // Check for drive prefix
        if s.len() >= 2 && s.as_bytes()[1] == b':' {
            let drive = s.as_bytes()[0];
            if drive.is_ascii_uppercase() {
                self.set_drive(drive - b'A');
            }
            s = &s[2..];
        }

        // Split name and extension on the first dot
        let (name, ext) = match s.find('.') {
            Some(pos) => (&s[..pos], &s[pos + 1..]),
            None => (s, ""),
        };

        self.set_raw_name(encode_segment::<NAME_LEN>(name));
        self.set_raw_ext(encode_segment::<EXT_LEN>(ext));
    }

    /// Set filename from string (upper-cased, space-padded to 8 chars).
    pub fn set_name(&mut self, name: &str) {
        self.set_raw_name(encode_segment::<NAME_LEN>(&name.to_uppercase()));
    }

    /// Set extension from string (upper-cased, space-padded to 3 chars).
    pub fn set_ext(&mut self, ext: &str) {
        self.set_raw_ext(encode_segment::<EXT_LEN>(&ext.to_uppercase()));
    }

    /// Get filename (8 chars, trimmed, without high bits).
    pub fn name(&self) -> String {
        decode_segment(self.raw_name())
    }

    /// Get extension (3 chars, trimmed, without high bits).
    pub fn extension(&self) -> String {
        decode_segment(self.raw_ext())
    }

    /// Get full filename with extension.
    pub fn filename(&self) -> String {
        let name = self.name();
        let ext = self.extension();
        if ext.is_empty() {
            name
        } else {
            format!("{}.{}", name, ext)
        }
    }

    /// True when any name or extension position is a `?` wildcard.
    pub fn has_wildcards(&self) -> bool {
        self.raw_name()
            .iter()
            .chain(self.raw_ext())
            .any(|&b| b & 0x7F == b'?')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filename() {
        let fcb = Fcb::parse("TEST.TXT");
        assert_eq!(fcb.drive(), 0);
        assert_eq!(fcb.name(), "TEST");
        assert_eq!(fcb.extension(), "TXT");
        assert_eq!(fcb.filename(), "TEST.TXT");
    }

    #[test]
    fn test_parse_filename_with_drive() {
        let fcb = Fcb::parse("B:FOO");
        assert_eq!(fcb.drive(), 1);
        assert_eq!(fcb.raw_name(), b"FOO     ");
        assert_eq!(fcb.raw_ext(), b"   ");
    }

    #[test]
    fn test_parse_lowercase() {
        let fcb = Fcb::parse("c:hello.com");
        assert_eq!(fcb.drive(), 2);
        assert_eq!(fcb.raw_name(), b"HELLO   ");
        assert_eq!(fcb.raw_ext(), b"COM");
    }

    #[test]
    fn test_parse_extension_wildcard() {
        let fcb = Fcb::parse("C:TEST.C*");
        assert_eq!(fcb.drive(), 2);
        assert_eq!(fcb.raw_name(), b"TEST    ");
        assert_eq!(fcb.raw_ext(), b"C??");
    }

    #[test]
    fn test_parse_star_dot_star() {
        let fcb = Fcb::parse("STEVE*.*");
        assert_eq!(fcb.raw_name(), b"STEVE???");
        assert_eq!(fcb.raw_ext(), b"???");
        assert!(fcb.has_wildcards());
    }

    #[test]
    fn test_star_consumes_rest_of_segment() {
        let fcb = Fcb::parse("A*BC.X*Y");
        assert_eq!(fcb.raw_name(), b"A???????");
        assert_eq!(fcb.raw_ext(), b"X??");
    }

    #[test]
    fn test_parse_truncates() {
        let fcb = Fcb::parse("VERYLONGNAME.EXTENSION");
        assert_eq!(fcb.raw_name(), b"VERYLONG");
        assert_eq!(fcb.raw_ext(), b"EXT");
        assert!(!fcb.has_wildcards());
    }

    #[test]
    fn test_parse_splits_on_first_dot() {
        let fcb = Fcb::parse("A.B.C");
        assert_eq!(fcb.raw_name(), b"A       ");
        assert_eq!(fcb.raw_ext(), b"B.C");
    }

    #[test]
    fn test_parse_degenerate_input() {
        let fcb = Fcb::parse("");
        assert_eq!(fcb, Fcb::new());

        let fcb = Fcb::parse("B:");
        assert_eq!(fcb.drive(), 1);
        assert_eq!(fcb.raw_name(), b"        ");

        let fcb = Fcb::parse("1:FOO");
        assert_eq!(fcb.drive(), 0);
        assert_eq!(fcb.name(), "FOO");

        let fcb = Fcb::parse(".TXT");
        assert_eq!(fcb.name(), "");
        assert_eq!(fcb.extension(), "TXT");
    }

    #[test]
    fn test_parse_resets_previous_state() {
        let mut fcb = Fcb::parse("B:LONGNAME.ABC");
        fcb.set_cr(12);
        fcb.parse_filename("X");
        assert_eq!(fcb.drive(), 0);
        assert_eq!(fcb.raw_name(), b"X       ");
        assert_eq!(fcb.raw_ext(), b"   ");
        assert_eq!(fcb.cr(), 0);
    }

    #[test]
    fn test_name_strips_attribute_bits() {
        let mut fcb = Fcb::new();
        fcb.set_raw_name(*b"READ\xCD   ");
        fcb.set_raw_ext([b'T' | 0x80, b'X', b'T']);
        assert_eq!(fcb.name(), "READM");
        assert_eq!(fcb.filename(), "READM.TXT");
    }

    #[test]
    fn test_set_name_and_ext() {
        let mut fcb = Fcb::new();
        fcb.set_name("hello");
        fcb.set_ext("c");
        assert_eq!(fcb.raw_name(), b"HELLO   ");
        assert_eq!(fcb.raw_ext(), b"C  ");
    }
}
