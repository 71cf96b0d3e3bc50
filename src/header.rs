//! Lenient sniff of the `%PDF-M.m` header comment.

use std::fmt;

/// PDF version from the header comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Read the version from the first bytes of the file, if present.
///
/// The header is advisory: the tail anchor alone decides whether a file
/// loads, so a missing or mangled header is simply `None`.
pub(crate) fn sniff_version(head: &[u8]) -> Option<PdfVersion> {
    let rest = head.strip_prefix(b"%PDF-")?;
    let major = match rest.first() {
        Some(&b) if b.is_ascii_digit() => b - b'0',
        _ => return None,
    };
    if rest.get(1) != Some(&b'.') {
        return None;
    }
    let minor = match rest.get(2) {
        Some(&b) if b.is_ascii_digit() => b - b'0',
        _ => return None,
    };
    Some(PdfVersion { major, minor })
}
