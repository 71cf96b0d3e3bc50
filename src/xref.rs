//! Cross-reference table recovery.
//!
//! A PDF is tail-anchored: the last kilobyte carries a `startxref` pointer
//! to the newest xref section, and each section's trailer may point at an
//! older one through `/Prev`. Sections are merged oldest-first so the
//! newest revision wins for every object.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::sync::LazyLock;

use log::warn;
use regex::bytes::Regex;

use crate::error::{ParseError, ParseResult};
use crate::lexer::{ascii_num, simple_token, skip_le, tuple};
use crate::objects::{dictionary, PdfDictionary};
use crate::source::ByteSource;

/// Fixed width of one traditional xref entry.
const XREF_ENTRY_LEN: usize = 20;

static STARTXREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"startxref[\t ]*(\r?\n|\r)[\t ]*([0-9]+)[\t ]*(\r?\n|\r)[\t ]*%%EOF").unwrap()
});

/// Scan the file tail for the `startxref … %%EOF` anchor and return the
/// offset it points at. The last match wins, so trailing incremental
/// updates shadow earlier ones even when several anchors fall inside the
/// window.
pub(crate) fn locate_startxref<R: Read + Seek>(
    src: &mut ByteSource<R>,
    window: usize,
) -> ParseResult<u64> {
    let size = src.size();
    let len = size.min(window as u64) as usize;
    let tail = src.read_at(size - len as u64, len)?;
    let anchor = STARTXREF_RE
        .captures_iter(&tail)
        .last()
        .ok_or(ParseError::NotAPdf)?;
    let digits = anchor.get(2).map(|g| g.as_bytes()).unwrap_or_default();
    Ok(ascii_num(digits) as u64)
}

/// Skip one xref section starting at `offset` and return the position of
/// the keyword that follows it (normally `trailer`).
pub(crate) fn skip_section<R: Read + Seek>(
    src: &mut ByteSource<R>,
    offset: u64,
) -> ParseResult<u64> {
    src.seek(offset)?;
    let keyword = simple_token(src)?;
    if keyword.bytes != b"xref" {
        return Err(ParseError::MalformedXref(format!(
            "expected xref keyword at offset {offset}"
        )));
    }
    loop {
        let first = simple_token(src)?;
        if first.is_empty() {
            return Err(ParseError::MalformedXref(format!(
                "unterminated xref section at offset {offset}"
            )));
        }
        if !first.bytes[0].is_ascii_digit() {
            src.seek(first.pos as u64)?;
            break;
        }
        let count = simple_token(src)?;
        skip_le(src)?;
        src.skip(ascii_num(&count.bytes) as u64 * XREF_ENTRY_LEN as u64)?;
    }
    Ok(src.position())
}

/// The live cross-reference table: object number → byte offset of the
/// object header. Free entries are absent.
#[derive(Debug, Clone, Default)]
pub struct XrefTable {
    entries: HashMap<u32, u64>,
}

impl XrefTable {
    /// Byte offset of an object's `N G obj` header.
    pub fn get(&self, object: u32) -> Option<u64> {
        self.entries.get(&object).copied()
    }

    pub fn contains(&self, object: u32) -> bool {
        self.entries.contains_key(&object)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(object, offset)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Walk the `/Prev` chain backward from `start`, then merge all
    /// sections oldest-first: in-use entries overwrite, free entries
    /// delete. Also returns the trailer dictionaries overlaid
    /// oldest-first, so the newest revision wins for every key.
    pub(crate) fn parse<R: Read + Seek>(
        src: &mut ByteSource<R>,
        start: u64,
        max_updates: usize,
    ) -> ParseResult<(Self, PdfDictionary)> {
        let mut sections = Vec::new();
        let mut trailers = Vec::new();
        let mut offset = start;
        loop {
            if sections.len() == max_updates {
                warn!("xref chain exceeds {max_updates} sections, ignoring older revisions");
                break;
            }
            sections.push(offset);
            let trailer_pos = skip_section(src, offset)?;
            src.seek(trailer_pos)?;
            let keyword = simple_token(src)?;
            if keyword.bytes != b"trailer" {
                return Err(ParseError::MalformedXref(format!(
                    "expected trailer keyword at offset {trailer_pos}"
                )));
            }
            let dict_token = simple_token(src)?;
            let dict = dictionary(&dict_token.bytes).ok_or_else(|| {
                ParseError::MalformedXref(format!(
                    "unparseable trailer dictionary at offset {}",
                    dict_token.pos
                ))
            })?;
            let prev = dict.get(b"/Prev").map(ascii_num);
            trailers.push(dict);
            match prev {
                Some(p) => offset = p as u64,
                None => break,
            }
        }

        let mut entries = HashMap::new();
        for &section in sections.iter().rev() {
            src.seek(section)?;
            simple_token(src)?; // the xref keyword, validated above
            loop {
                let header = tuple(src, 2)?;
                if header[0].bytes == b"trailer" || header[0].is_empty() {
                    break;
                }
                skip_le(src)?;
                let mut object = ascii_num(&header[0].bytes) as u32;
                let count = ascii_num(&header[1].bytes) as usize;
                let want = count.saturating_mul(XREF_ENTRY_LEN);
                let avail = src.size().saturating_sub(src.position()) as usize;
                let data = src.read_vec(want.min(avail))?;
                for entry in data.chunks_exact(XREF_ENTRY_LEN) {
                    if entry[17] == b'n' {
                        entries.insert(object, ascii_num(&entry[..10]) as u64);
                    } else {
                        entries.remove(&object);
                    }
                    object += 1;
                }
            }
        }

        let mut trailer = PdfDictionary::new();
        for dict in trailers.iter().rev() {
            for (key, value) in dict.iter() {
                trailer.insert(key.to_vec(), value.to_vec());
            }
        }
        Ok((Self { entries }, trailer))
    }
}
