//! High-level read-only PDF access.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::bytes::Regex;

use crate::error::ParseResult;
use crate::filters;
use crate::header::{self, PdfVersion};
use crate::lexer::{ascii_num, ref_token, simple_token, skip_le, tuple};
use crate::objects::{array, dictionary, PdfDictionary};
use crate::source::ByteSource;
use crate::trailer::PdfTrailer;
use crate::xref::{self, XrefTable};

/// Knobs for the load sequence.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Bound on the `/Prev` chain of incremental updates.
    pub max_updates: usize,
    /// How many trailing bytes to scan for the `startxref` anchor.
    pub tail_window: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_updates: 1024,
            tail_window: 1024,
        }
    }
}

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)[\r\n\t ]+([0-9]+)[\r\n\t ]+R$").unwrap());

/// Cheap shape check before the full grammar match.
fn looks_like_reference(s: &[u8]) -> bool {
    s.len() >= 5 && s[s.len() - 1] == b'R'
}

/// Object and generation number of a `"N G R"` slice.
fn parse_reference(s: &[u8]) -> Option<(u32, u32)> {
    let caps = REFERENCE_RE.captures(s)?;
    let object = ascii_num(caps.get(1)?.as_bytes());
    let generation = ascii_num(caps.get(2)?.as_bytes());
    Some((object as u32, generation as u32))
}

/// A loaded PDF file.
///
/// Construction runs the whole load sequence: tail anchor, xref chain,
/// trailer. Everything afterwards is lazy — objects are read from the file
/// when first resolved and memoised by reference text.
///
/// All value accessors speak byte slices: a reference in is the literal
/// `N G R` bytes, a value out is the literal bytes of the object body.
pub struct PdfReader<R: Read + Seek> {
    file: String,
    source: ByteSource<R>,
    version: Option<PdfVersion>,
    startxref: u64,
    xref: XrefTable,
    trailer: PdfTrailer,
    resolved: HashMap<Vec<u8>, Vec<u8>>,
    offsets: HashMap<Vec<u8>, i64>,
    pub(crate) pages_cache: Option<Vec<Vec<u8>>>,
}

impl PdfReader<File> {
    /// Open and load a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        Self::open_with_options(path, LoadOptions::default())
    }

    /// Open and load a PDF file with explicit options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: LoadOptions) -> ParseResult<Self> {
        let name = path.as_ref().display().to_string();
        let file = File::open(path.as_ref())?;
        let mut reader = Self::new_with_options(file, options)?;
        reader.file = name;
        Ok(reader)
    }
}

impl<R: Read + Seek> PdfReader<R> {
    /// Load from any seekable byte source, e.g. a `Cursor` over a buffer.
    pub fn new(source: R) -> ParseResult<Self> {
        Self::new_with_options(source, LoadOptions::default())
    }

    /// Load from any seekable byte source with explicit options.
    pub fn new_with_options(source: R, options: LoadOptions) -> ParseResult<Self> {
        let mut source = ByteSource::new(source)?;
        let head = source.read_at(0, 16)?;
        let version = header::sniff_version(&head);
        let startxref = xref::locate_startxref(&mut source, options.tail_window)?;
        let (xref, trailer_dict) = XrefTable::parse(&mut source, startxref, options.max_updates)?;
        Ok(Self {
            file: String::new(),
            source,
            version,
            startxref,
            xref,
            trailer: PdfTrailer::new(trailer_dict, startxref),
            resolved: HashMap::new(),
            offsets: HashMap::new(),
            pages_cache: None,
        })
    }

    /// Name of the opened file; empty for in-memory sources.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Version from the `%PDF-M.m` header, when one is present.
    pub fn version(&self) -> Option<PdfVersion> {
        self.version
    }

    /// Offset of the newest xref section.
    pub fn startxref(&self) -> u64 {
        self.startxref
    }

    /// The live cross-reference table.
    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    /// The trailer, overlaid across revisions.
    pub fn trailer(&self) -> &PdfTrailer {
        &self.trailer
    }

    /// Read the header and first value token of object `number`.
    ///
    /// Returns the file position just past the value token and the value
    /// bytes; `(-1, empty)` when the xref misses or the header's object
    /// number does not match.
    fn object(&mut self, number: u32) -> (i64, Vec<u8>) {
        let Some(offset) = self.xref.get(number) else {
            return (-1, Vec::new());
        };
        if self.source.seek(offset).is_err() {
            return (-1, Vec::new());
        }
        let Ok(header) = tuple(&mut self.source, 3) else {
            return (-1, Vec::new());
        };
        if ascii_num(&header[0].bytes) != i64::from(number) {
            return (-1, Vec::new());
        }
        let Ok(token) = ref_token(&mut self.source) else {
            return (-1, Vec::new());
        };
        (token.pos + token.bytes.len() as i64, token.bytes)
    }

    /// Dereference a chain of indirect references.
    ///
    /// A slice that is not a reference passes through unchanged as
    /// `(-1, input)`. Results are memoised under the original reference
    /// text, so repeated resolution returns bit-identical bytes and
    /// offset. A reference cycle yields `(-1, empty)`.
    pub fn resolve(&mut self, reference: &[u8]) -> (i64, Vec<u8>) {
        if !looks_like_reference(reference) {
            return (-1, reference.to_vec());
        }
        if let Some(bytes) = self.resolved.get(reference) {
            let offset = self.offsets.get(reference).copied().unwrap_or(-1);
            return (offset, bytes.clone());
        }
        let mut visited = HashSet::new();
        let mut current = reference.to_vec();
        let mut offset: i64 = -1;
        while let Some((object, _generation)) = parse_reference(&current) {
            if !visited.insert(object) {
                debug!("reference cycle through object {object}");
                return (-1, Vec::new());
            }
            let (position, bytes) = self.object(object);
            offset = position;
            current = bytes;
            if let Some(cached) = self.resolved.get(current.as_slice()) {
                offset = self.offsets.get(current.as_slice()).copied().unwrap_or(-1);
                current = cached.clone();
                break;
            }
        }
        self.resolved.insert(reference.to_vec(), current.clone());
        self.offsets.insert(reference.to_vec(), offset);
        (offset, current)
    }

    /// Resolved value bytes of a reference, or the input itself when it is
    /// a direct value.
    pub fn obj(&mut self, reference: &[u8]) -> Vec<u8> {
        self.resolve(reference).1
    }

    /// Leading ASCII-decimal integer of the resolved value.
    pub fn num(&mut self, reference: &[u8]) -> i64 {
        ascii_num(&self.obj(reference))
    }

    /// Resolved value parsed as a dictionary.
    pub fn dic(&mut self, reference: &[u8]) -> Option<PdfDictionary> {
        dictionary(&self.obj(reference))
    }

    /// Resolved value parsed as an array.
    pub fn arr(&mut self, reference: &[u8]) -> Option<Vec<Vec<u8>>> {
        array(&self.obj(reference))
    }

    /// Resolved value as an array; a non-array value yields the unresolved
    /// input as a single-element sequence.
    pub fn forced_array(&mut self, reference: &[u8]) -> Vec<Vec<u8>> {
        let value = self.obj(reference);
        if value.first() != Some(&b'[') {
            return vec![reference.to_vec()];
        }
        array(&value).unwrap_or_default()
    }

    /// Raw stream payload and its dictionary.
    ///
    /// `None` when the reference does not lead to a dictionary followed by
    /// the `stream` keyword.
    pub fn stream(&mut self, reference: &[u8]) -> Option<(PdfDictionary, Vec<u8>)> {
        let (position, dict_bytes) = self.resolve(reference);
        let dict = dictionary(&dict_bytes)?;
        if position < 0 {
            return None;
        }
        // An indirect /Length would move the cursor while resolving, so
        // read it before seeking to the payload.
        let length = dict
            .get(b"/Length")
            .map(<[u8]>::to_vec)
            .map(|v| self.num(&v) as usize)
            .unwrap_or(0);
        self.source.seek(position as u64).ok()?;
        let keyword = simple_token(&mut self.source).ok()?;
        if keyword.bytes != b"stream" {
            return None;
        }
        skip_le(&mut self.source).ok()?;
        let data = self.source.read_vec(length).ok()?;
        Some((dict, data))
    }

    /// Stream payload with its `/Filter` chain applied.
    ///
    /// Only `/FlateDecode` is supported; any other filter in the chain
    /// leaves empty bytes.
    pub fn decoded_stream(&mut self, reference: &[u8]) -> Option<(PdfDictionary, Vec<u8>)> {
        let (dict, mut data) = self.stream(reference)?;
        if let Some(filter) = dict.get(b"/Filter").map(<[u8]>::to_vec) {
            for name in self.forced_array(&filter) {
                data = filters::decode(&name, &data);
            }
        }
        Some((dict, data))
    }
}
