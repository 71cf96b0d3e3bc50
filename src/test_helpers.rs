//! Builders for synthetic PDFs with correct xref offsets.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Incrementally assembles a PDF: objects are appended and their offsets
/// recorded, then each `revision` call writes an xref section, trailer,
/// and tail over the objects added since the previous revision.
pub struct PdfBuilder {
    data: Vec<u8>,
    pending: Vec<(u32, usize)>,
    recorded: Vec<(u32, usize)>,
    max_object: u32,
    revisions: u32,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            data: b"%PDF-1.4\n".to_vec(),
            pending: Vec::new(),
            recorded: Vec::new(),
            max_object: 0,
            revisions: 0,
        }
    }

    /// Append `num 0 obj <body> endobj`.
    pub fn object(&mut self, num: u32, body: &str) -> &mut Self {
        self.raw_object(num, body.as_bytes())
    }

    /// Append an object with a raw (possibly binary) body.
    pub fn raw_object(&mut self, num: u32, body: &[u8]) -> &mut Self {
        self.record(num, self.data.len());
        self.data
            .extend_from_slice(format!("{num} 0 obj\n").as_bytes());
        self.data.extend_from_slice(body);
        self.data.extend_from_slice(b"\nendobj\n");
        self
    }

    /// Append a stream object: dictionary, `stream` keyword, payload,
    /// `endstream`.
    pub fn stream_object(&mut self, num: u32, dict: &str, payload: &[u8]) -> &mut Self {
        self.record(num, self.data.len());
        self.data
            .extend_from_slice(format!("{num} 0 obj\n{dict}\nstream\n").as_bytes());
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    /// Register an xref entry for `num` at an arbitrary offset without
    /// writing any data there.
    pub fn alias_object(&mut self, num: u32, offset: usize) -> &mut Self {
        self.record(num, offset);
        self
    }

    /// Most recently recorded offset of object `num`.
    pub fn offset_of(&self, num: u32) -> usize {
        self.recorded
            .iter()
            .rev()
            .find(|&&(n, _)| n == num)
            .map(|&(_, offset)| offset)
            .expect("object was never added")
    }

    /// Close the current revision: write its xref section (covering the
    /// objects added since the previous revision), a trailer with
    /// `/Size` plus `trailer_extra`, and the `startxref` tail. Returns
    /// the revision's xref offset for use in a later `/Prev`.
    pub fn revision(&mut self, trailer_extra: &str) -> usize {
        let xref_start = self.data.len();
        self.data.extend_from_slice(b"xref\n");
        if self.revisions == 0 {
            self.data.extend_from_slice(b"0 1\n0000000000 65535 f \n");
        }
        for &(num, offset) in &self.pending {
            self.data
                .extend_from_slice(format!("{num} 1\n{offset:010} 00000 n \n").as_bytes());
        }
        self.pending.clear();
        let size = self.max_object + 1;
        self.data.extend_from_slice(
            format!("trailer\n<< /Size {size} {trailer_extra} >>\nstartxref\n{xref_start}\n%%EOF\n")
                .as_bytes(),
        );
        self.revisions += 1;
        xref_start
    }

    /// Close the final revision and hand back the file.
    pub fn finish(&mut self, trailer_extra: &str) -> Vec<u8> {
        self.revision(trailer_extra);
        self.data.clone()
    }

    /// zlib-compress a fixture payload.
    pub fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn record(&mut self, num: u32, offset: usize) {
        self.pending.push((num, offset));
        self.recorded.push((num, offset));
        self.max_object = self.max_object.max(num);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_emits_tail_anchor_and_entries() {
        let data = PdfBuilder::new().object(1, "42").finish("/Root 1 0 R");
        let text = String::from_utf8_lossy(&data);
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.contains("1 0 obj"));
        assert!(text.contains("xref"));
        assert!(text.contains("startxref"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn entries_are_twenty_bytes() {
        let mut builder = PdfBuilder::new();
        builder.object(1, "42");
        let offset = builder.offset_of(1);
        let data = builder.finish("/Root 1 0 R");
        let entry = format!("{offset:010} 00000 n \n");
        assert_eq!(entry.len(), 20);
        assert!(String::from_utf8_lossy(&data).contains(&entry));
    }
}
