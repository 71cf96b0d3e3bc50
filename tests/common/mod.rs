//! Shared fixture support: a builder for synthetic PDFs with correct
//! xref offsets.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Assembles a PDF object by object; each `revision` call closes the file
/// with an xref section covering the objects added since the previous
/// revision, a trailer, and the `startxref` tail.
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

    pub fn object(&mut self, num: u32, body: &str) -> &mut Self {
        self.record(num, self.data.len());
        self.data
            .extend_from_slice(format!("{num} 0 obj\n{body}\nendobj\n").as_bytes());
        self
    }

    pub fn stream_object(&mut self, num: u32, dict: &str, payload: &[u8]) -> &mut Self {
        self.record(num, self.data.len());
        self.data
            .extend_from_slice(format!("{num} 0 obj\n{dict}\nstream\n").as_bytes());
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(b"\nendstream\nendobj\n");
        self
    }

    #[allow(dead_code)]
    pub fn offset_of(&self, num: u32) -> usize {
        self.recorded
            .iter()
            .rev()
            .find(|&&(n, _)| n == num)
            .map(|&(_, offset)| offset)
            .expect("object was never added")
    }

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

    pub fn finish(&mut self, trailer_extra: &str) -> Vec<u8> {
        self.revision(trailer_extra);
        self.data.clone()
    }

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
