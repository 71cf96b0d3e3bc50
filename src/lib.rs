//! # pdfscan
//!
//! A read-only parser for the structural layer of PDF files: it locates
//! the tail `startxref` anchor, rebuilds the live cross-reference table
//! across incremental updates, resolves indirect references to byte-exact
//! value slices, walks the page tree, and extracts raw and Flate-decoded
//! stream payloads.
//!
//! The API deliberately speaks byte slices rather than a typed object
//! tree. A reference goes in as its literal `N G R` bytes and a value
//! comes out as the literal bytes of the object body, so consumers that
//! need byte-exact fidelity (diffing tools, extractors, validators) never
//! fight a lossy intermediate representation.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pdfscan::PdfReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pdf = PdfReader::open("document.pdf")?;
//!
//! let pages = pdf.pages().to_vec();
//! println!("{} pages", pages.len());
//!
//! for page in &pages {
//!     let media_box = pdf.att(b"/MediaBox", page);
//!     println!("page {} MediaBox {}",
//!         String::from_utf8_lossy(page),
//!         String::from_utf8_lossy(&media_box));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Scope
//!
//! Traditional xref sections only: encrypted files, object streams, and
//! cross-reference streams (PDF 1.5+) are not supported, and the only
//! stream filter decoded is `/FlateDecode`. Damaged files degrade
//! locally — accessors return empty values for the parts that cannot be
//! read instead of failing the whole document.
//!
//! One `PdfReader` owns one file handle and its caches; it is not
//! internally synchronised. Use one reader per thread or serialise access
//! externally.

mod error;
mod lexer;
mod pages;
mod source;

pub mod filters;
pub mod header;
pub mod objects;
pub mod reader;
pub mod trailer;
pub mod xref;

#[cfg(test)]
mod test_helpers;

pub use error::{ParseError, ParseResult};
pub use filters::Filter;
pub use header::PdfVersion;
pub use objects::{array, dictionary, PdfDictionary};
pub use reader::{LoadOptions, PdfReader};
pub use trailer::PdfTrailer;
pub use xref::XrefTable;
