//! Page-tree navigation and inherited attributes.

use std::collections::HashSet;
use std::io::{Read, Seek};

use crate::objects::PdfDictionary;
use crate::reader::PdfReader;

impl<R: Read + Seek> PdfReader<R> {
    /// Look up `name` on the dictionary at `page`, walking `/Parent` links
    /// upward when the key is absent.
    ///
    /// The returned bytes are unresolved, so a reference-valued attribute
    /// comes back as its literal `N G R` text. Empty bytes mean the
    /// attribute exists nowhere on the path; a `/Parent` cycle ends the
    /// walk the same way.
    pub fn attribute(&mut self, name: &[u8], page: &[u8]) -> Vec<u8> {
        let mut dict = self.dic(page).unwrap_or_default();
        let mut visited = HashSet::new();
        loop {
            if let Some(value) = dict.get(name) {
                return value.to_vec();
            }
            let Some(parent) = dict.get(b"/Parent").map(<[u8]>::to_vec) else {
                return Vec::new();
            };
            if !visited.insert(parent.clone()) {
                return Vec::new();
            }
            dict = self.dic(&parent).unwrap_or_default();
        }
    }

    /// As [`attribute`](Self::attribute), but resolved.
    pub fn att(&mut self, name: &[u8], page: &[u8]) -> Vec<u8> {
        let attribute = self.attribute(name, page);
        self.obj(&attribute)
    }

    /// References to the document's pages, in tree order.
    ///
    /// The walk starts at `Trailer /Root → /Pages` and descends `/Kids`
    /// depth-first; a node without `/Kids` is a page. The list is built
    /// once and memoised.
    ///
    /// # Panics
    ///
    /// Panics when a node is encountered twice during the walk: a cyclic
    /// page tree cannot be enumerated without repeating or dropping pages.
    pub fn pages(&mut self) -> &[Vec<u8>] {
        if self.pages_cache.is_none() {
            let list = self.walk_pages();
            self.pages_cache = Some(list);
        }
        self.pages_cache.as_deref().unwrap_or_default()
    }

    fn walk_pages(&mut self) -> Vec<Vec<u8>> {
        let root = self.trailer().root().map(<[u8]>::to_vec).unwrap_or_default();
        let catalog = self.dic(&root).unwrap_or_default();
        let pages_ref = catalog.get(b"/Pages").map(<[u8]>::to_vec).unwrap_or_default();
        let pages_dict = self.dic(&pages_ref).unwrap_or_default();
        let count = pages_dict
            .get(b"/Count")
            .map(<[u8]>::to_vec)
            .map(|v| self.num(&v) as usize)
            .unwrap_or(0);

        let mut list = Vec::with_capacity(count);
        let kids = pages_dict.get(b"/Kids").map(<[u8]>::to_vec).unwrap_or_default();
        let mut stack = self.arr(&kids).unwrap_or_default();
        stack.reverse();
        let mut visited: HashSet<Vec<u8>> = HashSet::new();
        while let Some(node) = stack.pop() {
            if !visited.insert(node.clone()) {
                panic!(
                    "page tree revisits node {}",
                    String::from_utf8_lossy(&node)
                );
            }
            match self.dic(&node).unwrap_or_default().get(b"/Kids").map(<[u8]>::to_vec) {
                Some(kids) => {
                    let mut children = self.arr(&kids).unwrap_or_default();
                    children.reverse();
                    stack.append(&mut children);
                }
                None => list.push(node),
            }
        }
        list
    }

    /// The `/Font` resource dictionary effective for a page, including
    /// fonts inherited through `/Parent`.
    pub fn page_fonts(&mut self, page: &[u8]) -> Option<PdfDictionary> {
        let resources = self.attribute(b"/Resources", page);
        let fonts = self.dic(&resources)?.get(b"/Font").map(<[u8]>::to_vec)?;
        self.dic(&fonts)
    }
}
