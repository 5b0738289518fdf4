//! Loading [`SourceDocument`]s from XML text.
//!
//! This is a convenience for hosts without their own XML front end: selector
//! matching is not performed, so the only CSS an element receives is its
//! inline `style` attribute.

use std::borrow::Cow;
use std::path::Path;

use html5ever::{LocalName, Namespace, Prefix, QualName, ns};
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Attribute, Doctype, NodeChild, ProcessingInstruction, SourceDocument, StyleNode};
use crate::error::{Error, Result};
use crate::style::StyleTable;

/// Parse a document from a string.
pub fn read_document(xml: &str) -> Result<SourceDocument> {
    DocumentReader::default().read(xml)
}

/// Parse a document from raw bytes, detecting the encoding.
pub fn read_document_bytes(bytes: &[u8]) -> Result<SourceDocument> {
    let text = decode_text(bytes, declared_encoding(bytes).as_deref());
    read_document(&text)
}

/// Read and parse the file at `path`; its path becomes the base URI.
pub fn read_file(path: impl AsRef<Path>) -> Result<SourceDocument> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let doc = read_document_bytes(&bytes)?;
    Ok(doc.with_base_uri(path.to_string_lossy()))
}

/// Decode bytes to a string.
///
/// Tries UTF-8 first (a BOM is handled by encoding_rs), then the encoding
/// named by the XML declaration, then Windows-1252.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// The `encoding="..."` pseudo-attribute of the XML declaration, if any.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let decl = bytes.strip_prefix(b"<?xml")?;
    let decl = &decl[..memmem::find(decl, b"?>")?];
    let at = memmem::find(decl, b"encoding")? + b"encoding".len();
    let rest = decl[at..].trim_ascii_start().strip_prefix(b"=")?.trim_ascii_start();
    let (&quote, value) = rest.split_first().filter(|(q, _)| matches!(**q, b'"' | b'\''))?;
    let end = memchr::memchr(quote, value)?;
    Some(String::from_utf8_lossy(&value[..end]).into_owned())
}

#[derive(Default)]
struct DocumentReader {
    /// Open elements, innermost last.
    stack: Vec<StyleNode>,
    /// Namespace declarations per open element.
    scopes: Vec<Vec<(Option<String>, String)>>,
    root: Option<StyleNode>,
    doctype: Option<Doctype>,
    processing_instructions: Vec<ProcessingInstruction>,
}

impl DocumentReader {
    fn read(mut self, xml: &str) -> Result<SourceDocument> {
        let mut reader = Reader::from_str(xml);

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let node = self.open(&e, &reader)?;
                    self.stack.push(node);
                }
                Event::Empty(e) => {
                    let node = self.open(&e, &reader)?;
                    self.scopes.pop();
                    self.attach(node);
                }
                Event::End(_) => {
                    self.scopes.pop();
                    if let Some(node) = self.stack.pop() {
                        self.attach(node);
                    }
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(e.as_ref());
                    self.push_text(&text);
                }
                Event::GeneralRef(e) => {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    match resolve_entity(&entity) {
                        Some(resolved) => self.push_text(&resolved),
                        None => log::debug!("unresolved entity &{entity};"),
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if let Some(parent) = self.stack.last_mut() {
                        parent.children.push(NodeChild::CData(text));
                    }
                }
                Event::DocType(e) => {
                    let decl = String::from_utf8_lossy(e.as_ref());
                    self.doctype = Some(Doctype::parse(&decl));
                }
                Event::PI(e) => {
                    if self.root.is_none() && self.stack.is_empty() {
                        self.processing_instructions.push(ProcessingInstruction {
                            target: String::from_utf8_lossy(e.target()).into_owned(),
                            data: String::from_utf8_lossy(e.content()).trim().to_string(),
                        });
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(Error::InvalidDocument(format!(
                "{} unclosed element(s)",
                self.stack.len()
            )));
        }
        let root = self
            .root
            .ok_or_else(|| Error::InvalidDocument("no document element".into()))?;

        let content_type = if root.name.ns == ns!(html) || root.local_name() == "html" {
            "application/xhtml+xml"
        } else {
            "application/xml"
        };
        let mut doc = SourceDocument::new(root).with_content_type(content_type);
        doc.doctype = self.doctype;
        doc.processing_instructions = self.processing_instructions;
        Ok(doc)
    }

    /// Build the node for a start tag and push its namespace scope.
    fn open(&mut self, e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<StyleNode> {
        let mut raw_attrs = Vec::new();
        let mut scope = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
            if key == "xmlns" {
                scope.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.push((Some(prefix.to_string()), value.clone()));
            }
            raw_attrs.push((key, value));
        }
        self.scopes.push(scope);

        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut node = StyleNode::new(self.element_name(&name));
        for (key, value) in raw_attrs {
            if key == "style" {
                node.style = StyleTable::parse(&value);
                continue;
            }
            node.attributes.push(Attribute {
                name: attribute_name(&key),
                value,
            });
        }
        Ok(node)
    }

    fn element_name(&self, raw: &str) -> QualName {
        let (prefix, local) = split_name(raw);
        let ns = self
            .lookup_namespace(prefix)
            .map(Namespace::from)
            .unwrap_or(ns!());
        QualName::new(prefix.map(Prefix::from), ns, LocalName::from(local))
    }

    fn lookup_namespace(&self, prefix: Option<&str>) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .flatten()
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    fn attach(&mut self, node: StyleNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(NodeChild::Element(node)),
            None if self.root.is_none() => self.root = Some(node),
            None => log::warn!("ignoring second document element <{}>", node.local_name()),
        }
    }

    /// Append text, merging with a preceding text child. Indentation-only
    /// text (whitespace containing a newline) is dropped.
    fn push_text(&mut self, text: &str) {
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        if let Some(NodeChild::Text(prev)) = parent.children.last_mut() {
            prev.push_str(text);
            return;
        }
        if text.trim().is_empty() && text.contains('\n') && !preserves_space(parent) {
            return;
        }
        parent.children.push(NodeChild::Text(text.to_string()));
    }
}

fn preserves_space(node: &StyleNode) -> bool {
    node.style
        .white_space
        .as_ref()
        .and_then(|v| v.as_keyword())
        .is_some_and(|k| k == "pre" || k == "pre-wrap")
}

fn split_name(raw: &str) -> (Option<&str>, &str) {
    match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    }
}

fn attribute_name(raw: &str) -> QualName {
    match split_name(raw) {
        (None, "xmlns") => QualName::new(None, ns!(xmlns), LocalName::from("xmlns")),
        (None, local) => QualName::new(None, ns!(), LocalName::from(local)),
        (Some("xml"), local) => QualName::new(Some(Prefix::from("xml")), ns!(xml), LocalName::from(local)),
        (Some("xmlns"), local) => {
            QualName::new(Some(Prefix::from("xmlns")), ns!(xmlns), LocalName::from(local))
        }
        // Other prefixes are kept verbatim; attribute namespaces are not
        // consulted by the cascade.
        (Some(prefix), local) => {
            QualName::new(Some(Prefix::from(prefix)), ns!(), LocalName::from(local))
        }
    }
}

fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let resolved = match entity {
        "apos" => "'",
        "quot" => "\"",
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "nbsp" => "\u{a0}",
        _ => return None,
    };
    Some(resolved.to_string())
}
