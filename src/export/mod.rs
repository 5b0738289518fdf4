//! Export of styled documents back to source form.
//!
//! [`reverse_build`] undoes what the builder did: it splits the section at
//! page breaks, re-wraps XHTML bodies and drops synthetic runs.
//! [`write_xml`] serializes the result.
//!
//! # Architecture
//!
//! The `Exporter` trait uses a builder pattern:
//! - `new()` creates an exporter with default configuration
//! - `with_config()` allows customization
//! - `export()` writes to any `Write` destination
//!
//! # Example
//!
//! ```
//! use styledoc::dom::{SourceDocument, StyleNode};
//! use styledoc::export::{ExportOptions, Exporter, XmlExporter};
//! use styledoc::{StyledDocument, build};
//!
//! let source = SourceDocument::new(StyleNode::element("doc").with_text("Hello"));
//! let doc = StyledDocument::from_specs(&build(&[source]))?;
//!
//! let mut out = Vec::new();
//! XmlExporter::with_config(ExportOptions::new().with_pretty(true)).export(&doc, &mut out)?;
//! assert!(String::from_utf8_lossy(&out).contains("<doc>Hello</doc>"));
//! # Ok::<(), styledoc::Error>(())
//! ```

use std::io::Write;

use crate::error::Result;
use crate::text::StyledDocument;

mod reverse;
mod xml;

pub use reverse::{reverse_build, reverse_build_ops};
pub use xml::{escape_xml, write_xml};

/// Options for rebuilding source documents.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Re-insert tab indentation between element children.
    pub pretty: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Trait for writing styled documents to a specific format.
pub trait Exporter {
    /// Export `doc` to the provided writer.
    fn export<W: Write>(&self, doc: &StyledDocument, writer: &mut W) -> Result<()>;
}

/// Writes each source document as XML, in order.
#[derive(Debug, Clone, Default)]
pub struct XmlExporter {
    options: ExportOptions,
}

impl XmlExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(options: ExportOptions) -> Self {
        Self { options }
    }
}

impl Exporter for XmlExporter {
    fn export<W: Write>(&self, doc: &StyledDocument, writer: &mut W) -> Result<()> {
        for source in reverse_build(doc, &self.options)? {
            writer.write_all(write_xml(&source).as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::dom::{SourceDocument, StyleNode};

    #[test]
    fn test_exporter_writes_each_document() {
        let docs: Vec<_> = ["a", "b"]
            .iter()
            .map(|t| SourceDocument::new(StyleNode::element("doc").with_text(*t)))
            .collect();
        let doc = StyledDocument::from_specs(&build(&docs)).unwrap();

        let mut out = Vec::new();
        XmlExporter::new().export(&doc, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("<?xml").count(), 2);
        assert!(text.contains("<doc>a</doc>"));
        assert!(text.contains("<doc>b</doc>"));
    }
}
