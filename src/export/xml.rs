//! XML serialization of source documents.

use html5ever::QualName;

use crate::dom::{Attribute, NodeChild, SourceDocument, StyleNode};
use crate::style::ToCss;

/// Serialize `doc` as an XML document.
///
/// The `style` attribute is regenerated from each element's style table.
pub fn write_xml(doc: &SourceDocument) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

    for pi in &doc.processing_instructions {
        out.push_str("<?");
        out.push_str(&pi.target);
        if !pi.data.is_empty() {
            out.push(' ');
            out.push_str(&pi.data);
        }
        out.push_str("?>\n");
    }

    if let Some(doctype) = &doc.doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(&doctype.name);
        match (&doctype.public_id, &doctype.system_id) {
            (Some(public), Some(system)) => {
                out.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
            }
            (Some(public), None) => out.push_str(&format!(" PUBLIC \"{public}\"")),
            (None, Some(system)) => out.push_str(&format!(" SYSTEM \"{system}\"")),
            (None, None) => {}
        }
        out.push_str(">\n");
    }

    write_element(&doc.root, &mut out);
    out.push('\n');
    out
}

fn write_element(node: &StyleNode, out: &mut String) {
    let name = qualified(&node.name);
    out.push('<');
    out.push_str(&name);
    for attr in &node.attributes {
        write_attribute(attr, out);
    }
    if !node.style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&escape_xml(&node.style.to_css_string()));
        out.push('"');
    }

    if node.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    for child in &node.children {
        match child {
            NodeChild::Element(element) => write_element(element, out),
            NodeChild::Text(text) => out.push_str(&escape_xml(text)),
            NodeChild::CData(text) => {
                // "]]>" cannot appear inside a CDATA section
                out.push_str("<![CDATA[");
                out.push_str(&text.replace("]]>", "]]]]><![CDATA[>"));
                out.push_str("]]>");
            }
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn write_attribute(attr: &Attribute, out: &mut String) {
    out.push(' ');
    out.push_str(&qualified(&attr.name));
    out.push_str("=\"");
    out.push_str(&escape_xml(&attr.value));
    out.push('"');
}

fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// Escape special XML characters.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::reader::read_document;
    use crate::dom::{Doctype, ProcessingInstruction};

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_write_document() {
        let mut doc = SourceDocument::new(
            StyleNode::element("doc")
                .with_attribute("id", "d1")
                .with_css("color: red")
                .with_child(StyleNode::element("p").with_text("1 < 2"))
                .with_child(StyleNode::element("br"))
                .with_cdata("x]]>y"),
        )
        .with_doctype(Doctype::parse("doc SYSTEM \"doc.dtd\""));
        doc.processing_instructions.push(ProcessingInstruction {
            target: "xml-stylesheet".into(),
            data: "href=\"s.css\"".into(),
        });

        let xml = write_xml(&doc);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<?xml-stylesheet href=\"s.css\"?>\n"));
        assert!(xml.contains("<!DOCTYPE doc SYSTEM \"doc.dtd\">\n"));
        assert!(xml.contains("<doc id=\"d1\" style=\"color: "));
        assert!(xml.contains("<p>1 &lt; 2</p><br/>"));
        assert!(xml.contains("<![CDATA[x]]]]><![CDATA[>y]]>"));
    }

    #[test]
    fn test_written_xml_reads_back() {
        let xml = r#"<?xml version="1.0"?>
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en"><head><title>T</title></head><body style="font-size: 10pt"><p>a &amp; b</p></body></html>"#;
        let doc = read_document(xml).unwrap();
        let again = read_document(&write_xml(&doc)).unwrap();
        assert_eq!(again.root, doc.root);
        assert_eq!(again.doctype, doc.doctype);
    }
}
