//! Source document model.
//!
//! A [`SourceDocument`] is an owned tree of [`StyleNode`]s whose CSS has
//! already been resolved per element into a [`StyleTable`]. Trees are built
//! once per load (by hand or through [`reader`]) and not mutated afterwards.

pub mod reader;

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::style::StyleTable;

/// Namespace of RDF/XML documents.
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Whether `name` is the `rdf:RDF` container element.
pub fn is_rdf_name(name: &QualName) -> bool {
    &*name.local == "RDF" && &*name.ns == RDF_NS
}

/// Build an un-namespaced qualified name.
pub fn qual_name(local: &str) -> QualName {
    QualName::new(None, ns!(), LocalName::from(local))
}

/// Build a qualified name in namespace `ns`.
pub fn qual_name_ns(ns: &str, local: &str) -> QualName {
    QualName::new(None, Namespace::from(ns), LocalName::from(local))
}

/// Element attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    pub fn new(local: &str, value: impl Into<String>) -> Self {
        Self {
            name: qual_name(local),
            value: value.into(),
        }
    }

    pub fn local_name(&self) -> &str {
        self.name.local.as_ref()
    }

    /// Whether this is an `id` or `xml:id` attribute.
    pub fn is_id(&self) -> bool {
        self.name.local.as_ref() == "id" && (self.name.ns == ns!() || self.name.ns == ns!(xml))
    }
}

/// A child of a [`StyleNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChild {
    Element(StyleNode),
    Text(String),
    CData(String),
}

impl NodeChild {
    pub fn as_element(&self) -> Option<&StyleNode> {
        match self {
            NodeChild::Element(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeChild::Text(text) | NodeChild::CData(text) => Some(text),
            NodeChild::Element(_) => None,
        }
    }
}

/// An element together with its resolved style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleNode {
    pub name: QualName,
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeChild>,
    pub style: StyleTable,
}

impl StyleNode {
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            style: StyleTable::new(),
        }
    }

    /// Un-namespaced element named `local`.
    pub fn element(local: &str) -> Self {
        Self::new(qual_name(local))
    }

    pub fn with_attribute(mut self, local: &str, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(local, value));
        self
    }

    pub fn with_style(mut self, style: StyleTable) -> Self {
        self.style = style;
        self
    }

    /// Parse `css` as this node's style.
    pub fn with_css(self, css: &str) -> Self {
        self.with_style(StyleTable::parse(css))
    }

    pub fn with_child(mut self, child: StyleNode) -> Self {
        self.children.push(NodeChild::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(NodeChild::Text(text.into()));
        self
    }

    pub fn with_cdata(mut self, text: impl Into<String>) -> Self {
        self.children.push(NodeChild::CData(text.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        self.name.local.as_ref()
    }

    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name() == local)
            .map(|a| a.value.as_str())
    }

    /// The element's `id` or `xml:id`.
    pub fn id(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is_id())
            .map(|a| a.value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &StyleNode> {
        self.children.iter().filter_map(NodeChild::as_element)
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                NodeChild::Element(node) => node.collect_text(out),
                NodeChild::Text(text) | NodeChild::CData(text) => out.push_str(text),
            }
        }
    }
}

/// Document type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype {
    pub name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl Doctype {
    /// Parse the content of a `<!DOCTYPE ...>` declaration.
    pub fn parse(decl: &str) -> Self {
        let decl = decl.trim();
        let (name, rest) = match decl.find(char::is_whitespace) {
            Some(i) => (&decl[..i], decl[i..].trim_start()),
            None => (decl, ""),
        };
        let quoted = quoted_strings(rest);
        let (public_id, system_id) = if rest.starts_with("PUBLIC") {
            (quoted.first().cloned(), quoted.get(1).cloned())
        } else if rest.starts_with("SYSTEM") {
            (None, quoted.first().cloned())
        } else {
            (None, None)
        };
        Self {
            name: name.to_string(),
            public_id,
            system_id,
        }
    }
}

fn quoted_strings(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find(['"', '\'']) {
        let quote = rest[start..].chars().next().unwrap_or('"');
        let after = &rest[start + 1..];
        let Some(end) = after.find(quote) else {
            break;
        };
        out.push(after[..end].to_string());
        rest = &after[end + 1..];
    }
    out
}

/// `<?target data?>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

/// One loaded XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub root: StyleNode,
    pub base_uri: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub doctype: Option<Doctype>,
    pub processing_instructions: Vec<ProcessingInstruction>,
}

impl SourceDocument {
    pub fn new(root: StyleNode) -> Self {
        Self {
            root,
            base_uri: None,
            content_type: None,
            description: None,
            doctype: None,
            processing_instructions: Vec::new(),
        }
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_doctype(mut self, doctype: Doctype) -> Self {
        self.doctype = Some(doctype);
        self
    }

    /// Index into `root.children` of the `body` element, if this document
    /// is XHTML-like (an `html` root with a `body` child element).
    pub fn body_index(&self) -> Option<usize> {
        if self.root.local_name() != "html" {
            return None;
        }
        self.root.children.iter().position(
            |child| matches!(child, NodeChild::Element(node) if node.local_name() == "body"),
        )
    }

    pub fn is_xhtml(&self) -> bool {
        self.body_index().is_some()
    }

    /// Whether the root is an RDF container, laid out as one unit.
    pub fn is_rdf(&self) -> bool {
        is_rdf_name(&self.root.name)
    }

    /// Metadata carried on the root element's attribute set.
    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            base_uri: self.base_uri.clone(),
            content_type: self.content_type.clone(),
            description: self.description.clone(),
            doctype: self.doctype.clone(),
            processing_instructions: self.processing_instructions.clone(),
            xhtml: self.xhtml_frame(),
        }
    }

    fn xhtml_frame(&self) -> Option<XhtmlFrame> {
        let body_at = self.body_index()?;
        let body = self.root.children[body_at].as_element()?;
        let elements = |children: &[NodeChild]| -> Vec<StyleNode> {
            children
                .iter()
                .filter_map(NodeChild::as_element)
                .cloned()
                .collect()
        };
        Some(XhtmlFrame {
            body_name: body.name.clone(),
            body_attributes: body.attributes.clone(),
            body_style: body.style.clone(),
            leading: elements(&self.root.children[..body_at]),
            trailing: elements(&self.root.children[body_at + 1..]),
        })
    }
}

/// The parts of an XHTML document that are not flattened into runs: the
/// `body` element itself and the elements around it (usually `head`).
#[derive(Debug, Clone, PartialEq)]
pub struct XhtmlFrame {
    pub body_name: QualName,
    pub body_attributes: Vec<Attribute>,
    pub body_style: StyleTable,
    /// Elements before `body`.
    pub leading: Vec<StyleNode>,
    /// Elements after `body`.
    pub trailing: Vec<StyleNode>,
}

/// Document-level metadata attached to a document root's attribute set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentInfo {
    pub base_uri: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub doctype: Option<Doctype>,
    pub processing_instructions: Vec<ProcessingInstruction>,
    pub xhtml: Option<XhtmlFrame>,
}

impl DocumentInfo {
    /// Number of elements preceding `body`; 0 for non-XHTML documents.
    pub fn leading_count(&self) -> usize {
        self.xhtml.as_ref().map_or(0, |frame| frame.leading.len())
    }
}
