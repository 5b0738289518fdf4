//! Flattening source documents into element spec operations.
//!
//! The builder walks each [`SourceDocument`] in order and emits a balanced
//! sequence of [`ElementSpecOp`]s: a start tag per element, content runs for
//! text, and an end tag per element. The whole sequence is wrapped in one
//! synthetic section, and consecutive documents are separated by a page
//! break element holding a single object replacement character.

use std::rc::Rc;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::dom::{NodeChild, SourceDocument, StyleNode, qual_name};
use crate::style::{AttributeSet, CascadeResolver, CssValue, Property, ResolverConfig, SetKind, StyleTable};

/// U+FFFC, the placeholder for content that is not text.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Local name given to synthetic page break elements.
pub const PAGE_BREAK_NAME: &str = "page-break";

/// Characters escaped when an id becomes a URI fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// One step of the flattened element structure.
#[derive(Debug, Clone)]
pub enum ElementSpecOp {
    StartTag(Rc<AttributeSet>),
    /// A text run. The text is never empty.
    Content(Rc<AttributeSet>, String),
    EndTag(Rc<AttributeSet>),
}

impl ElementSpecOp {
    pub fn attributes(&self) -> &Rc<AttributeSet> {
        match self {
            ElementSpecOp::StartTag(attrs)
            | ElementSpecOp::Content(attrs, _)
            | ElementSpecOp::EndTag(attrs) => attrs,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ElementSpecOp::Content(_, text) => Some(text),
            _ => None,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ElementSpecOp::StartTag(_))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, ElementSpecOp::EndTag(_))
    }
}

/// Builder options.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Elements that are empty by nature. Their placeholder run is U+FFFC;
    /// other empty elements get a newline.
    pub empty_elements: Vec<String>,
    /// Style resolution used for `display` and `white-space` decisions.
    pub resolver: ResolverConfig,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            empty_elements: ["img", "br", "hr", "object", "embed", "input"]
                .into_iter()
                .map(String::from)
                .collect(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_element(mut self, local: &str) -> Self {
        self.empty_elements.push(local.to_string());
        self
    }

    pub fn with_empty_elements(mut self, locals: &[&str]) -> Self {
        self.empty_elements = locals.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    fn is_empty_element(&self, local: &str) -> bool {
        self.empty_elements.iter().any(|e| e.eq_ignore_ascii_case(local))
    }
}

/// Flatten `documents` with the default configuration.
pub fn build(documents: &[SourceDocument]) -> Vec<ElementSpecOp> {
    ElementSpecBuilder::new().build(documents)
}

/// Turns [`SourceDocument`]s into [`ElementSpecOp`]s.
#[derive(Debug)]
pub struct ElementSpecBuilder {
    config: BuilderConfig,
    resolver: CascadeResolver,
}

impl Default for ElementSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementSpecBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        let resolver = CascadeResolver::with_config(config.resolver.clone());
        Self { config, resolver }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Flatten `documents`, in order, into one balanced op sequence.
    pub fn build(&self, documents: &[SourceDocument]) -> Vec<ElementSpecOp> {
        let mut ctx = BuildContext {
            builder: self,
            ops: Vec::new(),
        };

        let section = Rc::new(AttributeSet::new(SetKind::Section));
        ctx.ops.push(ElementSpecOp::StartTag(Rc::clone(&section)));

        for (i, doc) in documents.iter().enumerate() {
            if i > 0 {
                ctx.page_break(&section);
            }
            ctx.document(doc, &section);
        }

        ctx.ops.push(ElementSpecOp::EndTag(section));
        log::debug!(
            "built {} ops from {} document(s)",
            ctx.ops.len(),
            documents.len()
        );
        ctx.ops
    }
}

/// Build a page break attribute set.
pub fn page_break_attributes() -> AttributeSet {
    AttributeSet::new(SetKind::PageBreak)
        .with_name(qual_name(PAGE_BREAK_NAME))
        .with_style(StyleTable::new().with(Property::Display, CssValue::keyword("block")))
}

/// `base#id`, with any fragment already on `base` removed.
pub fn target_uri(base: Option<&str>, id: &str) -> String {
    let base = base.unwrap_or("");
    let base = base.split_once('#').map_or(base, |(b, _)| b);
    format!("{base}#{}", utf8_percent_encode(id, FRAGMENT))
}

/// Collapse each run of whitespace into one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

struct BuildContext<'a> {
    builder: &'a ElementSpecBuilder,
    ops: Vec<ElementSpecOp>,
}

impl BuildContext<'_> {
    fn page_break(&mut self, section: &Rc<AttributeSet>) {
        let attrs = Rc::new(page_break_attributes());
        attrs.set_resolve_parent(section);
        self.ops.push(ElementSpecOp::StartTag(Rc::clone(&attrs)));
        self.push_content(&attrs, OBJECT_REPLACEMENT.to_string());
        self.ops.push(ElementSpecOp::EndTag(attrs));
    }

    fn document(&mut self, doc: &SourceDocument, section: &Rc<AttributeSet>) {
        let base = doc.base_uri.as_deref();
        let info = doc.info();

        let Some(body_at) = doc.body_index() else {
            let attrs = self
                .element_attributes(&doc.root, base)
                .with_document(info);
            self.element(&doc.root, Rc::new(attrs), section, base);
            return;
        };

        // XHTML: the html element frames body's children directly
        let Some(body) = doc.root.children[body_at].as_element() else {
            return;
        };
        let body_attrs = Rc::new(self.element_attributes(body, base));
        let root = Rc::new(
            self.element_attributes(&doc.root, base)
                .with_document(info)
                .with_body_scope(Rc::clone(&body_attrs)),
        );
        root.set_resolve_parent(section);
        body_attrs.set_resolve_parent(&root);

        self.ops.push(ElementSpecOp::StartTag(Rc::clone(&root)));
        self.children(&body.children, &body_attrs, base, body.local_name());
        self.ops.push(ElementSpecOp::EndTag(root));
    }

    fn element_attributes(&self, node: &StyleNode, base: Option<&str>) -> AttributeSet {
        let mut attrs = AttributeSet::element(node.name.clone(), node.style.clone())
            .with_attributes(node.attributes.clone());
        if let Some(id) = node.id() {
            attrs = attrs.with_target_uri(target_uri(base, id));
        }
        attrs
    }

    fn element(
        &mut self,
        node: &StyleNode,
        attrs: Rc<AttributeSet>,
        parent: &Rc<AttributeSet>,
        base: Option<&str>,
    ) {
        attrs.set_resolve_parent(parent);
        self.ops.push(ElementSpecOp::StartTag(Rc::clone(&attrs)));
        self.children(&node.children, &attrs, base, node.local_name());
        self.ops.push(ElementSpecOp::EndTag(attrs));
    }

    /// Emit `children` under `parent`, or a placeholder if nothing results.
    fn children(
        &mut self,
        children: &[NodeChild],
        parent: &Rc<AttributeSet>,
        base: Option<&str>,
        local_name: &str,
    ) {
        let resolver = &self.builder.resolver;
        let inline = resolver.display(parent).is_inline();
        let preserve = resolver.white_space(parent).preserves_spaces();
        let start = self.ops.len();

        for (i, child) in children.iter().enumerate() {
            match child {
                NodeChild::Element(node) => {
                    let attrs = Rc::new(self.element_attributes(node, base));
                    self.element(node, attrs, parent, base);
                }
                NodeChild::Text(text) | NodeChild::CData(text) => {
                    let mut text = if preserve {
                        text.clone()
                    } else {
                        collapse_whitespace(text)
                    };
                    if i + 1 == children.len() && !inline {
                        text.push('\n');
                    }
                    if !text.is_empty() {
                        self.push_content(parent, text);
                    }
                }
            }
        }

        if self.ops.len() == start {
            let placeholder = if self.builder.config.is_empty_element(local_name) {
                OBJECT_REPLACEMENT.to_string()
            } else {
                "\n".to_string()
            };
            self.push_content(parent, placeholder);
        }
    }

    fn push_content(&mut self, parent: &Rc<AttributeSet>, text: String) {
        let run = Rc::new(AttributeSet::new(SetKind::Content));
        run.set_resolve_parent(parent);
        self.ops.push(ElementSpecOp::Content(run, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(ops: &[ElementSpecOp]) -> Vec<&str> {
        ops.iter().filter_map(ElementSpecOp::text).collect()
    }

    fn names(ops: &[ElementSpecOp]) -> Vec<String> {
        ops.iter()
            .map(|op| {
                let name = op.attributes().local_name().unwrap_or("#");
                match op {
                    ElementSpecOp::StartTag(_) => format!("<{name}>"),
                    ElementSpecOp::EndTag(_) => format!("</{name}>"),
                    ElementSpecOp::Content(_, text) => format!("{text:?}"),
                }
            })
            .collect()
    }

    #[test]
    fn test_single_document_structure() {
        let doc = SourceDocument::new(
            StyleNode::element("doc")
                .with_css("display: block")
                .with_child(StyleNode::element("p").with_css("display: block").with_text("Hello   world")),
        );
        let ops = build(&[doc]);
        assert_eq!(
            names(&ops),
            vec!["<#>", "<doc>", "<p>", "\"Hello world\\n\"", "</p>", "</doc>", "</#>"]
        );
        assert!(ops[1].attributes().is_document_root());
        assert_eq!(ops[0].attributes().kind, SetKind::Section);
    }

    #[test]
    fn test_inline_parent_gets_no_newline() {
        let doc = SourceDocument::new(
            StyleNode::element("doc").with_child(StyleNode::element("span").with_text("  a \t b ")),
        );
        let ops = build(&[doc]);
        assert_eq!(texts(&ops), vec![" a b "]);
    }

    #[test]
    fn test_preformatted_text_kept() {
        let doc = SourceDocument::new(
            StyleNode::element("pre")
                .with_css("white-space: pre; display: block")
                .with_text("a\n  b"),
        );
        assert_eq!(texts(&build(&[doc])), vec!["a\n  b\n"]);
    }

    #[test]
    fn test_placeholders() {
        let doc = SourceDocument::new(
            StyleNode::element("doc")
                .with_child(StyleNode::element("img"))
                .with_child(StyleNode::element("empty"))
                .with_child(StyleNode::element("span").with_text("")),
        );
        let ops = build(&[doc]);
        assert_eq!(texts(&ops), vec!["\u{FFFC}", "\n", "\n"]);
    }

    #[test]
    fn test_page_breaks_between_documents() {
        let docs: Vec<_> = (0..3)
            .map(|i| SourceDocument::new(StyleNode::element("doc").with_text(format!("d{i}"))))
            .collect();
        let ops = build(&docs);
        let breaks: Vec<_> = ops
            .iter()
            .filter(|op| op.is_start() && op.attributes().is_page_break())
            .collect();
        assert_eq!(breaks.len(), 2);

        let resolver = CascadeResolver::new();
        assert_eq!(
            resolver.display(breaks[0].attributes()),
            crate::style::Display::Block
        );
        let break_at = ops.iter().position(|op| op.attributes().is_page_break()).unwrap();
        assert_eq!(ops[break_at + 1].text(), Some("\u{FFFC}"));
        assert!(ops[break_at + 2].is_end());
    }

    #[test]
    fn test_target_uri() {
        assert_eq!(target_uri(Some("file:/a.xml#old"), "x y"), "file:/a.xml#x%20y");
        assert_eq!(target_uri(None, "n1"), "#n1");

        let doc = SourceDocument::new(StyleNode::element("doc").with_attribute("id", "top"))
            .with_base_uri("http://example.com/d.xml");
        let ops = build(&[doc]);
        assert_eq!(
            ops[1].attributes().target_uri.as_deref(),
            Some("http://example.com/d.xml#top")
        );
    }

    #[test]
    fn test_xhtml_flattens_body() {
        let doc = SourceDocument::new(
            StyleNode::element("html")
                .with_child(StyleNode::element("head").with_child(StyleNode::element("title").with_text("T")))
                .with_child(
                    StyleNode::element("body")
                        .with_css("color: red")
                        .with_child(StyleNode::element("p").with_css("display: block").with_text("x")),
                ),
        );
        let ops = build(&[doc]);
        assert_eq!(
            names(&ops),
            vec!["<#>", "<html>", "<p>", "\"x\\n\"", "</p>", "</html>", "</#>"]
        );

        let root = ops[1].attributes();
        assert_eq!(root.document.as_ref().unwrap().leading_count(), 1);

        // Body style still cascades into its children
        let resolver = CascadeResolver::new();
        assert_eq!(
            resolver.color(ops[3].attributes()),
            crate::style::Color::rgb(255, 0, 0)
        );
    }

    #[test]
    fn test_content_runs_resolve_through_element() {
        let doc = SourceDocument::new(
            StyleNode::element("doc")
                .with_css("font-size: 10pt")
                .with_child(StyleNode::element("b").with_css("font-weight: bold").with_text("x")),
        );
        let ops = build(&[doc]);
        let run = ops.iter().find(|op| op.text().is_some()).unwrap().attributes();
        assert_eq!(run.kind, SetKind::Content);
        let resolver = CascadeResolver::new();
        assert_eq!(resolver.font_size(run), 10.0);
        assert_eq!(resolver.font_weight(run), crate::style::FontWeight::Bold);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let doc = SourceDocument::new(
            StyleNode::element("doc").with_child(StyleNode::element("p").with_text("a")),
        );
        let a = build(std::slice::from_ref(&doc));
        let b = build(std::slice::from_ref(&doc));
        assert_eq!(names(&a), names(&b));
    }
}
