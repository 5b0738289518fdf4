//! Round-trip properties: building the reverse-built documents again yields
//! the same runs.

use proptest::prelude::*;

use styledoc::dom::{NodeChild, SourceDocument, StyleNode};
use styledoc::export::{ExportOptions, reverse_build_ops, write_xml};
use styledoc::style::ToCss;
use styledoc::{ElementSpecOp, build};

const STYLES: &[&str] = &[
    "",
    "display: block",
    "display: block; white-space: pre",
    "font-size: larger; color: navy",
    "display: list-item; list-style-type: lower-roman",
];

const NAMES: &[&str] = &["p", "span", "em", "section", "img", "br"];

/// Shape of an op sequence: tag names, styles and run texts.
fn signature(ops: &[ElementSpecOp]) -> Vec<String> {
    ops.iter()
        .map(|op| {
            let attrs = op.attributes();
            let name = attrs.local_name().unwrap_or("#");
            match op {
                ElementSpecOp::StartTag(_) => format!("<{name} {}>", attrs.style.to_css_string()),
                ElementSpecOp::Content(_, text) => format!("{text:?}"),
                ElementSpecOp::EndTag(_) => format!("</{name}>"),
            }
        })
        .collect()
}

fn node() -> impl Strategy<Value = StyleNode> {
    let leaf = (
        prop::sample::select(NAMES),
        prop::sample::select(STYLES),
        "([a-z][a-z \n]{0,7})?",
    )
        .prop_map(|(name, css, text)| {
            let node = StyleNode::element(name).with_css(css);
            if text.is_empty() { node } else { node.with_text(text) }
        });

    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::sample::select(NAMES),
            prop::sample::select(STYLES),
            prop::collection::vec(
                prop_oneof![
                    inner.prop_map(NodeChild::Element),
                    "[a-z ]{1,6}".prop_map(NodeChild::Text),
                ],
                0..4,
            ),
        )
            .prop_map(|(name, css, children)| {
                let mut node = StyleNode::element(name).with_css(css);
                node.children = children;
                node
            })
    })
}

fn documents() -> impl Strategy<Value = Vec<SourceDocument>> {
    prop::collection::vec(
        node().prop_map(|child| {
            SourceDocument::new(StyleNode::element("doc").with_css("display: block").with_child(child))
        }),
        1..4,
    )
}

proptest! {
    #[test]
    fn prop_rebuild_is_idempotent(docs in documents()) {
        let ops = build(&docs);
        let back = reverse_build_ops(&ops, &ExportOptions::default()).unwrap();
        prop_assert_eq!(back.len(), docs.len());

        let again = build(&back);
        prop_assert_eq!(signature(&again), signature(&ops));

        let back_again = reverse_build_ops(&again, &ExportOptions::default()).unwrap();
        prop_assert_eq!(back_again, back);
    }

    #[test]
    fn prop_written_xml_is_readable(docs in documents()) {
        let back = reverse_build_ops(&build(&docs), &ExportOptions::default()).unwrap();
        for doc in &back {
            let xml = write_xml(doc);
            prop_assert!(styledoc::dom::reader::read_document(&xml).is_ok(), "{}", xml);
        }
    }
}

#[test]
fn test_xhtml_roundtrip() {
    let xhtml = SourceDocument::new(
        StyleNode::element("html")
            .with_child(StyleNode::element("head").with_child(StyleNode::element("title").with_text("T")))
            .with_child(
                StyleNode::element("body")
                    .with_css("font-size: 14pt")
                    .with_child(StyleNode::element("p").with_css("display: block").with_text("one"))
                    .with_child(StyleNode::element("p").with_css("display: block").with_text("two")),
            )
            .with_child(StyleNode::element("script").with_text("x")),
    );
    let plain = SourceDocument::new(StyleNode::element("doc").with_text("after"));
    let docs = vec![xhtml, plain];

    let back = reverse_build_ops(&build(&docs), &ExportOptions::default()).unwrap();
    assert_eq!(back, docs);
}
