//! Cascade tests over built documents.
//!
//! These tests read real XML through the reader, flatten it and query the
//! resolver the way a renderer would.

use styledoc::dom::reader::{read_document, read_file};
use styledoc::dom::{SourceDocument, StyleNode};
use styledoc::style::{Color, FontStyle, FontWeight, LineHeight, ResolverConfig, Side};
use styledoc::{ElementId, StyledDocument, build};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn load(names: &[&str]) -> StyledDocument {
    let sources: Vec<_> = names
        .iter()
        .map(|name| read_file(fixture_path(name)).expect("Failed to read fixture"))
        .collect();
    StyledDocument::from_specs(&build(&sources)).expect("Failed to build document")
}

/// Elements with local name `name`, in document order.
fn find(doc: &StyledDocument, name: &str) -> Vec<ElementId> {
    (0..doc.elements().len())
        .filter(|&id| doc.elements()[id].attributes.local_name() == Some(name))
        .collect()
}

fn by_id(doc: &StyledDocument, id: &str) -> ElementId {
    (0..doc.elements().len())
        .find(|&e| doc.elements()[e].attributes.attribute("id") == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ============================================================================
// Font size
// ============================================================================

#[test]
fn test_default_font_size() {
    let doc = StyledDocument::from_specs(&build(&[SourceDocument::new(
        StyleNode::element("doc").with_text("plain"),
    )]))
    .unwrap();
    let leaf = doc.leaf_at(0).unwrap();
    assert_eq!(doc.resolver().font_size(doc.attributes(leaf).unwrap()), 12.0);
}

#[test]
fn test_relative_sizes_against_parent() {
    let doc = load(&["notes.xml"]);
    let resolver = doc.resolver();

    assert_eq!(resolver.font_size(&doc.elements()[by_id(&doc, "n1")].attributes), 10.0);
    assert!(close(
        resolver.font_size(&doc.elements()[by_id(&doc, "n2")].attributes),
        12.0
    ));
    assert!(close(
        resolver.font_size(&doc.elements()[by_id(&doc, "n3")].attributes),
        15.0
    ));
}

#[test]
fn test_smaller_against_parent() {
    let source = read_document(
        r#"<doc style="font-size: 10pt"><small style="font-size: smaller">x</small></doc>"#,
    )
    .unwrap();
    let doc = StyledDocument::from_specs(&build(&[source])).unwrap();
    let small = find(&doc, "small")[0];
    assert!(close(
        doc.resolver().font_size(&doc.elements()[small].attributes),
        10.0 / 1.2
    ));
}

#[test]
fn test_configured_default_font_size() {
    let source = SourceDocument::new(StyleNode::element("doc").with_text("x"));
    let config = ResolverConfig::default().with_default_font_size(16.0);
    let doc = StyledDocument::from_specs_with(&build(&[source]), config).unwrap();
    let leaf = doc.leaf_at(0).unwrap();
    assert_eq!(doc.resolver().font_size(doc.attributes(leaf).unwrap()), 16.0);
}

// ============================================================================
// Fonts, colors, box
// ============================================================================

#[test]
fn test_xhtml_body_style_reaches_runs() {
    let doc = load(&["chapter.xhtml"]);
    let resolver = doc.resolver();

    let p = find(&doc, "p")[0];
    let attrs = &doc.elements()[p].attributes;
    assert_eq!(resolver.font_size(attrs), 11.0);
    // Georgia is not a platform family, the generic fallback is
    assert_eq!(resolver.font_family(attrs), "Serif");
    assert_eq!(resolver.text_indent(attrs), 0.0);

    let em = find(&doc, "em")[0];
    let font = resolver.font(&doc.elements()[em].attributes);
    assert_eq!(font.style, FontStyle::Italic);
    assert_eq!(font.weight, FontWeight::Normal);

    let h1 = find(&doc, "h1")[0];
    let h1 = &doc.elements()[h1].attributes;
    assert!(resolver.font(h1).is_bold());
    assert_eq!(resolver.margin(h1, Side::Bottom), 6.0);

    let pre = find(&doc, "pre")[0];
    assert_eq!(resolver.font_family(&doc.elements()[pre].attributes), "Monospaced");
}

#[test]
fn test_local_and_effective_background() {
    let doc = load(&["notes.xml"]);
    let resolver = doc.resolver();
    let yellow = Color::rgb(255, 255, 0);

    let notes = find(&doc, "notes")[0];
    assert_eq!(resolver.background_color(&doc.elements()[notes].attributes), Some(yellow));

    let note = &doc.elements()[by_id(&doc, "n1")].attributes;
    assert_eq!(resolver.background_color(note), None);
    assert_eq!(resolver.effective_background_color(note), yellow);

    let plain = StyledDocument::from_specs(&build(&[SourceDocument::new(
        StyleNode::element("doc").with_text("x"),
    )]))
    .unwrap();
    let root = plain.top_level()[0];
    assert_eq!(
        plain.resolver().effective_background_color(&plain.elements()[root].attributes),
        Color::WHITE
    );
}

#[test]
fn test_color_inherits_and_line_height_defaults() {
    let doc = load(&["chapter.xhtml"]);
    let resolver = doc.resolver();
    let last = *find(&doc, "p").last().unwrap();
    let run = doc.children(last)[0];
    assert_eq!(resolver.color(&doc.elements()[run].attributes), Color::rgb(0x33, 0x66, 0x99));
    assert_eq!(
        resolver.line_height(&doc.elements()[run].attributes),
        LineHeight::Multiplier(1.0)
    );
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_markers() {
    let doc = load(&["notes.xml", "chapter.xhtml"]);

    let items = find(&doc, "item");
    let markers: Vec<_> = items.iter().map(|&i| doc.list_marker(i)).collect();
    assert_eq!(
        markers,
        vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
    );

    let li = find(&doc, "li");
    assert_eq!(doc.list_marker(li[2]).as_deref(), Some("III"));

    // Not a list item
    assert_eq!(doc.list_marker(by_id(&doc, "n1")), None);
}
