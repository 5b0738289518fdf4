//! Pagination of whole views into fragments.

use std::rc::Rc;

use super::fragment::{FragmentView, WholeView};
use crate::style::{AttributeSet, Display, Font, Side};
use crate::text::{ElementId, ElementKind, StyledDocument};

/// Measures set text. Hosts with real font metrics supply their own.
pub trait TextMeasurer {
    /// Height in points of `text` in `font`, wrapped at `width` points, with
    /// lines `line_height` points apart.
    fn text_height(&self, text: &str, font: &Font, line_height: f32, width: f32) -> f32;
}

/// Measures text assuming every character has the same advance.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    /// Character advance as a fraction of the font size.
    pub advance: f32,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn text_height(&self, text: &str, font: &Font, line_height: f32, width: f32) -> f32 {
        let advance = (font.size * self.advance).max(f32::EPSILON);
        let per_line = ((width / advance).floor() as usize).max(1);
        let body = text.strip_suffix('\n').unwrap_or(text);
        let lines: usize = body
            .split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum();
        lines as f32 * line_height
    }
}

/// Page geometry in points.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    pub page_height: f32,
    pub page_width: f32,
}

impl Default for LayoutConfig {
    /// US Letter with one inch margins.
    fn default() -> Self {
        Self {
            page_height: 648.0,
            page_width: 468.0,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_height(mut self, height: f32) -> Self {
        self.page_height = height;
        self
    }

    pub fn with_page_width(mut self, width: f32) -> Self {
        self.page_width = width;
        self
    }
}

/// One laid-out page.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub fragments: Vec<FragmentView>,
    /// Height used, in points.
    pub used: f32,
}

/// Splits whole views across pages.
pub struct LayoutPass<'a> {
    doc: &'a StyledDocument,
    config: LayoutConfig,
    measurer: Box<dyn TextMeasurer + 'a>,
}

impl<'a> LayoutPass<'a> {
    pub fn new(doc: &'a StyledDocument) -> Self {
        Self::with_config(doc, LayoutConfig::default())
    }

    pub fn with_config(doc: &'a StyledDocument, config: LayoutConfig) -> Self {
        Self {
            doc,
            config,
            measurer: Box::new(HeuristicMeasurer::default()),
        }
    }

    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'a) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Whole views for the top-level elements of the document.
    pub fn top_level_views(&self) -> Vec<Rc<WholeView>> {
        self.doc
            .top_level()
            .iter()
            .filter_map(|&id| WholeView::for_element(self.doc, id))
            .collect()
    }

    /// Height of element `id` laid out `width` points wide.
    pub fn measure(&self, id: ElementId, width: f32) -> f32 {
        measure_element(self.doc, self.measurer.as_ref(), id, width)
    }

    /// Lay `wholes` out in order.
    ///
    /// Each whole is split between its children wherever the next child
    /// does not fit or a forced page break applies. Page break elements end
    /// the current page.
    pub fn paginate(&self, wholes: &[Rc<WholeView>]) -> Vec<Page> {
        let mut pages = vec![Page::default()];
        for whole in wholes {
            self.place(whole, &mut pages);
        }
        if pages.len() > 1 && pages.last().is_some_and(|p| p.fragments.is_empty()) {
            pages.pop();
        }
        log::debug!("laid out {} view(s) on {} page(s)", wholes.len(), pages.len());
        pages
    }

    /// Lay out again the wholes behind `pages`, dropping stale fragments.
    pub fn reflow(&self, pages: Vec<Page>) -> Vec<Page> {
        let mut wholes: Vec<Rc<WholeView>> = Vec::new();
        for fragment in pages.into_iter().flat_map(|p| p.fragments) {
            match fragment.whole() {
                Ok(whole) => {
                    if !wholes.iter().any(|w| Rc::ptr_eq(w, &whole)) {
                        wholes.push(whole);
                    }
                }
                Err(e) => log::warn!("discarding fragment: {e}"),
            }
        }
        self.paginate(&wholes)
    }

    fn new_page(pages: &mut Vec<Page>) {
        if pages.last().is_some_and(|p| !p.fragments.is_empty()) {
            pages.push(Page::default());
        }
    }

    fn place(&self, whole: &Rc<WholeView>, pages: &mut Vec<Page>) {
        let attrs = whole.attributes();
        let resolver = self.doc.resolver();

        if attrs.is_page_break() {
            if let Some(page) = pages.last_mut() {
                page.fragments.push(whole.create_fragment(true, true, 0..whole.children().len()));
            }
            pages.push(Page::default());
            return;
        }
        if resolver.page_break_before(&attrs).is_forced() {
            Self::new_page(pages);
        }

        let width = self.config.page_width;
        let children = whole.children();
        let mut start = 0;
        let mut first = true;

        for (i, &child) in children.iter().enumerate() {
            let Some(element) = self.doc.element(child) else {
                log::warn!("skipping element {child} missing from the document");
                continue;
            };
            let child_attrs = &element.attributes;
            let height = self.measure(child, width);
            let used = pages.last().map_or(0.0, |p| p.used);

            let forced = i > start && resolver.page_break_before(child_attrs).is_forced();
            let overflow = i > start && used + height > self.config.page_height;
            if forced || overflow {
                close(whole, pages, start..i, first, false);
                first = false;
                start = i;
                pages.push(Page::default());
            }
            if let Some(page) = pages.last_mut() {
                page.used += height;
            }
            if i + 1 < children.len() && resolver.page_break_after(child_attrs).is_forced() {
                close(whole, pages, start..i + 1, first, false);
                first = false;
                start = i + 1;
                pages.push(Page::default());
            }
        }
        close(whole, pages, start..children.len(), first, true);

        if resolver.page_break_after(&attrs).is_forced() {
            pages.push(Page::default());
        }
    }
}

fn close(
    whole: &Rc<WholeView>,
    pages: &mut [Page],
    range: std::ops::Range<usize>,
    first: bool,
    last: bool,
) {
    if let Some(page) = pages.last_mut() {
        page.fragments.push(whole.create_fragment(first, last, range));
    }
}

fn flows_inline(doc: &StyledDocument, attrs: &AttributeSet, leaf: bool) -> bool {
    leaf || doc.resolver().display(attrs).is_inline()
}

/// Height of an element: text runs and inline children flow together as
/// one paragraph in the element's font, block children stack.
pub(crate) fn measure_element(
    doc: &StyledDocument,
    measurer: &dyn TextMeasurer,
    id: ElementId,
    width: f32,
) -> f32 {
    let Some(element) = doc.element(id) else {
        return 0.0;
    };
    let resolver = doc.resolver();
    let attrs = &element.attributes;
    if resolver.display(attrs) == Display::None {
        return 0.0;
    }

    let paragraph = |text: &str| -> f32 {
        let font = resolver.font(attrs);
        let line = resolver.line_height(attrs).to_points(font.size);
        measurer.text_height(text, &font, line, width)
    };

    let children = match &element.kind {
        ElementKind::Leaf { text } => return paragraph(text),
        ElementKind::Branch { children } => children,
    };

    let vertical = |side| resolver.margin(attrs, side) + resolver.padding(attrs, side);
    let horizontal = vertical(Side::Left) + vertical(Side::Right);
    let inner = (width - horizontal).max(1.0);

    let mut height = vertical(Side::Top) + vertical(Side::Bottom);
    let mut run = String::new();
    for &child in children {
        let child_el = &doc.elements()[child];
        if flows_inline(doc, &child_el.attributes, child_el.is_leaf()) {
            run.push_str(&doc.text_range(child_el.range()));
        } else {
            if !run.is_empty() {
                height += paragraph(&run);
                run.clear();
            }
            height += measure_element(doc, measurer, child, inner);
        }
    }
    if !run.is_empty() {
        height += paragraph(&run);
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::dom::{SourceDocument, StyleNode};
    use crate::style::{FontStyle, FontWeight};

    fn font(size: f32) -> Font {
        Font::new("Serif", size, FontWeight::Normal, FontStyle::Normal)
    }

    #[test]
    fn test_heuristic_measurer() {
        let m = HeuristicMeasurer::default();
        // 10pt font, 5pt advance, 20 characters per line at 100pt
        assert_eq!(m.text_height("short\n", &font(10.0), 12.0, 100.0), 12.0);
        assert_eq!(m.text_height(&"x".repeat(41), &font(10.0), 12.0, 100.0), 36.0);
        assert_eq!(m.text_height("a\nb", &font(10.0), 12.0, 100.0), 24.0);
    }

    fn paragraphs(n: usize, css: impl Fn(usize) -> String) -> StyledDocument {
        let mut root = StyleNode::element("doc").with_css("display: block");
        for i in 0..n {
            root = root.with_child(
                StyleNode::element("p")
                    .with_css(&format!("display: block; {}", css(i)))
                    .with_text(format!("paragraph {i}")),
            );
        }
        StyledDocument::from_specs(&build(&[SourceDocument::new(root)])).unwrap()
    }

    #[test]
    fn test_whole_fits_one_page() {
        let doc = paragraphs(3, |_| String::new());
        let pass = LayoutPass::new(&doc);
        let pages = pass.paginate(&pass.top_level_views());
        assert_eq!(pages.len(), 1);
        let fragment = &pages[0].fragments[0];
        assert!(fragment.is_first() && fragment.is_last());
        assert_eq!(fragment.children().unwrap().len(), 3);
    }

    #[test]
    fn test_split_across_pages() {
        let doc = paragraphs(10, |_| String::new());
        // Each paragraph is one 12pt line
        let config = LayoutConfig::new().with_page_height(40.0);
        let pass = LayoutPass::with_config(&doc, config);
        let pages = pass.paginate(&pass.top_level_views());

        let fragments: Vec<_> = pages.iter().flat_map(|p| p.fragments.iter()).collect();
        assert_eq!(pages.len(), 4);
        assert!(fragments[0].is_first() && !fragments[0].is_last());
        assert!(!fragments[1].is_first() && !fragments[1].is_last());
        assert!(fragments[3].is_last());
        assert_eq!(fragments[0].child_range(), 0..3);
        assert_eq!(fragments[3].child_range(), 9..10);
        assert!(fragments.windows(2).all(|w| w[0].same_whole(w[1])));
    }

    #[test]
    fn test_forced_breaks() {
        let doc = paragraphs(4, |i| {
            if i == 2 {
                "page-break-before: always".to_string()
            } else {
                String::new()
            }
        });
        let pass = LayoutPass::new(&doc);
        let pages = pass.paginate(&pass.top_level_views());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].fragments[0].child_range(), 0..2);
        assert_eq!(pages[1].fragments[0].child_range(), 2..4);
    }

    #[test]
    fn test_page_break_elements_end_pages() {
        let docs: Vec<_> = (0..3)
            .map(|i| SourceDocument::new(StyleNode::element("doc").with_text(format!("d{i}"))))
            .collect();
        let doc = StyledDocument::from_specs(&build(&docs)).unwrap();
        let pass = LayoutPass::new(&doc);
        let pages = pass.paginate(&pass.top_level_views());
        assert_eq!(pages.len(), 3);
    }

    #[test]
    fn test_reflow_discards_stale_fragments() {
        let doc = paragraphs(2, |_| String::new());
        let docs = vec![
            SourceDocument::new(StyleNode::element("a").with_text("x")),
            SourceDocument::new(StyleNode::element("b").with_text("y")),
        ];
        let two = StyledDocument::from_specs(&build(&docs)).unwrap();

        let pass = LayoutPass::new(&two);
        let wholes = pass.top_level_views();
        let pages = pass.paginate(&wholes);
        let before: usize = pages.iter().map(|p| p.fragments.len()).sum();

        wholes[0].detach();
        let after = pass.reflow(pages);
        let count: usize = after.iter().map(|p| p.fragments.len()).sum();
        assert_eq!(count, before - 1);
        assert!(after.iter().flat_map(|p| &p.fragments).all(|f| !f.is_stale()));

        // Single-page documents are unaffected
        let pass = LayoutPass::new(&doc);
        assert_eq!(pass.reflow(pass.paginate(&pass.top_level_views())).len(), 1);
    }

    #[test]
    fn test_unknown_children_are_skipped() {
        let doc = paragraphs(2, |_| String::new());
        let root = doc.top_level()[0];
        let mut children = doc.children(root).to_vec();
        children.push(doc.elements().len() + 10);
        let whole = WholeView::new(root, Rc::clone(&doc.elements()[root].attributes), children);

        let pass = LayoutPass::new(&doc);
        let pages = pass.paginate(&[whole]);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].fragments[0].child_range(), 0..3);
    }

    #[test]
    fn test_measure_box_and_hidden() {
        let root = StyleNode::element("doc")
            .with_css("display: block; margin-top: 10pt; padding-bottom: 2pt")
            .with_child(StyleNode::element("p").with_css("display: none").with_text("hidden"))
            .with_text("one line");
        let doc = StyledDocument::from_specs(&build(&[SourceDocument::new(root)])).unwrap();
        let pass = LayoutPass::new(&doc);
        let id = doc.top_level()[0];
        assert_eq!(pass.measure(id, 468.0), 10.0 + 2.0 + 12.0);
    }
}
