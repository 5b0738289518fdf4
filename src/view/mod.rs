//! Render-time views over a [`StyledDocument`].
//!
//! A block element gets one [`WholeView`]. Layout splits it into
//! [`FragmentView`]s, one per page it touches; fragments delegate
//! attribute and identity queries back to the whole. Embedded components
//! (images, objects) are atomic [`EmbedView`]s. [`SectionView`] sits above
//! all of them and maps the section's top-level children back to their
//! source documents.

mod fragment;
mod layout;
mod section;

use std::ops::Range;
use std::rc::Rc;

use crate::error::Result;
use crate::style::AttributeSet;
use crate::text::{ElementId, StyledDocument};

pub use fragment::{FragmentView, WholeView};
pub use layout::{HeuristicMeasurer, LayoutConfig, LayoutPass, Page, TextMeasurer};
pub use section::{ForwardedChange, RangeKind, SectionRange, SectionView, SourceChange};

/// Elements rendered as embedded components rather than text.
const EMBED_ELEMENTS: &[&str] = &["img", "object", "embed"];

/// What every view can answer.
pub trait ViewCapabilities {
    /// The attribute set styling this view.
    fn attributes(&self) -> Result<Rc<AttributeSet>>;

    /// Height in points when laid out `width` points wide.
    fn measure(&self, doc: &StyledDocument, measurer: &dyn TextMeasurer, width: f32) -> Result<f32>;

    /// A piece of this view covering `children`, if it can be split.
    fn fragment(&self, first: bool, last: bool, children: Range<usize>) -> Option<FragmentView>;
}

/// An embedded component with a fixed size.
#[derive(Debug, Clone)]
pub struct EmbedView {
    pub element: ElementId,
    pub attributes: Rc<AttributeSet>,
    /// Width in points, if the element declares one.
    pub width: Option<f32>,
    /// Height in points; 0 if undeclared.
    pub height: f32,
}

impl EmbedView {
    pub fn new(element: ElementId, attributes: Rc<AttributeSet>) -> Self {
        let width = attributes.attribute("width").and_then(dimension);
        let height = attributes.attribute("height").and_then(dimension).unwrap_or(0.0);
        Self {
            element,
            attributes,
            width,
            height,
        }
    }
}

/// A `width`/`height` attribute in points. Bare numbers are pixels.
fn dimension(value: &str) -> Option<f32> {
    let value = value.trim();
    if let Some(pt) = value.strip_suffix("pt") {
        return pt.trim().parse().ok();
    }
    let px: f32 = value.strip_suffix("px").unwrap_or(value).trim().parse().ok()?;
    Some(px * 0.75)
}

/// The closed set of views.
#[derive(Debug, Clone)]
pub enum View {
    Block(Rc<WholeView>),
    Fragment(FragmentView),
    ComponentEmbed(EmbedView),
}

impl View {
    /// The view for element `id`: an embed for component elements, a
    /// whole block otherwise.
    pub fn for_element(doc: &StyledDocument, id: ElementId) -> Option<View> {
        let attrs = doc.attributes(id)?;
        if attrs
            .local_name()
            .is_some_and(|name| EMBED_ELEMENTS.iter().any(|e| name.eq_ignore_ascii_case(e)))
        {
            return Some(View::ComponentEmbed(EmbedView::new(id, Rc::clone(attrs))));
        }
        WholeView::for_element(doc, id).map(View::Block)
    }

    pub fn element(&self) -> Result<ElementId> {
        match self {
            View::Block(whole) => Ok(whole.element()),
            View::Fragment(fragment) => fragment.element(),
            View::ComponentEmbed(embed) => Ok(embed.element),
        }
    }
}

impl ViewCapabilities for View {
    fn attributes(&self) -> Result<Rc<AttributeSet>> {
        match self {
            View::Block(whole) => Ok(whole.attributes()),
            View::Fragment(fragment) => fragment.attributes(),
            View::ComponentEmbed(embed) => Ok(Rc::clone(&embed.attributes)),
        }
    }

    fn measure(&self, doc: &StyledDocument, measurer: &dyn TextMeasurer, width: f32) -> Result<f32> {
        match self {
            View::Block(whole) => Ok(layout::measure_element(doc, measurer, whole.element(), width)),
            View::Fragment(fragment) => Ok(fragment
                .children()?
                .into_iter()
                .map(|child| layout::measure_element(doc, measurer, child, width))
                .sum()),
            View::ComponentEmbed(embed) => Ok(embed.height),
        }
    }

    fn fragment(&self, first: bool, last: bool, children: Range<usize>) -> Option<FragmentView> {
        match self {
            View::Block(whole) => Some(whole.create_fragment(first, last, children)),
            View::Fragment(fragment) => {
                // Re-split relative to this fragment's own children
                let whole = fragment.whole().ok()?;
                let base = fragment.child_range();
                let start = (base.start + children.start).min(base.end);
                let end = (base.start + children.end).min(base.end);
                Some(whole.create_fragment(
                    first && fragment.is_first(),
                    last && fragment.is_last(),
                    start..end,
                ))
            }
            View::ComponentEmbed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::dom::{SourceDocument, StyleNode};
    use crate::error::Error;

    fn doc() -> StyledDocument {
        let root = StyleNode::element("doc")
            .with_css("display: block")
            .with_child(StyleNode::element("p").with_css("display: block").with_text("one"))
            .with_child(StyleNode::element("img").with_attribute("height", "40"))
            .with_child(StyleNode::element("p").with_css("display: block").with_text("two"));
        StyledDocument::from_specs(&build(&[SourceDocument::new(root)])).unwrap()
    }

    #[test]
    fn test_dimension() {
        assert_eq!(dimension("40"), Some(30.0));
        assert_eq!(dimension(" 40px "), Some(30.0));
        assert_eq!(dimension("12pt"), Some(12.0));
        assert_eq!(dimension("auto"), None);
    }

    #[test]
    fn test_embed_view() {
        let doc = doc();
        let root = doc.top_level()[0];
        let img = doc.children(root)[1];
        let view = View::for_element(&doc, img).unwrap();
        assert!(matches!(view, View::ComponentEmbed(_)));
        assert_eq!(
            view.measure(&doc, &HeuristicMeasurer::default(), 100.0).unwrap(),
            30.0
        );
        assert!(view.fragment(true, true, 0..1).is_none());
    }

    #[test]
    fn test_block_and_fragment_views() {
        let doc = doc();
        let root = doc.top_level()[0];
        let view = View::for_element(&doc, root).unwrap();
        let measurer = HeuristicMeasurer::default();
        let whole_height = view.measure(&doc, &measurer, 468.0).unwrap();

        let first = View::Fragment(view.fragment(true, false, 0..2).unwrap());
        let last = View::Fragment(view.fragment(false, true, 2..3).unwrap());
        let split: f32 = [&first, &last]
            .iter()
            .map(|v| v.measure(&doc, &measurer, 468.0).unwrap())
            .sum();
        assert_eq!(split, whole_height);
        assert_eq!(first.element().unwrap(), root);
        assert!(Rc::ptr_eq(
            &first.attributes().unwrap(),
            &view.attributes().unwrap()
        ));

        let inner = first.fragment(false, true, 1..2).unwrap();
        assert_eq!(inner.child_range(), 1..2);
        assert!(!inner.is_first());
        assert!(!inner.is_last());
    }

    #[test]
    fn test_stale_fragment_view() {
        let doc = doc();
        let View::Block(whole) = View::for_element(&doc, doc.top_level()[0]).unwrap() else {
            panic!("expected a block view");
        };
        let fragment = View::Fragment(whole.create_fragment(true, true, 0..3));
        drop(whole);
        assert!(matches!(fragment.attributes(), Err(Error::StaleFragment)));
        assert!(fragment.fragment(true, true, 0..1).is_none());
    }
}
