//! The top-level view over several source documents.
//!
//! The built section holds every document root (and the page breaks
//! between them) as children. [`SectionView`] records which run of
//! characters belongs to which document, and translates structural
//! changes addressed in source-document coordinates into positions within
//! the flattened section.

use std::ops::Range;

use crate::dom::is_rdf_name;
use crate::text::{ElementId, StyledDocument};

/// How a top-level element takes part in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// A document root laid out as one block.
    Document,
    /// An XHTML root whose body children are laid out individually.
    Xhtml,
    /// An RDF root, laid out atomically.
    Rdf,
    /// A synthetic page break between documents.
    PageBreak,
}

/// The characters one top-level element covers.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRange {
    /// Index of the source document; for page breaks, of the document that
    /// follows.
    pub document: usize,
    pub kind: RangeKind,
    pub element: ElementId,
    pub start: usize,
    pub end: usize,
    /// Elements preceding `body` in an XHTML source, 0 otherwise.
    pub leading: usize,
}

impl SectionRange {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// A structural change in source-document coordinates.
///
/// `path` lists child indices from the document element down to the
/// changed parent; `index` is the position within that parent where
/// `removed` children were replaced by `added` ones. Below the document
/// element, indices count children as the builder emits them. At the
/// document element only element children count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChange {
    pub document: usize,
    pub path: Vec<usize>,
    pub index: usize,
    pub removed: usize,
    pub added: usize,
}

/// A [`SourceChange`] after translation by [`SectionView::forward_change`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardedChange {
    /// Relocated to the document's root view; `path` and `index` are in its
    /// section index space (leading elements first, then body children).
    Redirected {
        element: ElementId,
        path: Vec<usize>,
        index: usize,
        removed: usize,
        added: usize,
    },
    /// Passed on unmodified.
    Forwarded(SourceChange),
}

/// Document ranges of a built section.
#[derive(Debug)]
pub struct SectionView<'a> {
    doc: &'a StyledDocument,
    ranges: Vec<SectionRange>,
}

impl<'a> SectionView<'a> {
    pub fn new(doc: &'a StyledDocument) -> Self {
        let mut ranges = Vec::new();
        let mut breaks = 0;

        for &id in doc.top_level() {
            let element = &doc.elements()[id];
            let attrs = &element.attributes;
            let (kind, leading) = if attrs.is_page_break() {
                breaks += 1;
                (RangeKind::PageBreak, 0)
            } else {
                match &attrs.document {
                    Some(info) if info.xhtml.is_some() => (RangeKind::Xhtml, info.leading_count()),
                    _ if attrs.name.as_ref().is_some_and(is_rdf_name) => (RangeKind::Rdf, 0),
                    _ => (RangeKind::Document, 0),
                }
            };
            ranges.push(SectionRange {
                document: breaks,
                kind,
                element: id,
                start: element.start,
                end: element.end,
                leading,
            });
        }
        log::trace!("section has {} range(s)", ranges.len());

        Self { doc, ranges }
    }

    pub fn ranges(&self) -> &[SectionRange] {
        &self.ranges
    }

    /// The range rooting document `document`.
    pub fn document_range(&self, document: usize) -> Option<&SectionRange> {
        self.ranges
            .iter()
            .find(|r| r.document == document && r.kind != RangeKind::PageBreak)
    }

    /// Elements taking part in layout of characters `start..end`.
    ///
    /// Page breaks and RDF roots appear whole, XHTML roots contribute the
    /// body children overlapping the range, any other document root appears
    /// as itself.
    pub fn layout_children(&self, start: usize, end: usize) -> Vec<ElementId> {
        let mut out = Vec::new();
        for range in self.ranges.iter().filter(|r| r.overlaps(start, end)) {
            match range.kind {
                RangeKind::Xhtml => {
                    out.extend(self.doc.children(range.element).iter().copied().filter(|&c| {
                        let child = &self.doc.elements()[c];
                        child.start < end && start < child.end
                    }));
                }
                RangeKind::Document | RangeKind::Rdf | RangeKind::PageBreak => {
                    out.push(range.element)
                }
            }
        }
        out
    }

    /// Translate `change` into the section's coordinates.
    pub fn forward_change(&self, change: SourceChange) -> ForwardedChange {
        let Some(range) = self
            .document_range(change.document)
            .filter(|r| r.kind == RangeKind::Xhtml)
        else {
            return ForwardedChange::Forwarded(change);
        };
        let body = range.leading;

        match change.path.split_first() {
            // Addressed to body itself
            Some((&first, [])) if first == body => ForwardedChange::Redirected {
                element: range.element,
                path: Vec::new(),
                index: change.index + range.leading,
                removed: change.removed,
                added: change.added,
            },
            // Somewhere under body
            Some((&first, [child, rest @ ..])) if first == body => {
                let mut path = Vec::with_capacity(rest.len() + 1);
                path.push(child + range.leading);
                path.extend_from_slice(rest);
                ForwardedChange::Redirected {
                    element: range.element,
                    path,
                    index: change.index,
                    removed: change.removed,
                    added: change.added,
                }
            }
            _ => {
                log::trace!("forwarding change outside body: {change:?}");
                ForwardedChange::Forwarded(change)
            }
        }
    }

    /// The root-view child at `index` of document `document`'s section
    /// index space. Leading XHTML elements have no view.
    pub fn section_child(&self, document: usize, index: usize) -> Option<ElementId> {
        let range = self.document_range(document)?;
        let at = index.checked_sub(range.leading)?;
        self.doc.children(range.element).get(at).copied()
    }

    /// The parent element a redirected change applies to.
    pub fn change_target(&self, change: &ForwardedChange) -> Option<ElementId> {
        let ForwardedChange::Redirected { element, path, .. } = change else {
            return None;
        };
        let Some((&first, rest)) = path.split_first() else {
            return Some(*element);
        };
        let document = self.ranges.iter().find(|r| r.element == *element)?.document;
        let mut target = self.section_child(document, first)?;
        for &index in rest {
            target = *self.doc.children(target).get(index)?;
        }
        Some(target)
    }
}
