//! Whole views and the fragments that split them.

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use crate::style::AttributeSet;
use crate::text::{ElementId, StyledDocument};

/// The single logical view of one block element.
///
/// Fragments refer back to it weakly and read attributes through it, so a
/// [`set_attributes`](Self::set_attributes) is seen by every fragment.
#[derive(Debug)]
pub struct WholeView {
    element: ElementId,
    attributes: RefCell<Rc<AttributeSet>>,
    children: Vec<ElementId>,
    live: Cell<bool>,
}

impl WholeView {
    pub fn new(element: ElementId, attributes: Rc<AttributeSet>, children: Vec<ElementId>) -> Rc<Self> {
        Rc::new(Self {
            element,
            attributes: RefCell::new(attributes),
            children,
            live: Cell::new(true),
        })
    }

    /// The whole view for element `id` of `doc`.
    pub fn for_element(doc: &StyledDocument, id: ElementId) -> Option<Rc<Self>> {
        let element = doc.element(id)?;
        Some(Self::new(
            id,
            Rc::clone(&element.attributes),
            element.children().to_vec(),
        ))
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn attributes(&self) -> Rc<AttributeSet> {
        Rc::clone(&self.attributes.borrow())
    }

    pub fn set_attributes(&self, attributes: Rc<AttributeSet>) {
        *self.attributes.borrow_mut() = attributes;
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    /// Mark the source element as gone. Fragments become stale.
    pub fn detach(&self) {
        self.live.set(false);
    }

    /// A fragment covering `children` (indices into [`children`](Self::children)).
    pub fn create_fragment(self: &Rc<Self>, first: bool, last: bool, children: Range<usize>) -> FragmentView {
        FragmentView {
            whole: Rc::downgrade(self),
            first,
            last,
            children,
        }
    }
}

/// One physical piece of a [`WholeView`].
#[derive(Debug, Clone)]
pub struct FragmentView {
    whole: Weak<WholeView>,
    first: bool,
    last: bool,
    children: Range<usize>,
}

impl FragmentView {
    /// The whole this fragment belongs to, if it is still live.
    pub fn whole(&self) -> Result<Rc<WholeView>> {
        match self.whole.upgrade() {
            Some(whole) if whole.is_live() => Ok(whole),
            _ => Err(Error::StaleFragment),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.whole().is_err()
    }

    pub fn attributes(&self) -> Result<Rc<AttributeSet>> {
        Ok(self.whole()?.attributes())
    }

    pub fn element(&self) -> Result<ElementId> {
        Ok(self.whole()?.element())
    }

    /// The whole's children assigned to this fragment.
    pub fn children(&self) -> Result<Vec<ElementId>> {
        let whole = self.whole()?;
        let all = whole.children();
        let end = self.children.end.min(all.len());
        let start = self.children.start.min(end);
        Ok(all[start..end].to_vec())
    }

    pub fn child_range(&self) -> Range<usize> {
        self.children.clone()
    }

    pub fn is_first(&self) -> bool {
        self.first
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    /// Whether this fragment and `other` split the same whole.
    pub fn same_whole(&self, other: &FragmentView) -> bool {
        Weak::ptr_eq(&self.whole, &other.whole)
    }
}
