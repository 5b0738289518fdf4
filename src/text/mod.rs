//! Styled text model built from element spec operations.
//!
//! A [`StyledDocument`] is an immutable snapshot: an arena of elements
//! (branches holding children, leaves holding text runs) over one flat
//! character sequence. Edits are expressed as [`DocumentEdit`] patches;
//! [`StyledDocument::apply`] returns a new snapshot and leaves the old one
//! untouched.

use std::ops::Range;
use std::rc::Rc;

use crate::builder::ElementSpecOp;
use crate::error::{Error, Result};
use crate::list;
use crate::style::{AttributeSet, CascadeResolver, Display, ResolverConfig, SetKind, StyleTable};

/// Index of an element within one [`StyledDocument`].
pub type ElementId = usize;

#[derive(Debug, Clone)]
pub enum ElementKind {
    Branch { children: Vec<ElementId> },
    Leaf { text: String },
}

#[derive(Debug, Clone)]
pub struct Element {
    pub attributes: Rc<AttributeSet>,
    pub parent: Option<ElementId>,
    pub kind: ElementKind,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

impl Element {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ElementKind::Leaf { .. })
    }

    pub fn children(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Branch { children } => children,
            ElementKind::Leaf { .. } => &[],
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A patch against a [`StyledDocument`].
#[derive(Debug, Clone)]
pub enum DocumentEdit {
    /// Replace an element's local style.
    SetStyle {
        element: ElementId,
        style: StyleTable,
    },
    /// Insert text at a character offset, inside the run covering it.
    InsertText { offset: usize, text: String },
    /// Remove an element and its subtree.
    RemoveElement { element: ElementId },
}

/// Immutable element tree over a flat character sequence.
#[derive(Debug)]
pub struct StyledDocument {
    elements: Vec<Element>,
    root: ElementId,
    text: String,
    char_len: usize,
    resolver: CascadeResolver,
}

impl StyledDocument {
    /// Build a document from a balanced op sequence.
    pub fn from_specs(ops: &[ElementSpecOp]) -> Result<Self> {
        Self::from_specs_with(ops, ResolverConfig::default())
    }

    pub fn from_specs_with(ops: &[ElementSpecOp], config: ResolverConfig) -> Result<Self> {
        let mut elements: Vec<Element> = Vec::with_capacity(ops.len());
        let mut stack: Vec<ElementId> = Vec::new();
        let mut root = None;
        let mut text = String::new();
        let mut char_len = 0;

        for (i, op) in ops.iter().enumerate() {
            match op {
                ElementSpecOp::StartTag(attrs) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(Error::UnbalancedStructure(format!(
                            "second root element at op {i}"
                        )));
                    }
                    let id = elements.len();
                    elements.push(Element {
                        attributes: Rc::clone(attrs),
                        parent: stack.last().copied(),
                        kind: ElementKind::Branch {
                            children: Vec::new(),
                        },
                        start: char_len,
                        end: char_len,
                    });
                    if let Some(&parent) = stack.last() {
                        push_child(&mut elements[parent], id);
                    } else {
                        root = Some(id);
                    }
                    stack.push(id);
                }
                ElementSpecOp::Content(attrs, run) => {
                    let Some(&parent) = stack.last() else {
                        return Err(Error::UnbalancedStructure(format!(
                            "content outside any element at op {i}"
                        )));
                    };
                    let id = elements.len();
                    let len = run.chars().count();
                    elements.push(Element {
                        attributes: Rc::clone(attrs),
                        parent: Some(parent),
                        kind: ElementKind::Leaf { text: run.clone() },
                        start: char_len,
                        end: char_len + len,
                    });
                    push_child(&mut elements[parent], id);
                    text.push_str(run);
                    char_len += len;
                }
                ElementSpecOp::EndTag(attrs) => {
                    let Some(id) = stack.pop() else {
                        return Err(Error::UnbalancedStructure(format!(
                            "end tag without start at op {i}"
                        )));
                    };
                    if !Rc::ptr_eq(&elements[id].attributes, attrs) {
                        return Err(Error::UnbalancedStructure(format!(
                            "end tag at op {i} does not match its start tag"
                        )));
                    }
                    elements[id].end = char_len;
                }
            }
        }

        if !stack.is_empty() {
            return Err(Error::UnbalancedStructure(format!(
                "{} element(s) left open",
                stack.len()
            )));
        }
        let root = root.ok_or_else(|| Error::UnbalancedStructure("no elements".into()))?;

        Ok(Self {
            elements,
            root,
            text,
            char_len,
            resolver: CascadeResolver::with_config(config),
        })
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn attributes(&self, id: ElementId) -> Option<&Rc<AttributeSet>> {
        self.elements.get(id).map(|e| &e.attributes)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements.get(id).map_or(&[], Element::children)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.parent
    }

    /// The resolver used for style queries against this document.
    pub fn resolver(&self) -> &CascadeResolver {
        &self.resolver
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text between two character offsets.
    pub fn text_range(&self, range: Range<usize>) -> String {
        self.text
            .chars()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .collect()
    }

    /// The leaf covering character `offset`.
    pub fn leaf_at(&self, offset: usize) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.is_leaf() && e.start <= offset && offset < e.end)
    }

    /// Elements of the top level, below the enclosing section.
    pub fn top_level(&self) -> &[ElementId] {
        self.children(self.root)
    }

    /// Marker text for a list item, or `None` if `id` is not a list item or
    /// its style has no textual marker.
    pub fn list_marker(&self, id: ElementId) -> Option<String> {
        let element = self.elements.get(id)?;
        if self.resolver.display(&element.attributes) != Display::ListItem {
            return None;
        }
        let siblings = self.children(element.parent?);
        let index = siblings
            .iter()
            .filter(|&&s| self.resolver.display(&self.elements[s].attributes) == Display::ListItem)
            .position(|&s| s == id)?;
        let keyword = self.resolver.list_style_keyword(&element.attributes);
        list::marker(&keyword, index)
    }

    /// The op sequence this document was built from.
    pub fn to_ops(&self) -> Vec<ElementSpecOp> {
        let mut ops = Vec::with_capacity(self.elements.len() * 2);
        self.push_ops(self.root, &mut ops);
        ops
    }

    fn push_ops(&self, id: ElementId, ops: &mut Vec<ElementSpecOp>) {
        let element = &self.elements[id];
        match &element.kind {
            ElementKind::Leaf { text } => {
                ops.push(ElementSpecOp::Content(
                    Rc::clone(&element.attributes),
                    text.clone(),
                ));
            }
            ElementKind::Branch { children } => {
                ops.push(ElementSpecOp::StartTag(Rc::clone(&element.attributes)));
                for &child in children {
                    self.push_ops(child, ops);
                }
                ops.push(ElementSpecOp::EndTag(Rc::clone(&element.attributes)));
            }
        }
    }

    /// Apply `edit`, producing a new snapshot.
    ///
    /// Attribute sets are copied into the new snapshot and re-parented, so
    /// style queries against the old snapshot are unaffected.
    pub fn apply(&self, edit: &DocumentEdit) -> Result<StyledDocument> {
        let plan = self.plan(edit)?;
        let mut ops = Vec::with_capacity(self.elements.len() * 2 + 1);
        self.emit(self.root, None, &plan, &mut ops);
        log::trace!("applied {edit:?}: {} ops", ops.len());
        StyledDocument::from_specs_with(&ops, self.resolver.config().clone())
    }

    fn plan(&self, edit: &DocumentEdit) -> Result<EditPlan> {
        let mut plan = EditPlan::default();
        match edit {
            DocumentEdit::SetStyle { element, style } => {
                self.check_id(*element)?;
                plan.restyle = Some((*element, style.clone()));
            }
            DocumentEdit::InsertText { offset, text } => {
                if *offset > self.char_len {
                    return Err(Error::InvalidEdit(format!(
                        "offset {offset} past end {}",
                        self.char_len
                    )));
                }
                let leaf = self
                    .leaf_at(*offset)
                    .or_else(|| self.elements.iter().rposition(Element::is_leaf))
                    .ok_or_else(|| Error::InvalidEdit("document has no text runs".into()))?;
                let within = *offset - self.elements[leaf].start;
                plan.insert = Some((leaf, within, text.clone()));
            }
            DocumentEdit::RemoveElement { element } => {
                self.check_id(*element)?;
                if *element == self.root {
                    return Err(Error::InvalidEdit("cannot remove the root".into()));
                }
                plan.remove = Some(*element);
            }
        }
        Ok(plan)
    }

    fn check_id(&self, id: ElementId) -> Result<()> {
        if id < self.elements.len() {
            Ok(())
        } else {
            Err(Error::InvalidEdit(format!("no element {id}")))
        }
    }

    fn copy_attributes(&self, id: ElementId, plan: &EditPlan) -> AttributeSet {
        let mut copy = self.elements[id].attributes.detached_clone();
        if let Some((target, style)) = &plan.restyle
            && *target == id
        {
            copy.style = style.clone();
        }
        if let Some(body) = &copy.body_scope {
            copy.body_scope = Some(Rc::new(body.detached_clone()));
        }
        copy
    }

    fn emit(
        &self,
        id: ElementId,
        parent: Option<&Rc<AttributeSet>>,
        plan: &EditPlan,
        ops: &mut Vec<ElementSpecOp>,
    ) {
        let attrs = Rc::new(self.copy_attributes(id, plan));
        if let Some(parent) = parent {
            attrs.set_resolve_parent(parent);
        }

        match &self.elements[id].kind {
            ElementKind::Leaf { text } => {
                let mut text = text.clone();
                if let Some((leaf, within, inserted)) = &plan.insert
                    && *leaf == id
                {
                    let at = text
                        .char_indices()
                        .nth(*within)
                        .map_or(text.len(), |(i, _)| i);
                    text.insert_str(at, inserted);
                }
                ops.push(ElementSpecOp::Content(attrs, text));
            }
            ElementKind::Branch { children } => {
                if let Some(body) = &attrs.body_scope {
                    body.set_resolve_parent(&attrs);
                }
                let scope = attrs.body_scope.clone().unwrap_or_else(|| Rc::clone(&attrs));

                ops.push(ElementSpecOp::StartTag(Rc::clone(&attrs)));
                let before = ops.len();
                for &child in children {
                    if plan.remove == Some(child) {
                        continue;
                    }
                    self.emit(child, Some(&scope), plan, ops);
                }
                if ops.len() == before {
                    let run = Rc::new(AttributeSet::new(SetKind::Content));
                    run.set_resolve_parent(&scope);
                    ops.push(ElementSpecOp::Content(run, "\n".to_string()));
                }
                ops.push(ElementSpecOp::EndTag(attrs));
            }
        }
    }
}

#[derive(Debug, Default)]
struct EditPlan {
    restyle: Option<(ElementId, StyleTable)>,
    insert: Option<(ElementId, usize, String)>,
    remove: Option<ElementId>,
}

fn push_child(parent: &mut Element, child: ElementId) {
    if let ElementKind::Branch { children } = &mut parent.kind {
        children.push(child);
    }
}
