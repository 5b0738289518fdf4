//! Rebuilding source documents from element spec operations.

use std::rc::Rc;

use crate::builder::OBJECT_REPLACEMENT;
use crate::dom::{NodeChild, SourceDocument, StyleNode, qual_name};
use crate::error::{Error, Result};
use crate::style::{AttributeSet, CascadeResolver, SetKind};
use crate::text::StyledDocument;

use super::ExportOptions;

/// Reconstruct the source documents of a styled document.
pub fn reverse_build(doc: &StyledDocument, options: &ExportOptions) -> Result<Vec<SourceDocument>> {
    reverse_build_ops(&doc.to_ops(), options)
}

/// Reconstruct source documents from a balanced op sequence.
///
/// Page break elements separate documents and are dropped. Placeholder
/// runs and the newline appended to the last run of a block are removed.
pub fn reverse_build_ops(
    ops: &[crate::builder::ElementSpecOp],
    options: &ExportOptions,
) -> Result<Vec<SourceDocument>> {
    let roots = parse_tree(ops)?;
    let resolver = CascadeResolver::new();

    // A wrapping section contributes its children
    let top: Vec<Tree> = roots
        .into_iter()
        .flat_map(|tree| match tree {
            Tree::Branch { attrs, children } if attrs.kind == SetKind::Section => children,
            other => vec![other],
        })
        .collect();

    let mut documents = Vec::new();
    for tree in top {
        let Tree::Branch { attrs, children } = tree else {
            log::warn!("dropping text outside any document");
            continue;
        };
        if attrs.is_page_break() {
            continue;
        }
        let mut doc = rebuild_document(&resolver, &attrs, children);
        if options.pretty {
            indent(&mut doc.root, 0);
        }
        documents.push(doc);
    }
    log::debug!("rebuilt {} document(s) from {} ops", documents.len(), ops.len());
    Ok(documents)
}

enum Tree {
    Branch {
        attrs: Rc<AttributeSet>,
        children: Vec<Tree>,
    },
    Run(String),
}

fn parse_tree(ops: &[crate::builder::ElementSpecOp]) -> Result<Vec<Tree>> {
    use crate::builder::ElementSpecOp;

    let mut roots = Vec::new();
    let mut stack: Vec<(Rc<AttributeSet>, Vec<Tree>)> = Vec::new();

    for (i, op) in ops.iter().enumerate() {
        match op {
            ElementSpecOp::StartTag(attrs) => stack.push((Rc::clone(attrs), Vec::new())),
            ElementSpecOp::Content(_, text) => match stack.last_mut() {
                Some((_, children)) => children.push(Tree::Run(text.clone())),
                None => roots.push(Tree::Run(text.clone())),
            },
            ElementSpecOp::EndTag(attrs) => {
                let Some((open, children)) = stack.pop() else {
                    return Err(Error::UnbalancedStructure(format!(
                        "end tag without start at op {i}"
                    )));
                };
                if !Rc::ptr_eq(&open, attrs) {
                    return Err(Error::UnbalancedStructure(format!(
                        "end tag at op {i} does not match its start tag"
                    )));
                }
                let tree = Tree::Branch {
                    attrs: open,
                    children,
                };
                match stack.last_mut() {
                    Some((_, siblings)) => siblings.push(tree),
                    None => roots.push(tree),
                }
            }
        }
    }
    if !stack.is_empty() {
        return Err(Error::UnbalancedStructure(format!(
            "{} element(s) left open",
            stack.len()
        )));
    }
    Ok(roots)
}

fn rebuild_document(resolver: &CascadeResolver, attrs: &AttributeSet, children: Vec<Tree>) -> SourceDocument {
    let info = attrs.document.clone().unwrap_or_default();

    let root = match &info.xhtml {
        Some(frame) => {
            let body_set = AttributeSet::new(SetKind::Element).with_style(frame.body_style.clone());
            let body = StyleNode {
                name: frame.body_name.clone(),
                attributes: frame.body_attributes.clone(),
                children: rebuild_children(resolver, &body_set, children),
                style: frame.body_style.clone(),
            };
            let mut html = bare_node(attrs);
            html.children.extend(frame.leading.iter().cloned().map(NodeChild::Element));
            html.children.push(NodeChild::Element(body));
            html.children.extend(frame.trailing.iter().cloned().map(NodeChild::Element));
            html
        }
        None => rebuild_node(resolver, attrs, children),
    };

    SourceDocument {
        root,
        base_uri: info.base_uri,
        content_type: info.content_type,
        description: info.description,
        doctype: info.doctype,
        processing_instructions: info.processing_instructions,
    }
}

fn bare_node(attrs: &AttributeSet) -> StyleNode {
    StyleNode {
        name: attrs.name.clone().unwrap_or_else(|| qual_name("div")),
        attributes: attrs.attributes.clone(),
        children: Vec::new(),
        style: attrs.style.clone(),
    }
}

fn rebuild_node(resolver: &CascadeResolver, attrs: &AttributeSet, children: Vec<Tree>) -> StyleNode {
    let mut node = bare_node(attrs);
    node.children = rebuild_children(resolver, attrs, children);
    node
}

fn rebuild_children(resolver: &CascadeResolver, parent: &AttributeSet, children: Vec<Tree>) -> Vec<NodeChild> {
    if let [Tree::Run(text)] = children.as_slice()
        && is_placeholder(text)
    {
        return Vec::new();
    }

    let block = !resolver.display(parent).is_inline();
    let count = children.len();
    let mut out = Vec::with_capacity(count);
    for (i, child) in children.into_iter().enumerate() {
        match child {
            Tree::Branch { attrs, children } => {
                out.push(NodeChild::Element(rebuild_node(resolver, &attrs, children)));
            }
            Tree::Run(mut text) => {
                if block && i + 1 == count && text.ends_with('\n') {
                    text.pop();
                }
                if !text.is_empty() {
                    out.push(NodeChild::Text(text));
                }
            }
        }
    }
    out
}

fn is_placeholder(text: &str) -> bool {
    text == "\n" || (text.chars().count() == 1 && text.starts_with(OBJECT_REPLACEMENT))
}

/// Insert tab indentation between the element children of `node`. Nodes
/// holding text are left alone.
fn indent(node: &mut StyleNode, depth: usize) {
    let has_text = node
        .children
        .iter()
        .any(|c| c.as_text().is_some_and(|t| !t.trim().is_empty()));
    if has_text || node.children.is_empty() {
        return;
    }

    let inner = format!("\n{}", "\t".repeat(depth + 1));
    let children = std::mem::take(&mut node.children);
    for child in children {
        let NodeChild::Element(mut element) = child else {
            continue;
        };
        indent(&mut element, depth + 1);
        node.children.push(NodeChild::Text(inner.clone()));
        node.children.push(NodeChild::Element(element));
    }
    node.children.push(NodeChild::Text(format!("\n{}", "\t".repeat(depth))));
}
