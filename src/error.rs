//! Error types for styledoc operations.

use thiserror::Error;

/// Errors that can occur while resolving styles, building views or
/// reconstructing documents.
///
/// Style queries never surface these to their callers: the typed accessors
/// on [`CascadeResolver`](crate::style::CascadeResolver) log the failure and
/// fall back to a default. Structural errors are returned to the host.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing context for length resolution: {0}")]
    MissingContext(&'static str),

    #[error("fragment refers to a whole view that is no longer live")]
    StaleFragment,

    #[error("cyclic resolve-parent chain")]
    MalformedCascade,

    #[error("unbalanced element structure: {0}")]
    UnbalancedStructure(String),

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
