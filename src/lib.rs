//! # styledoc
//!
//! Cascading styles over XML document trees, flattened into styled text runs
//! for a generic text-layout renderer.
//!
//! ## Features
//!
//! - Resolve CSS properties through a parent-linked cascade, with font and
//!   length resolution in points
//! - Flatten one or more source documents into a balanced sequence of
//!   start tag, content and end tag operations
//! - Split block views into page fragments, and map section ranges back to
//!   their source documents
//! - Rebuild the source documents from the flattened form
//!
//! ## Quick Start
//!
//! ```
//! use styledoc::dom::reader::read_document;
//! use styledoc::{StyledDocument, build};
//!
//! let source = read_document(r#"<doc style="font-size: 10pt">
//!     <p style="display: block; font-size: larger">Hello</p>
//! </doc>"#)?;
//! let doc = StyledDocument::from_specs(&build(&[source]))?;
//!
//! let leaf = doc.leaf_at(0).unwrap();
//! let size = doc.resolver().font_size(doc.attributes(leaf).unwrap());
//! assert!((size - 12.0).abs() < 1e-3);
//! # Ok::<(), styledoc::Error>(())
//! ```

pub mod builder;
pub mod dom;
pub mod error;
pub mod export;
pub mod list;
pub mod style;
pub mod text;
pub mod view;

pub use builder::{BuilderConfig, ElementSpecBuilder, ElementSpecOp, build};
pub use dom::{SourceDocument, StyleNode};
pub use error::{Error, Result};
pub use export::{ExportOptions, reverse_build, write_xml};
pub use style::{AttributeSet, CascadeResolver, ResolverConfig};
pub use text::{DocumentEdit, Element, ElementId, ElementKind, StyledDocument};
pub use view::{FragmentView, LayoutPass, SectionView, View, WholeView};
