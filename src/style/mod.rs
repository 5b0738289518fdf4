//! Style system: CSS values, per-element property tables and the cascade.
//!
//! This module contains:
//! - CSS keyword types and colors (`properties`)
//! - Raw values and units (`value`) and the typed `StyleTable` (`table`)
//! - Declaration parsing (`parse`)
//! - Length and font resolution (`length`, `font`)
//! - The resolve-parent cascade over `AttributeSet`s (`cascade`)

mod cascade;
mod font;
mod length;
pub(crate) mod parse;
mod properties;
mod table;
mod value;

pub trait ToCss {
    /// Write this value as CSS to the buffer.
    fn to_css(&self, buf: &mut String);

    /// Convert to a CSS string (convenience method).
    fn to_css_string(&self) -> String {
        let mut buf = String::new();
        self.to_css(&mut buf);
        buf
    }
}

pub use properties::{
    BreakValue, Color, Display, FontStyle, FontWeight, ListStyleType, TextAlign, VerticalAlign,
    WhiteSpace,
};

pub use value::{CssValue, LengthUnit};

pub use table::{Property, StyleTable};

pub use parse::{parse_declarations, parse_value};

pub use length::{DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT, LengthResolver, SIZE_SCALE};

pub use font::{Font, FontCache, FontCatalog, ResolverConfig};

pub use cascade::{AttributeSet, CascadeResolver, LineHeight, SetKind, Side};

