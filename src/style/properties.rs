//! CSS property types and the enum_property! macro.
//!
//! This module contains the keyword-valued CSS property types that the
//! cascade hands out through its typed accessors.

use std::fmt::Write;

use super::ToCss;

/// Macro for defining CSS keyword enums with automatic ToCss implementation.
///
/// Inspired by lightningcss's `enum_property!` macro, this reduces boilerplate
/// for enums that map directly to CSS keywords.
///
/// # Example
///
/// ```ignore
/// enum_property! {
///     /// Font style (normal, italic).
///     pub enum FontStyle {
///         #[default]
///         Normal => "normal",
///         Italic => "italic",
///     }
/// }
/// ```
macro_rules! enum_property {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $css:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Returns the CSS keyword for this value.
            #[inline]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $css,)*
                }
            }

            /// Parse a CSS keyword into this enum.
            #[inline]
            pub fn from_css(s: &str) -> Option<Self> {
                match s {
                    $($css => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl ToCss for $name {
            fn to_css(&self, buf: &mut String) {
                buf.push_str(self.as_str());
            }
        }
    };
}

// Export the macro for use within the crate
pub(crate) use enum_property;

enum_property! {
    /// Font weight. Only the keyword distinction is modelled; numeric
    /// weights are not resolved.
    pub enum FontWeight {
        #[default]
        Normal => "normal",
        Bold => "bold",
    }
}

impl FontWeight {
    /// Interpret a `font-weight` keyword. `bolder` counts as bold, anything
    /// unrecognised as normal.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "bold" | "bolder" => FontWeight::Bold,
            _ => FontWeight::Normal,
        }
    }
}

enum_property! {
    /// Font style. `oblique` is folded into italic.
    pub enum FontStyle {
        #[default]
        Normal => "normal",
        Italic => "italic",
    }
}

impl FontStyle {
    /// Interpret a `font-style` keyword.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "italic" | "oblique" => FontStyle::Italic,
            _ => FontStyle::Normal,
        }
    }
}

enum_property! {
    /// Page break behavior (`page-break-before` / `page-break-after`).
    pub enum BreakValue {
        #[default]
        Auto => "auto",
        Always => "always",
        Avoid => "avoid",
        Left => "left",
        Right => "right",
    }
}

impl BreakValue {
    /// Whether this value forces a break.
    pub fn is_forced(self) -> bool {
        matches!(self, BreakValue::Always | BreakValue::Left | BreakValue::Right)
    }
}

enum_property! {
    /// CSS white-space values.
    pub enum WhiteSpace {
        /// Collapse whitespace, wrap lines.
        #[default]
        Normal => "normal",
        /// Collapse whitespace but don't wrap lines.
        Nowrap => "nowrap",
        /// Preserve whitespace and newlines, don't wrap lines.
        Pre => "pre",
        /// Preserve whitespace and newlines, wrap lines.
        PreWrap => "pre-wrap",
        /// Collapse whitespace except newlines, wrap lines.
        PreLine => "pre-line",
    }
}

impl WhiteSpace {
    /// Whether text under this mode keeps its whitespace verbatim.
    pub fn preserves_spaces(self) -> bool {
        matches!(self, WhiteSpace::Pre | WhiteSpace::PreWrap)
    }
}

enum_property! {
    /// CSS vertical-align values for inline content.
    pub enum VerticalAlign {
        #[default]
        Baseline => "baseline",
        Top => "top",
        Middle => "middle",
        Bottom => "bottom",
        TextTop => "text-top",
        TextBottom => "text-bottom",
        Super => "super",
        Sub => "sub",
    }
}

enum_property! {
    /// Text alignment.
    pub enum TextAlign {
        #[default]
        Left => "left",
        Right => "right",
        Center => "center",
        Justify => "justify",
    }
}

enum_property! {
    /// Display mode. Absent a declaration, elements are inline.
    pub enum Display {
        Block => "block",
        #[default]
        Inline => "inline",
        InlineBlock => "inline-block",
        ListItem => "list-item",
        None => "none",
        Table => "table",
        TableRow => "table-row",
        TableCell => "table-cell",
    }
}

impl Display {
    /// Whether the element takes part in inline flow.
    #[inline]
    pub fn is_inline(self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock)
    }
}

enum_property! {
    /// CSS list-style-type values.
    pub enum ListStyleType {
        /// No marker
        None => "none",
        /// Disc bullet (CSS default)
        #[default]
        Disc => "disc",
        /// Circle bullet
        Circle => "circle",
        /// Square bullet
        Square => "square",
        /// Decimal numbers
        Decimal => "decimal",
        /// Lowercase roman numerals
        LowerRoman => "lower-roman",
        /// Uppercase roman numerals
        UpperRoman => "upper-roman",
        /// Lowercase greek letters
        LowerGreek => "lower-greek",
        /// Lowercase letters
        LowerAlpha => "lower-alpha",
        /// Uppercase letters
        UpperAlpha => "upper-alpha",
    }
}

impl ListStyleType {
    /// Parse a `list-style-type` keyword, accepting the `-latin` aliases.
    pub fn parse(keyword: &str) -> Option<Self> {
        let lower = keyword.trim().to_ascii_lowercase();
        match lower.as_str() {
            "lower-latin" => Some(ListStyleType::LowerAlpha),
            "upper-latin" => Some(ListStyleType::UpperAlpha),
            other => ListStyleType::from_css(other),
        }
    }

    /// Whether the marker is rendered as text rather than a shape.
    pub fn is_textual(self) -> bool {
        !matches!(
            self,
            ListStyleType::None | ListStyleType::Disc | ListStyleType::Circle | ListStyleType::Square
        )
    }
}

/// RGBA color (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Create a new opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a new color with alpha.
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Look up one of the CSS2 named colors.
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "maroon" => Color::rgb(128, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "lime" => Color::rgb(0, 255, 0),
            "blue" => Color::rgb(0, 0, 255),
            "navy" => Color::rgb(0, 0, 128),
            "yellow" => Color::rgb(255, 255, 0),
            "olive" => Color::rgb(128, 128, 0),
            "aqua" | "cyan" => Color::rgb(0, 255, 255),
            "teal" => Color::rgb(0, 128, 128),
            "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
            "purple" => Color::rgb(128, 0, 128),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "orange" => Color::rgb(255, 165, 0),
            "transparent" => Color::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }
}

impl ToCss for Color {
    fn to_css(&self, buf: &mut String) {
        if self.a == 255 {
            // Opaque: use #RRGGBB
            let _ = write!(buf, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b);
        } else if self.a == 0 {
            buf.push_str("transparent");
        } else {
            let alpha = self.a as f32 / 255.0;
            let _ = write!(buf, "rgba({},{},{},{:.2})", self.r, self.g, self.b, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_css() {
        assert_eq!(Color::BLACK.to_css_string(), "#000000");
        assert_eq!(Color::rgb(0, 128, 255).to_css_string(), "#0080ff");
        assert_eq!(Color::TRANSPARENT.to_css_string(), "transparent");
        assert!(Color::rgba(255, 0, 0, 128).to_css_string().starts_with("rgba(255,0,0,"));
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(Color::named("Navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::named("no-such-color"), None);
    }

    #[test]
    fn test_font_keywords() {
        assert_eq!(FontWeight::from_keyword("bolder"), FontWeight::Bold);
        assert_eq!(FontWeight::from_keyword("700"), FontWeight::Normal);
        assert_eq!(FontStyle::from_keyword("oblique"), FontStyle::Italic);
        assert_eq!(FontStyle::from_keyword("normal"), FontStyle::Normal);
    }

    #[test]
    fn test_list_style_aliases() {
        assert_eq!(ListStyleType::parse("lower-latin"), Some(ListStyleType::LowerAlpha));
        assert_eq!(ListStyleType::parse("UPPER-LATIN"), Some(ListStyleType::UpperAlpha));
        assert_eq!(ListStyleType::parse("lower-greek"), Some(ListStyleType::LowerGreek));
        assert!(!ListStyleType::Disc.is_textual());
        assert!(ListStyleType::Decimal.is_textual());
    }

    #[test]
    fn test_display_keywords() {
        assert_eq!(Display::from_css("list-item"), Some(Display::ListItem));
        assert_eq!(Display::Inline.to_css_string(), "inline");
        assert!(Display::Inline.is_inline());
        assert!(!Display::ListItem.is_inline());
    }

    #[test]
    fn test_break_values() {
        assert!(BreakValue::Always.is_forced());
        assert!(BreakValue::Left.is_forced());
        assert!(!BreakValue::Avoid.is_forced());
    }
}
