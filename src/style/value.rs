//! Raw CSS values as stored in a style table.

use std::fmt::Write;

use super::ToCss;
use super::properties::{Color, enum_property};

enum_property! {
    /// Length units understood by the length resolver.
    pub enum LengthUnit {
        /// Points, the canonical internal unit.
        #[default]
        Pt => "pt",
        Px => "px",
        Pc => "pc",
        In => "in",
        Cm => "cm",
        Mm => "mm",
        Em => "em",
        Ex => "ex",
    }
}

impl LengthUnit {
    /// Points per unit for absolute units, `None` for font-relative ones.
    pub fn points_per_unit(self) -> Option<f32> {
        match self {
            LengthUnit::Pt => Some(1.0),
            // 96 px per inch
            LengthUnit::Px => Some(0.75),
            LengthUnit::Pc => Some(12.0),
            LengthUnit::In => Some(72.0),
            LengthUnit::Cm => Some(72.0 / 2.54),
            LengthUnit::Mm => Some(72.0 / 25.4),
            LengthUnit::Em | LengthUnit::Ex => None,
        }
    }

    /// Whether the unit converts to points without a reference font.
    #[inline]
    pub fn is_absolute(self) -> bool {
        self.points_per_unit().is_some()
    }
}

/// A single CSS value, prior to resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum CssValue {
    /// A dimension with its unit, e.g. `12pt`, `1.5em`.
    Length(f32, LengthUnit),
    /// A percentage, stored as the number before `%`.
    Percentage(f32),
    /// An identifier or free-form keyword list (`bold`, `larger`,
    /// `Georgia, serif`).
    Keyword(String),
    /// A unitless number (`line-height: 1.2`).
    Number(f32),
    Color(Color),
}

impl CssValue {
    /// Shorthand for a keyword value.
    pub fn keyword(s: impl Into<String>) -> Self {
        CssValue::Keyword(s.into())
    }

    /// Shorthand for a point length.
    pub fn pt(v: f32) -> Self {
        CssValue::Length(v, LengthUnit::Pt)
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            CssValue::Keyword(k) => Some(k.as_str()),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            CssValue::Color(c) => Some(*c),
            // Keyword colors may reach us from hand-built tables
            CssValue::Keyword(k) => Color::named(k),
            _ => None,
        }
    }
}

impl ToCss for CssValue {
    fn to_css(&self, buf: &mut String) {
        match self {
            CssValue::Length(v, unit) => {
                if *v == 0.0 {
                    buf.push('0');
                } else {
                    let _ = write!(buf, "{}{}", v, unit.as_str());
                }
            }
            CssValue::Percentage(v) => {
                let _ = write!(buf, "{}%", v);
            }
            CssValue::Keyword(k) => buf.push_str(k),
            CssValue::Number(n) => {
                let _ = write!(buf, "{}", n);
            }
            CssValue::Color(c) => c.to_css(buf),
        }
    }
}
