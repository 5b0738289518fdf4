//! Conversion of CSS lengths to points.

use super::font::Font;
use super::value::{CssValue, LengthUnit};
use crate::error::{Error, Result};

/// Font size, in points, used when nothing in the cascade specifies one.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Line height multiplier used when nothing in the cascade specifies one.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.0;

/// Ratio between adjacent absolute size keywords, and the factor applied
/// by `larger` / `smaller`.
pub const SIZE_SCALE: f32 = 1.2;

/// Converts [`CssValue`]s to points.
///
/// Font-relative units need a reference font; percentages and the
/// `larger`/`smaller` keywords need the parent size and fall back to the
/// default font size without one.
#[derive(Debug, Clone, Copy)]
pub struct LengthResolver {
    default_font_size: f32,
}

impl Default for LengthResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthResolver {
    pub fn new() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
        }
    }

    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn default_font_size(&self) -> f32 {
        self.default_font_size
    }

    /// Resolve `value` to points.
    pub fn resolve(
        &self,
        value: &CssValue,
        reference_font: Option<&Font>,
        parent: Option<f32>,
    ) -> Result<f32> {
        match value {
            CssValue::Length(magnitude, unit) => {
                if let Some(factor) = unit.points_per_unit() {
                    return Ok(magnitude * factor);
                }
                let font = reference_font.ok_or(Error::MissingContext("em/ex without a font"))?;
                match unit {
                    LengthUnit::Ex => Ok(magnitude * font.size * 0.5),
                    _ => Ok(magnitude * font.size),
                }
            }
            CssValue::Percentage(pct) => {
                let base = parent.unwrap_or(self.default_font_size);
                Ok(base * pct / 100.0)
            }
            CssValue::Number(n) if *n == 0.0 => Ok(0.0),
            CssValue::Number(_) => Err(Error::MissingContext("number without a unit")),
            CssValue::Keyword(keyword) => self.resolve_keyword(keyword, parent),
            CssValue::Color(_) => Err(Error::MissingContext("color is not a length")),
        }
    }

    fn resolve_keyword(&self, keyword: &str, parent: Option<f32>) -> Result<f32> {
        let step = match keyword.trim().to_ascii_lowercase().as_str() {
            "xx-small" => -3,
            "x-small" => -2,
            "small" => -1,
            "medium" => 0,
            "large" => 1,
            "x-large" => 2,
            "xx-large" => 3,
            "larger" => return Ok(parent.unwrap_or(self.default_font_size) * SIZE_SCALE),
            "smaller" => return Ok(parent.unwrap_or(self.default_font_size) / SIZE_SCALE),
            _ => return Err(Error::MissingContext("unknown length keyword")),
        };
        Ok(self.default_font_size * SIZE_SCALE.powi(step))
    }

    /// Resolve a box length (margin, padding, text-indent).
    ///
    /// Only absolute units are honored; anything relative resolves to 0.
    pub fn resolve_absolute(&self, value: &CssValue) -> f32 {
        match value {
            CssValue::Length(magnitude, unit) => match unit.points_per_unit() {
                Some(factor) => magnitude * factor,
                None => {
                    log::trace!("relative box length {value:?} treated as 0");
                    0.0
                }
            },
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::properties::{FontStyle, FontWeight};

    fn font(size: f32) -> Font {
        Font::new("Serif", size, FontWeight::Normal, FontStyle::Normal)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_absolute_units() {
        let r = LengthResolver::new();
        assert_eq!(r.resolve(&CssValue::pt(10.0), None, None).unwrap(), 10.0);
        assert_eq!(
            r.resolve(&CssValue::Length(1.0, LengthUnit::In), None, None).unwrap(),
            72.0
        );
        assert_eq!(
            r.resolve(&CssValue::Length(2.0, LengthUnit::Pc), None, None).unwrap(),
            24.0
        );
        assert!(close(
            r.resolve(&CssValue::Length(2.54, LengthUnit::Cm), None, None).unwrap(),
            72.0
        ));
    }

    #[test]
    fn test_em_needs_font() {
        let r = LengthResolver::new();
        let em = CssValue::Length(1.5, LengthUnit::Em);
        assert!(matches!(
            r.resolve(&em, None, None),
            Err(Error::MissingContext(_))
        ));
        assert_eq!(r.resolve(&em, Some(&font(10.0)), None).unwrap(), 15.0);
        let ex = CssValue::Length(2.0, LengthUnit::Ex);
        assert_eq!(r.resolve(&ex, Some(&font(10.0)), None).unwrap(), 10.0);
    }

    #[test]
    fn test_percentage() {
        let r = LengthResolver::new();
        let pct = CssValue::Percentage(150.0);
        assert_eq!(r.resolve(&pct, None, Some(10.0)).unwrap(), 15.0);
        assert_eq!(r.resolve(&pct, None, None).unwrap(), 18.0);
    }

    #[test]
    fn test_size_keywords() {
        let r = LengthResolver::new();
        let kw = |k: &str| r.resolve(&CssValue::keyword(k), None, None).unwrap();
        assert_eq!(kw("medium"), 12.0);
        assert!(close(kw("large"), 14.4));
        assert!(close(kw("xx-large"), 12.0 * 1.728));
        assert!(close(kw("small"), 10.0));
        assert!(close(kw("xx-small"), 12.0 / 1.728));
    }

    #[test]
    fn test_larger_smaller() {
        let r = LengthResolver::new();
        let larger = CssValue::keyword("larger");
        let smaller = CssValue::keyword("smaller");
        assert!(close(r.resolve(&larger, None, Some(10.0)).unwrap(), 12.0));
        assert!(close(r.resolve(&smaller, None, Some(12.0)).unwrap(), 10.0));
        assert!(close(r.resolve(&larger, None, None).unwrap(), 14.4));
    }

    #[test]
    fn test_numbers() {
        let r = LengthResolver::new();
        assert_eq!(r.resolve(&CssValue::Number(0.0), None, None).unwrap(), 0.0);
        assert!(r.resolve(&CssValue::Number(3.0), None, None).is_err());
        assert!(r.resolve(&CssValue::keyword("bogus"), None, None).is_err());
    }

    #[test]
    fn test_box_lengths_absolute_only() {
        let r = LengthResolver::new();
        assert_eq!(r.resolve_absolute(&CssValue::pt(4.0)), 4.0);
        assert_eq!(r.resolve_absolute(&CssValue::Length(2.0, LengthUnit::Em)), 0.0);
        assert_eq!(r.resolve_absolute(&CssValue::Percentage(50.0)), 0.0);
    }
}
