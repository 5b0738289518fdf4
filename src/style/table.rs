//! Typed per-element property tables.

use super::ToCss;
use super::properties::enum_property;
use super::value::CssValue;

enum_property! {
    /// The CSS properties the renderer understands.
    pub enum Property {
        #[default]
        FontFamily => "font-family",
        FontSize => "font-size",
        FontWeight => "font-weight",
        FontStyle => "font-style",
        Color => "color",
        BackgroundColor => "background-color",
        LineHeight => "line-height",
        TextIndent => "text-indent",
        TextAlign => "text-align",
        WhiteSpace => "white-space",
        Display => "display",
        VerticalAlign => "vertical-align",
        PageBreakBefore => "page-break-before",
        PageBreakAfter => "page-break-after",
        ListStyleType => "list-style-type",
        MarginTop => "margin-top",
        MarginRight => "margin-right",
        MarginBottom => "margin-bottom",
        MarginLeft => "margin-left",
        PaddingTop => "padding-top",
        PaddingRight => "padding-right",
        PaddingBottom => "padding-bottom",
        PaddingLeft => "padding-left",
    }
}

impl Property {
    /// Every property, in serialization order.
    pub const ALL: [Property; 23] = [
        Property::FontFamily,
        Property::FontSize,
        Property::FontWeight,
        Property::FontStyle,
        Property::Color,
        Property::BackgroundColor,
        Property::LineHeight,
        Property::TextIndent,
        Property::TextAlign,
        Property::WhiteSpace,
        Property::Display,
        Property::VerticalAlign,
        Property::PageBreakBefore,
        Property::PageBreakAfter,
        Property::ListStyleType,
        Property::MarginTop,
        Property::MarginRight,
        Property::MarginBottom,
        Property::MarginLeft,
        Property::PaddingTop,
        Property::PaddingRight,
        Property::PaddingBottom,
        Property::PaddingLeft,
    ];

    /// Look a property up by its CSS name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Property::from_css(name.trim().to_ascii_lowercase().as_str())
    }

    /// Whether the cascade walks the resolve-parent chain for this property.
    ///
    /// `background-color` is not inherited here; the effective background
    /// is a separate accessor.
    pub fn is_inherited(self) -> bool {
        matches!(
            self,
            Property::FontFamily
                | Property::FontSize
                | Property::FontWeight
                | Property::FontStyle
                | Property::Color
                | Property::LineHeight
                | Property::TextIndent
                | Property::TextAlign
                | Property::WhiteSpace
        )
    }
}

/// Locally specified CSS values for one element.
///
/// Each known property has its own slot; there is no string-keyed bag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleTable {
    pub font_family: Option<CssValue>,
    pub font_size: Option<CssValue>,
    pub font_weight: Option<CssValue>,
    pub font_style: Option<CssValue>,
    pub color: Option<CssValue>,
    pub background_color: Option<CssValue>,
    pub line_height: Option<CssValue>,
    pub text_indent: Option<CssValue>,
    pub text_align: Option<CssValue>,
    pub white_space: Option<CssValue>,
    pub display: Option<CssValue>,
    pub vertical_align: Option<CssValue>,
    pub page_break_before: Option<CssValue>,
    pub page_break_after: Option<CssValue>,
    pub list_style_type: Option<CssValue>,
    pub margin_top: Option<CssValue>,
    pub margin_right: Option<CssValue>,
    pub margin_bottom: Option<CssValue>,
    pub margin_left: Option<CssValue>,
    pub padding_top: Option<CssValue>,
    pub padding_right: Option<CssValue>,
    pub padding_bottom: Option<CssValue>,
    pub padding_left: Option<CssValue>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the body of a `style` attribute or declaration block.
    pub fn parse(block: &str) -> Self {
        super::parse::parse_declarations(block)
    }

    fn slot(&self, property: Property) -> &Option<CssValue> {
        match property {
            Property::FontFamily => &self.font_family,
            Property::FontSize => &self.font_size,
            Property::FontWeight => &self.font_weight,
            Property::FontStyle => &self.font_style,
            Property::Color => &self.color,
            Property::BackgroundColor => &self.background_color,
            Property::LineHeight => &self.line_height,
            Property::TextIndent => &self.text_indent,
            Property::TextAlign => &self.text_align,
            Property::WhiteSpace => &self.white_space,
            Property::Display => &self.display,
            Property::VerticalAlign => &self.vertical_align,
            Property::PageBreakBefore => &self.page_break_before,
            Property::PageBreakAfter => &self.page_break_after,
            Property::ListStyleType => &self.list_style_type,
            Property::MarginTop => &self.margin_top,
            Property::MarginRight => &self.margin_right,
            Property::MarginBottom => &self.margin_bottom,
            Property::MarginLeft => &self.margin_left,
            Property::PaddingTop => &self.padding_top,
            Property::PaddingRight => &self.padding_right,
            Property::PaddingBottom => &self.padding_bottom,
            Property::PaddingLeft => &self.padding_left,
        }
    }

    fn slot_mut(&mut self, property: Property) -> &mut Option<CssValue> {
        match property {
            Property::FontFamily => &mut self.font_family,
            Property::FontSize => &mut self.font_size,
            Property::FontWeight => &mut self.font_weight,
            Property::FontStyle => &mut self.font_style,
            Property::Color => &mut self.color,
            Property::BackgroundColor => &mut self.background_color,
            Property::LineHeight => &mut self.line_height,
            Property::TextIndent => &mut self.text_indent,
            Property::TextAlign => &mut self.text_align,
            Property::WhiteSpace => &mut self.white_space,
            Property::Display => &mut self.display,
            Property::VerticalAlign => &mut self.vertical_align,
            Property::PageBreakBefore => &mut self.page_break_before,
            Property::PageBreakAfter => &mut self.page_break_after,
            Property::ListStyleType => &mut self.list_style_type,
            Property::MarginTop => &mut self.margin_top,
            Property::MarginRight => &mut self.margin_right,
            Property::MarginBottom => &mut self.margin_bottom,
            Property::MarginLeft => &mut self.margin_left,
            Property::PaddingTop => &mut self.padding_top,
            Property::PaddingRight => &mut self.padding_right,
            Property::PaddingBottom => &mut self.padding_bottom,
            Property::PaddingLeft => &mut self.padding_left,
        }
    }

    #[inline]
    pub fn get(&self, property: Property) -> Option<&CssValue> {
        self.slot(property).as_ref()
    }

    /// Look a value up by CSS property name. Unknown names yield `None`.
    pub fn get_by_name(&self, name: &str) -> Option<&CssValue> {
        Property::from_name(name).and_then(|p| self.get(p))
    }

    pub fn set(&mut self, property: Property, value: CssValue) {
        *self.slot_mut(property) = Some(value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, property: Property, value: CssValue) -> Self {
        self.set(property, value);
        self
    }

    /// Set a value by CSS name. Returns `false` if the property is unknown.
    pub fn set_by_name(&mut self, name: &str, value: CssValue) -> bool {
        match Property::from_name(name) {
            Some(property) => {
                self.set(property, value);
                true
            }
            None => {
                log::debug!("ignoring unsupported CSS property {name:?}");
                false
            }
        }
    }

    pub fn remove(&mut self, property: Property) -> Option<CssValue> {
        self.slot_mut(property).take()
    }

    /// Iterate over the specified properties in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Property, &CssValue)> {
        Property::ALL
            .into_iter()
            .filter_map(move |p| self.get(p).map(|v| (p, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

impl ToCss for StyleTable {
    fn to_css(&self, buf: &mut String) {
        for (i, (property, value)) in self.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            buf.push_str(property.as_str());
            buf.push_str(": ");
            value.to_css(buf);
            buf.push(';');
        }
    }
}
