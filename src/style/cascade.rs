//! Resolve-parent cascade.
//!
//! Every run or element carries an [`AttributeSet`]: its locally specified
//! properties plus a weak back-reference to the enclosing element's set.
//! [`CascadeResolver`] answers style queries by walking that chain, applying
//! property-specific defaults when nothing is found.
//!
//! Inherited (resolved up the chain): font-family, font-size, font-weight,
//! font-style, color, line-height, text-indent, text-align, white-space.
//! Local only: display, vertical-align, page-break-*, list-style-type,
//! background-color, margins and padding.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use html5ever::QualName;

use super::font::{Font, FontCache, ResolverConfig, generic_family};
use super::length::LengthResolver;
use super::properties::{
    BreakValue, Color, Display, FontStyle, FontWeight, ListStyleType, TextAlign, VerticalAlign,
    WhiteSpace,
};
use super::table::{Property, StyleTable};
use super::value::CssValue;
use crate::dom::{Attribute, DocumentInfo};
use crate::error::{Error, Result};

/// What an [`AttributeSet`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// The synthetic section enclosing all documents.
    Section,
    /// A source element.
    Element,
    /// A text run.
    Content,
    /// A synthetic break between documents.
    PageBreak,
}

/// Style and identity for one element or text run.
#[derive(Debug, Clone)]
pub struct AttributeSet {
    pub kind: SetKind,
    /// Element name; `None` for text runs and the section.
    pub name: Option<QualName>,
    /// Locally specified properties.
    pub style: StyleTable,
    /// Source attributes, carried opaquely for round-tripping.
    pub attributes: Vec<Attribute>,
    /// `base#id` link target for elements with an id.
    pub target_uri: Option<String>,
    /// Document metadata, present only on document roots.
    pub document: Option<DocumentInfo>,
    /// For XHTML roots: the set standing in for `body`, which is not emitted
    /// itself but is the resolve parent of its flattened children.
    pub body_scope: Option<Rc<AttributeSet>>,
    resolve_parent: RefCell<Weak<AttributeSet>>,
}

impl AttributeSet {
    pub fn new(kind: SetKind) -> Self {
        Self {
            kind,
            name: None,
            style: StyleTable::new(),
            attributes: Vec::new(),
            target_uri: None,
            document: None,
            body_scope: None,
            resolve_parent: RefCell::new(Weak::new()),
        }
    }

    /// An element set named `name` with the given local style.
    pub fn element(name: QualName, style: StyleTable) -> Self {
        Self {
            name: Some(name),
            style,
            ..Self::new(SetKind::Element)
        }
    }

    pub fn with_name(mut self, name: QualName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_style(mut self, style: StyleTable) -> Self {
        self.style = style;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_target_uri(mut self, uri: impl Into<String>) -> Self {
        self.target_uri = Some(uri.into());
        self
    }

    pub fn with_document(mut self, info: DocumentInfo) -> Self {
        self.document = Some(info);
        self
    }

    pub fn with_body_scope(mut self, body: Rc<AttributeSet>) -> Self {
        self.body_scope = Some(body);
        self
    }

    /// Point upward lookups at `parent`. The link never keeps it alive.
    pub fn set_resolve_parent(&self, parent: &Rc<AttributeSet>) {
        *self.resolve_parent.borrow_mut() = Rc::downgrade(parent);
    }

    pub fn clear_resolve_parent(&self) {
        *self.resolve_parent.borrow_mut() = Weak::new();
    }

    /// The enclosing set, if it is still alive.
    pub fn resolve_parent(&self) -> Option<Rc<AttributeSet>> {
        self.resolve_parent.borrow().upgrade()
    }

    /// Copy of this set with the resolve-parent link removed.
    pub fn detached_clone(&self) -> Self {
        let copy = self.clone();
        copy.clear_resolve_parent();
        copy
    }

    pub fn local_name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.local.as_ref())
    }

    /// Value of the first attribute with local name `local`.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local.as_ref() == local)
            .map(|a| a.value.as_str())
    }

    #[inline]
    pub fn is_page_break(&self) -> bool {
        self.kind == SetKind::PageBreak
    }

    /// Whether this set roots a source document.
    #[inline]
    pub fn is_document_root(&self) -> bool {
        self.document.is_some()
    }
}

/// Computed `line-height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    /// A multiple of the font size.
    Multiplier(f32),
    /// A fixed height in points.
    Absolute(f32),
}

impl LineHeight {
    pub fn to_points(self, font_size: f32) -> f32 {
        match self {
            LineHeight::Multiplier(m) => m * font_size,
            LineHeight::Absolute(pt) => pt,
        }
    }
}

/// Box edge for margin and padding queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn margin(self) -> Property {
        match self {
            Side::Top => Property::MarginTop,
            Side::Right => Property::MarginRight,
            Side::Bottom => Property::MarginBottom,
            Side::Left => Property::MarginLeft,
        }
    }

    fn padding(self) -> Property {
        match self {
            Side::Top => Property::PaddingTop,
            Side::Right => Property::PaddingRight,
            Side::Bottom => Property::PaddingBottom,
            Side::Left => Property::PaddingLeft,
        }
    }
}

/// Answers typed style queries against [`AttributeSet`] chains.
///
/// Typed accessors never fail: a malformed value or a cyclic chain is
/// logged and the property's default is returned instead.
#[derive(Debug)]
pub struct CascadeResolver {
    config: ResolverConfig,
    lengths: LengthResolver,
    fonts: RefCell<FontCache>,
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        let lengths = LengthResolver::new().with_default_font_size(config.default_font_size);
        let fonts = RefCell::new(FontCache::new(config.font_cache_capacity));
        Self {
            config,
            lengths,
            fonts,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn lengths(&self) -> &LengthResolver {
        &self.lengths
    }

    /// Drop every cached font. Later queries rebuild them.
    pub fn clear_font_cache(&self) {
        self.fonts.borrow_mut().clear();
    }

    /// Look up `property`, walking the resolve-parent chain if `resolve_up`.
    ///
    /// Returns `Err(MalformedCascade)` if the chain loops back on itself.
    pub fn try_get_property(
        &self,
        attrs: &AttributeSet,
        property: Property,
        resolve_up: bool,
    ) -> Result<Option<CssValue>> {
        if let Some(value) = attrs.style.get(property) {
            return Ok(Some(value.clone()));
        }
        if !resolve_up {
            return Ok(None);
        }

        let mut visited: Vec<*const AttributeSet> = vec![attrs as *const AttributeSet];
        let mut current = attrs.resolve_parent();
        while let Some(node) = current {
            let ptr = Rc::as_ptr(&node);
            if visited.contains(&ptr) {
                return Err(Error::MalformedCascade);
            }
            visited.push(ptr);
            if let Some(value) = node.style.get(property) {
                return Ok(Some(value.clone()));
            }
            current = node.resolve_parent();
        }
        Ok(None)
    }

    /// [`try_get_property`](Self::try_get_property), treating a cycle as
    /// "not found".
    pub fn get_property(
        &self,
        attrs: &AttributeSet,
        property: Property,
        resolve_up: bool,
    ) -> Option<CssValue> {
        match self.try_get_property(attrs, property, resolve_up) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{e} while resolving {}", property.as_str());
                None
            }
        }
    }

    /// [`get_property`](Self::get_property) by CSS name. Unknown names
    /// yield `None`.
    pub fn get_property_by_name(
        &self,
        attrs: &AttributeSet,
        name: &str,
        resolve_up: bool,
    ) -> Option<CssValue> {
        let property = Property::from_name(name)?;
        self.get_property(attrs, property, resolve_up)
    }

    fn keyword(&self, attrs: &AttributeSet, property: Property, resolve_up: bool) -> Option<String> {
        match self.get_property(attrs, property, resolve_up)? {
            CssValue::Keyword(k) => Some(k.to_ascii_lowercase()),
            other => {
                log::debug!("expected keyword for {}, got {other:?}", property.as_str());
                None
            }
        }
    }

    fn color_of(&self, value: Option<CssValue>, property: Property) -> Option<Color> {
        let value = value?;
        let color = value.as_color();
        if color.is_none() {
            log::debug!("invalid {} value {value:?}", property.as_str());
        }
        color
    }

    /// Foreground color, inherited; black by default.
    pub fn color(&self, attrs: &AttributeSet) -> Color {
        let value = self.get_property(attrs, Property::Color, true);
        self.color_of(value, Property::Color)
            .unwrap_or(Color::BLACK)
    }

    /// Locally specified background; `None` means "no background".
    pub fn background_color(&self, attrs: &AttributeSet) -> Option<Color> {
        let value = self.get_property(attrs, Property::BackgroundColor, false);
        self.color_of(value, Property::BackgroundColor)
    }

    /// Background to paint: the nearest specified background up the chain,
    /// white at the root.
    pub fn effective_background_color(&self, attrs: &AttributeSet) -> Color {
        let value = self.get_property(attrs, Property::BackgroundColor, true);
        self.color_of(value, Property::BackgroundColor)
            .unwrap_or(Color::WHITE)
    }

    /// Font size in points.
    ///
    /// Relative sizes (`em`, `%`, `larger`, `smaller`) resolve against the
    /// parent's computed size.
    pub fn font_size(&self, attrs: &AttributeSet) -> f32 {
        let mut visited = Vec::new();
        match self.font_size_at(attrs, &mut visited) {
            Ok(size) => size,
            Err(e) => {
                log::warn!("{e} while resolving font-size");
                self.config.default_font_size
            }
        }
    }

    fn font_size_at(
        &self,
        attrs: &AttributeSet,
        visited: &mut Vec<*const AttributeSet>,
    ) -> Result<f32> {
        let ptr = attrs as *const AttributeSet;
        if visited.contains(&ptr) {
            return Err(Error::MalformedCascade);
        }
        visited.push(ptr);

        let parent = match attrs.resolve_parent() {
            Some(p) => Some(self.font_size_at(&p, visited)?),
            None => None,
        };
        let inherited = parent.unwrap_or(self.config.default_font_size);

        let Some(value) = attrs.style.get(Property::FontSize) else {
            return Ok(inherited);
        };
        let reference = Font::new("", inherited, FontWeight::Normal, FontStyle::Normal);
        match self.lengths.resolve(value, Some(&reference), parent) {
            Ok(size) => Ok(size),
            Err(e) => {
                log::debug!("font-size {value:?}: {e}");
                Ok(inherited)
            }
        }
    }

    /// The declared `font-family` list, in order, unquoted.
    pub fn font_families(&self, attrs: &AttributeSet) -> Vec<String> {
        match self.get_property(attrs, Property::FontFamily, true) {
            Some(CssValue::Keyword(list)) => list
                .split(',')
                .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\'').trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The family to render with.
    ///
    /// Walks the declared list: a generic keyword maps to its platform
    /// family and ends the search; otherwise the first family in the catalog
    /// wins. Falls back to the `serif` platform family.
    pub fn font_family(&self, attrs: &AttributeSet) -> String {
        for name in self.font_families(attrs) {
            if let Some(platform) = generic_family(&name) {
                return platform.to_string();
            }
            if let Some(family) = self.config.catalog.lookup(&name) {
                return family.to_string();
            }
        }
        generic_family("serif").unwrap_or("Serif").to_string()
    }

    pub fn font_weight(&self, attrs: &AttributeSet) -> FontWeight {
        self.keyword(attrs, Property::FontWeight, true)
            .map(|k| FontWeight::from_keyword(&k))
            .unwrap_or_default()
    }

    pub fn font_style(&self, attrs: &AttributeSet) -> FontStyle {
        self.keyword(attrs, Property::FontStyle, true)
            .map(|k| FontStyle::from_keyword(&k))
            .unwrap_or_default()
    }

    /// The complete font, shared through the font cache.
    pub fn font(&self, attrs: &AttributeSet) -> Rc<Font> {
        let family = self.font_family(attrs);
        let size = self.font_size(attrs);
        let weight = self.font_weight(attrs);
        let style = self.font_style(attrs);
        self.fonts.borrow_mut().get(&family, size, weight, style)
    }

    pub fn line_height(&self, attrs: &AttributeSet) -> LineHeight {
        let default = LineHeight::Multiplier(self.config.default_line_height);
        let Some(value) = self.get_property(attrs, Property::LineHeight, true) else {
            return default;
        };
        match &value {
            CssValue::Number(n) => LineHeight::Multiplier(*n),
            CssValue::Percentage(p) => LineHeight::Multiplier(p / 100.0),
            CssValue::Keyword(k) if k.eq_ignore_ascii_case("normal") => default,
            CssValue::Length(..) => {
                let font = self.font(attrs);
                match self.lengths.resolve(&value, Some(&font), None) {
                    Ok(pt) => LineHeight::Absolute(pt),
                    Err(e) => {
                        log::debug!("line-height {value:?}: {e}");
                        default
                    }
                }
            }
            _ => {
                log::debug!("invalid line-height {value:?}");
                default
            }
        }
    }

    /// First-line indent in points. Absolute units only.
    pub fn text_indent(&self, attrs: &AttributeSet) -> f32 {
        self.get_property(attrs, Property::TextIndent, true)
            .map(|v| self.lengths.resolve_absolute(&v))
            .unwrap_or(0.0)
    }

    /// Margin in points. Absolute units only.
    pub fn margin(&self, attrs: &AttributeSet, side: Side) -> f32 {
        self.get_property(attrs, side.margin(), false)
            .map(|v| self.lengths.resolve_absolute(&v))
            .unwrap_or(0.0)
    }

    /// Padding in points. Absolute units only.
    pub fn padding(&self, attrs: &AttributeSet, side: Side) -> f32 {
        self.get_property(attrs, side.padding(), false)
            .map(|v| self.lengths.resolve_absolute(&v))
            .unwrap_or(0.0)
    }

    pub fn display(&self, attrs: &AttributeSet) -> Display {
        self.keyword(attrs, Property::Display, false)
            .and_then(|k| Display::from_css(&k))
            .unwrap_or_default()
    }

    pub fn vertical_align(&self, attrs: &AttributeSet) -> VerticalAlign {
        self.keyword(attrs, Property::VerticalAlign, false)
            .and_then(|k| VerticalAlign::from_css(&k))
            .unwrap_or_default()
    }

    pub fn page_break_before(&self, attrs: &AttributeSet) -> BreakValue {
        self.keyword(attrs, Property::PageBreakBefore, false)
            .and_then(|k| BreakValue::from_css(&k))
            .unwrap_or_default()
    }

    pub fn page_break_after(&self, attrs: &AttributeSet) -> BreakValue {
        self.keyword(attrs, Property::PageBreakAfter, false)
            .and_then(|k| BreakValue::from_css(&k))
            .unwrap_or_default()
    }

    /// The raw `list-style-type` keyword, defaulting to `disc`.
    ///
    /// Kept as a string so unknown styles reach the marker generator
    /// unchanged.
    pub fn list_style_keyword(&self, attrs: &AttributeSet) -> String {
        self.keyword(attrs, Property::ListStyleType, false)
            .unwrap_or_else(|| ListStyleType::default().as_str().to_string())
    }

    pub fn list_style_type(&self, attrs: &AttributeSet) -> ListStyleType {
        ListStyleType::parse(&self.list_style_keyword(attrs)).unwrap_or_default()
    }

    pub fn text_align(&self, attrs: &AttributeSet) -> TextAlign {
        self.keyword(attrs, Property::TextAlign, true)
            .and_then(|k| TextAlign::from_css(&k))
            .unwrap_or_default()
    }

    pub fn white_space(&self, attrs: &AttributeSet) -> WhiteSpace {
        self.keyword(attrs, Property::WhiteSpace, true)
            .and_then(|k| WhiteSpace::from_css(&k))
            .unwrap_or_default()
    }
}
