//! Fonts, the catalog of available families, and the font cache.

use std::collections::HashMap;
use std::rc::Rc;

use super::length::{DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT};
use super::properties::{FontStyle, FontWeight};

/// A resolved font description.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    /// Size in points.
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32, weight: FontWeight, style: FontStyle) -> Self {
        Self {
            family: family.into(),
            size,
            weight,
            style,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_italic(&self) -> bool {
        self.style == FontStyle::Italic
    }
}

/// Platform family names for the CSS generic keywords.
const GENERIC_FAMILIES: &[(&str, &str)] = &[
    ("serif", "Serif"),
    ("sans-serif", "SansSerif"),
    ("monospace", "Monospaced"),
    ("symbol", "Symbol"),
];

/// Map a generic family keyword (`serif`, `monospace`, ...) to its platform
/// family, case-insensitively.
pub(crate) fn generic_family(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_ascii_lowercase();
    GENERIC_FAMILIES
        .iter()
        .find(|(keyword, _)| *keyword == lower)
        .map(|(_, family)| *family)
}

/// The font families a host can render.
///
/// Names are matched case-insensitively and reported in their registered
/// spelling. The platform families for the generic keywords are always
/// present.
#[derive(Debug, Clone)]
pub struct FontCatalog {
    families: HashMap<String, String>,
}

impl Default for FontCatalog {
    fn default() -> Self {
        let mut catalog = Self {
            families: HashMap::new(),
        };
        for (_, family) in GENERIC_FAMILIES {
            catalog.insert(family);
        }
        catalog
    }
}

impl FontCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.insert(family);
        self
    }

    pub fn insert(&mut self, family: &str) {
        let family = family.trim();
        if !family.is_empty() {
            self.families
                .insert(family.to_lowercase(), family.to_string());
        }
    }

    /// The registered spelling of `family`, if it is available.
    pub fn lookup(&self, family: &str) -> Option<&str> {
        self.families
            .get(&family.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.lookup(family).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    size_bits: u32,
    bold: bool,
    italic: bool,
}

/// Fixed-capacity least-recently-used cache of fonts.
///
/// Lookups always succeed: a miss builds the font and may evict the entry
/// that was used longest ago.
#[derive(Debug)]
pub struct FontCache {
    capacity: usize,
    tick: u64,
    entries: HashMap<FontKey, (Rc<Font>, u64)>,
}

impl FontCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, family: &str, size: f32, weight: FontWeight, style: FontStyle) -> Rc<Font> {
        let key = FontKey {
            family: family.to_string(),
            size_bits: size.to_bits(),
            bold: weight == FontWeight::Bold,
            italic: style == FontStyle::Italic,
        };
        self.tick += 1;
        let tick = self.tick;

        if let Some((font, used)) = self.entries.get_mut(&key) {
            *used = tick;
            return Rc::clone(font);
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        let font = Rc::new(Font::new(family, size, weight, style));
        self.entries.insert(key, (Rc::clone(&font), tick));
        font
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, (_, used))| *used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            log::trace!("evicting font {} {}pt", key.family, f32::from_bits(key.size_bits));
            self.entries.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Configuration for [`CascadeResolver`](super::CascadeResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Font size in points when the cascade specifies none.
    pub default_font_size: f32,
    /// Line height multiplier when the cascade specifies none.
    pub default_line_height: f32,
    /// Maximum number of cached fonts.
    pub font_cache_capacity: usize,
    pub catalog: FontCatalog,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            default_line_height: DEFAULT_LINE_HEIGHT,
            font_cache_capacity: 64,
            catalog: FontCatalog::default(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_font_size(mut self, size: f32) -> Self {
        self.default_font_size = size;
        self
    }

    pub fn with_default_line_height(mut self, multiplier: f32) -> Self {
        self.default_line_height = multiplier;
        self
    }

    pub fn with_font_cache_capacity(mut self, capacity: usize) -> Self {
        self.font_cache_capacity = capacity;
        self
    }

    pub fn with_catalog(mut self, catalog: FontCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}
