//! CSS declaration parsing.
//!
//! Selector matching happens upstream; this module only turns declaration
//! blocks (as found in `style` attributes) into a [`StyleTable`].

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

use super::properties::Color;
use super::table::{Property, StyleTable};
use super::value::{CssValue, LengthUnit};

/// Parse a declaration block such as `font-size: 10pt; color: red`.
///
/// Parsing is lenient: invalid or unsupported declarations are skipped.
pub fn parse_declarations(block: &str) -> StyleTable {
    let mut table = StyleTable::new();
    let mut input = ParserInput::new(block);
    let mut parser = Parser::new(&mut input);
    let mut decl_parser = DeclarationListParser { table: &mut table };

    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        if let Err((_, slice)) = result {
            log::debug!("skipping invalid CSS declaration {slice:?}");
        }
    }

    table
}

/// Parse a single property value from text.
pub fn parse_value(property: Property, text: &str) -> Option<CssValue> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    parse_property_value(property, &mut parser)
}

fn parse_property_value(property: Property, input: &mut Parser<'_, '_>) -> Option<CssValue> {
    match property {
        Property::Color | Property::BackgroundColor => parse_color(input).map(CssValue::Color),
        Property::FontFamily => parse_family_list(input).map(CssValue::Keyword),
        _ => parse_component(input),
    }
}

/// Parse one length, percentage, number or keyword.
fn parse_component(input: &mut Parser<'_, '_>) -> Option<CssValue> {
    match input.next().ok()? {
        Token::Dimension { value, unit, .. } => {
            let unit = LengthUnit::from_css(unit.to_ascii_lowercase().as_str())?;
            Some(CssValue::Length(*value, unit))
        }
        Token::Percentage { unit_value, .. } => Some(CssValue::Percentage(*unit_value * 100.0)),
        Token::Number { value, .. } => Some(CssValue::Number(*value)),
        Token::Ident(ident) => Some(CssValue::Keyword(ident.to_ascii_lowercase())),
        _ => None,
    }
}

/// Parse a comma-separated font family list into a normalized string.
fn parse_family_list(input: &mut Parser<'_, '_>) -> Option<String> {
    let mut families: Vec<String> = Vec::new();
    let mut current = String::new();

    while let Ok(token) = input.next() {
        match token {
            Token::Comma => {
                if !current.is_empty() {
                    families.push(std::mem::take(&mut current));
                }
            }
            Token::Ident(name) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(name);
            }
            Token::QuotedString(name) => {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(name);
            }
            _ => return None,
        }
    }
    if !current.is_empty() {
        families.push(current);
    }

    if families.is_empty() {
        None
    } else {
        Some(families.join(", "))
    }
}

pub(crate) fn parse_color(input: &mut Parser<'_, '_>) -> Option<Color> {
    // Try named colors first
    if let Ok(token) = input.try_parse(|i| i.expect_ident_cloned()) {
        return Color::named(token.as_ref());
    }

    // cssparser reports #ff0000 as IDHash and #222299 as Hash. The token type
    // must be checked inside try_parse so the position is reset on mismatch.
    if let Ok(hash) = input.try_parse(|i| -> Result<_, ParseError<'_, ()>> {
        match i.next()? {
            Token::IDHash(h) | Token::Hash(h) => Ok(h.clone()),
            _ => Err(i.new_custom_error(())),
        }
    }) && let Some(color) = parse_hex_color(hash.as_ref())
    {
        return Some(color);
    }

    if let Ok(color) = input.try_parse(parse_rgb_function) {
        return Some(color);
    }

    None
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(Color::rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::rgb(r, g, b))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Color::rgba(r, g, b, a))
        }
        _ => None,
    }
}

fn parse_rgb_function<'i>(input: &mut Parser<'i, '_>) -> Result<Color, ParseError<'i, ()>> {
    input.expect_function_matching("rgb")?;
    input.parse_nested_block(|input| {
        let r = parse_color_component(input)?;
        input.expect_comma()?;
        let g = parse_color_component(input)?;
        input.expect_comma()?;
        let b = parse_color_component(input)?;
        Ok(Color::rgb(r, g, b))
    })
}

fn parse_color_component<'i>(input: &mut Parser<'i, '_>) -> Result<u8, ParseError<'i, ()>> {
    let location = input.current_source_location();
    match input.next()? {
        Token::Number {
            int_value: Some(v), ..
        } => Ok((*v).clamp(0, 255) as u8),
        Token::Percentage { unit_value, .. } => {
            Ok((unit_value * 255.0).round().clamp(0.0, 255.0) as u8)
        }
        _ => Err(location.new_custom_error(())),
    }
}

/// Extract the color from a `background` shorthand, skipping everything else.
fn parse_background_color(input: &mut Parser<'_, '_>) -> Option<Color> {
    let mut color = None;
    while !input.is_exhausted() {
        if color.is_none()
            && let Ok(c) =
                input.try_parse(|i| parse_color(i).ok_or(i.new_custom_error::<_, ()>(())))
        {
            color = Some(c);
            continue;
        }
        if input.next().is_err() {
            break;
        }
    }
    color
}

/// Expand a 1-4 value box shorthand (`margin`, `padding`).
fn parse_box_shorthand(
    input: &mut Parser<'_, '_>,
    sides: [Property; 4],
    table: &mut StyleTable,
) -> bool {
    let mut values = Vec::with_capacity(4);
    while values.len() < 4 {
        let Ok(value) = input.try_parse(|i| parse_component(i).ok_or(i.new_custom_error::<_, ()>(())))
        else {
            break;
        };
        values.push(value);
    }

    // top, right, bottom, left
    let expanded = match values.as_slice() {
        [all] => [all.clone(), all.clone(), all.clone(), all.clone()],
        [v, h] => [v.clone(), h.clone(), v.clone(), h.clone()],
        [t, h, b] => [t.clone(), h.clone(), b.clone(), h.clone()],
        [t, r, b, l] => [t.clone(), r.clone(), b.clone(), l.clone()],
        _ => return false,
    };
    for (side, value) in sides.into_iter().zip(expanded) {
        table.set(side, value);
    }
    true
}

struct DeclarationListParser<'a> {
    table: &'a mut StyleTable,
}

impl DeclarationListParser<'_> {
    fn apply(&mut self, name: &str, input: &mut Parser<'_, '_>) -> bool {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "margin" => parse_box_shorthand(
                input,
                [
                    Property::MarginTop,
                    Property::MarginRight,
                    Property::MarginBottom,
                    Property::MarginLeft,
                ],
                self.table,
            ),
            "padding" => parse_box_shorthand(
                input,
                [
                    Property::PaddingTop,
                    Property::PaddingRight,
                    Property::PaddingBottom,
                    Property::PaddingLeft,
                ],
                self.table,
            ),
            "background" => match parse_background_color(input) {
                Some(color) => {
                    self.table.set(Property::BackgroundColor, CssValue::Color(color));
                    true
                }
                None => false,
            },
            "list-style" => {
                while let Ok(ident) = input.try_parse(|i| i.expect_ident_cloned()) {
                    if super::properties::ListStyleType::parse(ident.as_ref()).is_some() {
                        self.table.set(
                            Property::ListStyleType,
                            CssValue::Keyword(ident.to_ascii_lowercase()),
                        );
                        return true;
                    }
                }
                false
            }
            _ => {
                let Some(property) = Property::from_name(&lower) else {
                    log::debug!("ignoring unsupported CSS property {lower:?}");
                    return false;
                };
                match parse_property_value(property, input) {
                    Some(value) => {
                        self.table.set(property, value);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        if self.apply(&name, input) {
            // Values arrive already cascaded, importance carries no meaning here
            let _ = input.try_parse(cssparser::parse_important);
            Ok(())
        } else {
            Err(input.new_custom_error(()))
        }
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths_and_keywords() {
        let table = parse_declarations("font-size: 10pt; display: List-Item; line-height: 1.5");
        assert_eq!(table.font_size, Some(CssValue::pt(10.0)));
        assert_eq!(table.display, Some(CssValue::keyword("list-item")));
        assert_eq!(table.line_height, Some(CssValue::Number(1.5)));
    }

    #[test]
    fn test_parse_percentage() {
        let table = parse_declarations("font-size: 150%");
        assert_eq!(table.font_size, Some(CssValue::Percentage(150.0)));
    }

    #[test]
    fn test_parse_colors() {
        let table = parse_declarations(
            "color: #f00; background-color: rgb(0, 128, 255); border-color: red",
        );
        assert_eq!(table.color, Some(CssValue::Color(Color::rgb(255, 0, 0))));
        assert_eq!(
            table.background_color,
            Some(CssValue::Color(Color::rgb(0, 128, 255)))
        );
    }

    #[test]
    fn test_parse_background_shorthand() {
        let table = parse_declarations("background: url(x.png) no-repeat #00ff00");
        assert_eq!(
            table.background_color,
            Some(CssValue::Color(Color::rgb(0, 255, 0)))
        );
    }

    #[test]
    fn test_parse_font_family_list() {
        let table = parse_declarations("font-family: \"Times New Roman\", Georgia, serif");
        assert_eq!(
            table.font_family,
            Some(CssValue::keyword("Times New Roman, Georgia, serif"))
        );
    }

    #[test]
    fn test_parse_margin_shorthand() {
        let table = parse_declarations("margin: 1pt 2pt");
        assert_eq!(table.margin_top, Some(CssValue::pt(1.0)));
        assert_eq!(table.margin_right, Some(CssValue::pt(2.0)));
        assert_eq!(table.margin_bottom, Some(CssValue::pt(1.0)));
        assert_eq!(table.margin_left, Some(CssValue::pt(2.0)));
    }

    #[test]
    fn test_invalid_declarations_are_skipped() {
        let table = parse_declarations("font-size: ; color: blue; float: left; @junk");
        assert_eq!(table.font_size, None);
        assert_eq!(table.color, Some(CssValue::Color(Color::rgb(0, 0, 255))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_important_is_accepted() {
        let table = parse_declarations("font-weight: bold !important");
        assert_eq!(table.font_weight, Some(CssValue::keyword("bold")));
    }

    #[test]
    fn test_list_style_shorthand() {
        let table = parse_declarations("list-style: inside lower-roman");
        assert_eq!(table.list_style_type, Some(CssValue::keyword("lower-roman")));
    }
}
