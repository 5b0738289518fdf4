//! List marker text.

use crate::style::ListStyleType;

/// Marker text for the list item at zero-based `index`.
///
/// Returns `None` for styles rendered as shapes (`disc`, `circle`,
/// `square`), for `none` and for unknown keywords.
///
/// Alphabetic and greek markers do not wrap: past the end of the alphabet
/// they continue with the following code points. Roman numerals above
/// [`ROMAN_LIMIT`] are written in decimal.
pub fn marker(keyword: &str, index: usize) -> Option<String> {
    let style = ListStyleType::parse(keyword)?;
    let ordinal = u128::try_from(index).ok()? + 1;
    match style {
        ListStyleType::Decimal => Some(ordinal.to_string()),
        ListStyleType::LowerRoman => Some(roman(ordinal).to_ascii_lowercase()),
        ListStyleType::UpperRoman => Some(roman(ordinal)),
        ListStyleType::LowerGreek => offset_char('α', index),
        ListStyleType::LowerAlpha => offset_char('a', index),
        ListStyleType::UpperAlpha => offset_char('A', index),
        ListStyleType::None
        | ListStyleType::Disc
        | ListStyleType::Circle
        | ListStyleType::Square => None,
    }
}

fn offset_char(first: char, index: usize) -> Option<String> {
    let code = u32::try_from(index).ok()?.checked_add(first as u32)?;
    char::from_u32(code).map(String::from)
}

/// Largest ordinal written as a roman numeral.
pub const ROMAN_LIMIT: u128 = 100_000;

const ROMAN: [(u128, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Uppercase subtractive roman numeral. Thousands repeat `M`.
fn roman(mut n: u128) -> String {
    if n > ROMAN_LIMIT {
        return n.to_string();
    }
    let mut out = String::new();
    for (value, digits) in ROMAN {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Value of an uppercase or lowercase roman numeral.
pub fn parse_roman(s: &str) -> Option<usize> {
    let digit = |c: char| match c.to_ascii_uppercase() {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    };
    let values = s.chars().map(digit).collect::<Option<Vec<i64>>>()?;
    if values.is_empty() {
        return None;
    }
    let mut total = 0i64;
    for (i, &v) in values.iter().enumerate() {
        match values.get(i + 1) {
            Some(&next) if next > v => total -= v,
            _ => total += v,
        }
    }
    usize::try_from(total).ok()
}
