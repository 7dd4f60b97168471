use ratatui::style::Color;
use std::str::FromStr;

/// Fallback for colors the terminal cannot show.
pub const FALLBACK: Color = Color::Gray;

/// Converts a CSS color from the backend to a terminal color. Handles
/// `#rgb`, `#rrggbb`, `#rrggbbaa` (alpha blended over black) and the named
/// colors ratatui knows.
pub fn parse_css_color(value: &str) -> Color {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(FALLBACK);
    }
    Color::from_str(value).unwrap_or(FALLBACK)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range).and_then(|digits| u8::from_str_radix(digits, 16).ok())
    };

    match hex.len() {
        3 => {
            let mut rgb = [0_u8; 3];
            for (i, slot) in rgb.iter_mut().enumerate() {
                let digit = channel(i..i + 1)?;
                *slot = digit * 17;
            }
            Some(Color::Rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => {
            let alpha = u16::from(channel(6..8)?);
            let blend = |c: u8| u8::try_from(u16::from(c) * alpha / 255).unwrap_or(u8::MAX);
            Some(Color::Rgb(
                blend(channel(0..2)?),
                blend(channel(2..4)?),
                blend(channel(4..6)?),
            ))
        }
        _ => None,
    }
}
