//! Paint colour parsing and the preset palette.

use image::Rgb;

/// Preset palette as (hex, label) pairs.
pub const PRESETS: [(&str, &str); 30] = [
    ("#000000", "noir"),
    ("#333434", "gris"),
    ("#D4D7D9", "gris clair"),
    ("#FFFFFF", "blanc"),
    ("#6D302F", "maron"),
    ("#6D001A", "rouge marronâtre"),
    ("#9C451A", "maron clair"),
    ("#BE0027", "rouge"),
    ("#FF2651", "rouge clair"),
    ("#FF2D00", "rouge"),
    ("#FFA800", "orange foncé"),
    ("#FFD623", "jaune"),
    ("#FFF8B8", "beige"),
    ("#7EED38", "vert clair"),
    ("#00CC4E", "vert"),
    ("#00A344", "vert foncé"),
    ("#598D5A", "vert foncé foncé"),
    ("#004B6F", "bleu sous marin"),
    ("#009EAA", "bleu marin"),
    ("#00CCC0", "bleu sale de bain"),
    ("#33E9F4", "cian"),
    ("#5EB3FF", "bleu evian"),
    ("#245AEA", "bleu ciel"),
    ("#313AC1", "bleu ciel violet"),
    ("#1832A4", "ciel violet foncé"),
    ("#511E9F", "violet"),
    ("#6A5CFF", "violet clair"),
    ("#B44AC0", "violet clair rose"),
    ("#FF63AA", "rose"),
    ("#E4ABFF", "rose clair"),
];

/// Parse loosely formatted hex colour input.
///
/// Non-hex characters are dropped, the rest is cut to six digits and padded
/// with `0`, so any input yields a colour: `"#f0"` becomes `#F00000`.
pub fn parse_hex_color(input: &str) -> Rgb<u8> {
    let mut digits: Vec<u8> = input
        .chars()
        .filter_map(|c| c.to_digit(16))
        .take(6)
        .map(|d| d as u8)
        .collect();
    digits.resize(6, 0);

    Rgb([
        digits[0] << 4 | digits[1],
        digits[2] << 4 | digits[3],
        digits[4] << 4 | digits[5],
    ])
}

/// Format a colour as `#RRGGBB`.
pub fn to_hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}
