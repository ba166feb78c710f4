pub use csscolorparser::Color;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ColorFormat {
    #[default]
    Hex,
    Rgb,
    Hsl,
}

impl ColorFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hex" => Some(ColorFormat::Hex),
            "rgb" => Some(ColorFormat::Rgb),
            "hsl" => Some(ColorFormat::Hsl),
            _ => None,
        }
    }
}

/// Parses a declared value as a color. Bare hex digits such as `100` are
/// numbers here, not colors.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.is_empty() || value.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    value.parse::<Color>().ok()
}

pub fn format_color(color: &Color, format: ColorFormat) -> String {
    let [r, g, b, a] = color.to_rgba8();
    let opaque = a == u8::MAX;
    match format {
        ColorFormat::Hex if opaque => format!("#{r:02x}{g:02x}{b:02x}"),
        ColorFormat::Hex => format!("#{r:02x}{g:02x}{b:02x}{a:02x}"),
        ColorFormat::Rgb if opaque => format!("rgb({r}, {g}, {b})"),
        ColorFormat::Rgb => format!("rgba({r}, {g}, {b}, {})", alpha(a)),
        ColorFormat::Hsl => {
            let (h, s, l) = hsl(r, g, b);
            if opaque {
                format!("hsl({h}, {s}%, {l}%)")
            } else {
                format!("hsla({h}, {s}%, {l}%, {})", alpha(a))
            }
        }
    }
}

pub fn rgba_components(color: &Color) -> [f32; 4] {
    color.to_rgba8().map(|channel| f32::from(channel) / 255.0)
}

fn alpha(a: u8) -> f32 {
    (f32::from(a) / 255.0 * 100.0).round() / 100.0
}

fn hsl(r: u8, g: u8, b: u8) -> (u32, u32, u32) {
    let [r, g, b] = [r, g, b].map(|channel| f64::from(channel) / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let d = max - min;
    if d == 0.0 {
        return (0, 0, percent(l));
    }

    let s = d / (1.0 - (2.0 * l - 1.0).abs());
    let sector = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    let h = (sector * 60.0).round() as u32 % 360;
    (h, percent(s), percent(l))
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(value: &str, format: ColorFormat) -> String {
        format_color(&parse_color(value).unwrap(), format)
    }

    #[test]
    fn parses_color_literals() {
        assert!(parse_color("red").is_some());
        assert!(parse_color(" #0af ").is_some());
        assert!(parse_color("rgb(10, 20, 30)").is_some());
        assert!(parse_color("hsl(120, 50%, 50%)").is_some());
        assert!(parse_color("4px").is_none());
        assert!(parse_color("100").is_none());
        assert!(parse_color("var(--x)").is_none());
        assert!(parse_color("").is_none());
    }

    #[test]
    fn formats() {
        insta::assert_snapshot!(format("red", ColorFormat::Hex), @"#ff0000");
        insta::assert_snapshot!(format("#33669980", ColorFormat::Hex), @"#33669980");
        insta::assert_snapshot!(format("#336699", ColorFormat::Rgb), @"rgb(51, 102, 153)");
        insta::assert_snapshot!(format("rgba(255, 0, 0, 0.5)", ColorFormat::Rgb), @"rgba(255, 0, 0, 0.5)");
        insta::assert_snapshot!(format("#336699", ColorFormat::Hsl), @"hsl(210, 50%, 40%)");
        insta::assert_snapshot!(format("white", ColorFormat::Hsl), @"hsl(0, 0%, 100%)");
    }

    #[test]
    fn format_names() {
        assert_eq!(ColorFormat::from_name("HSL"), Some(ColorFormat::Hsl));
        assert_eq!(ColorFormat::from_name("lab"), None);
    }
}
