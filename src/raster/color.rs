//! CSS colour strings.

use tiny_skia::Color;

/// Parse a CSS colour: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r,g,b)` or
/// `rgba(r,g,b,a)` with `a` in `0..=1` (or `0..=255`).
///
/// # Examples
///
/// ```
/// use snapguide::raster::parse_color;
///
/// let c = parse_color("#ff0000").unwrap().to_color_u8();
/// assert_eq!((c.red(), c.green(), c.blue(), c.alpha()), (255, 0, 0, 255));
/// assert!(parse_color("rgba(0, 0, 255, 0.5)").is_some());
/// assert!(parse_color("teal").is_none());
/// ```
pub fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    rgb[i] = v * 17;
                }
                Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
            },
            6 => Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Color::from_rgba8(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => None,
        };
    }

    let lower = s.to_ascii_lowercase();
    let (body, has_alpha) = if let Some(body) = lower.strip_prefix("rgba(") {
        (body.strip_suffix(')')?, true)
    } else if let Some(body) = lower.strip_prefix("rgb(") {
        (body.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }
    let byte = |p: &str| -> Option<u8> { Some(p.parse::<f32>().ok()?.round().clamp(0.0, 255.0) as u8) };
    let r = byte(parts[0])?;
    let g = byte(parts[1])?;
    let b = byte(parts[2])?;
    let a = if has_alpha {
        let alpha = parts[3].parse::<f32>().ok()?;
        if alpha <= 1.0 {
            (alpha * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            alpha.round().clamp(0.0, 255.0) as u8
        }
    } else {
        255
    };
    Some(Color::from_rgba8(r, g, b, a))
}

/// Parse a colour, falling back to `fallback` (and logging) when invalid.
pub fn parse_color_or(value: &str, fallback: Color) -> Color {
    parse_color(value).unwrap_or_else(|| {
        log::debug!("Unrecognised colour '{}', using fallback", value);
        fallback
    })
}

/// Copy of `color` with its alpha multiplied by `factor`.
pub fn with_opacity(color: Color, factor: f32) -> Color {
    let mut c = color;
    c.apply_opacity(factor);
    c
}

/// Colour as `(r, g, b)` floats in `0..=1`, for PDF operators.
pub fn to_rgb_f32(color: Color) -> (f32, f32, f32) {
    (color.red(), color.green(), color.blue())
}
