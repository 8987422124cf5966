// tabdash-widgets/src/common/colors.rs
use ratatui::style::Color;

/// Get color for focus state
///
/// # Example
/// ```rust
/// use ratatui::style::Color;
/// use tabdash_widgets::common::focus_color;
/// assert_eq!(focus_color(true), Color::Yellow);
/// assert_eq!(focus_color(false), Color::DarkGray);
/// ```
pub fn focus_color(focused: bool) -> Color {
    if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into an RGB color
///
/// # Example
/// ```rust
/// use ratatui::style::Color;
/// use tabdash_widgets::common::hex_to_color;
/// assert_eq!(hex_to_color("#FF8000"), Some(Color::Rgb(255, 128, 0)));
/// assert_eq!(hex_to_color("#F80"), None);
/// ```
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse a CSS `rgb(r, g, b)` / `rgba(r, g, b, a)` string, dropping alpha.
///
/// Quick link hover colors are stored in this form.
pub fn css_rgb_to_color(css: &str) -> Option<Color> {
    let css = css.trim();
    let inner = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let mut parts = inner.split(',').map(str::trim);
    let r = parts.next()?.parse::<u8>().ok()?;
    let g = parts.next()?.parse::<u8>().ok()?;
    let b = parts.next()?.parse::<u8>().ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Black or white, whichever reads better on `color`
pub fn contrast_color(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let luma = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
            if luma > 140.0 { Color::Black } else { Color::White }
        }
        _ => Color::White,
    }
}
