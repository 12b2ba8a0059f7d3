//! Color handling for the TikZ codec.
//!
//! Export only ever emits names from [`PALETTE`] so every color used in a
//! picture has a matching `\definecolor`. Import accepts defined names,
//! hex codes and a small whitelist of CSS names.

use crate::model::ShapeKind;
use std::collections::{BTreeSet, HashMap};

/// Named colors with their HTML hex values.
pub const PALETTE: &[(&str, &str)] = &[
    ("lightblue", "E3F2FD"),
    ("blue", "1976D2"),
    ("darkblue", "0D47A1"),
    ("lightgreen", "E8F5E8"),
    ("green", "388E3C"),
    ("darkgreen", "1B5E20"),
    ("lightgray", "F5F5F5"),
    ("gray", "757575"),
    ("darkgray", "424242"),
    ("mediumgray", "666666"),
    ("lightergray", "CCCCCC"),
    ("verylightgray", "EEEEEE"),
    ("darkergray", "333333"),
    ("yellow", "F57F17"),
    ("orange", "FF9800"),
    ("darkorange", "F57C00"),
    ("red", "F44336"),
    ("darkred", "B71C1C"),
    ("purple", "800080"),
    ("brown", "A52A2A"),
    ("pink", "FFC0CB"),
    ("magenta", "FF00FF"),
    ("cyan", "00FFFF"),
];

// Exact hex -> name mappings, including the editor's default colors.
const KNOWN_HEX: &[(&str, &str)] = &[
    ("FFFFFF", "verylightgray"),
    ("F5F5F5", "lightgray"),
    ("666666", "mediumgray"),
    ("000000", "darkgray"),
    ("E3F2FD", "lightblue"),
    ("1976D2", "blue"),
    ("0D47A1", "darkblue"),
    ("E8F5E8", "lightgreen"),
    ("388E3C", "green"),
    ("1B5E20", "darkgreen"),
    ("757575", "gray"),
    ("424242", "darkgray"),
    ("EEEEEE", "verylightgray"),
    ("CCCCCC", "lightergray"),
    ("333333", "darkergray"),
    ("FF0000", "red"),
    ("00FF00", "green"),
    ("0000FF", "blue"),
    ("FFFF00", "yellow"),
    ("FF9800", "orange"),
    ("F57C00", "darkorange"),
    ("F44336", "red"),
    ("B71C1C", "darkred"),
    ("800080", "purple"),
    ("A52A2A", "brown"),
    ("FFC0CB", "pink"),
    ("FF00FF", "magenta"),
    ("00FFFF", "cyan"),
];

/// CSS names the importer keeps verbatim.
pub const CSS_COLOR_NAMES: &[&str] = &[
    "black", "white", "red", "green", "blue", "yellow", "orange", "purple", "pink", "gray",
    "grey", "lightblue", "lightgreen", "darkblue", "darkgreen", "darkred", "darkorange", "brown",
    "cyan", "magenta", "teal", "lime", "navy", "maroon",
];

pub const FALLBACK_COLOR: &str = "#374151";
pub const FALLBACK_GRAY_DEF: &str = "\\definecolor{gray}{HTML}{757575} % fallback gray";

pub fn palette_hex(name: &str) -> Option<&'static str> {
    PALETTE.iter().find(|(n, _)| *n == name).map(|(_, h)| *h)
}

pub fn is_hex6(s: &str) -> bool {
    let s = s.strip_prefix('#').unwrap_or(s);
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn looks_hex(s: &str) -> bool {
    s.starts_with('#') || is_hex6(s)
}

/// Closest palette name for a hex color.
pub fn hex_to_named(hex: &str) -> &'static str {
    let h = hex.trim_start_matches('#').to_ascii_uppercase();
    if let Some((_, name)) = KNOWN_HEX.iter().find(|(k, _)| *k == h) {
        return name;
    }
    let channel = |i: usize| h.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());
    let (r, g, b) = match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => (r as i32, g as i32, b as i32),
        _ => return "lightblue",
    };
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max - min < 30 {
        return match max {
            m if m > 220 => "verylightgray",
            m if m > 180 => "lightgray",
            m if m > 140 => "gray",
            m if m > 100 => "mediumgray",
            _ => "darkgray",
        };
    }
    if r > g && r > b {
        if r > 200 { "red" } else { "darkred" }
    } else if g > r && g > b {
        if g > 200 { "green" } else { "darkgreen" }
    } else if b > r && b > g {
        if b > 200 { "blue" } else { "darkblue" }
    } else if r > 150 && g > 150 && b < 100 {
        "yellow"
    } else if r > 150 && g > 100 && b < 100 {
        "orange"
    } else {
        "lightblue"
    }
}

fn shape_defaults(shape: ShapeKind) -> (&'static str, &'static str) {
    match shape {
        ShapeKind::Circle => ("lightgreen", "darkgreen"),
        ShapeKind::Diamond => ("yellow", "darkorange"),
        ShapeKind::Rectangle => ("lightblue", "darkblue"),
    }
}

/// `(fill, draw)` names for a node. An empty fill selects the shape's
/// default pair; an empty stroke alone falls back to darkblue.
pub fn node_colors(shape: ShapeKind, fill: &str, stroke: &str) -> (String, String) {
    let fill = fill.trim();
    if fill.is_empty() {
        let (f, d) = shape_defaults(shape);
        return (f.to_string(), d.to_string());
    }
    let convert = |c: &str| {
        if looks_hex(c) { hex_to_named(c).to_string() } else { c.to_string() }
    };
    let stroke = stroke.trim();
    let draw = if stroke.is_empty() { "darkblue".to_string() } else { convert(stroke) };
    (convert(fill), draw)
}

/// `\definecolor` lines for every used color, sorted and deduplicated.
pub fn color_definitions<'a>(used: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let used: BTreeSet<&str> = used.into_iter().collect();
    let mut defs = Vec::new();
    let mut fallback_added = false;
    let mut fallback = |defs: &mut Vec<String>| {
        if !fallback_added {
            defs.push(FALLBACK_GRAY_DEF.to_string());
            fallback_added = true;
        }
    };
    for color in used {
        if color.starts_with('#') {
            fallback(&mut defs);
        } else if let Some(hex) = palette_hex(color) {
            defs.push(format!("\\definecolor{{{}}}{{HTML}}{{{}}}", color, hex));
        } else if is_hex6(color) {
            defs.push(format!("\\definecolor{{custom{}}}{{HTML}}{{{}}}", color, color));
        } else {
            fallback(&mut defs);
        }
    }
    defs
}

/// Resolve a color token read from TikZ source into an editor color.
pub fn resolve_color(raw: Option<&str>, defined: &HashMap<String, String>, fallback: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback.to_string();
    };
    if let Some(hex) = defined.get(raw) {
        return hex.clone();
    }
    if is_hex6(raw) {
        return if raw.starts_with('#') { raw.to_string() } else { format!("#{raw}") };
    }
    let lower = raw.to_ascii_lowercase();
    if CSS_COLOR_NAMES.contains(&lower.as_str()) {
        return raw.to_string();
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_defaults_map_to_grays() {
        assert_eq!(hex_to_named("#f5f5f5"), "lightgray");
        assert_eq!(hex_to_named("#666666"), "mediumgray");
    }

    #[test]
    fn heuristic_picks_dominant_channel() {
        assert_eq!(hex_to_named("#10E020"), "green");
        assert_eq!(hex_to_named("#101080"), "darkblue");
        assert_eq!(hex_to_named("#C8C8C0"), "lightgray");
        assert_eq!(hex_to_named("#zzzzzz"), "lightblue");
    }

    #[test]
    fn empty_fill_uses_shape_pair() {
        assert_eq!(
            node_colors(ShapeKind::Diamond, "", "#000000"),
            ("yellow".to_string(), "darkorange".to_string())
        );
    }

    #[test]
    fn definitions_are_sorted_and_fallback_once() {
        let defs = color_definitions(["red", "blue", "white", "black", "red"]);
        assert_eq!(defs.len(), 3);
        assert!(defs[0].starts_with("\\definecolor{gray}"));
        assert!(defs[1].contains("{blue}"));
        assert!(defs[2].contains("{red}"));
    }

    #[test]
    fn resolve_prefers_defined_names() {
        let mut defined = HashMap::new();
        defined.insert("c1".to_string(), "#123456".to_string());
        assert_eq!(resolve_color(Some("c1"), &defined, "#fff"), "#123456");
        assert_eq!(resolve_color(Some("abcdef"), &defined, "#fff"), "#abcdef");
        assert_eq!(resolve_color(Some("Teal"), &defined, "#fff"), "Teal");
        assert_eq!(resolve_color(Some("chartreuse"), &defined, "#fff"), "#fff");
        assert_eq!(resolve_color(None, &defined, "#fff"), "#fff");
    }
}
