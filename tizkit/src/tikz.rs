use crate::error::{DiagramError, Result};
use crate::geometry::limits;
use crate::geometry::tolerance::clamp;
use crate::model::{ConnectionKind, ConnectionStyle, Node, ShapeKind};
use crate::options::{ImportOptions, TikzOptions};
use crate::palette::{self, FALLBACK_COLOR};
use crate::{tikz_name, Diagram};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

pub const PICTURE_OPEN: &str = "\\begin{tikzpicture}[node distance=2cm, auto, thick, every node/.style={align=center}, >={Stealth[length=3mm,width=2mm]}]";
pub const PICTURE_CLOSE: &str = "\\end{tikzpicture}";

const PREAMBLE: &str = r"\documentclass[12pt]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{geometry}
\usepackage{amsmath, amsfonts, amssymb}
\usepackage{graphicx}
\usepackage[HTML]{xcolor}
\usepackage{tikz}
\usepackage{float}

% TikZ libraries
\usetikzlibrary{shapes.geometric, arrows, positioning, backgrounds, fit, calc, decorations.pathmorphing, decorations.markings, arrows.meta}

\geometry{margin=0.5in}";

pub fn escape_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' | '%' | '_' | '$' | '#' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '&' | '%' | '_' | '$' | '#' | '{' | '}') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out.trim().to_string()
}

/// Up to three decimals, no trailing zeros, no negative zero.
fn fmt_num(v: f32) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() { "0".to_string() } else { s.to_string() }
}

// Maps canvas pixels into the target square, flipping y so up is up.
struct Fit {
    scale: f32,
    min_x: f32,
    min_y: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Fit {
    fn new(d: &Diagram, opts: &TikzOptions) -> Fit {
        let centers: Vec<_> = d.nodes().map(|(_, n)| n.center()).collect();
        if centers.is_empty() {
            return Fit { scale: 1.0, min_x: 0.0, min_y: 0.0, pad_x: 0.0, pad_y: 0.0 };
        }
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for c in &centers {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }
        let range = opts.target_max - opts.target_min;
        let span_x = if max_x > min_x { max_x - min_x } else { 1.0 };
        let span_y = if max_y > min_y { max_y - min_y } else { 1.0 };
        let scale = (range / span_x).min(range / span_y).min(opts.max_scale);
        let pad_x = (range - span_x * scale) / 2.0;
        let pad_y = (range - span_y * scale) / 2.0;
        tracing::info!(scale, pad_x, pad_y, min_x, max_x, min_y, max_y, "tikz coordinate fit");
        Fit { scale, min_x, min_y, pad_x, pad_y }
    }

    fn map(&self, n: &Node, opts: &TikzOptions) -> (f32, f32) {
        let c = n.center();
        let x = opts.target_min + self.pad_x + (c.x - self.min_x) * self.scale;
        let y = opts.target_max - self.pad_y - (c.y - self.min_y) * self.scale;
        (
            clamp(x, -opts.clamp_cm, opts.clamp_cm),
            clamp(y, -opts.clamp_cm, opts.clamp_cm),
        )
    }
}

/// The tikzpicture body and the palette colors it references.
pub fn to_tikz_impl(d: &Diagram, opts: &TikzOptions) -> (String, Vec<String>) {
    let fit = Fit::new(d, opts);
    let mut lines = vec![PICTURE_OPEN.to_string()];
    let mut used = Vec::new();
    for (id, n) in d.nodes() {
        let (x, y) = fit.map(n, opts);
        let (fill, draw) = palette::node_colors(n.shape, &n.fill_color, &n.stroke_color);
        let name = tikz_name(id);
        let label = escape_label(&n.label);
        let (x, y) = (fmt_num(x), fmt_num(y));
        let line = match n.shape {
            ShapeKind::Circle => {
                let size = clamp(n.width * 0.5, 1.0, 3.0);
                format!(
                    "\\node ({name}) [circle, fill={fill}, draw={draw}, minimum size={}cm] at ({x}, {y}) {{{label}}};",
                    fmt_num(size)
                )
            }
            ShapeKind::Diamond => {
                let size = clamp(n.width.min(n.height) * 0.5, 1.0, 3.0);
                format!(
                    "\\node ({name}) [diamond, fill={fill}, draw={draw}, aspect=2, minimum size={}cm] at ({x}, {y}) {{{label}}};",
                    fmt_num(size)
                )
            }
            ShapeKind::Rectangle => format!(
                "\\node ({name}) [rectangle, fill={fill}, draw={draw}, text width=2cm, minimum height=1cm, text centered, rounded corners=2pt] at ({x}, {y}) {{{label}}};"
            ),
        };
        lines.push(line);
        used.push(fill);
        used.push(draw);
    }
    for (_, c) in d.connections() {
        let arrow = match c.kind {
            ConnectionKind::Arrow => "->",
            ConnectionKind::Line => "-",
        };
        lines.push(format!(
            "\\draw[{arrow}] ({}) -- ({});",
            tikz_name(c.from),
            tikz_name(c.to)
        ));
    }
    lines.push(PICTURE_CLOSE.to_string());
    (lines.join("\n"), used)
}

pub fn to_document_impl(d: &Diagram, opts: &TikzOptions) -> String {
    let (body, used) = to_tikz_impl(d, opts);
    let defs = palette::color_definitions(used.iter().map(String::as_str));
    format!(
        "{PREAMBLE}\n\n% Color definitions\n{}\n\n\\begin{{document}}\n\\begin{{center}}\n{body}\n\\end{{center}}\n\\end{{document}}",
        defs.join("\n")
    )
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static tikz pattern"))
}

fn picture_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?s)\\begin\{tikzpicture\}.*?\\end\{tikzpicture\}")
}

fn definecolor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\\definecolor\{([^}]+)\}\{HTML\}\{([0-9A-Fa-f]{6})\}")
}

fn node_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"\\node\s*\(([^)]+)\)\s*\[([^\]]*)\]\s*(?:at\s*\(([^,]+),\s*([^)]+)\)\s*)?\{([\s\S]*?)\};",
    )
}

fn draw_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\\draw\s*\[([^\]]*)\]\s*\(([^)]+)\)\s*(?:--|to)\s*\(([^)]+)\);")
}

fn attr_re(key: &str) -> &'static Regex {
    static FILL: OnceLock<Regex> = OnceLock::new();
    static DRAW: OnceLock<Regex> = OnceLock::new();
    match key {
        "fill" => regex(&FILL, r"fill=([^,\]]+)"),
        _ => regex(&DRAW, r"draw=([^,\]]+)"),
    }
}

fn leading_float(s: &str) -> Option<f32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = regex(&RE, r"^\s*[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?");
    re.find(s).and_then(|m| m.as_str().trim().parse::<f32>().ok())
}

fn import_size(shape: ShapeKind) -> (f32, f32) {
    match shape {
        ShapeKind::Circle => (70.0, 70.0),
        ShapeKind::Rectangle | ShapeKind::Diamond => (90.0, 50.0),
    }
}

pub fn from_tikz_impl(latex: &str, existing: Option<&Diagram>, opts: &ImportOptions) -> Result<Diagram> {
    if latex.len() > limits::MAX_TIKZ_BYTES {
        return Err(DiagramError::CapsExceeded { what: "tikz bytes", max: limits::MAX_TIKZ_BYTES });
    }
    let tikz = picture_re().find(latex).ok_or(DiagramError::NoTikzPicture)?.as_str();

    let mut defined: HashMap<String, String> = HashMap::new();
    // color definitions usually sit in the preamble, outside the picture
    for cap in definecolor_re().captures_iter(latex) {
        defined.insert(cap[1].trim().to_string(), format!("#{}", &cap[2]));
    }

    let prior_nodes: HashMap<String, &Node> = existing
        .map(|d| d.nodes().map(|(id, n)| (tikz_name(id), n)).collect())
        .unwrap_or_default();
    let prior_conns: HashMap<(String, String), ConnectionStyle> = existing
        .map(|d| {
            d.connections()
                .map(|(_, c)| {
                    let style = ConnectionStyle {
                        kind: c.kind,
                        color: c.color.clone(),
                        stroke_width: c.stroke_width,
                    };
                    ((tikz_name(c.from), tikz_name(c.to)), style)
                })
                .collect()
        })
        .unwrap_or_default();

    let mut d = Diagram::with_canvas(opts.canvas_width, opts.canvas_height);
    let mut names: HashMap<String, u32> = HashMap::new();
    for cap in node_re().captures_iter(tikz) {
        let name = cap[1].trim().to_string();
        let attrs = cap.get(2).map_or("", |m| m.as_str());
        let coords = match (cap.get(3), cap.get(4)) {
            (Some(x), Some(y)) => leading_float(x.as_str()).zip(leading_float(y.as_str())),
            _ => None,
        };
        let Some((x, y)) = coords else {
            tracing::warn!(node = %name, "skipping tikz node without coordinates");
            continue;
        };
        let shape = if attrs.contains("circle") {
            ShapeKind::Circle
        } else if attrs.contains("diamond") {
            ShapeKind::Diamond
        } else {
            ShapeKind::Rectangle
        };
        let (width, height) = import_size(shape);
        let cx = x * opts.pixels_per_cm + opts.canvas_width / 2.0;
        let cy = -y * opts.pixels_per_cm + opts.canvas_height / 2.0;
        let prior = prior_nodes.get(&name).copied();
        let attr = |key: &str| attr_re(key).captures(attrs).and_then(|c| c.get(1)).map(|m| m.as_str());
        let fill = palette::resolve_color(
            attr("fill"),
            &defined,
            prior.map_or("#ffffff", |p| p.fill_color.as_str()),
        );
        let stroke = palette::resolve_color(
            attr("draw"),
            &defined,
            prior.map_or(FALLBACK_COLOR, |p| p.stroke_color.as_str()),
        );
        let node = Node {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
            shape,
            label: unescape_label(cap.get(5).map_or("", |m| m.as_str())),
            fill_color: fill,
            stroke_color: stroke,
            text_color: prior.map_or("#1f2937".to_string(), |p| p.text_color.clone()),
            stroke_width: prior.map_or(2.0, |p| p.stroke_width),
        };
        match d.insert_node(node) {
            Ok(id) => {
                names.insert(name, id);
            }
            Err(e @ DiagramError::CapsExceeded { .. }) => return Err(e),
            Err(e) => tracing::warn!(node = %name, error = %e, "skipping invalid tikz node"),
        }
    }
    if d.node_count() == 0 {
        return Err(DiagramError::EmptyTikz);
    }

    for cap in draw_re().captures_iter(tikz) {
        let attrs = cap.get(1).map_or("", |m| m.as_str());
        let from = cap[2].trim().to_string();
        let to = cap[3].trim().to_string();
        let (Some(&a), Some(&b)) = (names.get(&from), names.get(&to)) else {
            tracing::warn!(%from, %to, "skipping tikz draw with unknown endpoint");
            continue;
        };
        let prior = prior_conns.get(&(from.clone(), to.clone()));
        let kind = if attrs.contains("->") || attrs.contains("<->") {
            ConnectionKind::Arrow
        } else if attrs.contains('-') {
            ConnectionKind::Line
        } else {
            prior.map_or(ConnectionKind::Arrow, |p| p.kind)
        };
        let color_attr = attr_re("draw").captures(attrs).and_then(|c| c.get(1)).map(|m| m.as_str());
        let style = ConnectionStyle {
            kind,
            color: palette::resolve_color(
                color_attr,
                &defined,
                prior.map_or(FALLBACK_COLOR, |p| p.color.as_str()),
            ),
            stroke_width: prior.map_or(2.0, |p| p.stroke_width),
        };
        match d.connect(a, b, style) {
            Ok(_) => {}
            Err(e @ DiagramError::CapsExceeded { .. }) => return Err(e),
            Err(e) => tracing::warn!(%from, %to, error = %e, "skipping tikz draw"),
        }
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_then_unescape_restores_label() {
        let raw = "50% of a_b & {c} #1 $x$";
        assert_eq!(unescape_label(&escape_label(raw)), raw);
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_num(2.0), "2");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(1.25), "1.25");
        assert_eq!(fmt_num(-3.1234), "-3.123");
    }

    #[test]
    fn leading_float_ignores_units() {
        assert_eq!(leading_float(" 1.5cm"), Some(1.5));
        assert_eq!(leading_float("-2"), Some(-2.0));
        assert_eq!(leading_float("abc"), None);
    }
}
