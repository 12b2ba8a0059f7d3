use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Diamond,
}

impl ShapeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Diamond => "diamond",
        }
    }

    pub fn parse(s: &str) -> Option<ShapeKind> {
        match s {
            "rectangle" => Some(ShapeKind::Rectangle),
            "circle" => Some(ShapeKind::Circle),
            "diamond" => Some(ShapeKind::Diamond),
            _ => None,
        }
    }

    /// Size of a freshly added shape in the editor.
    pub fn default_size(self) -> (f32, f32) {
        match self {
            ShapeKind::Circle => (80.0, 80.0),
            ShapeKind::Rectangle | ShapeKind::Diamond => (100.0, 60.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Arrow,
    Line,
}

impl ConnectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionKind::Arrow => "arrow",
            ConnectionKind::Line => "line",
        }
    }

    pub fn parse(s: &str) -> Option<ConnectionKind> {
        match s {
            "arrow" => Some(ConnectionKind::Arrow),
            "line" => Some(ConnectionKind::Line),
            _ => None,
        }
    }
}

pub const DEFAULT_LABEL: &str = "New Node";
pub const DEFAULT_FILL: &str = "#f5f5f5";
pub const DEFAULT_STROKE: &str = "#666666";
pub const DEFAULT_TEXT: &str = "#000000";
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_CONNECTION_COLOR: &str = "#000000";

/// A shape on the canvas. `x`/`y` is the top-left corner of its bounding box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub shape: ShapeKind,
    pub label: String,
    pub fill_color: String,
    pub stroke_color: String,
    pub text_color: String,
    pub stroke_width: f32,
}

impl Node {
    pub fn new(shape: ShapeKind, x: f32, y: f32) -> Self {
        let (width, height) = shape.default_size();
        Node {
            x,
            y,
            width,
            height,
            shape,
            label: DEFAULT_LABEL.to_string(),
            fill_color: DEFAULT_FILL.to_string(),
            stroke_color: DEFAULT_STROKE.to_string(),
            text_color: DEFAULT_TEXT.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    pub kind: ConnectionKind,
    pub color: String,
    pub stroke_width: f32,
}

impl Default for ConnectionStyle {
    fn default() -> Self {
        ConnectionStyle {
            kind: ConnectionKind::Arrow,
            color: DEFAULT_CONNECTION_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub from: u32,
    pub to: u32,
    // cached anchors, owned by the diagram
    pub from_point: Point,
    pub to_point: Point,
    pub kind: ConnectionKind,
    pub color: String,
    pub stroke_width: f32,
}

/// Partial node update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    #[serde(rename = "type")]
    pub shape: Option<ShapeKind>,
    #[serde(rename = "text")]
    pub label: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub text_color: Option<String>,
    pub stroke_width: Option<f32>,
}

impl NodePatch {
    pub fn touches_geometry(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.shape.is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionPatch {
    #[serde(rename = "type")]
    pub kind: Option<ConnectionKind>,
    pub color: Option<String>,
    pub stroke_width: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramStats {
    pub nodes: usize,
    pub connections: usize,
    pub node_types: std::collections::BTreeMap<ShapeKind, usize>,
    pub connection_types: std::collections::BTreeMap<ConnectionKind, usize>,
}
