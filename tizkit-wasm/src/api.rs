use crate::error;
use crate::interop::{f32s, num, object, to_js, u32s, u8s};
use crate::Diagram;
use tizkit::{ConnectionKind, ConnectionPatch, ConnectionStyle, Node, NodePatch, ShapeKind, Ticket};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Anchor of one connector endpoint for two node objects
/// (`{x, y, width, height, type}`); returns `{x, y}` or null on bad input.
#[wasm_bindgen]
pub fn resolve_anchor(from: JsValue, to: JsValue, is_from: bool) -> JsValue {
    let a = serde_wasm_bindgen::from_value::<AnchorNode>(from);
    let b = serde_wasm_bindgen::from_value::<AnchorNode>(to);
    match (a, b) {
        (Ok(a), Ok(b)) => {
            let p = tizkit::resolve_anchor(&a.into(), &b.into(), tizkit::Endpoint::from_flag(is_from));
            to_js(&p)
        }
        _ => JsValue::NULL,
    }
}

#[derive(serde::Deserialize)]
struct AnchorNode {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(rename = "type", default)]
    shape: ShapeKind,
}

impl From<AnchorNode> for Node {
    fn from(n: AnchorNode) -> Node {
        Node::new(n.shape, n.x, n.y).with_size(n.width, n.height)
    }
}

fn shape_arg(s: &str) -> Result<ShapeKind, JsValue> {
    ShapeKind::parse(s).ok_or_else(|| error::invalid_payload(format!("unknown shape '{s}'")))
}

fn style_arg(kind: &str, color: String, stroke_width: f32) -> Result<ConnectionStyle, JsValue> {
    let kind = ConnectionKind::parse(kind)
        .ok_or_else(|| error::invalid_payload(format!("unknown connection type '{kind}'")))?;
    Ok(ConnectionStyle { kind, color, stroke_width })
}

fn shape_code(s: ShapeKind) -> u8 {
    match s {
        ShapeKind::Rectangle => 0,
        ShapeKind::Circle => 1,
        ShapeKind::Diamond => 2,
    }
}

fn warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

#[wasm_bindgen]
impl Diagram {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Diagram {
        crate::Diagram::rs_new()
    }
    pub fn version(&self) -> u64 {
        self.rs_version()
    }

    // Nodes
    pub fn add_node(&mut self, shape: &str, x: f32, y: f32) -> Option<u32> {
        let shape = ShapeKind::parse(shape)?;
        self.inner.add_node(shape, x, y).ok()
    }
    pub fn add_node_res(&mut self, shape: &str, x: f32, y: f32) -> JsValue {
        match shape_arg(shape) {
            Ok(shape) => error::from_result(self.inner.add_node(shape, x, y)),
            Err(e) => e,
        }
    }
    pub fn get_node(&self, id: u32) -> JsValue {
        match self.inner.node(id) {
            Some(n) => to_js(n),
            None => JsValue::NULL,
        }
    }
    pub fn move_node(&mut self, id: u32, x: f32, y: f32) -> bool {
        self.inner.move_node(id, x, y).is_ok()
    }
    pub fn move_node_res(&mut self, id: u32, x: f32, y: f32) -> JsValue {
        let r = self.inner.move_node(id, x, y).map(|n| n as f64);
        error::from_result(r)
    }
    /// Partial update with the editor's camelCase node fields.
    pub fn update_node_res(&mut self, id: u32, patch: JsValue) -> JsValue {
        let patch: NodePatch = match serde_wasm_bindgen::from_value(patch) {
            Ok(p) => p,
            Err(e) => return error::invalid_payload(e.to_string()),
        };
        error::from_result(self.inner.update_node(id, patch).map(|_| true))
    }
    pub fn delete_node(&mut self, id: u32) -> bool {
        self.inner.delete_node(id).is_ok()
    }
    /// On success the value holds the ids of the cascaded connections.
    pub fn delete_node_res(&mut self, id: u32) -> JsValue {
        match self.inner.delete_node(id) {
            Ok(removed) => error::ok(u32s(&removed)),
            Err(e) => error::from_diagram(&e),
        }
    }
    pub fn node_count(&self) -> u32 {
        self.inner.node_count() as u32
    }

    // Connections
    pub fn connect(&mut self, from: u32, to: u32, kind: &str, color: String, stroke_width: f32) -> Option<u32> {
        let style = style_arg(kind, color, stroke_width).ok()?;
        self.inner.connect(from, to, style).ok()
    }
    pub fn connect_res(&mut self, from: u32, to: u32, kind: &str, color: String, stroke_width: f32) -> JsValue {
        match style_arg(kind, color, stroke_width) {
            Ok(style) => error::from_result(self.inner.connect(from, to, style)),
            Err(e) => e,
        }
    }
    pub fn get_connection(&self, id: u32) -> JsValue {
        match self.inner.connection(id) {
            Some(c) => to_js(c),
            None => JsValue::NULL,
        }
    }
    pub fn update_connection_res(&mut self, id: u32, patch: JsValue) -> JsValue {
        let patch: ConnectionPatch = match serde_wasm_bindgen::from_value(patch) {
            Ok(p) => p,
            Err(e) => return error::invalid_payload(e.to_string()),
        };
        error::from_result(self.inner.update_connection(id, patch).map(|_| true))
    }
    pub fn delete_connection(&mut self, id: u32) -> bool {
        self.inner.delete_connection(id).is_ok()
    }
    pub fn delete_connection_res(&mut self, id: u32) -> JsValue {
        error::from_result(self.inner.delete_connection(id).map(|_| true))
    }
    pub fn connection_count(&self) -> u32 {
        self.inner.connection_count() as u32
    }

    // Typed arrays for the canvas renderer
    pub fn get_node_data(&self) -> JsValue {
        let mut ids = Vec::new();
        let mut rects = Vec::new();
        let mut shapes = Vec::new();
        let mut stroke_widths = Vec::new();
        for (id, n) in self.inner.nodes() {
            ids.push(id);
            rects.extend_from_slice(&[n.x, n.y, n.width, n.height]);
            shapes.push(shape_code(n.shape));
            stroke_widths.push(n.stroke_width);
        }
        object(&[
            ("ids", u32s(&ids)),
            ("rects", f32s(&rects)),
            ("shapes", u8s(&shapes)),
            ("stroke_widths", f32s(&stroke_widths)),
        ])
    }
    pub fn get_connection_data(&self) -> JsValue {
        let mut ids = Vec::new();
        let mut endpoints = Vec::new();
        let mut points = Vec::new();
        let mut kinds = Vec::new();
        for (id, c) in self.inner.connections() {
            ids.push(id);
            endpoints.extend_from_slice(&[c.from, c.to]);
            points.extend_from_slice(&[c.from_point.x, c.from_point.y, c.to_point.x, c.to_point.y]);
            kinds.push(match c.kind {
                ConnectionKind::Arrow => 0,
                ConnectionKind::Line => 1,
            });
        }
        object(&[
            ("ids", u32s(&ids)),
            ("endpoints", u32s(&endpoints)),
            ("points", f32s(&points)),
            ("kinds", u8s(&kinds)),
        ])
    }

    // Bulk edits
    pub fn remove_all_borders(&mut self) {
        self.inner.remove_all_borders();
    }
    pub fn clear(&mut self) {
        self.inner.clear();
        self.gesture.cancel();
    }
    pub fn apply_grid_layout(&mut self) {
        self.inner.apply_grid_layout();
    }
    pub fn stats(&self) -> JsValue {
        to_js(&self.inner.stats())
    }

    // Connect mode
    pub fn start_connecting(&mut self, kind: &str, color: String, stroke_width: f32) -> JsValue {
        match style_arg(kind, color, stroke_width) {
            Ok(style) => {
                self.gesture.style = style;
                self.gesture.start();
                error::ok(JsValue::TRUE)
            }
            Err(e) => e,
        }
    }
    pub fn cancel_connecting(&mut self) {
        self.gesture.cancel();
    }
    pub fn is_connecting(&self) -> bool {
        self.gesture.is_active()
    }
    /// Value is the new connection id, or null while waiting for a target.
    pub fn click_node_res(&mut self, id: u32) -> JsValue {
        match self.gesture.click(&mut self.inner, id) {
            Ok(Some(cid)) => error::ok(num(cid)),
            Ok(None) => error::ok(JsValue::NULL),
            Err(e) => error::from_diagram(&e),
        }
    }

    // JSON
    pub fn to_json(&self) -> JsValue {
        to_js(&self.inner.to_json_value())
    }
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        let val = match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => val,
            Err(e) => return error::err("json_parse", e.to_string(), None),
        };
        match tizkit::Diagram::from_json_value(val) {
            Ok(d) => {
                self.inner = d;
                self.gesture.cancel();
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::from_diagram(&e),
        }
    }
    pub fn generation_request(&self) -> JsValue {
        to_js(&self.inner.generation_request())
    }

    // TikZ
    pub fn set_tikz_options(&mut self, opts: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value(opts) {
            Ok(o) => {
                self.tikz_opts = o;
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::invalid_payload(e.to_string()),
        }
    }
    pub fn set_import_options(&mut self, opts: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value(opts) {
            Ok(o) => {
                self.import_opts = o;
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::invalid_payload(e.to_string()),
        }
    }
    pub fn to_tikz(&self) -> String {
        self.inner.to_tikz(&self.tikz_opts)
    }
    pub fn to_latex_document(&self) -> String {
        self.inner.to_latex_document(&self.tikz_opts)
    }
    /// Replace the diagram with one parsed from LaTeX; styles the source
    /// leaves out are kept from the current diagram.
    pub fn from_tikz_res(&mut self, latex: &str) -> JsValue {
        match tizkit::Diagram::from_tikz(latex, Some(&self.inner), &self.import_opts) {
            Ok(d) => {
                self.inner = d;
                self.gesture.cancel();
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::from_diagram(&e),
        }
    }

    // LaTeX sync
    pub fn set_sync_options(&mut self, opts: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value(opts) {
            Ok(o) => {
                self.sync = tizkit::LatexSync::with_options(o);
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::invalid_payload(e.to_string()),
        }
    }
    pub fn note_edit(&mut self, now_ms: f64) {
        self.sync.note_edit(now_ms);
    }
    pub fn has_pending_edit(&self) -> bool {
        self.sync.has_pending_edit()
    }
    pub fn generation_due(&self, now_ms: f64) -> bool {
        self.sync.is_due(now_ms)
    }
    pub fn begin_generation(&mut self) -> f64 {
        self.sync.begin().0 as f64
    }
    pub fn complete_generation(&mut self, ticket: f64, latex: String) -> bool {
        self.sync.complete(Ticket(ticket as u64), latex)
    }
    pub fn fail_generation(&mut self, ticket: f64, message: String) {
        warn(&format!("latex generation {ticket} failed: {message}"));
        self.sync.fail(Ticket(ticket as u64), message);
    }
    pub fn latest_latex(&self) -> Option<String> {
        self.sync.latest().map(str::to_string)
    }
    /// Pop the last generation failure as `{ticket, message}`, or null.
    pub fn take_generation_error(&mut self) -> JsValue {
        match self.sync.take_error() {
            Some((t, message)) => object(&[
                ("ticket", JsValue::from_f64(t.0 as f64)),
                ("message", JsValue::from_str(&message)),
            ]),
            None => JsValue::NULL,
        }
    }
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}
