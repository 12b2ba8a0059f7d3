use crate::error::{DiagramError, Result};
use crate::geometry::{anchor::connection_points, limits};
use crate::model::{
    Connection, ConnectionKind, Node, Point, ShapeKind, DEFAULT_CONNECTION_COLOR, DEFAULT_FILL,
    DEFAULT_LABEL, DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, DEFAULT_TEXT,
};
use crate::{check_color_len, validate_node, Diagram};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

pub const FORMAT_VERSION: u32 = 1;

pub fn to_json_impl(d: &Diagram) -> Value {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct NodeSer<'a> {
        id: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        #[serde(rename = "type")]
        shape: ShapeKind,
        text: &'a str,
        fill_color: &'a str,
        stroke_color: &'a str,
        text_color: &'a str,
        stroke_width: f32,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ConnectionSer<'a> {
        id: u32,
        from: u32,
        to: u32,
        from_point: Point,
        to_point: Point,
        #[serde(rename = "type")]
        kind: ConnectionKind,
        color: &'a str,
        stroke_width: f32,
    }
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Doc<'a> {
        version: u32,
        canvas_width: f32,
        canvas_height: f32,
        nodes: Vec<NodeSer<'a>>,
        connections: Vec<ConnectionSer<'a>>,
    }
    let nodes = d
        .nodes()
        .map(|(id, n)| NodeSer {
            id,
            x: n.x,
            y: n.y,
            width: n.width,
            height: n.height,
            shape: n.shape,
            text: &n.label,
            fill_color: &n.fill_color,
            stroke_color: &n.stroke_color,
            text_color: &n.text_color,
            stroke_width: n.stroke_width,
        })
        .collect();
    let connections = d
        .connections()
        .map(|(id, c)| ConnectionSer {
            id,
            from: c.from,
            to: c.to,
            from_point: c.from_point,
            to_point: c.to_point,
            kind: c.kind,
            color: &c.color,
            stroke_width: c.stroke_width,
        })
        .collect();
    let doc = Doc {
        version: FORMAT_VERSION,
        canvas_width: d.canvas.0,
        canvas_height: d.canvas.1,
        nodes,
        connections,
    };
    serde_json::to_value(doc).unwrap_or(Value::Null)
}

pub fn generation_request_impl(d: &Diagram) -> Value {
    let mut data = to_json_impl(d);
    if let Some(obj) = data.as_object_mut() {
        obj.remove("version");
    }
    json!({ "type": "diagram", "data": data })
}

pub fn from_json_impl(v: Value) -> Result<Diagram> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct NodeDe {
        id: u32,
        x: f32,
        y: f32,
        width: Option<f32>,
        height: Option<f32>,
        #[serde(rename = "type")]
        shape: Option<ShapeKind>,
        #[serde(alias = "label")]
        text: Option<String>,
        fill_color: Option<String>,
        stroke_color: Option<String>,
        text_color: Option<String>,
        stroke_width: Option<f32>,
    }
    // fromPoint/toPoint are derived and ignored on input
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ConnectionDe {
        id: u32,
        from: u32,
        to: u32,
        #[serde(rename = "type")]
        kind: Option<ConnectionKind>,
        color: Option<String>,
        stroke_width: Option<f32>,
    }
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct DocDe {
        #[allow(dead_code)]
        version: Option<u32>,
        canvas_width: Option<f32>,
        canvas_height: Option<f32>,
        nodes: Vec<NodeDe>,
        connections: Option<Vec<ConnectionDe>>,
    }
    let doc: DocDe = serde_json::from_value(v)?;
    let conns = doc.connections.unwrap_or_default();
    if doc.nodes.len() > limits::MAX_NODES {
        return Err(DiagramError::CapsExceeded { what: "nodes", max: limits::MAX_NODES });
    }
    if conns.len() > limits::MAX_CONNECTIONS {
        return Err(DiagramError::CapsExceeded { what: "connections", max: limits::MAX_CONNECTIONS });
    }
    let check_id = |id: u32| -> Result<()> {
        if id >= limits::MAX_ID {
            return Err(DiagramError::OutOfRange {
                param: "id",
                min: 0.0,
                max: limits::MAX_ID as f32,
                got: id as f32,
            });
        }
        Ok(())
    };

    let mut d = Diagram::with_canvas(
        doc.canvas_width.unwrap_or(crate::options::DEFAULT_CANVAS_WIDTH),
        doc.canvas_height.unwrap_or(crate::options::DEFAULT_CANVAS_HEIGHT),
    );
    let mut nodes: HashMap<u32, Node> = HashMap::new();
    for n in doc.nodes {
        check_id(n.id)?;
        let shape = n.shape.unwrap_or_default();
        let (dw, dh) = shape.default_size();
        let node = Node {
            x: n.x,
            y: n.y,
            width: n.width.unwrap_or(dw),
            height: n.height.unwrap_or(dh),
            shape,
            label: n.text.unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            fill_color: n.fill_color.unwrap_or_else(|| DEFAULT_FILL.to_string()),
            stroke_color: n.stroke_color.unwrap_or_else(|| DEFAULT_STROKE.to_string()),
            text_color: n.text_color.unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            stroke_width: n.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH),
        };
        validate_node(&node)?;
        if nodes.insert(n.id, node).is_some() {
            return Err(DiagramError::DuplicateId { kind: "node", id: n.id });
        }
    }
    let mut seen: HashSet<u32> = HashSet::new();
    for c in &conns {
        check_id(c.id)?;
        if !seen.insert(c.id) {
            return Err(DiagramError::DuplicateId { kind: "connection", id: c.id });
        }
        for end in [c.from, c.to] {
            if !nodes.contains_key(&end) {
                return Err(DiagramError::DanglingConnection { connection: c.id, node: end });
            }
        }
        if c.from == c.to {
            return Err(DiagramError::SelfConnection { node: c.from });
        }
        if let Some(color) = &c.color {
            check_color_len(color)?;
        }
        if let Some(w) = c.stroke_width {
            if !limits::in_stroke_bounds(w) {
                return Err(DiagramError::OutOfRange {
                    param: "strokeWidth",
                    min: 0.0,
                    max: limits::STROKE_WIDTH_MAX,
                    got: w,
                });
            }
        }
    }

    let (node_slot, node_len) = slot_ids(nodes.keys().copied().collect());
    d.nodes = vec![None; node_len];
    for (id, n) in nodes {
        d.nodes[node_slot[&id] as usize] = Some(n);
    }
    let (conn_slot, conn_len) = slot_ids(conns.iter().map(|c| c.id).collect());
    d.connections = vec![None; conn_len];
    for c in conns {
        let (from, to) = (node_slot[&c.from], node_slot[&c.to]);
        let (from_point, to_point) = match (d.node(from), d.node(to)) {
            (Some(a), Some(b)) => connection_points(a, b),
            _ => continue,
        };
        let cid = conn_slot[&c.id];
        d.connections[cid as usize] = Some(Connection {
            from,
            to,
            from_point,
            to_point,
            kind: c.kind.unwrap_or_default(),
            color: c.color.unwrap_or_else(|| DEFAULT_CONNECTION_COLOR.to_string()),
            stroke_width: c.stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH),
        });
        d.incident.entry(from).or_default().push(cid);
        d.incident.entry(to).or_default().push(cid);
    }
    for list in d.incident.values_mut() {
        list.sort_unstable();
    }
    tracing::debug!(
        nodes = d.node_count(),
        connections = d.connection_count(),
        "diagram loaded from json"
    );
    Ok(d)
}

/// Arena slot for every incoming id, plus the arena length. Ids are kept when
/// the arena stays reasonably dense; otherwise they are packed in id order.
fn slot_ids(mut ids: Vec<u32>) -> (HashMap<u32, u32>, usize) {
    ids.sort_unstable();
    let span = ids.last().map_or(0, |&m| m as usize + 1);
    let packed = span > limits::sparse_ceiling(ids.len());
    if packed {
        tracing::info!(count = ids.len(), span, "packing sparse document ids");
    }
    let slots = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, if packed { i as u32 } else { id }))
        .collect();
    (slots, if packed { ids.len() } else { span })
}
