pub mod error;
pub mod interaction;
pub mod model;
pub mod options;
pub mod palette;
pub mod sync;
pub mod geometry {
    pub mod anchor;
    pub mod limits;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod layout;
}
mod json;
mod tikz;

pub use error::{DiagramError, Result};
pub use geometry::anchor::{connection_points, resolve_anchor, Endpoint};
pub use interaction::{ConnectGesture, GestureState};
pub use model::{
    Connection, ConnectionKind, ConnectionPatch, ConnectionStyle, DiagramStats, Node, NodePatch,
    Point, ShapeKind,
};
pub use options::{ImportOptions, SyncOptions, TikzOptions};
pub use sync::{LatexSync, Ticket};

use error::{check_finite, check_range};
use geometry::limits;
use std::collections::HashMap;

/// Nodes and connections of one diagram.
///
/// Ids are slot indices and are not reused. Every connection is listed in
/// `incident` under both of its endpoints, so a node move only touches the
/// connections that actually hang off that node.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub(crate) nodes: Vec<Option<Node>>,             // id is index
    pub(crate) connections: Vec<Option<Connection>>, // id is index
    pub(crate) incident: HashMap<u32, Vec<u32>>,     // node id -> connection ids
    pub(crate) canvas: (f32, f32),
    pub(crate) version: u64,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    pub fn new() -> Self {
        Self::with_canvas(options::DEFAULT_CANVAS_WIDTH, options::DEFAULT_CANVAS_HEIGHT)
    }

    pub fn with_canvas(width: f32, height: f32) -> Self {
        Diagram {
            nodes: Vec::new(),
            connections: Vec::new(),
            incident: HashMap::new(),
            canvas: (width, height),
            version: 1,
        }
    }

    /// Monotonic edit counter; bumps on every successful mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn canvas(&self) -> (f32, f32) {
        self.canvas
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    // Nodes
    /// Add a node with the shape's default size and style.
    pub fn add_node(&mut self, shape: ShapeKind, x: f32, y: f32) -> Result<u32> {
        self.insert_node(Node::new(shape, x, y))
    }

    pub fn insert_node(&mut self, node: Node) -> Result<u32> {
        validate_node(&node)?;
        if self.node_count() >= limits::MAX_NODES {
            return Err(DiagramError::CapsExceeded { what: "nodes", max: limits::MAX_NODES });
        }
        let id = self.nodes.len() as u32;
        tracing::debug!(id, shape = node.shape.as_str(), x = node.x, y = node.y, "node added");
        self.nodes.push(Some(node));
        self.bump();
        Ok(id)
    }

    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.get(id as usize).and_then(|n| n.as_ref())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (u32, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (i as u32, n)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn move_node(&mut self, id: u32, x: f32, y: f32) -> Result<usize> {
        check_range("x", x, limits::COORD_MIN, limits::COORD_MAX)?;
        check_range("y", y, limits::COORD_MIN, limits::COORD_MAX)?;
        let n = self
            .nodes
            .get_mut(id as usize)
            .and_then(|n| n.as_mut())
            .ok_or(DiagramError::node(id))?;
        n.x = x;
        n.y = y;
        self.bump();
        self.on_node_moved(id)
    }

    /// Recompute the cached anchors of every connection touching `id`.
    /// Returns how many connections were refreshed.
    pub fn on_node_moved(&mut self, id: u32) -> Result<usize> {
        if self.node(id).is_none() {
            return Err(DiagramError::node(id));
        }
        let cids = self.incident.get(&id).cloned().unwrap_or_default();
        for &cid in &cids {
            self.refresh_connection(cid);
        }
        tracing::debug!(node = id, refreshed = cids.len(), "anchors refreshed");
        Ok(cids.len())
    }

    fn refresh_connection(&mut self, cid: u32) {
        let (from, to) = match self.connection(cid) {
            Some(c) => (c.from, c.to),
            None => return,
        };
        let points = match (self.node(from), self.node(to)) {
            (Some(a), Some(b)) => connection_points(a, b),
            _ => return,
        };
        if let Some(Some(c)) = self.connections.get_mut(cid as usize) {
            c.from_point = points.0;
            c.to_point = points.1;
        }
    }

    pub fn update_node(&mut self, id: u32, patch: NodePatch) -> Result<()> {
        let mut next = self.node(id).cloned().ok_or(DiagramError::node(id))?;
        if let Some(x) = patch.x { next.x = x; }
        if let Some(y) = patch.y { next.y = y; }
        if let Some(w) = patch.width { next.width = w; }
        if let Some(h) = patch.height { next.height = h; }
        if let Some(s) = patch.shape { next.shape = s; }
        if let Some(l) = patch.label.clone() { next.label = l; }
        if let Some(c) = patch.fill_color.clone() { next.fill_color = c; }
        if let Some(c) = patch.stroke_color.clone() { next.stroke_color = c; }
        if let Some(c) = patch.text_color.clone() { next.text_color = c; }
        if let Some(w) = patch.stroke_width { next.stroke_width = w; }
        validate_node(&next)?;
        self.nodes[id as usize] = Some(next);
        self.bump();
        if patch.touches_geometry() {
            self.on_node_moved(id)?;
        }
        Ok(())
    }

    /// Remove a node and every connection that references it.
    /// Returns the ids of the removed connections.
    pub fn delete_node(&mut self, id: u32) -> Result<Vec<u32>> {
        match self.nodes.get_mut(id as usize) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => return Err(DiagramError::node(id)),
        }
        let removed = self.incident.remove(&id).unwrap_or_default();
        for &cid in &removed {
            if let Some(c) = self.connections.get_mut(cid as usize).and_then(|c| c.take()) {
                let other = if c.from == id { c.to } else { c.from };
                self.unlink(other, cid);
            }
        }
        tracing::debug!(node = id, cascaded = removed.len(), "node deleted");
        self.bump();
        Ok(removed)
    }

    fn unlink(&mut self, node: u32, cid: u32) {
        if let Some(list) = self.incident.get_mut(&node) {
            list.retain(|&c| c != cid);
            if list.is_empty() {
                self.incident.remove(&node);
            }
        }
    }

    // Connections
    pub fn connect(&mut self, from: u32, to: u32, style: ConnectionStyle) -> Result<u32> {
        let a = self.node(from).ok_or(DiagramError::node(from))?;
        let b = self.node(to).ok_or(DiagramError::node(to))?;
        if from == to {
            return Err(DiagramError::SelfConnection { node: from });
        }
        check_range("strokeWidth", style.stroke_width, 0.0, limits::STROKE_WIDTH_MAX)?;
        check_color_len(&style.color)?;
        if self.connection_count() >= limits::MAX_CONNECTIONS {
            return Err(DiagramError::CapsExceeded {
                what: "connections",
                max: limits::MAX_CONNECTIONS,
            });
        }
        let (from_point, to_point) = connection_points(a, b);
        let id = self.connections.len() as u32;
        self.connections.push(Some(Connection {
            from,
            to,
            from_point,
            to_point,
            kind: style.kind,
            color: style.color,
            stroke_width: style.stroke_width,
        }));
        self.incident.entry(from).or_default().push(id);
        self.incident.entry(to).or_default().push(id);
        tracing::debug!(id, from, to, "connection added");
        self.bump();
        Ok(id)
    }

    pub fn connection(&self, id: u32) -> Option<&Connection> {
        self.connections.get(id as usize).and_then(|c| c.as_ref())
    }

    pub fn connections(&self) -> impl Iterator<Item = (u32, &Connection)> + '_ {
        self.connections
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i as u32, c)))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_some()).count()
    }

    /// Connection ids attached to `node`, in creation order.
    pub fn incident_connections(&self, node: u32) -> &[u32] {
        self.incident.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn update_connection(&mut self, id: u32, patch: ConnectionPatch) -> Result<()> {
        if let Some(w) = patch.stroke_width {
            check_range("strokeWidth", w, 0.0, limits::STROKE_WIDTH_MAX)?;
        }
        if let Some(color) = &patch.color {
            check_color_len(color)?;
        }
        let c = self
            .connections
            .get_mut(id as usize)
            .and_then(|c| c.as_mut())
            .ok_or(DiagramError::connection(id))?;
        if let Some(k) = patch.kind { c.kind = k; }
        if let Some(color) = patch.color { c.color = color; }
        if let Some(w) = patch.stroke_width { c.stroke_width = w; }
        self.bump();
        Ok(())
    }

    pub fn delete_connection(&mut self, id: u32) -> Result<()> {
        let c = self
            .connections
            .get_mut(id as usize)
            .and_then(|c| c.take())
            .ok_or(DiagramError::connection(id))?;
        self.unlink(c.from, id);
        self.unlink(c.to, id);
        self.bump();
        Ok(())
    }

    // Bulk edits
    pub fn remove_all_borders(&mut self) {
        for n in self.nodes.iter_mut().flatten() {
            n.stroke_width = 0.0;
        }
        self.bump();
    }

    /// Drop every node and connection. Slots stay allocated so ids handed
    /// out before the clear are never issued again.
    pub fn clear(&mut self) {
        self.nodes.iter_mut().for_each(|n| *n = None);
        self.connections.iter_mut().for_each(|c| *c = None);
        self.incident.clear();
        self.bump();
    }

    pub fn refresh_anchors(&mut self) {
        for cid in 0..self.connections.len() as u32 {
            self.refresh_connection(cid);
        }
    }

    /// Arrange nodes on a grid (150 px columns, 100 px rows) and re-anchor.
    pub fn apply_grid_layout(&mut self) {
        algorithms::layout::grid_layout_impl(self);
        self.refresh_anchors();
        self.bump();
    }

    pub fn stats(&self) -> DiagramStats {
        let mut s = DiagramStats::default();
        for (_, n) in self.nodes() {
            s.nodes += 1;
            *s.node_types.entry(n.shape).or_insert(0) += 1;
        }
        for (_, c) in self.connections() {
            s.connections += 1;
            *s.connection_types.entry(c.kind).or_insert(0) += 1;
        }
        s
    }

    /// Check referential integrity, the incidence index and anchor placement.
    pub fn validate(&self) -> Result<()> {
        use geometry::anchor::on_boundary;
        use geometry::tolerance::EPS_BOUNDARY;
        for (cid, c) in self.connections() {
            let a = self
                .node(c.from)
                .ok_or(DiagramError::DanglingConnection { connection: cid, node: c.from })?;
            let b = self
                .node(c.to)
                .ok_or(DiagramError::DanglingConnection { connection: cid, node: c.to })?;
            if c.from == c.to {
                return Err(DiagramError::SelfConnection { node: c.from });
            }
            for end in [c.from, c.to] {
                if !self.incident_connections(end).contains(&cid) {
                    return Err(DiagramError::InvalidPayload {
                        message: format!("connection {cid} missing from index of node {end}"),
                    });
                }
            }
            // f32 round-off grows with coordinate magnitude
            let magnitude = [a.x, a.y, b.x, b.y, a.width, a.height, b.width, b.height]
                .iter()
                .fold(0.0f32, |m, v| m.max(v.abs()));
            let eps = EPS_BOUNDARY + magnitude * 1e-5;
            if !on_boundary(a, c.from_point, eps) || !on_boundary(b, c.to_point, eps) {
                return Err(DiagramError::InvalidPayload {
                    message: format!("connection {cid} anchors are stale"),
                });
            }
        }
        for (&nid, cids) in &self.incident {
            for &cid in cids {
                match self.connection(cid) {
                    Some(c) if c.from == nid || c.to == nid => {}
                    _ => {
                        return Err(DiagramError::InvalidPayload {
                            message: format!("index of node {nid} lists foreign connection {cid}"),
                        })
                    }
                }
            }
        }
        Ok(())
    }

    // JSON
    pub fn to_json_value(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }
    pub fn from_json_value(v: serde_json::Value) -> Result<Diagram> {
        json::from_json_impl(v)
    }
    /// `{type: "diagram", data: {...}}` body for the LaTeX generation endpoint.
    pub fn generation_request(&self) -> serde_json::Value {
        json::generation_request_impl(self)
    }

    // TikZ
    pub fn to_tikz(&self, opts: &TikzOptions) -> String {
        tikz::to_tikz_impl(self, opts).0
    }
    pub fn to_latex_document(&self, opts: &TikzOptions) -> String {
        tikz::to_document_impl(self, opts)
    }
    /// Parse the first `tikzpicture` of `latex`. Styles missing from the
    /// source are taken from the same-named node of `existing`, if any.
    pub fn from_tikz(latex: &str, existing: Option<&Diagram>, opts: &ImportOptions) -> Result<Diagram> {
        tikz::from_tikz_impl(latex, existing, opts)
    }
}

/// TikZ node name used for a diagram node id.
pub fn tikz_name(id: u32) -> String {
    format!("n{id}")
}

pub(crate) fn validate_node(n: &Node) -> Result<()> {
    check_range("x", n.x, limits::COORD_MIN, limits::COORD_MAX)?;
    check_range("y", n.y, limits::COORD_MIN, limits::COORD_MAX)?;
    check_finite("width", n.width)?;
    check_finite("height", n.height)?;
    if !limits::in_size_bounds(n.width) {
        return Err(DiagramError::OutOfRange { param: "width", min: 0.0, max: limits::SIZE_MAX, got: n.width });
    }
    if !limits::in_size_bounds(n.height) {
        return Err(DiagramError::OutOfRange { param: "height", min: 0.0, max: limits::SIZE_MAX, got: n.height });
    }
    check_range("strokeWidth", n.stroke_width, 0.0, limits::STROKE_WIDTH_MAX)?;
    if n.label.len() > limits::MAX_LABEL_LEN {
        return Err(DiagramError::CapsExceeded { what: "label length", max: limits::MAX_LABEL_LEN });
    }
    for c in [&n.fill_color, &n.stroke_color, &n.text_color] {
        check_color_len(c)?;
    }
    Ok(())
}

pub(crate) fn check_color_len(color: &str) -> Result<()> {
    if color.len() > limits::MAX_COLOR_LEN {
        return Err(DiagramError::CapsExceeded { what: "color length", max: limits::MAX_COLOR_LEN });
    }
    Ok(())
}
