//! Boundary anchors for connectors.
//!
//! A connector is drawn between the points where the line of centers leaves
//! each endpoint shape, so arrows touch outlines instead of centers.

use super::tolerance::{near_zero, EPS_POS};
use crate::model::{Node, Point, ShapeKind};

/// Diamonds are treated as a circle of this fraction of their width.
/// An approximation; anchors do not follow the actual diamond edges.
pub const DIAMOND_RADIUS_FACTOR: f32 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    From,
    To,
}

impl Endpoint {
    pub fn from_flag(is_from: bool) -> Self {
        if is_from { Endpoint::From } else { Endpoint::To }
    }
}

/// Anchor of one endpoint of a connection from `from` to `to`.
pub fn resolve_anchor(from: &Node, to: &Node, end: Endpoint) -> Point {
    let fc = from.center();
    let tc = to.center();
    let (mut dx, mut dy) = (tc.x - fc.x, tc.y - fc.y);
    // Coincident centers: pretend the target lies to the right.
    if near_zero(dx, EPS_POS) && near_zero(dy, EPS_POS) {
        dx = 1.0;
        dy = 0.0;
    }
    match end {
        Endpoint::From => boundary_point(from, fc, dx, dy),
        Endpoint::To => boundary_point(to, tc, -dx, -dy),
    }
}

/// Both anchors of a connection, `(from_point, to_point)`.
pub fn connection_points(from: &Node, to: &Node) -> (Point, Point) {
    (
        resolve_anchor(from, to, Endpoint::From),
        resolve_anchor(from, to, Endpoint::To),
    )
}

fn boundary_point(node: &Node, c: Point, dx: f32, dy: f32) -> Point {
    match node.shape {
        ShapeKind::Circle => radial_point(c, node.width / 2.0, dx, dy),
        ShapeKind::Diamond => radial_point(c, node.width * DIAMOND_RADIUS_FACTOR, dx, dy),
        ShapeKind::Rectangle => rect_point(c, node.width / 2.0, node.height / 2.0, dx, dy),
    }
}

fn radial_point(c: Point, radius: f32, dx: f32, dy: f32) -> Point {
    let angle = dy.atan2(dx);
    Point {
        x: c.x + angle.cos() * radius,
        y: c.y + angle.sin() * radius,
    }
}

// Ray/box intersection. The caller guarantees (dx, dy) != (0, 0), so the
// divisor of whichever branch is taken is strictly positive.
fn rect_point(c: Point, hw: f32, hh: f32, dx: f32, dy: f32) -> Point {
    if dx.abs() * hh > dy.abs() * hw || dy == 0.0 {
        let x = c.x + if dx > 0.0 { hw } else { -hw };
        let y = c.y + (dy * hw) / dx.abs();
        Point { x, y }
    } else {
        let x = c.x + (dx * hh) / dy.abs();
        let y = c.y + if dy > 0.0 { hh } else { -hh };
        Point { x, y }
    }
}

/// Whether `p` lies on the outline `resolve_anchor` projects onto for `node`.
pub fn on_boundary(node: &Node, p: Point, eps: f32) -> bool {
    let c = node.center();
    let (dx, dy) = (p.x - c.x, p.y - c.y);
    match node.shape {
        ShapeKind::Circle | ShapeKind::Diamond => {
            let r = match node.shape {
                ShapeKind::Circle => node.width / 2.0,
                _ => node.width * DIAMOND_RADIUS_FACTOR,
            };
            ((dx * dx + dy * dy).sqrt() - r).abs() <= eps
        }
        ShapeKind::Rectangle => {
            let (hw, hh) = (node.width / 2.0, node.height / 2.0);
            let inside = dx.abs() <= hw + eps && dy.abs() <= hh + eps;
            let on_edge = (dx.abs() - hw).abs() <= eps || (dy.abs() - hh).abs() <= eps;
            inside && on_edge
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Node {
        Node::new(ShapeKind::Rectangle, x, y).with_size(w, h)
    }

    #[test]
    fn rect_diagonal_exits_through_corner_region() {
        let a = rect(0.0, 0.0, 100.0, 100.0);
        let b = rect(200.0, 200.0, 100.0, 100.0);
        let p = resolve_anchor(&a, &b, Endpoint::From);
        // 45 degrees on a square hits the corner
        assert!((p.x - 100.0).abs() < 1e-3);
        assert!((p.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn zero_size_rect_collapses_to_center() {
        let a = rect(10.0, 10.0, 0.0, 0.0);
        let b = rect(10.0, 10.0, 0.0, 0.0);
        let p = resolve_anchor(&a, &b, Endpoint::From);
        assert_eq!(p, Point::new(10.0, 10.0));
    }

    #[test]
    fn endpoint_flag_maps_to_variant() {
        assert_eq!(Endpoint::from_flag(true), Endpoint::From);
        assert_eq!(Endpoint::from_flag(false), Endpoint::To);
    }
}
