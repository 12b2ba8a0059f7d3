use proptest::prelude::*;
use tizkit::geometry::anchor::DIAMOND_RADIUS_FACTOR;
use tizkit::{connection_points, Node, Point, ShapeKind};

fn shape_strategy() -> impl Strategy<Value = ShapeKind> {
    prop_oneof![Just(ShapeKind::Rectangle), Just(ShapeKind::Circle), Just(ShapeKind::Diamond)]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    (shape_strategy(), -2000i32..2000, -2000i32..2000, 1u16..400, 1u16..400).prop_map(
        |(shape, x, y, w, h)| Node::new(shape, x as f32, y as f32).with_size(w as f32, h as f32),
    )
}

fn rect_strategy() -> impl Strategy<Value = Node> {
    (-2000i32..2000, -2000i32..2000, 1u16..400, 1u16..400).prop_map(|(x, y, w, h)| {
        Node::new(ShapeKind::Rectangle, x as f32, y as f32).with_size(w as f32, h as f32)
    })
}

// slack for f32 round-off at these coordinate magnitudes
const TOL: f32 = 0.05;

fn radius(n: &Node) -> Option<f32> {
    match n.shape {
        ShapeKind::Circle => Some(n.width / 2.0),
        ShapeKind::Diamond => Some(n.width * DIAMOND_RADIUS_FACTOR),
        ShapeKind::Rectangle => None,
    }
}

/// Distance of `p` from the line through `a` and `b`, and whether `p` lies
/// on the `b` side of `a`.
fn line_offset(a: Point, b: Point, p: Point) -> (f32, bool) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    let cross = dx * (p.y - a.y) - dy * (p.x - a.x);
    let dot = dx * (p.x - a.x) + dy * (p.y - a.y);
    (cross.abs() / len, dot >= -TOL * len)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, .. ProptestConfig::default() })]

    #[test]
    fn anchors_lie_on_the_line_of_centers(a in node_strategy(), b in node_strategy()) {
        let (ca, cb) = (a.center(), b.center());
        prop_assume!((ca.x - cb.x).abs() > 0.25 || (ca.y - cb.y).abs() > 0.25);
        let (from, to) = connection_points(&a, &b);
        prop_assert!(from.is_finite() && to.is_finite());

        let (off, toward) = line_offset(ca, cb, from);
        prop_assert!(off < TOL, "from {:?} is {} off the center line", from, off);
        prop_assert!(toward, "from {:?} points away from the target", from);
        let (off, toward) = line_offset(cb, ca, to);
        prop_assert!(off < TOL, "to {:?} is {} off the center line", to, off);
        prop_assert!(toward, "to {:?} points away from the source", to);
    }

    #[test]
    fn round_shapes_anchor_at_their_radius(a in node_strategy(), b in node_strategy()) {
        let (ca, cb) = (a.center(), b.center());
        prop_assume!((ca.x - cb.x).abs() > 0.25 || (ca.y - cb.y).abs() > 0.25);
        let (from, to) = connection_points(&a, &b);
        for (n, c, p) in [(&a, ca, from), (&b, cb, to)] {
            if let Some(r) = radius(n) {
                let d = ((p.x - c.x).powi(2) + (p.y - c.y).powi(2)).sqrt();
                prop_assert!((d - r).abs() < TOL, "distance {} for radius {}", d, r);
            }
        }
    }

    #[test]
    fn horizontal_offset_exits_side_edges(a in rect_strategy(), shift in 1i32..3000, left in any::<bool>()) {
        let dx = (if left { -shift } else { shift }) as f32;
        let b = Node { x: a.x + dx, ..a.clone() };
        let (from, to) = connection_points(&a, &b);
        let (ca, cb, hw) = (a.center(), b.center(), a.width / 2.0);
        prop_assert!(!from.x.is_nan() && !from.y.is_nan() && !to.x.is_nan() && !to.y.is_nan());
        prop_assert_eq!(from.y, ca.y);
        prop_assert_eq!(to.y, cb.y);
        prop_assert!((from.x - (ca.x + hw * dx.signum())).abs() < TOL);
        prop_assert!((to.x - (cb.x - hw * dx.signum())).abs() < TOL);
    }

    #[test]
    fn vertical_offset_exits_top_or_bottom(a in rect_strategy(), shift in 1i32..3000, up in any::<bool>()) {
        let dy = (if up { -shift } else { shift }) as f32;
        let b = Node { y: a.y + dy, ..a.clone() };
        let (from, to) = connection_points(&a, &b);
        let (ca, cb, hh) = (a.center(), b.center(), a.height / 2.0);
        prop_assert!(!from.x.is_nan() && !from.y.is_nan() && !to.x.is_nan() && !to.y.is_nan());
        prop_assert_eq!(from.x, ca.x);
        prop_assert_eq!(to.x, cb.x);
        prop_assert!((from.y - (ca.y + hh * dy.signum())).abs() < TOL);
        prop_assert!((to.y - (cb.y - hh * dy.signum())).abs() < TOL);
    }

    #[test]
    fn axis_aligned_round_shapes_stay_finite(a in node_strategy(), shift in 1i32..3000, vertical in any::<bool>()) {
        let b = if vertical {
            Node { y: a.y + shift as f32, ..a.clone() }
        } else {
            Node { x: a.x + shift as f32, ..a.clone() }
        };
        let (from, to) = connection_points(&a, &b);
        prop_assert!(from.is_finite() && to.is_finite());
    }
}
