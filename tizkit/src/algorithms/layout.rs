use crate::Diagram;

pub const GRID_SPACING_X: f32 = 150.0;
pub const GRID_SPACING_Y: f32 = 100.0;

/// Row-major grid with `floor(sqrt(n))` nodes per row, in id order.
pub fn grid_positions(count: usize) -> Vec<(f32, f32)> {
    let per_row = ((count as f64).sqrt() as usize).max(1);
    (0..count)
        .map(|i| {
            let row = i / per_row;
            let col = i % per_row;
            (col as f32 * GRID_SPACING_X, row as f32 * GRID_SPACING_Y)
        })
        .collect()
}

pub(crate) fn grid_layout_impl(d: &mut Diagram) {
    let ids: Vec<u32> = d.nodes().map(|(id, _)| id).collect();
    let positions = grid_positions(ids.len());
    for (id, (x, y)) in ids.into_iter().zip(positions) {
        if let Some(Some(n)) = d.nodes.get_mut(id as usize) {
            n.x = x;
            n.y = y;
        }
    }
}
