// Ingestion limits for untrusted diagram documents (JSON/TikZ)

// Scene size caps
pub const MAX_NODES: usize = 20_000;
pub const MAX_CONNECTIONS: usize = 60_000;
// Ids index slot vectors, so they are bounded too
pub const MAX_ID: u32 = 1_000_000;
// A loaded document keeps its ids only while max id stays within
// max(count * ID_SLACK, ID_SLACK_MIN); sparser documents are packed.
pub const ID_SLACK: usize = 4;
pub const ID_SLACK_MIN: usize = 1_024;

// TikZ source cap in bytes
pub const MAX_TIKZ_BYTES: usize = 4 * 1024 * 1024;

// Labels and color strings
pub const MAX_LABEL_LEN: usize = 4_096;
pub const MAX_COLOR_LEN: usize = 64;

// Numeric bounds
pub const COORD_MIN: f32 = -1_000_000.0;
pub const COORD_MAX: f32 = 1_000_000.0;
pub const SIZE_MAX: f32 = 100_000.0;
pub const STROKE_WIDTH_MAX: f32 = 1_000.0;

#[inline]
pub fn in_size_bounds(s: f32) -> bool { s.is_finite() && s > 0.0 && s <= SIZE_MAX }

#[inline]
pub fn in_stroke_bounds(w: f32) -> bool { w.is_finite() && w >= 0.0 && w <= STROKE_WIDTH_MAX }

#[inline]
pub fn sparse_ceiling(count: usize) -> usize { count.saturating_mul(ID_SLACK).max(ID_SLACK_MIN) }
