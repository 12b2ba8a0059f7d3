// Shared tolerances for anchor geometry and invariant checks

pub const EPS_POS: f32 = 1e-4; // coincident centers (px)
pub const EPS_BOUNDARY: f32 = 1e-2; // on-outline slack for f32 round-off (px)

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    x.max(lo).min(hi)
}

#[inline]
pub fn near_zero(x: f32, eps: f32) -> bool {
    x.abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_inside_values() {
        assert_eq!(clamp(0.4, 1.0, 3.0), 1.0);
        assert_eq!(clamp(2.5, 1.0, 3.0), 2.5);
        assert_eq!(clamp(9.0, 1.0, 3.0), 3.0);
    }

    #[test]
    fn near_zero_is_inclusive() {
        assert!(near_zero(-EPS_POS, EPS_POS));
        assert!(!near_zero(2.0 * EPS_POS, EPS_POS));
    }
}
