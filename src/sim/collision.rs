//! Collision detection for lane-bound entities
//!
//! Entities in the same lane always line up vertically, so a collision is
//! just lane equality plus overlap of the horizontal extents.

/// Half-open horizontal extent `[start, start + width)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub width: f32,
}

impl Span {
    pub fn new(start: f32, width: f32) -> Self {
        Self { start, width }
    }

    /// Exclusive right edge
    #[inline]
    pub fn end(&self) -> f32 {
        self.start + self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0
    }

    /// True if the two half-open spans share at least one point.
    /// Spans that only touch (`a.end() == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start < other.end()
            && other.start < self.end()
    }
}

/// Sole collision predicate: same lane and overlapping spans
#[inline]
pub fn lane_collision(lane_a: u32, span_a: Span, lane_b: u32, span_b: Span) -> bool {
    lane_a == lane_b && span_a.overlaps(&span_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_touching_edges_do_not_collide() {
        let player = Span::new(40.0, 40.0);
        assert!(!player.overlaps(&Span::new(80.0, 30.0)));
        assert!(!player.overlaps(&Span::new(10.0, 30.0)));
        assert!(player.overlaps(&Span::new(79.0, 30.0)));
        assert!(player.overlaps(&Span::new(11.0, 30.0)));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Span::new(0.0, 100.0);
        let inner = Span::new(40.0, 10.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_lane_mismatch_never_collides() {
        let span = Span::new(40.0, 40.0);
        assert!(lane_collision(2, span, 2, span));
        assert!(!lane_collision(1, span, 2, span));
    }

    #[test]
    fn test_empty_span_never_overlaps() {
        let empty = Span::new(50.0, 0.0);
        assert!(!empty.overlaps(&Span::new(40.0, 40.0)));
        assert!(!Span::new(40.0, 40.0).overlaps(&empty));
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            a_x in -700.0f32..700.0, a_w in 0.0f32..100.0,
            b_x in -700.0f32..700.0, b_w in 0.0f32..100.0,
            a_lane in 0u32..4, b_lane in 0u32..4,
        ) {
            let a = Span::new(a_x, a_w);
            let b = Span::new(b_x, b_w);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            prop_assert_eq!(lane_collision(a_lane, a, b_lane, b), lane_collision(b_lane, b, a_lane, a));
        }

        #[test]
        fn integer_positions_match_cellwise_overlap(a_x in -50i32..50, b_x in -50i32..50, a_w in 1i32..20, b_w in 1i32..20) {
            // Brute force over unit cells of the half-open intervals
            let cells_a: Vec<i32> = (a_x..a_x + a_w).collect();
            let shared = (b_x..b_x + b_w).any(|c| cells_a.contains(&c));
            let a = Span::new(a_x as f32, a_w as f32);
            let b = Span::new(b_x as f32, b_w as f32);
            prop_assert_eq!(a.overlaps(&b), shared);
        }
    }
}
