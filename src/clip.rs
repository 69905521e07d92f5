//! Half-plane clipping pen.
//!
//! Trims a path to the side of a line where `nx·x + ny·y ≥ min_product`,
//! passing through points on the keep side, interpolating the crossing on
//! near-straight segments and bisecting the turn parameter on curved ones.
//!
//! Limitation: an arc whose endpoints both lie on the keep side but whose
//! bulge crosses the boundary is not detected. Callers must guarantee that
//! the curves they feed in cannot do this.

use crate::arcs::interpolate_arc_turn;
use crate::float_types::Real;
use crate::path::Pen;

/// Turns below this magnitude are clipped as straight lines.
const LINE_TURN: Real = 1e-9;
/// Boundary slack: points this close to the line count as inside, so a path
/// that merely touches the boundary survives point-for-point.
const EDGE_SLACK: Real = 1e-12;

pub struct ClipPen<P: Pen> {
    target: P,
    nx: Real,
    ny: Real,
    min_product: Real,
    last: Option<(Real, Real, bool)>,
}

impl<P: Pen> ClipPen<P> {
    pub fn new(target: P, nx: Real, ny: Real, min_product: Real) -> Self {
        Self {
            target,
            nx,
            ny,
            min_product,
            last: None,
        }
    }

    pub fn into_inner(self) -> P {
        self.target
    }

    fn offset(&self, x: Real, y: Real) -> Real {
        self.nx * x + self.ny * y - self.min_product
    }

    fn inside(&self, x: Real, y: Real) -> bool {
        self.offset(x, y) >= -EDGE_SLACK
    }

    /// Turn parameter at which the arc from `(px, py)` to `(x, y)` crosses the
    /// boundary, given that exactly one endpoint is inside. The crossing is
    /// assumed unique over the segment.
    fn crossing_turn(&self, px: Real, py: Real, x: Real, y: Real, turn: Real) -> Real {
        let start_inside = self.inside(px, py);
        let mut lo = 0.0;
        let mut hi = turn;
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            let (mx, my) = interpolate_arc_turn(px, py, x, y, turn, mid);
            if self.inside(mx, my) == start_inside {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

impl<P: Pen> Pen for ClipPen<P> {
    fn move_to(&mut self, x: Real, y: Real) {
        let inside = self.inside(x, y);
        if inside {
            self.target.move_to(x, y);
        }
        self.last = Some((x, y, inside));
    }

    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        let Some((px, py, was_inside)) = self.last else {
            debug_assert!(false, "arc_to before any move_to");
            return;
        };
        let inside = self.inside(x, y);
        match (was_inside, inside) {
            (true, true) => self.target.arc_to(x, y, turn),
            (true, false) => {
                // Leaving the keep side: emit up to the crossing, drop the rest.
                if turn.abs() < LINE_TURN {
                    let d0 = self.offset(px, py);
                    let d1 = self.offset(x, y);
                    let t = d0 / (d0 - d1);
                    self.target.arc_to(px + (x - px) * t, py + (y - py) * t, 0.0);
                } else {
                    let tc = self.crossing_turn(px, py, x, y, turn);
                    let (cx, cy) = interpolate_arc_turn(px, py, x, y, turn, tc);
                    self.target.arc_to(cx, cy, tc);
                }
            }
            (false, true) => {
                // Re-entering: open a sub-path at the crossing.
                if turn.abs() < LINE_TURN {
                    let d0 = self.offset(px, py);
                    let d1 = self.offset(x, y);
                    let t = d0 / (d0 - d1);
                    self.target.move_to(px + (x - px) * t, py + (y - py) * t);
                    self.target.arc_to(x, y, 0.0);
                } else {
                    let tc = self.crossing_turn(px, py, x, y, turn);
                    let (cx, cy) = interpolate_arc_turn(px, py, x, y, turn, tc);
                    self.target.move_to(cx, cy);
                    self.target.arc_to(x, y, turn - tc);
                }
            }
            (false, false) => {}
        }
        self.last = Some((x, y, inside));
    }
}
