//! Shared helpers for the integration tests.
#![allow(dead_code)]

use rackgen::float_types::Real;
use rackgen::path::{PathOp, Pen, RecordingPen};

pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Collects the endpoint sequence of a recorded path.
pub fn points_of(pen: &RecordingPen) -> Vec<(Real, Real)> {
    pen.ops().iter().map(PathOp::point).collect()
}

/// Records a rectangle as four straight arcs, counterclockwise.
pub fn record_rect(x0: Real, y0: Real, x1: Real, y1: Real) -> RecordingPen {
    let mut pen = RecordingPen::new();
    pen.move_to(x0, y0);
    pen.arc_to(x1, y0, 0.0);
    pen.arc_to(x1, y1, 0.0);
    pen.arc_to(x0, y1, 0.0);
    pen.arc_to(x0, y0, 0.0);
    pen
}
