//! Public sketch protocol.
//!
//! Consumers receive a [`Sketch`], a closure that drives a [`SketchPen`]
//! through one closed outline. The public protocol speaks lines, arcs in
//! degrees, conics and circles; the internal path primitive (radians, arcs
//! only) is adapted to it here.

use crate::arcs::interpolate_arc_turn;
use crate::float_types::{PI, Real};
use crate::path::Pen;
use geo::{Coord, LineString, Polygon};

/// Receiver of a 2-D outline in the public vocabulary. `turn_degrees` is the
/// total direction change along an arc, positive counterclockwise.
pub trait SketchPen {
    fn move_to(&mut self, x: Real, y: Real, tag: Option<&str>);
    fn line_to(&mut self, x: Real, y: Real);
    fn arc_to(&mut self, x: Real, y: Real, turn_degrees: Real);
    fn conic_to(&mut self, x1: Real, y1: Real, x2: Real, y2: Real, w: Real);
    fn circle(&mut self, x: Real, y: Real, d: Real, tag: Option<&str>);
}

/// A closed outline as a callback over the public pen protocol.
pub type Sketch = Box<dyn Fn(&mut dyn SketchPen)>;

/// Turns below this are emitted as lines.
const LINE_TURN: Real = 1e-9;

/// Adapts the internal turn-radians pen protocol to a [`SketchPen`].
pub struct SketchAdapter<'a> {
    target: &'a mut dyn SketchPen,
}

impl<'a> SketchAdapter<'a> {
    pub fn new(target: &'a mut dyn SketchPen) -> Self {
        SketchAdapter { target }
    }
}

impl<'a> Pen for SketchAdapter<'a> {
    fn move_to(&mut self, x: Real, y: Real) {
        self.target.move_to(x, y, None);
    }

    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        if turn.abs() < LINE_TURN {
            self.target.line_to(x, y);
        } else {
            self.target.arc_to(x, y, turn * (180.0 / PI));
        }
    }
}

/// Flattens a sketch into a [`geo::Polygon`], with arcs subdivided until the
/// chord sagitta is below `tolerance`. The first subpath becomes the
/// exterior ring; further subpaths and circles become interiors.
pub fn sketch_to_polygon(sketch: &Sketch, tolerance: Real) -> Polygon<Real> {
    let mut pen = FlattenPen { tolerance, rings: Vec::new(), current: Vec::new() };
    sketch(&mut pen);
    pen.close_ring();
    let mut rings = pen.rings.into_iter();
    let exterior = rings.next().unwrap_or_default();
    Polygon::new(
        LineString::from(exterior),
        rings.map(LineString::from).collect(),
    )
}

struct FlattenPen {
    tolerance: Real,
    rings: Vec<Vec<Coord<Real>>>,
    current: Vec<Coord<Real>>,
}

impl FlattenPen {
    fn close_ring(&mut self) {
        if self.current.len() >= 3 {
            let ring = std::mem::take(&mut self.current);
            self.rings.push(ring);
        } else {
            self.current.clear();
        }
    }

    fn last(&self) -> Coord<Real> {
        match self.current.last() {
            Some(c) => *c,
            None => Coord { x: 0.0, y: 0.0 },
        }
    }

    fn push(&mut self, x: Real, y: Real) {
        self.current.push(Coord { x, y });
    }
}

impl SketchPen for FlattenPen {
    fn move_to(&mut self, x: Real, y: Real, _tag: Option<&str>) {
        self.close_ring();
        self.push(x, y);
    }

    fn line_to(&mut self, x: Real, y: Real) {
        self.push(x, y);
    }

    fn arc_to(&mut self, x: Real, y: Real, turn_degrees: Real) {
        let from = self.last();
        let turn = turn_degrees * (PI / 180.0);
        let chord = (x - from.x).hypot(y - from.y);
        let steps = arc_steps(chord, turn, self.tolerance);
        for i in 1..=steps {
            let t = turn * i as Real / steps as Real;
            let (px, py) = interpolate_arc_turn(from.x, from.y, x, y, turn, t);
            self.push(px, py);
        }
    }

    fn conic_to(&mut self, x1: Real, y1: Real, x2: Real, y2: Real, w: Real) {
        let from = self.last();
        const STEPS: usize = 16;
        for i in 1..=STEPS {
            let t = i as Real / STEPS as Real;
            let b0 = (1.0 - t) * (1.0 - t);
            let b1 = 2.0 * w * t * (1.0 - t);
            let b2 = t * t;
            let denom = b0 + b1 + b2;
            self.push(
                (b0 * from.x + b1 * x1 + b2 * x2) / denom,
                (b0 * from.y + b1 * y1 + b2 * y2) / denom,
            );
        }
    }

    fn circle(&mut self, x: Real, y: Real, d: Real, _tag: Option<&str>) {
        self.close_ring();
        let r = 0.5 * d;
        let max_step = 2.0 * (2.0 * self.tolerance / r.max(self.tolerance)).min(1.0).sqrt();
        let steps = ((2.0 * PI / max_step).ceil() as usize).clamp(16, 4096);
        for i in 0..steps {
            let a = 2.0 * PI * i as Real / steps as Real;
            self.push(x + r * a.cos(), y + r * a.sin());
        }
        self.close_ring();
    }
}

/// Subdivision count bounding the sagitta of each chord by `tolerance`.
fn arc_steps(chord: Real, turn: Real, tolerance: Real) -> usize {
    if turn.abs() < LINE_TURN {
        return 1;
    }
    if chord <= 0.0 {
        return 1;
    }
    let radius = (chord / (2.0 * (0.5 * turn).sin())).abs();
    if radius <= tolerance {
        return 1;
    }
    let max_step = 2.0 * (2.0 * tolerance / radius).min(1.0).sqrt();
    ((turn.abs() / max_step).ceil() as usize).clamp(1, 4096)
}
