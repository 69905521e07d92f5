//! The minimal curve-recording abstraction underlying every pipeline stage.
//!
//! A path is an ordered list of [`PathOp`]s: `Move` starts a new sub-path and
//! `ArcTo` adds a circular arc (or, at `turn == 0`, a straight line) whose
//! signed `turn` is the total direction change from the previous point. Paths
//! are pure descriptions; they own no geometry-kernel resources.

use crate::float_types::Real;

/// Squared chord length below which an arc target is coincident with its
/// source and the operation is dropped.
const DROP_DIST_SQ: Real = 1e-14;
/// Squared chord length below which an arc is too short to carry a meaningful
/// turn; the turn is coerced to zero.
const STRAIGHTEN_DIST_SQ: Real = 1e-8;

/// The pen capability: every consumer and filter stage in the pipeline speaks
/// this protocol.
pub trait Pen {
    /// Start a new sub-path at `(x, y)`.
    fn move_to(&mut self, x: Real, y: Real);
    /// Arc from the current point to `(x, y)` with signed total direction
    /// change `turn` (radians); `turn == 0` is a straight line.
    fn arc_to(&mut self, x: Real, y: Real, turn: Real);
}

impl<P: Pen + ?Sized> Pen for &mut P {
    fn move_to(&mut self, x: Real, y: Real) {
        (**self).move_to(x, y);
    }
    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        (**self).arc_to(x, y, turn);
    }
}

impl<P: Pen + ?Sized> Pen for Box<P> {
    fn move_to(&mut self, x: Real, y: Real) {
        (**self).move_to(x, y);
    }
    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        (**self).arc_to(x, y, turn);
    }
}

/// A pen that can commit a checkpoint and roll back to it, discarding
/// everything recorded since. Filters that may need to redo a partially
/// emitted construction (the fillet pens) require this capability as a bound,
/// so its absence is a compile-time error rather than a runtime surprise.
pub trait CheckpointPen: Pen {
    /// Mark the current end of the output as the rollback point.
    fn commit(&mut self);
    /// Discard everything recorded after the last [`commit`](Self::commit).
    fn rollback(&mut self);
}

/// One recorded path operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    Move(Real, Real),
    ArcTo(Real, Real, Real),
}

impl PathOp {
    /// Target point of the operation.
    pub fn point(&self) -> (Real, Real) {
        match *self {
            PathOp::Move(x, y) | PathOp::ArcTo(x, y, _) => (x, y),
        }
    }
}

/// A pen that records the full operation list and can replay it forward or
/// reversed onto any other pen.
#[derive(Debug, Clone, Default)]
pub struct RecordingPen {
    ops: Vec<PathOp>,
    checkpoint: usize,
}

impl RecordingPen {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded operations.
    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The most recently recorded point, if any.
    pub fn last_point(&self) -> Option<(Real, Real)> {
        self.ops.last().map(PathOp::point)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.checkpoint = 0;
    }

    /// Replay the recorded operations forward onto `pen`.
    pub fn replay(&self, pen: &mut dyn Pen) {
        for op in &self.ops {
            match *op {
                PathOp::Move(x, y) => pen.move_to(x, y),
                PathOp::ArcTo(x, y, turn) => pen.arc_to(x, y, turn),
            }
        }
    }

    /// Replay forward, skipping the leading bare `Move` so the recording
    /// continues a path already open on `pen`.
    pub fn replay_continue(&self, pen: &mut dyn Pen) {
        let start = self
            .ops
            .iter()
            .position(|op| matches!(op, PathOp::ArcTo(..)))
            .unwrap_or(self.ops.len());
        for op in &self.ops[start..] {
            match *op {
                PathOp::Move(x, y) => pen.move_to(x, y),
                PathOp::ArcTo(x, y, turn) => pen.arc_to(x, y, turn),
            }
        }
    }

    /// Replay the recording end-to-start: points are read in reverse order and
    /// every turn is negated. With `do_move == false` the leading `Move` onto
    /// the (former) end point is suppressed, continuing an open path.
    pub fn replay_reversed(&self, pen: &mut dyn Pen, do_move: bool) {
        let Some(last) = self.ops.last() else {
            return;
        };
        if do_move {
            let (x, y) = last.point();
            pen.move_to(x, y);
        }
        for i in (1..self.ops.len()).rev() {
            let (px, py) = self.ops[i - 1].point();
            match self.ops[i] {
                PathOp::ArcTo(_, _, turn) => pen.arc_to(px, py, -turn),
                PathOp::Move(..) => pen.move_to(px, py),
            }
        }
    }
}

impl Pen for RecordingPen {
    fn move_to(&mut self, x: Real, y: Real) {
        // A trailing bare move never contributed geometry; replace it.
        if matches!(self.ops.last(), Some(PathOp::Move(..))) {
            self.ops.pop();
        }
        self.ops.push(PathOp::Move(x, y));
    }

    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        let Some(last) = self.ops.last() else {
            debug_assert!(false, "arc_to before any move_to");
            return;
        };
        let (px, py) = last.point();
        let d2 = (x - px) * (x - px) + (y - py) * (y - py);
        if d2 < DROP_DIST_SQ {
            return;
        }
        let turn = if d2 < STRAIGHTEN_DIST_SQ { 0.0 } else { turn };
        self.ops.push(PathOp::ArcTo(x, y, turn));
    }
}

impl CheckpointPen for RecordingPen {
    fn commit(&mut self) {
        self.checkpoint = self.ops.len();
    }

    fn rollback(&mut self) {
        self.ops.truncate(self.checkpoint);
    }
}

/// A pen that remembers only the most recent point touched by any operation.
///
/// Used to seed the starting point of a replicated pattern: the captured point
/// is transferred as a single `move_to` without re-emitting the whole path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastPointPen {
    last: Option<(Real, Real)>,
}

impl LastPointPen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_point(&self) -> Option<(Real, Real)> {
        self.last
    }

    /// Emit the captured point, if any, as a `move_to` on `pen`.
    pub fn transfer(&self, pen: &mut dyn Pen) {
        if let Some((x, y)) = self.last {
            pen.move_to(x, y);
        }
    }
}

impl Pen for LastPointPen {
    fn move_to(&mut self, x: Real, y: Real) {
        self.last = Some((x, y));
    }
    fn arc_to(&mut self, x: Real, y: Real, _turn: Real) {
        self.last = Some((x, y));
    }
}
