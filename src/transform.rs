//! Lazy, associative composition of rotate/scale/translate/flip operations and
//! arbitrary filter stages, applied to a path only when consumed.
//!
//! The compositor keeps a single *pending* affine (rotation in degrees,
//! uniform scale, Y-flip flag, translation) plus an ordered list of queued
//! stages. Scalar builder calls update the pending affine in place; queuing a
//! stage folds the pending affine into a new upstream stage and resets it.
//! This two-phase state preserves one linear ordering of effects without an
//! expression tree, so long pipelines never grow the call stack.
//!
//! When the compositor is applied to a target pen, data flows through the
//! pending affine first, then through the queued stages in order, then into
//! the target.

use crate::clip::ClipPen;
use crate::float_types::Real;
use crate::path::Pen;

/// Builds a filter pen in front of a downstream pen when the compositor is
/// applied to a target.
pub trait Stage {
    fn attach<'a>(&self, target: Box<dyn Pen + 'a>) -> Box<dyn Pen + 'a>;
}

/// Exact direction cosines for quarter-turn rotations, indexed by
/// `rotation / 90°`. Avoids floating drift for the common right-angle cases.
const QUARTER_DIRS: [(Real, Real); 4] = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

fn rotation_cos_sin(deg: Real) -> (Real, Real) {
    if deg % 90.0 == 0.0 {
        let idx = ((deg / 90.0) as i64).rem_euclid(4) as usize;
        QUARTER_DIRS[idx]
    } else {
        let rad = deg.to_radians();
        (rad.cos(), rad.sin())
    }
}

fn normalize_deg(deg: Real) -> Real {
    let mut d = deg % 360.0;
    if d < 0.0 {
        d += 360.0;
    }
    d
}

#[derive(Debug, Clone, Copy)]
struct AffineStage {
    rotation_deg: Real,
    scale: Real,
    flip_y: bool,
    tx: Real,
    ty: Real,
}

impl AffineStage {
    fn is_identity(&self) -> bool {
        self.rotation_deg == 0.0 && self.scale == 1.0 && !self.flip_y && self.tx == 0.0 && self.ty == 0.0
    }
}

impl Stage for AffineStage {
    fn attach<'a>(&self, target: Box<dyn Pen + 'a>) -> Box<dyn Pen + 'a> {
        let (c, s) = rotation_cos_sin(self.rotation_deg);
        Box::new(AffinePen {
            cos: c,
            sin: s,
            scale: self.scale,
            flip_y: self.flip_y,
            tx: self.tx,
            ty: self.ty,
            target,
        })
    }
}

struct AffinePen<'a> {
    cos: Real,
    sin: Real,
    scale: Real,
    flip_y: bool,
    tx: Real,
    ty: Real,
    target: Box<dyn Pen + 'a>,
}

impl AffinePen<'_> {
    fn map(&self, x: Real, y: Real) -> (Real, Real) {
        let y = if self.flip_y { -y } else { y };
        let xr = x * self.cos - y * self.sin;
        let yr = x * self.sin + y * self.cos;
        (xr * self.scale + self.tx, yr * self.scale + self.ty)
    }
}

impl Pen for AffinePen<'_> {
    fn move_to(&mut self, x: Real, y: Real) {
        let (x, y) = self.map(x, y);
        self.target.move_to(x, y);
    }
    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        let (x, y) = self.map(x, y);
        let turn = if self.flip_y { -turn } else { turn };
        self.target.arc_to(x, y, turn);
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipStage {
    nx: Real,
    ny: Real,
    min_product: Real,
}

impl Stage for ClipStage {
    fn attach<'a>(&self, target: Box<dyn Pen + 'a>) -> Box<dyn Pen + 'a> {
        Box::new(ClipPen::new(target, self.nx, self.ny, self.min_product))
    }
}

/// The transform compositor. Created empty (identity); wrapped around a
/// target pen with [`apply`](Transform::apply).
pub struct Transform {
    pending: AffineStage,
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform {
    pub fn new() -> Self {
        Self {
            pending: AffineStage {
                rotation_deg: 0.0,
                scale: 1.0,
                flip_y: false,
                tx: 0.0,
                ty: 0.0,
            },
            stages: Vec::new(),
        }
    }

    /// Rotate about the origin by `deg` degrees counterclockwise.
    pub fn rotate(mut self, deg: Real) -> Self {
        let step = normalize_deg(deg);
        let (c, s) = rotation_cos_sin(step);
        self.pending.rotation_deg = normalize_deg(self.pending.rotation_deg + step);
        let (tx, ty) = (self.pending.tx, self.pending.ty);
        self.pending.tx = tx * c - ty * s;
        self.pending.ty = tx * s + ty * c;
        self
    }

    /// Translate by `(x, y)` after any rotation/scale/flip.
    pub fn translate(mut self, x: Real, y: Real) -> Self {
        self.pending.tx += x;
        self.pending.ty += y;
        self
    }

    /// Uniform scale about the origin. A negative factor normalizes to a 180°
    /// rotation plus a positive scale, so the stored scale stays `≥ 0`.
    pub fn scale(self, factor: Real) -> Self {
        if factor < 0.0 {
            return self.rotate(180.0).scale(-factor);
        }
        let mut t = self;
        t.pending.scale *= factor;
        t.pending.tx *= factor;
        t.pending.ty *= factor;
        t
    }

    /// Uniform scale with an optional mirror across the X axis applied before
    /// the rotation.
    pub fn scale_flip(mut self, factor: Real, flip_y: bool) -> Self {
        if flip_y {
            self.pending.rotation_deg = normalize_deg(-self.pending.rotation_deg);
            self.pending.flip_y = !self.pending.flip_y;
            self.pending.ty = -self.pending.ty;
        }
        self.scale(factor)
    }

    /// Queue a half-plane clip stage: only geometry with
    /// `nx·x + ny·y ≥ min_product` survives.
    pub fn clip(self, nx: Real, ny: Real, min_product: Real) -> Self {
        self.process(Box::new(ClipStage { nx, ny, min_product }))
    }

    /// Queue an arbitrary filter stage behind everything composed so far.
    pub fn process(mut self, stage: Box<dyn Stage>) -> Self {
        self.flush_pending();
        self.stages.push(stage);
        self
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_identity() {
            // The accumulated affine stays upstream of every queued stage.
            self.stages.insert(0, Box::new(self.pending));
            self.pending = AffineStage {
                rotation_deg: 0.0,
                scale: 1.0,
                flip_y: false,
                tx: 0.0,
                ty: 0.0,
            };
        }
    }

    /// Wrap `target` in the composed pipeline: pending affine first, then the
    /// queued stages in insertion order, then the target itself.
    pub fn apply<'a>(&self, target: Box<dyn Pen + 'a>) -> Box<dyn Pen + 'a> {
        let mut pen = target;
        for stage in self.stages.iter().rev() {
            pen = stage.attach(pen);
        }
        self.pending.attach(pen)
    }
}
