//! Tolerance-driven tessellation of a polar curve into an arc chain.
//!
//! Candidate intervals live in a priority queue keyed by worst-case radial
//! deviation; the worst interval is split until every fitted arc is within
//! tolerance, so the coarsest sufficient approximation is produced without
//! global resampling.

use crate::arcs::center_distance_factor;
use crate::float_types::{PI, Real};
use std::collections::BinaryHeap;
use tracing::trace;

/// One emitted piece: arc to `(x, y)` with the given turn.
#[derive(Debug, Clone, Copy)]
pub struct ArcPiece {
    pub x: Real,
    pub y: Real,
    pub turn: Real,
}

/// Parameter spans wider than this are bisected up front so each fitted arc
/// stays numerically well-conditioned.
const MAX_SPAN: Real = 0.6 * PI;
/// Intervals narrower than this are emitted as-is; guards against endless
/// refinement across a residual tangent break.
const MIN_SPAN: Real = 1e-9;

struct Cell {
    err: Real,
    lo: Real,
    hi: Real,
    turn: Real,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.err == other.err
    }
}
impl Eq for Cell {}
impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.err.total_cmp(&other.err)
    }
}

/// Signed turn of the circular arc through three points of the curve, from
/// the sagitta of the midpoint over the chord.
fn fit_turn(p0: (Real, Real), pm: (Real, Real), p1: (Real, Real)) -> Real {
    let cx = p1.0 - p0.0;
    let cy = p1.1 - p0.1;
    let len2 = cx * cx + cy * cy;
    if len2 < 1e-28 {
        return 0.0;
    }
    let bulge = (cx * (pm.1 - p0.1) - cy * (pm.0 - p0.0)) / len2;
    -4.0 * (2.0 * bulge).atan()
}

/// Worst-case deviation of the curve from the fitted arc over `[lo, hi]`,
/// probed at the quarter points.
fn fit_cell(eval: &dyn Fn(Real) -> (Real, Real), lo: Real, hi: Real) -> Cell {
    let p0 = eval(lo);
    let pm = eval(0.5 * (lo + hi));
    let p1 = eval(hi);
    let turn = fit_turn(p0, pm, p1);
    let chord = (p1.0 - p0.0).hypot(p1.1 - p0.1);
    let err = if turn.abs() < 1e-9 {
        // Straight fit: perpendicular distance of the probes from the chord.
        let inv = if chord > 0.0 { 1.0 / chord } else { 0.0 };
        let ux = (p1.0 - p0.0) * inv;
        let uy = (p1.1 - p0.1) * inv;
        let dev = |p: (Real, Real)| ((p.0 - p0.0) * uy - (p.1 - p0.1) * ux).abs();
        dev(eval(lo + 0.25 * (hi - lo))).max(dev(eval(lo + 0.75 * (hi - lo))))
    } else {
        // Radial deviation of the probes from the fitted circle.
        let radius = chord / (2.0 * (0.5 * turn).sin());
        let mid = ((p0.0 + p1.0) * 0.5, (p0.1 + p1.1) * 0.5);
        let offset = center_distance_factor(turn) * chord;
        let ox = mid.0 - (p1.1 - p0.1) * inv_chord(chord) * offset;
        let oy = mid.1 + (p1.0 - p0.0) * inv_chord(chord) * offset;
        let dev = |p: (Real, Real)| (((p.0 - ox).hypot(p.1 - oy)) - radius.abs()).abs();
        dev(eval(lo + 0.25 * (hi - lo))).max(dev(eval(lo + 0.75 * (hi - lo))))
    };
    Cell { err, lo, hi, turn }
}

fn inv_chord(chord: Real) -> Real {
    if chord > 0.0 { 1.0 / chord } else { 0.0 }
}

/// Tessellate `eval` over `[lo, hi]` to within `tolerance`, appending the
/// pieces (in increasing parameter order) to `out`.
pub fn tessellate_span(
    eval: &dyn Fn(Real) -> (Real, Real),
    lo: Real,
    hi: Real,
    tolerance: Real,
    out: &mut Vec<ArcPiece>,
) {
    if hi <= lo {
        return;
    }
    // Pre-split oversized spans.
    if hi - lo >= MAX_SPAN {
        let mid = 0.5 * (lo + hi);
        tessellate_span(eval, lo, mid, tolerance, out);
        tessellate_span(eval, mid, hi, tolerance, out);
        return;
    }
    let mut heap = BinaryHeap::new();
    heap.push(fit_cell(eval, lo, hi));
    while let Some(top) = heap.peek() {
        if top.err <= tolerance || top.hi - top.lo <= MIN_SPAN {
            break;
        }
        let cell = match heap.pop() {
            Some(c) => c,
            None => break,
        };
        let mid = 0.5 * (cell.lo + cell.hi);
        trace!(lo = cell.lo, hi = cell.hi, err = cell.err, "split interval");
        heap.push(fit_cell(eval, cell.lo, mid));
        heap.push(fit_cell(eval, mid, cell.hi));
    }
    let mut cells: Vec<Cell> = heap.into_vec();
    cells.sort_by(|a, b| a.lo.total_cmp(&b.lo));
    for cell in cells {
        let (x, y) = eval(cell.hi);
        out.push(ArcPiece { x, y, turn: cell.turn });
    }
}
