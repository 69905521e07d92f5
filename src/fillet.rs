//! Root fillet maximization.
//!
//! [`fillet_pass`] replays a path through a [`FilletPen`] that watches for a
//! sharp convex-root corner, then replaces the tail of the arc leading into
//! the corner and the base of the flank leaving it with the largest circular
//! arc that stays tangent to both. The pen runs a small state machine:
//!
//! * **Unqualified** holds each arc back one op so the arc entering a corner
//!   is still replaceable when the bend is detected.
//! * **Filleting** forwards flank arcs tentatively while the candidate fillet
//!   keeps growing, and lands as soon as tangency can no longer be pushed
//!   further up the flank.
//! * **Done** passes the rest of the path through untouched.
//!
//! The fillet circle is solved in closed form: tangent to the circle carrying
//! the corner's entry arc and tangent to the flank at a trial point. The trial
//! point is pushed along the flank until the root tangency would back out of
//! the entry arc, then bisected to the furthest admissible landing.

use crate::arcs::wrap_angle;
use crate::errors::GearError;
use crate::float_types::{FRAC_PI_2, PI, Real};
use crate::path::{CheckpointPen, Pen, RecordingPen};
use tracing::debug;

/// Direction break that opens a fillet zone, in radians.
const ENTER_BEND: Real = 0.125 * PI;
/// A flank direction back within this window of the entry land direction
/// closes the zone.
const EXIT_WINDOW: Real = 0.1 * PI;

#[derive(Clone, Copy, PartialEq)]
enum State {
    Unqualified,
    Filleting,
    Done,
}

/// One recorded arc with its endpoint directions.
#[derive(Clone, Copy)]
struct Seg {
    x0: Real,
    y0: Real,
    x1: Real,
    y1: Real,
    turn: Real,
}

impl Seg {
    fn chord_dir(&self) -> Real {
        (self.y1 - self.y0).atan2(self.x1 - self.x0)
    }

    fn start_dir(&self) -> Real {
        self.chord_dir() - 0.5 * self.turn
    }

    fn end_dir(&self) -> Real {
        self.chord_dir() + 0.5 * self.turn
    }

    fn chord_len(&self) -> Real {
        (self.x1 - self.x0).hypot(self.y1 - self.y0)
    }

    fn point_at(&self, f: Real) -> (Real, Real) {
        if self.turn.abs() < 1e-9 {
            (
                self.x0 + (self.x1 - self.x0) * f,
                self.y0 + (self.y1 - self.y0) * f,
            )
        } else {
            crate::arcs::interpolate_arc_turn(
                self.x0,
                self.y0,
                self.x1,
                self.y1,
                self.turn,
                f * self.turn,
            )
        }
    }

    fn dir_at(&self, f: Real) -> Real {
        self.start_dir() + f * self.turn
    }
}

/// Circle or line carrying the arc that enters the corner.
#[derive(Clone, Copy)]
enum LandCarrier {
    Circle { cx: Real, cy: Real, r: Real },
    /// Unit direction of a straight entry segment.
    Line { ux: Real, uy: Real, len: Real },
}

/// A solved fillet landing on the flank.
struct Landing {
    /// Tangency point on the entry arc.
    tx: Real,
    ty: Real,
    /// Sweep of the entry arc shortened to end at the tangency point.
    land_turn: Real,
    /// Tangency point on the flank.
    qx: Real,
    qy: Real,
    /// Sweep of the fillet arc itself.
    fillet_turn: Real,
    radius: Real,
}

/// Pen that detects one root corner per pass and rounds it in place.
///
/// The target must be a [`CheckpointPen`] so tentative flank arcs can be
/// discarded once the landing is known.
pub struct FilletPen<'a, P: CheckpointPen> {
    target: &'a mut P,
    tolerance: Real,
    state: State,
    /// One-op holdback while scanning for the corner.
    pending: Option<Seg>,
    last: Option<(Real, Real)>,
    last_dir: Option<Real>,
    /// Sign of the corner bend; the fillet sweeps the same way.
    zone_sign: Real,
    /// Direction along the entry arc at the corner.
    anchor_dir: Real,
    land: Option<(Seg, LandCarrier)>,
    /// Last tentatively forwarded flank arc, for landing at path end.
    current: Option<Seg>,
    entered: bool,
    applied: bool,
}

impl<'a, P: CheckpointPen> FilletPen<'a, P> {
    pub fn new(target: &'a mut P, tolerance: Real) -> Self {
        FilletPen {
            target,
            tolerance,
            state: State::Unqualified,
            pending: None,
            last: None,
            last_dir: None,
            zone_sign: 0.0,
            anchor_dir: 0.0,
            land: None,
            current: None,
            entered: false,
            applied: false,
        }
    }

    /// Flushes the pass. Errors when a corner was entered but no fillet
    /// could be landed anywhere along its flank.
    pub fn finish(mut self) -> Result<bool, GearError> {
        if self.state == State::Filleting {
            // Path ended inside the zone; land at the furthest point reached.
            if let Some(seg) = self.current.take() {
                let f = self.best_fraction(&seg);
                if let Some(landing) = self.landing(&seg, f) {
                    self.emit(&seg, f, &landing);
                }
            }
        }
        if let Some(p) = self.pending.take() {
            self.target.arc_to(p.x1, p.y1, p.turn);
        }
        if self.entered && !self.applied {
            return Err(GearError::Fillet(
                "no tangent fillet fits the root corner".into(),
            ));
        }
        Ok(self.applied)
    }

    fn flush_pending(&mut self) {
        if let Some(p) = self.pending.take() {
            self.target.arc_to(p.x1, p.y1, p.turn);
        }
    }

    /// Solves the fillet tangent to the entry carrier and tangent to the
    /// flank at fraction `f` along `seg`. `None` when no circle fits or its
    /// root tangency falls outside the entry arc.
    fn landing(&self, seg: &Seg, f: Real) -> Option<Landing> {
        let (land_seg, carrier) = self.land.as_ref()?;
        let (qx, qy) = seg.point_at(f);
        let d1 = seg.dir_at(f);
        let s = self.zone_sign;
        // Normal at the flank tangency, pointing toward the fillet center.
        let (nx, ny) = (-s * d1.sin(), s * d1.cos());

        match *carrier {
            LandCarrier::Circle { cx, cy, r } => {
                let (vx, vy) = (qx - cx, qy - cy);
                for sigma in [s, -s] {
                    let denom = 2.0 * (sigma * r + vx * nx + vy * ny);
                    if denom.abs() < 1e-12 {
                        continue;
                    }
                    let radius = (r * r - (vx * vx + vy * vy)) / denom;
                    if radius < -1e-12 {
                        continue;
                    }
                    let radius = radius.max(0.0);
                    let (fx, fy) = (qx + radius * nx, qy + radius * ny);
                    let (wx, wy) = (fx - cx, fy - cy);
                    let wl = wx.hypot(wy);
                    if wl < 1e-12 {
                        continue;
                    }
                    let (tx, ty) = (cx + r * wx / wl, cy + r * wy / wl);
                    // Fraction of the entry arc kept, by sweep about its
                    // center.
                    let a0 = (land_seg.y0 - cy).atan2(land_seg.x0 - cx);
                    let at = (ty - cy).atan2(tx - cx);
                    let frac = wrap_angle(at - a0) / land_seg.turn;
                    if !(-1e-9..=1.0 + 1e-9).contains(&frac) {
                        continue;
                    }
                    let land_turn = land_seg.turn * frac.clamp(0.0, 1.0);
                    let dir_t = at + land_seg.turn.signum() * FRAC_PI_2;
                    let fillet_turn = wrap_angle(d1 - dir_t);
                    if fillet_turn * s < -1e-9 {
                        continue;
                    }
                    return Some(Landing {
                        tx,
                        ty,
                        land_turn,
                        qx,
                        qy,
                        fillet_turn,
                        radius,
                    });
                }
                None
            }
            LandCarrier::Line { ux, uy, len } => {
                let (px, py) = (land_seg.x0, land_seg.y0);
                let rel_cross = (qx - px) * uy - (qy - py) * ux;
                let n_cross = nx * uy - ny * ux;
                for sigma in [1.0, -1.0] {
                    let denom = sigma - n_cross;
                    if denom.abs() < 1e-12 {
                        continue;
                    }
                    let radius = rel_cross / denom;
                    if radius < -1e-12 {
                        continue;
                    }
                    let radius = radius.max(0.0);
                    let (fx, fy) = (qx + radius * nx, qy + radius * ny);
                    let along = (fx - px) * ux + (fy - py) * uy;
                    if !(-1e-9..=len * (1.0 + 1e-9)).contains(&along) {
                        continue;
                    }
                    let (tx, ty) = (px + along * ux, py + along * uy);
                    let dir_t = uy.atan2(ux);
                    let fillet_turn = wrap_angle(d1 - dir_t);
                    if fillet_turn * s < -1e-9 {
                        continue;
                    }
                    return Some(Landing {
                        tx,
                        ty,
                        land_turn: 0.0,
                        qx,
                        qy,
                        fillet_turn,
                        radius,
                    });
                }
                None
            }
        }
    }

    /// Largest fraction of `seg` that still admits a tangent fillet.
    fn best_fraction(&self, seg: &Seg) -> Real {
        if self.landing(seg, 1.0).is_some() {
            return 1.0;
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        let step = seg.chord_len().max(1e-12);
        let mut iters = 0;
        while (hi - lo) * step > self.tolerance * 1e-3 && iters < 64 {
            let mid = 0.5 * (lo + hi);
            if self.landing(seg, mid).is_some() {
                lo = mid;
            } else {
                hi = mid;
            }
            iters += 1;
        }
        lo
    }

    /// Discards the tentative zone ops and writes the shortened entry arc,
    /// the fillet, and the rest of the flank arc past the landing.
    fn emit(&mut self, seg: &Seg, f: Real, landing: &Landing) {
        self.target.rollback();
        self.target.arc_to(landing.tx, landing.ty, landing.land_turn);
        self.target.arc_to(landing.qx, landing.qy, landing.fillet_turn);
        if f < 1.0 {
            self.target.arc_to(seg.x1, seg.y1, (1.0 - f) * seg.turn);
        }
        self.target.commit();
        debug!(
            radius = landing.radius,
            turn = landing.fillet_turn,
            "fillet landed"
        );
        self.current = None;
        self.applied = true;
        self.state = State::Done;
    }

    fn filleting_arc(&mut self, seg: Seg) {
        let exit = wrap_angle(seg.end_dir() - self.anchor_dir).abs() <= EXIT_WINDOW;
        if !exit && self.landing(&seg, 1.0).is_some() {
            // Fillet still growing; keep the arc tentative.
            self.target.arc_to(seg.x1, seg.y1, seg.turn);
            self.current = Some(seg);
            return;
        }
        let f = self.best_fraction(&seg);
        match self.landing(&seg, f) {
            Some(landing) => self.emit(&seg, f, &landing),
            None => {
                self.target.arc_to(seg.x1, seg.y1, seg.turn);
                self.current = Some(seg);
            }
        }
    }

    fn enter_zone(&mut self, land: Seg, bend: Real, seg: Seg) {
        let carrier = if land.turn.abs() < 1e-9 {
            let len = land.chord_len();
            if len < 1e-12 {
                // Nothing to anchor on.
                self.flush_pending_seg(land);
                self.pending = Some(seg);
                return;
            }
            LandCarrier::Line {
                ux: (land.x1 - land.x0) / len,
                uy: (land.y1 - land.y0) / len,
                len,
            }
        } else {
            let cdf = crate::arcs::center_distance_factor(land.turn);
            let (mx, my) = (
                0.5 * (land.x0 + land.x1),
                0.5 * (land.y0 + land.y1),
            );
            let (dx, dy) = (land.x1 - land.x0, land.y1 - land.y0);
            let (cx, cy) = (mx - dy * cdf, my + dx * cdf);
            let r = (land.x0 - cx).hypot(land.y0 - cy);
            LandCarrier::Circle { cx, cy, r }
        };
        self.zone_sign = bend.signum();
        self.anchor_dir = land.end_dir();
        self.land = Some((land, carrier));
        self.entered = true;
        self.state = State::Filleting;
        // Everything from the entry arc on is tentative until the landing.
        self.target.commit();
        self.target.arc_to(land.x1, land.y1, land.turn);
        self.filleting_arc(seg);
    }

    fn flush_pending_seg(&mut self, p: Seg) {
        self.target.arc_to(p.x1, p.y1, p.turn);
    }
}

impl<'a, P: CheckpointPen> Pen for FilletPen<'a, P> {
    fn move_to(&mut self, x: Real, y: Real) {
        self.flush_pending();
        if self.state == State::Filleting {
            // A subpath break inside the zone abandons the landing.
            self.current = None;
            self.state = State::Done;
        }
        self.target.move_to(x, y);
        self.last = Some((x, y));
        self.last_dir = None;
    }

    fn arc_to(&mut self, x: Real, y: Real, turn: Real) {
        let Some((x0, y0)) = self.last else {
            self.target.arc_to(x, y, turn);
            return;
        };
        let seg = Seg {
            x0,
            y0,
            x1: x,
            y1: y,
            turn,
        };
        self.last = Some((x, y));
        let prev_dir = self.last_dir;
        self.last_dir = Some(seg.end_dir());

        match self.state {
            State::Done => {
                self.target.arc_to(x, y, turn);
            }
            State::Filleting => {
                self.filleting_arc(seg);
            }
            State::Unqualified => {
                let bend = prev_dir.map(|d| wrap_angle(seg.start_dir() - d));
                match (self.pending.take(), bend) {
                    (Some(land), Some(b)) if b.abs() >= ENTER_BEND => {
                        self.enter_zone(land, b, seg);
                    }
                    (held, _) => {
                        if let Some(p) = held {
                            self.flush_pending_seg(p);
                        }
                        self.pending = Some(seg);
                    }
                }
            }
        }
    }
}

/// Rounds the first sharp corner of `path` with the largest tangent arc and
/// returns the rewritten path. Paths without a qualifying corner come back
/// unchanged.
pub fn fillet_pass(path: &RecordingPen, tolerance: Real) -> Result<RecordingPen, GearError> {
    let mut out = RecordingPen::new();
    {
        let mut pen = FilletPen::new(&mut out, tolerance);
        path.replay(&mut pen);
        pen.finish()?;
    }
    Ok(out)
}
