//! Tooth form synthesis by rack envelope.
//!
//! A rack tooth outline is rolled along the pitch circle; every straight
//! segment of the outline sweeps an envelope curve (involutes from sloped
//! flanks, concentric circles from lands) and every convex corner sweeps a
//! trochoid. The tooth flank is the radial extremum of all swept curves over
//! half a tooth pitch, assembled into contiguous spans and tessellated into
//! an arc chain on demand.

mod curve;
mod tessellate;

pub use curve::{CutCurve, Generator};
pub use tessellate::{ArcPiece, tessellate_span};

use crate::errors::GearError;
use crate::float_types::{Real, TAU};
use crate::path::{PathOp, Pen, RecordingPen};
use nalgebra::Point2;
use tracing::debug;

/// Which side of the rack profile the blank material lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Material inside the pitch circle; the envelope keeps the innermost cut.
    External,
    /// Ring material outside the pitch circle; the envelope keeps the
    /// outermost cut.
    Internal,
}

/// Envelope samples per half pitch during the winner march.
const MARCH_STEPS: usize = 256;
/// Samples used when scanning a generator domain for theta extrema.
const BRANCH_SAMPLES: usize = 64;
/// Tolerance below which two polyline points are one point.
const POINT_EPS: Real = 1e-9;

/// A maximal monotone-theta piece of one swept curve, for one tooth-pitch
/// rotation of the rack.
#[derive(Debug)]
struct Branch {
    curve: CutCurve,
    /// Applied to the curve's gear-frame output, one tooth pitch per step.
    offset: Real,
    phi_lo: Real,
    phi_hi: Real,
    theta_lo: Real,
    theta_hi: Real,
}

impl Branch {
    fn covers(&self, theta: Real) -> bool {
        theta >= self.theta_lo - 1e-12 && theta <= self.theta_hi + 1e-12
    }

    /// Roll parameter whose gear-frame angle equals `theta`, by bisection
    /// over the monotone piece.
    fn phi_at(&self, theta: Real) -> Real {
        let theta = theta.clamp(self.theta_lo, self.theta_hi);
        let mut lo = self.phi_lo;
        let mut hi = self.phi_hi;
        let t_lo = self.curve.theta_at(lo) + self.offset;
        let t_hi = self.curve.theta_at(hi) + self.offset;
        let rising = t_hi >= t_lo;
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let t = self.curve.theta_at(mid) + self.offset;
            if (t < theta) == rising {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    fn radius_at(&self, theta: Real) -> Real {
        self.curve.radius_at_phi(self.phi_at(theta))
    }

    fn point_at(&self, theta: Real) -> (Real, Real) {
        let p = self.curve.point_at(self.phi_at(theta));
        let (s, c) = self.offset.sin_cos();
        (p.x * c - p.y * s, p.x * s + p.y * c)
    }
}

/// How the boundary runs over one angular span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    /// Swept curve, by branch index.
    Curve(usize),
    /// Untouched blank at the tip radius.
    Blank,
}

/// A contiguous piece of the half-tooth boundary, in tooth-pitch units.
#[derive(Debug, Clone, Copy)]
pub struct ToothSpan {
    pub from: Real,
    pub to: Real,
    kind: SpanKind,
}

/// Envelope of a rack outline rolled along a pitch circle.
///
/// The half-tooth domain runs θ ∈ [0, ½] in tooth pitches. For external
/// gears θ = 0 is the space center (root) and θ = ½ the tooth center (tip);
/// for internal gears the rack is mirrored, so θ = 0 is the ring root and
/// θ = ½ the bore blank.
#[derive(Debug)]
pub struct ToothCutter {
    pitch_radius: Real,
    pitch_angle: Real,
    side: Side,
    tip_extent: Real,
    face_tolerance: Real,
    branches: Vec<Branch>,
    spans: Vec<ToothSpan>,
}

impl ToothCutter {
    /// Builds the envelope of `rack` rolled along a pitch circle of radius
    /// `teeth`. `tip_extent` is the signed radial offset of the blank rim
    /// from the pitch circle; `face_tolerance` bounds the radial error of
    /// the emitted arc chain.
    pub fn new(
        rack: &RecordingPen,
        teeth: u32,
        side: Side,
        tip_extent: Real,
        face_tolerance: Real,
    ) -> Result<Self, GearError> {
        if teeth < 4 {
            return Err(GearError::TooFewTeeth(teeth));
        }
        let points = closed_polyline(rack)?;
        let pitch_radius = teeth as Real;
        let pitch_angle = TAU / teeth as Real;

        let y_top = points
            .iter()
            .map(|p| p.y)
            .fold(Real::NEG_INFINITY, Real::max);
        // Cuts beyond the deepest rack point are not part of the working
        // flank; this also bounds corner trochoid domains.
        let r_lim = pitch_radius + y_top;

        let mut generators = Vec::new();
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            let delta = b - a;
            let len = delta.norm();
            if len > POINT_EPS {
                generators.push(Generator::Edge { origin: a, dir: delta / len, len });
            }
            // Trochoid far fields point radially outward, which the outermost
            // cut of a ring would latch onto; corners only matter for the
            // external root.
            if side == Side::External {
                generators.push(Generator::Corner { point: a });
            }
        }

        let mut branches = Vec::new();
        for generator in &generators {
            let curve = CutCurve { generator: *generator, pitch_radius };
            let Some((phi_a, phi_b)) = curve.phi_domain(r_lim) else {
                continue;
            };
            for rotation in -1i32..=1 {
                let offset = rotation as Real * pitch_angle;
                split_monotone(&curve, offset, phi_a, phi_b, &mut branches);
            }
        }

        let mut cutter = ToothCutter {
            pitch_radius,
            pitch_angle,
            side,
            tip_extent,
            face_tolerance,
            branches,
            spans: Vec::new(),
        };
        cutter.assemble_spans()?;
        debug!(
            teeth,
            branches = cutter.branches.len(),
            spans = cutter.spans.len(),
            "tooth envelope assembled"
        );
        Ok(cutter)
    }

    /// Radius of the blank rim.
    pub fn blank_radius(&self) -> Real {
        self.pitch_radius + self.tip_extent
    }

    /// Boundary spans over half a tooth, in pitch units from the space
    /// center (0) to the tooth center (0.5).
    pub fn spans(&self) -> &[ToothSpan] {
        &self.spans
    }

    /// Boundary radius at `theta` tooth-pitch units from the space center.
    pub fn radius_at(&self, theta: Real) -> Real {
        self.winner_at(theta * self.pitch_angle).1
    }

    /// Winner identity and radius at `theta_rad`.
    fn winner_at(&self, theta_rad: Real) -> (SpanKind, Real) {
        let mut kind = SpanKind::Blank;
        let mut best = self.blank_radius();
        for (i, branch) in self.branches.iter().enumerate() {
            if !branch.covers(theta_rad) {
                continue;
            }
            let r = branch.radius_at(theta_rad);
            let wins = match self.side {
                Side::External => r < best,
                Side::Internal => r > best,
            };
            if wins {
                best = r;
                kind = SpanKind::Curve(i);
            }
        }
        (kind, best)
    }

    /// Marches the half pitch, locating winner handovers by bisection.
    fn assemble_spans(&mut self) -> Result<(), GearError> {
        let half = 0.5 * self.pitch_angle;
        let step = half / MARCH_STEPS as Real;
        let mut spans: Vec<ToothSpan> = Vec::new();
        let mut span_start = 0.0;
        let mut current = self.winner_at(0.0).0;
        for i in 1..=MARCH_STEPS {
            let theta = i as Real * step;
            let winner = self.winner_at(theta).0;
            if winner == current {
                continue;
            }
            // Winner changed inside (theta - step, theta]; shrink the
            // bracket to the handover angle.
            let mut lo = theta - step;
            let mut hi = theta;
            for _ in 0..48 {
                let mid = 0.5 * (lo + hi);
                if self.winner_at(mid).0 == current {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            let cut = 0.5 * (lo + hi) / self.pitch_angle;
            if cut > span_start + 1e-12 {
                spans.push(ToothSpan { from: span_start, to: cut, kind: current });
                span_start = cut;
            }
            current = winner;
        }
        spans.push(ToothSpan { from: span_start, to: 0.5, kind: current });
        if spans.iter().all(|s| s.kind == SpanKind::Blank) {
            return Err(GearError::Envelope(
                "rack outline never meets the blank".into(),
            ));
        }
        self.spans = spans;
        Ok(())
    }

    /// Emits the half-tooth boundary from the space center to the tooth
    /// center as an arc chain. Returns the number of arcs emitted.
    pub fn draw_tooth_path<P: Pen>(&self, pen: &mut P, do_move: bool) -> usize {
        let mut pieces: Vec<ArcPiece> = Vec::new();
        for span in &self.spans {
            let a = span.from * self.pitch_angle;
            let b = span.to * self.pitch_angle;
            match span.kind {
                SpanKind::Blank => {
                    let r = self.blank_radius();
                    let (s, c) = b.sin_cos();
                    pieces.push(ArcPiece { x: r * c, y: r * s, turn: b - a });
                }
                SpanKind::Curve(i) => {
                    let branch = &self.branches[i];
                    let eval = move |theta: Real| branch.point_at(theta);
                    tessellate_span(&eval, a, b, self.face_tolerance, &mut pieces);
                }
            }
        }
        if do_move {
            let start = match self.spans[0].kind {
                SpanKind::Blank => {
                    let r = self.blank_radius();
                    (r, 0.0)
                }
                SpanKind::Curve(i) => self.branches[i].point_at(0.0),
            };
            pen.move_to(start.0, start.1);
        }
        for piece in &pieces {
            pen.arc_to(piece.x, piece.y, piece.turn);
        }
        pieces.len()
    }
}

/// Extracts the rack outline as a closed polyline.
fn closed_polyline(rack: &RecordingPen) -> Result<Vec<Point2<Real>>, GearError> {
    let mut points: Vec<Point2<Real>> = Vec::new();
    for op in rack.ops() {
        match *op {
            PathOp::Move(x, y) => {
                if !points.is_empty() {
                    return Err(GearError::Envelope(
                        "rack outline has more than one subpath".into(),
                    ));
                }
                points.push(Point2::new(x, y));
            }
            PathOp::ArcTo(x, y, turn) => {
                if turn.abs() > 1e-9 {
                    return Err(GearError::Envelope(
                        "rack outline must be straight-sided".into(),
                    ));
                }
                points.push(Point2::new(x, y));
            }
        }
    }
    if points.len() < 4 {
        return Err(GearError::Envelope("rack outline too short".into()));
    }
    let first = points[0];
    let last = points[points.len() - 1];
    if (last - first).norm() > POINT_EPS {
        return Err(GearError::Envelope("rack outline is not closed".into()));
    }
    points.pop();
    Ok(points)
}

/// Splits `[phi_a, phi_b]` at extrema of the gear-frame angle and records
/// one branch per monotone piece.
fn split_monotone(
    curve: &CutCurve,
    offset: Real,
    phi_a: Real,
    phi_b: Real,
    out: &mut Vec<Branch>,
) {
    if phi_b - phi_a < 1e-12 {
        return;
    }
    let theta = |phi: Real| curve.theta_at(phi) + offset;
    let step = (phi_b - phi_a) / BRANCH_SAMPLES as Real;
    let mut cuts = vec![phi_a];
    let mut prev = theta(phi_a);
    let mut prev_phi = phi_a;
    let mut prev_dir = 0i8;
    for i in 1..=BRANCH_SAMPLES {
        let phi = phi_a + i as Real * step;
        let t = theta(phi);
        let dir = if t > prev {
            1
        } else if t < prev {
            -1
        } else {
            prev_dir
        };
        if prev_dir != 0 && dir != 0 && dir != prev_dir {
            // The extremum lies within the last two steps.
            let lo = (prev_phi - step).max(phi_a);
            cuts.push(refine_extremum(&theta, lo, phi, prev_dir > 0));
        }
        prev = t;
        prev_phi = phi;
        if dir != 0 {
            prev_dir = dir;
        }
    }
    cuts.push(phi_b);
    cuts.sort_by(|a, b| a.total_cmp(b));
    for pair in cuts.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi - lo < 1e-12 {
            continue;
        }
        let (t_lo, t_hi) = (theta(lo), theta(hi));
        out.push(Branch {
            curve: *curve,
            offset,
            phi_lo: lo,
            phi_hi: hi,
            theta_lo: t_lo.min(t_hi),
            theta_hi: t_lo.max(t_hi),
        });
    }
}

/// Golden-section search for the extremum of `theta` in `[lo, hi]`.
/// `maximum` selects which extremum is bracketed.
fn refine_extremum(theta: &dyn Fn(Real) -> Real, lo: Real, hi: Real, maximum: bool) -> Real {
    const INV_PHI: Real = 0.618_033_988_749_894_8;
    let mut a = lo;
    let mut b = hi;
    let mut x1 = b - INV_PHI * (b - a);
    let mut x2 = a + INV_PHI * (b - a);
    let mut f1 = theta(x1);
    let mut f2 = theta(x2);
    for _ in 0..80 {
        let keep_left = if maximum { f1 > f2 } else { f1 < f2 };
        if keep_left {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = b - INV_PHI * (b - a);
            f1 = theta(x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = a + INV_PHI * (b - a);
            f2 = theta(x2);
        }
    }
    0.5 * (a + b)
}
