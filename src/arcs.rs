//! Closed-form relations between chord, turn angle, radius, bulge and arc
//! length, used throughout the tooth synthesis pipeline.
//!
//! A *turn* is the signed total direction change (radians) along a circular arc
//! from its start point to its end point; `turn == 0` describes a straight
//! line. The center/bulge factors divide by `tan(turn/2)` / `sin(turn/2)`, so
//! callers must check that `|turn|` is significant and special-case straight
//! segments themselves.

use crate::float_types::{PI, Real, TAU};

/// Euclidean distance between two points.
#[inline]
pub fn distance(x1: Real, y1: Real, x2: Real, y2: Real) -> Real {
    (x2 - x1).hypot(y2 - y1)
}

/// Direction of travel from `(x1, y1)` to `(x2, y2)`, in `(-π, π]` with
/// +x toward +y giving `+π/2`.
#[inline]
pub fn angle_from_to(x1: Real, y1: Real, x2: Real, y2: Real) -> Real {
    (y2 - y1).atan2(x2 - x1)
}

/// Normalize an angle into `(-π, π]`.
pub fn wrap_angle(a: Real) -> Real {
    let mut a = a % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Radius of the arc with the given chord length and turn.
#[inline]
pub fn radius_from_distance(chord: Real, turn: Real) -> Real {
    chord / (2.0 * (0.5 * turn).sin())
}

/// Distance from the chord midpoint to the arc center, as a fraction of the
/// chord length, to be applied perpendicular to the chord.
///
/// Undefined at `turn == 0`; the caller must treat zero-turn segments as lines.
#[inline]
pub fn center_distance_factor(turn: Real) -> Real {
    1.0 / (2.0 * (0.5 * turn).tan())
}

/// Sagitta (bulge height) of the arc as a fraction of the chord length,
/// applied perpendicular to the chord on the bulge side.
#[inline]
pub fn bulge_factor(turn: Real) -> Real {
    if turn == 0.0 {
        return 0.0;
    }
    versine(0.5 * turn) / (2.0 * (0.5 * turn).sin())
}

/// Arc length as a fraction of chord length.
#[inline]
pub fn arc_length_factor(turn: Real) -> Real {
    if turn == 0.0 {
        return 1.0;
    }
    (0.5 * turn) / (0.5 * turn).sin()
}

/// Numerically stable `1 - cos(θ)`, computed as `2·sin²(θ/2)`.
#[inline]
pub fn versine(theta: Real) -> Real {
    let s = (0.5 * theta).sin();
    2.0 * s * s
}

/// Point on the arc from `(x1, y1)` to `(x2, y2)` (total direction change
/// `turn`) at which the cumulative turn equals `target_turn`, for
/// `0 ≤ target_turn/turn ≤ 1`.
///
/// Computed by mapping the unit-circle parametrization of the arc through the
/// affine frame of the chord, which keeps the result exact at both endpoints
/// and avoids trigonometric error amplification for very small turns.
pub fn interpolate_arc_turn(
    x1: Real,
    y1: Real,
    x2: Real,
    y2: Real,
    turn: Real,
    target_turn: Real,
) -> (Real, Real) {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let half = 0.5 * turn;
    let (c, s) = if half.sin().abs() < 1e-12 {
        // Straight or nearly straight: fall back to linear interpolation.
        let f = if turn == 0.0 { 0.0 } else { target_turn / turn };
        (f, 0.0)
    } else {
        let ratio = (0.5 * target_turn).sin() / half.sin();
        let ang = 0.5 * (target_turn - turn);
        (ang.cos() * ratio, ang.sin() * ratio)
    };
    (x1 + dx * c - dy * s, y1 + dx * s + dy * c)
}
