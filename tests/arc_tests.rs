mod support;

use rackgen::arcs::{
    angle_from_to, arc_length_factor, bulge_factor, center_distance_factor, distance,
    interpolate_arc_turn, radius_from_distance, versine, wrap_angle,
};
use rackgen::float_types::{FRAC_PI_2, PI, Real, TAU};
use support::approx_eq;

#[test]
fn distance_and_direction_between_points() {
    assert_eq!(distance(1.0, 2.0, 1.0, 2.0), 0.0);
    assert_eq!(distance(0.0, 0.0, 3.0, 4.0), 5.0);

    assert_eq!(angle_from_to(2.0, 1.0, 5.0, 1.0), 0.0);
    assert!(approx_eq(angle_from_to(0.0, 0.0, 0.0, 1.0), FRAC_PI_2, 1e-15));
    // Straight back along -x lands on the closed end of the range.
    assert!(approx_eq(angle_from_to(1.0, 0.0, 0.0, 0.0), PI, 1e-15));
    assert!(approx_eq(angle_from_to(0.0, 0.0, 1.0, -1.0), -0.25 * PI, 1e-15));
}

#[test]
fn interpolate_hits_both_endpoints() {
    let cases: [(Real, Real, Real, Real, Real); 4] = [
        (0.0, 0.0, 1.0, 0.0, 0.7),
        (1.0, 2.0, -3.0, 0.5, -1.3),
        (0.0, 0.0, 0.0, 2.0, 3.0),
        (-1.0, -1.0, 1.0, 1.0, -0.01),
    ];
    for (x1, y1, x2, y2, turn) in cases {
        let (sx, sy) = interpolate_arc_turn(x1, y1, x2, y2, turn, 0.0);
        assert!(approx_eq(sx, x1, 1e-12));
        assert!(approx_eq(sy, y1, 1e-12));
        let (ex, ey) = interpolate_arc_turn(x1, y1, x2, y2, turn, turn);
        assert!(approx_eq(ex, x2, 1e-10));
        assert!(approx_eq(ey, y2, 1e-10));
    }
}

#[test]
fn interpolate_semicircle_midpoint() {
    // Unit semicircle from (1,0) to (-1,0), counterclockwise: the halfway
    // point by turn is (0,1).
    let (x, y) = interpolate_arc_turn(1.0, 0.0, -1.0, 0.0, PI, 0.5 * PI);
    assert!(approx_eq(x, 0.0, 1e-12));
    assert!(approx_eq(y, 1.0, 1e-12));
}

#[test]
fn interpolate_straight_fallback() {
    let (x, y) = interpolate_arc_turn(0.0, 0.0, 4.0, 0.0, 0.0, 0.0);
    assert_eq!((x, y), (0.0, 0.0));
}

#[test]
fn bulge_factor_zero_at_zero_turn() {
    assert_eq!(bulge_factor(0.0), 0.0);
    // Semicircle: sagitta is half the chord.
    assert!(approx_eq(bulge_factor(PI), 0.5, 1e-12));
}

#[test]
fn center_distance_factor_signs() {
    // Quarter turn: the center sits half a chord off the midpoint.
    assert!(approx_eq(center_distance_factor(0.5 * PI), 0.5, 1e-12));
    assert!(approx_eq(center_distance_factor(-0.5 * PI), -0.5, 1e-12));
    // Semicircle: center on the chord.
    assert!(approx_eq(center_distance_factor(PI), 0.0, 1e-12));
}

#[test]
fn radius_from_chord() {
    // Unit-radius semicircle has chord 2.
    assert!(approx_eq(radius_from_distance(2.0, PI), 1.0, 1e-12));
    // Quarter turn on the unit circle: chord √2.
    let chord = (2.0 as Real).sqrt();
    assert!(approx_eq(radius_from_distance(chord, 0.5 * PI), 1.0, 1e-12));
}

#[test]
fn arc_length_exceeds_chord() {
    assert!(approx_eq(arc_length_factor(0.0), 1.0, 1e-12));
    // Semicircle arc is π/2 times its chord.
    assert!(approx_eq(arc_length_factor(PI), 0.5 * PI, 1e-12));
    assert!(arc_length_factor(1.0) > 1.0);
}

#[test]
fn versine_identities() {
    assert!(approx_eq(versine(0.0), 0.0, 1e-15));
    assert!(approx_eq(versine(PI), 2.0, 1e-12));
    assert!(approx_eq(versine(0.5 * PI), 1.0, 1e-12));
}

#[test]
fn wrap_angle_range() {
    assert!(approx_eq(wrap_angle(3.0 * PI), PI, 1e-12));
    assert!(approx_eq(wrap_angle(-3.0 * PI), PI, 1e-12));
    assert!(approx_eq(wrap_angle(TAU + 0.25), 0.25, 1e-12));
    for k in -5..=5 {
        let a = wrap_angle(0.3 + k as Real * TAU);
        assert!(approx_eq(a, 0.3, 1e-9));
    }
}
