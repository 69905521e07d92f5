//! Envelope tests: rack outlines rolled into tooth boundaries.

mod support;

use rackgen::GearError;
use rackgen::cutter::{Side, ToothCutter};
use rackgen::float_types::{PI, Real};
use rackgen::path::{Pen, RecordingPen};
use rackgen::rack::RackProfile;
use rackgen::transform::Transform;
use support::{approx_eq, points_of, record_rect};

const PRESSURE_ANGLE: Real = 20.0 * PI / 180.0;
const ADDENDUM: Real = 1.514539;

fn default_rack() -> RecordingPen {
    let rack = RackProfile::new(1.5, PRESSURE_ANGLE, 0.0, 0.5, 0.0, 0.3, 0.3);
    let mut pen = RecordingPen::new();
    rack.draw(&mut pen);
    pen
}

fn mirrored_rack() -> RecordingPen {
    let rack = RackProfile::new(1.5, PRESSURE_ANGLE, 0.0, 0.5, 0.0, 0.3, 0.3);
    let mut pen = RecordingPen::new();
    {
        let t = Transform::new().scale_flip(1.0, true);
        let mut target = t.apply(Box::new(&mut pen));
        rack.draw(&mut *target);
    }
    pen
}

fn external_cutter(teeth: u32) -> ToothCutter {
    ToothCutter::new(&default_rack(), teeth, Side::External, ADDENDUM, 0.001).unwrap()
}

#[test]
fn external_radii_hit_root_pitch_and_tip() {
    let cutter = external_cutter(40);
    // Root land sits one addendum plus clearance below the pitch circle.
    assert!(approx_eq(cutter.radius_at(0.0), 40.0 - ADDENDUM - 0.3, 1e-5));
    // Tooth center is untouched blank at the tip circle.
    assert!(approx_eq(cutter.radius_at(0.5), 40.0 + ADDENDUM, 1e-5));
    assert!(approx_eq(cutter.blank_radius(), 40.0 + ADDENDUM, 1e-5));
    // A balanced flank crosses the pitch circle a quarter pitch from the
    // space center.
    assert!(approx_eq(cutter.radius_at(0.25), 40.0, 1e-4));
}

#[test]
fn external_boundary_is_monotone_without_undercut() {
    let cutter = external_cutter(40);
    let mut prev = cutter.radius_at(0.0);
    for i in 1..=100 {
        let r = cutter.radius_at(i as Real / 200.0);
        assert!(r >= prev - 1e-6, "radius dipped at step {i}");
        prev = r;
    }
}

#[test]
fn spans_tile_the_half_pitch() {
    let cutter = external_cutter(40);
    let spans = cutter.spans();
    assert!(!spans.is_empty());
    assert_eq!(spans[0].from, 0.0);
    assert_eq!(spans[spans.len() - 1].to, 0.5);
    for pair in spans.windows(2) {
        assert!(approx_eq(pair[0].to, pair[1].from, 1e-12));
    }
}

#[test]
fn half_tooth_path_runs_from_root_to_tip() {
    let cutter = external_cutter(40);
    let mut pen = RecordingPen::new();
    let arcs = cutter.draw_tooth_path(&mut pen, true);
    assert!(arcs > 0);

    let pts = points_of(&pen);
    let root = 40.0 - ADDENDUM - 0.3;
    let tip = 40.0 + ADDENDUM;
    // Starts on the space-center ray at the root land.
    assert!(approx_eq(pts[0].0, root, 1e-5));
    assert!(approx_eq(pts[0].1, 0.0, 1e-9));
    // Ends on the tooth-center ray at the tip circle.
    let last = pts[pts.len() - 1];
    let half_pitch = PI / 40.0;
    assert!(approx_eq(last.1.atan2(last.0), half_pitch, 1e-6));
    assert!(approx_eq(last.0.hypot(last.1), tip, 1e-5));
    // Every sample stays inside the radial band of the tooth.
    for (x, y) in pts {
        let r = x.hypot(y);
        assert!(r > root - 5e-3 && r < tip + 5e-3);
    }
}

/// A small pinion still yields a usable boundary even where the trochoid
/// undercuts the flank.
#[test]
fn small_pinion_boundary_closes() {
    let cutter = external_cutter(12);
    assert!(cutter.radius_at(0.0) < 12.0);
    assert!(approx_eq(cutter.radius_at(0.5), 12.0 + ADDENDUM, 1e-5));
    let mut pen = RecordingPen::new();
    let arcs = cutter.draw_tooth_path(&mut pen, true);
    assert!(arcs > 0);
    let last = points_of(&pen).pop().unwrap();
    assert!(approx_eq(last.1.atan2(last.0), PI / 12.0, 1e-6));
}

#[test]
fn internal_radii_span_bore_to_ring_root() {
    let cutter =
        ToothCutter::new(&mirrored_rack(), 40, Side::Internal, -ADDENDUM, 0.001).unwrap();
    // The mirrored rack cuts the ring root at the half-tooth start; the
    // root sits a clearance beyond the working band.
    assert!(approx_eq(cutter.radius_at(0.0), 40.0 + ADDENDUM + 0.3, 1e-5));
    // The untouched bore blank lies at the tooth center.
    assert!(approx_eq(cutter.radius_at(0.5), 40.0 - ADDENDUM, 1e-5));
}

#[test]
fn rejects_too_few_teeth() {
    let err = ToothCutter::new(&default_rack(), 3, Side::External, ADDENDUM, 0.001).unwrap_err();
    assert!(matches!(err, GearError::TooFewTeeth(3)));
}

#[test]
fn rejects_open_rack_outline() {
    let mut pen = RecordingPen::new();
    pen.move_to(-1.0, -1.0);
    pen.arc_to(1.0, -1.0, 0.0);
    pen.arc_to(1.0, 1.0, 0.0);
    pen.arc_to(-1.0, 1.0, 0.0);
    let err = ToothCutter::new(&pen, 40, Side::External, 1.0, 0.001).unwrap_err();
    assert!(matches!(err, GearError::Envelope(_)));
}

#[test]
fn rejects_curved_rack_outline() {
    let mut pen = RecordingPen::new();
    pen.move_to(-1.0, -1.0);
    pen.arc_to(1.0, -1.0, 0.5);
    pen.arc_to(1.0, 1.0, 0.0);
    pen.arc_to(-1.0, 1.0, 0.0);
    pen.arc_to(-1.0, -1.0, 0.0);
    let err = ToothCutter::new(&pen, 40, Side::External, 1.0, 0.001).unwrap_err();
    assert!(matches!(err, GearError::Envelope(_)));
}

/// A rack that never reaches the blank produces no boundary.
#[test]
fn rejects_rack_clear_of_the_blank() {
    let rect = record_rect(-1.0, 5.0, 1.0, 6.0);
    let err = ToothCutter::new(&rect, 40, Side::External, 1.0, 0.001).unwrap_err();
    assert!(matches!(err, GearError::Envelope(_)));
}
