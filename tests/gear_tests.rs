//! End-to-end gear pair synthesis.

mod support;

use geo::Area;
use rackgen::float_types::{PI, Real};
use rackgen::sketch::{Sketch, SketchPen, sketch_to_polygon};
use rackgen::{GearError, GearPairProps, SizeType, create_gear_pair};
use support::approx_eq;

const ADDENDUM: Real = 1.514539;

/// Counts protocol calls and tracks the outline endpoints.
#[derive(Default)]
struct CountingPen {
    moves: usize,
    lines: usize,
    arcs: usize,
    circles: usize,
    first: Option<(Real, Real)>,
    last: Option<(Real, Real)>,
}

impl SketchPen for CountingPen {
    fn move_to(&mut self, x: Real, y: Real, _tag: Option<&str>) {
        self.moves += 1;
        if self.first.is_none() {
            self.first = Some((x, y));
        }
        self.last = Some((x, y));
    }

    fn line_to(&mut self, x: Real, y: Real) {
        self.lines += 1;
        self.last = Some((x, y));
    }

    fn arc_to(&mut self, x: Real, y: Real, _turn_degrees: Real) {
        self.arcs += 1;
        self.last = Some((x, y));
    }

    fn conic_to(&mut self, _x1: Real, _y1: Real, x2: Real, y2: Real, _w: Real) {
        self.last = Some((x2, y2));
    }

    fn circle(&mut self, _x: Real, _y: Real, _d: Real, _tag: Option<&str>) {
        self.circles += 1;
    }
}

#[test]
fn default_pair_reports_module_pitch_diameters() {
    let pair = create_gear_pair(&GearPairProps::default()).unwrap();
    // Module 2 with 40 and 12 teeth.
    assert!(approx_eq(pair.gear_pitch_diameter, 80.0 / PI, 1e-9));
    assert!(approx_eq(pair.pinion_pitch_diameter, 24.0 / PI, 1e-9));
    assert!(pair.gear_tooth_arcs > 0);
    assert!(pair.pinion_tooth_arcs > 0);
}

#[test]
fn diametral_pitch_and_center_distance_sizing() {
    let props = GearPairProps {
        size_type: SizeType::DiametralPitch,
        size: 4.0,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    assert!(approx_eq(pair.gear_pitch_diameter, 10.0 / PI, 1e-9));

    let props = GearPairProps {
        size_type: SizeType::CenterDistance,
        size: 26.0,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    // Half the pitch diameters sum back to the requested center distance.
    assert!(approx_eq(
        0.5 * (pair.gear_pitch_diameter + pair.pinion_pitch_diameter),
        26.0,
        1e-9
    ));

    let props = GearPairProps {
        size_type: SizeType::CenterDistance,
        size: 14.0,
        is_internal_gear: true,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    assert!(approx_eq(
        0.5 * (pair.gear_pitch_diameter - pair.pinion_pitch_diameter),
        14.0,
        1e-9
    ));
}

#[test]
fn gear_outline_is_one_closed_loop() {
    let pair = create_gear_pair(&GearPairProps::default()).unwrap();
    let mut pen = CountingPen::default();
    (pair.gear)(&mut pen);
    assert_eq!(pen.moves, 1);
    assert_eq!(pen.circles, 0);
    // At least one arc per tooth boundary segment.
    assert!(pen.arcs >= 40);
    let (fx, fy) = pen.first.unwrap();
    let (lx, ly) = pen.last.unwrap();
    assert!(approx_eq(fx, lx, 1e-9));
    assert!(approx_eq(fy, ly, 1e-9));
}

#[test]
fn gear_polygon_stays_in_the_tooth_band() {
    let pair = create_gear_pair(&GearPairProps::default()).unwrap();
    let poly = sketch_to_polygon(&pair.gear, 0.01);
    let scale = 1.0 / PI;
    let root = (40.0 - ADDENDUM - 0.3) * scale;
    let tip = (40.0 + ADDENDUM) * scale;
    for c in poly.exterior().coords() {
        let r = c.x.hypot(c.y);
        assert!(r > root - 0.05 && r < tip + 0.05);
    }
    let area = poly.unsigned_area();
    assert!(area > PI * root * root && area < PI * tip * tip);
}

#[test]
fn internal_gear_band_runs_bore_to_ring_root() {
    let props = GearPairProps {
        is_internal_gear: true,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    let poly = sketch_to_polygon(&pair.gear, 0.01);
    let scale = 1.0 / PI;
    let bore = (40.0 - ADDENDUM) * scale;
    let ring_root = (40.0 + ADDENDUM + 0.3) * scale;
    for c in poly.exterior().coords() {
        let r = c.x.hypot(c.y);
        assert!(r > bore - 0.05 && r < ring_root + 0.05);
    }
}

#[test]
fn max_fillet_still_closes_the_outline() {
    let props = GearPairProps {
        is_max_fillet: true,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    let mut pen = CountingPen::default();
    (pair.pinion)(&mut pen);
    assert_eq!(pen.moves, 1);
    let (fx, fy) = pen.first.unwrap();
    let (lx, ly) = pen.last.unwrap();
    assert!(approx_eq(fx, lx, 1e-9));
    assert!(approx_eq(fy, ly, 1e-9));
}

/// Flattens the sketch and checks that no two non-adjacent segments of the
/// exterior ring cross. Coincident seam points from the per-tooth replication
/// are merged before the sweep.
fn assert_outline_is_simple(sketch: &Sketch) {
    let poly = sketch_to_polygon(sketch, 0.001);
    let mut pts: Vec<(Real, Real)> = Vec::new();
    for c in poly.exterior().coords() {
        let far = pts
            .last()
            .is_none_or(|&(x, y)| (c.x - x).hypot(c.y - y) > 1e-9);
        if far {
            pts.push((c.x, c.y));
        }
    }
    if pts.len() > 1 {
        let (fx, fy) = pts[0];
        let (lx, ly) = pts[pts.len() - 1];
        if (fx - lx).hypot(fy - ly) <= 1e-9 {
            pts.pop();
        }
    }
    let n = pts.len();
    assert!(n > 3);
    let cross = |o: (Real, Real), a: (Real, Real), b: (Real, Real)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        for j in i + 2..n {
            // The closing segment is adjacent to the first one.
            if i == 0 && j == n - 1 {
                continue;
            }
            let c = pts[j];
            let d = pts[(j + 1) % n];
            let straddles = cross(c, d, a) * cross(c, d, b) < 0.0
                && cross(a, b, c) * cross(a, b, d) < 0.0;
            assert!(!straddles, "segments {i} and {j} cross");
        }
    }
}

#[test]
fn outlines_have_no_self_intersections() {
    let pair = create_gear_pair(&GearPairProps::default()).unwrap();
    assert_outline_is_simple(&pair.gear);

    let props = GearPairProps {
        is_internal_gear: true,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    assert_outline_is_simple(&pair.gear);

    let props = GearPairProps {
        is_max_fillet: true,
        ..GearPairProps::default()
    };
    let pair = create_gear_pair(&props).unwrap();
    assert_outline_is_simple(&pair.pinion);
}

#[test]
fn rejects_bad_configurations() {
    let props = GearPairProps {
        gear_teeth: 3,
        ..GearPairProps::default()
    };
    assert!(matches!(
        create_gear_pair(&props),
        Err(GearError::TooFewTeeth(3))
    ));

    let props = GearPairProps {
        pinion_teeth: 2,
        ..GearPairProps::default()
    };
    assert!(matches!(
        create_gear_pair(&props),
        Err(GearError::TooFewTeeth(2))
    ));

    let props = GearPairProps {
        is_internal_gear: true,
        gear_teeth: 12,
        pinion_teeth: 40,
        ..GearPairProps::default()
    };
    assert!(matches!(
        create_gear_pair(&props),
        Err(GearError::InternalTeethOrder { .. })
    ));

    let props = GearPairProps {
        size: 0.0,
        ..GearPairProps::default()
    };
    assert!(matches!(
        create_gear_pair(&props),
        Err(GearError::InvalidSize(_))
    ));

    let props = GearPairProps {
        size: Real::NAN,
        ..GearPairProps::default()
    };
    assert!(matches!(
        create_gear_pair(&props),
        Err(GearError::InvalidSize(_))
    ));
}
