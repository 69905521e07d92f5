//! Closed-form cut curves: the traces swept into the gear blank by one
//! generating element of the rack as it rolls without slipping along the
//! pitch circle.
//!
//! Rolling kinematics, in rack coordinates with the pitch line on `y = 0` and
//! the pitch point at `(R·φ, 0)` for roll parameter `φ` (the gear rotation in
//! radians): a rack point `(u, v)` maps into the gear frame as
//! `(R + v)·e_r(φ) + (u − R·φ)·e_t(φ)`. A straight rack edge contributes its
//! envelope under this family (an involute for a sloped flank, a concentric
//! circle for a land parallel to the pitch line); a rack corner contributes
//! the trochoid traced by the fixed point; the blank rim contributes the
//! circle bounding the untouched stock.

use crate::float_types::Real;
use nalgebra::{Point2, Vector2};

/// One generating element of the rolling rack.
#[derive(Debug, Clone, Copy)]
pub enum Generator {
    /// A straight rack edge: `origin + s·dir`, `0 ≤ s ≤ len`, `dir` unit.
    Edge {
        origin: Point2<Real>,
        dir: Vector2<Real>,
        len: Real,
    },
    /// A rack corner vertex, tracing a trochoid.
    Corner { point: Point2<Real> },
    /// The blank rim, a circle at radial offset `extent` from the pitch
    /// circle (negative for an internal ring's inner bore).
    Rim { extent: Real },
}

/// A closed-form relation between the roll parameter and a point of the
/// generated boundary, yielding polar angle and radius in the gear frame.
#[derive(Debug, Clone, Copy)]
pub struct CutCurve {
    pub generator: Generator,
    pub pitch_radius: Real,
}

impl CutCurve {
    /// The generated point in the gear frame at roll parameter `φ`.
    pub fn point_at(&self, phi: Real) -> Point2<Real> {
        let r = self.pitch_radius;
        let q = match self.generator {
            Generator::Edge { origin, dir, .. } => {
                // Envelope condition: the edge normal through the contact
                // point passes through the pitch point.
                let s = r * phi * dir.x - origin.coords.dot(&dir);
                origin + dir * s
            }
            Generator::Corner { point } => point,
            Generator::Rim { extent } => {
                return Point2::new((r + extent) * phi.cos(), (r + extent) * phi.sin());
            }
        };
        let (c, s) = (phi.cos(), phi.sin());
        let radial = r + q.y;
        let slide = q.x - r * phi;
        Point2::new(radial * c - slide * s, radial * s + slide * c)
    }

    /// Polar angle of the generated point at `φ`, radians.
    pub fn theta_at(&self, phi: Real) -> Real {
        let p = self.point_at(phi);
        p.y.atan2(p.x)
    }

    /// Radius of the generated point at `φ`.
    pub fn radius_at_phi(&self, phi: Real) -> Real {
        self.point_at(phi).coords.norm()
    }

    /// Roll-parameter interval over which the generator actually cuts, or
    /// `None` when it can never touch stock within radius `r_max`.
    pub fn phi_domain(&self, r_max: Real) -> Option<(Real, Real)> {
        let r = self.pitch_radius;
        match self.generator {
            Generator::Edge { origin, dir, len } => {
                if dir.x.abs() < 1e-9 {
                    // A radial edge has no rolling envelope; its corners cover it.
                    return None;
                }
                let phi_of = |s: Real| (s + origin.coords.dot(&dir)) / (r * dir.x);
                let (a, b) = (phi_of(0.0), phi_of(len));
                Some(if a <= b { (a, b) } else { (b, a) })
            }
            Generator::Corner { point } => {
                let radial = r + point.y;
                if radial >= r_max {
                    return None;
                }
                let w = (r_max * r_max - radial * radial).sqrt();
                Some(((point.x - w) / r, (point.x + w) / r))
            }
            Generator::Rim { .. } => None,
        }
    }
}
