//! The idealized generating rack: a straight-sided (trapezoidal) reference
//! tooth that, rolled along a pitch circle, generates a conjugate involute
//! gear tooth.
//!
//! Geometry is expressed in units where the circular pitch is `2π` (module
//! `2`), with the pitch line on `y = 0`, y+ radially outward from the gear
//! being cut, and the rack tooth pointing down (into the gear), centered on
//! `x = 0`. The gear tooth space forms under this rack tooth, so the tooth
//! itself forms half a pitch away.

use crate::float_types::{PI, Real};
use crate::path::Pen;

/// One rack tooth as a closed four-line outline plus the derived heights the
/// assembly needs to size blank circles.
#[derive(Debug, Clone, Copy)]
pub struct RackProfile {
    /// Half tooth thickness at the pitch line.
    half_thickness: Real,
    /// Working half-depth each member engages (the addendum).
    addendum: Real,
    /// Radial offset of the working band (profile shift).
    shift: Real,
    /// Extra extent beyond the working depth on the tip side (y < 0).
    bottom_relief: Real,
    /// Extra extent beyond the working depth on the outward side (y > 0).
    top_relief: Real,
    /// Flank slope `tan(pressure_angle)`.
    flank_slope: Real,
}

impl RackProfile {
    /// Derive the rack from gearing parameters.
    ///
    /// # Parameters
    /// - `contact_ratio`: target contact ratio the working depth is sized for
    /// - `pressure_angle`: flank pressure angle in radians
    /// - `profile_shift`: radial offset of the rack datum (length units)
    /// - `balance`: fraction of the pitch given to the *generated* tooth
    /// - `absolute_balance`: symmetric flank intercept shift realizing backlash
    /// - `top_relief`, `bottom_relief`: extra extent past the working depth
    pub fn new(
        contact_ratio: Real,
        pressure_angle: Real,
        profile_shift: Real,
        balance: Real,
        absolute_balance: Real,
        top_relief: Real,
        bottom_relief: Real,
    ) -> Self {
        // Working depth from the contact-ratio target: each member contributes
        // addendum/sin(α) along the line of action, and the base pitch is
        // 2π·cos(α).
        let addendum = contact_ratio * PI * pressure_angle.sin() * pressure_angle.cos();
        // The rack tooth cuts the gear space; the generated tooth keeps
        // `balance` of the pitch, so the rack tooth gets the rest, widened by
        // the absolute-balance term.
        let half_thickness = PI * (1.0 - balance) + absolute_balance;
        Self {
            half_thickness,
            addendum,
            shift: profile_shift,
            bottom_relief,
            top_relief,
            flank_slope: pressure_angle.tan(),
        }
    }

    /// Working half-depth (each member's addendum) in rack units.
    pub fn addendum(&self) -> Real {
        self.addendum
    }

    /// Radial profile shift in rack units.
    pub fn shift(&self) -> Real {
        self.shift
    }

    /// Lowest extent of the rack tooth (cuts the gear root).
    pub fn bottom_extent(&self) -> Real {
        self.shift - self.addendum - self.bottom_relief
    }

    /// Highest extent of the rack outline.
    pub fn top_extent(&self) -> Real {
        self.shift + self.addendum + self.top_relief
    }

    /// Flank x at height `y` on the right-hand flank. The profile shift
    /// displaces the whole rack radially, flanks included.
    fn flank_x(&self, y: Real) -> Real {
        self.half_thickness + (y - self.shift) * self.flank_slope
    }

    /// Emit the closed outline: bottom land, right flank, top land, left
    /// flank, all straight (turn 0), counterclockwise.
    pub fn draw(&self, pen: &mut dyn Pen) {
        let yb = self.bottom_extent();
        let yt = self.top_extent();
        let xb = self.flank_x(yb);
        let xt = self.flank_x(yt);
        pen.move_to(-xb, yb);
        pen.arc_to(xb, yb, 0.0);
        pen.arc_to(xt, yt, 0.0);
        pen.arc_to(-xt, yt, 0.0);
        pen.arc_to(-xb, yb, 0.0);
    }
}
