//! Gear pair assembly.
//!
//! Validates a [`GearPairProps`], generates one tooth per member through the
//! rack/envelope pipeline, optionally maximizes the root fillets, and wraps
//! each finished tooth in a [`Sketch`] that replicates it around the axis.
//!
//! Internal units put the circular pitch at `2π`, so the pitch radius equals
//! the tooth count and one module is 2 units; the configured size collapses
//! to a single output scale factor.

use crate::cutter::{Side, ToothCutter};
use crate::errors::GearError;
use crate::fillet::fillet_pass;
use crate::float_types::{PI, Real, TAU};
use crate::path::{LastPointPen, RecordingPen};
use crate::rack::RackProfile;
use crate::sketch::{Sketch, SketchAdapter, SketchPen};
use crate::transform::Transform;
use tracing::debug;

/// One module in internal length units.
const MODULE: Real = 2.0;

/// How the `size` field of [`GearPairProps`] is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeType {
    /// `size` is the module (pitch diameter per tooth).
    Module,
    /// `size` is the diametral pitch (teeth per unit of pitch diameter).
    DiametralPitch,
    /// `size` is the center distance of the pair.
    CenterDistance,
}

/// Full configuration of a gear pair. All `*_percent` fields are relative
/// to the gear module.
#[derive(Debug, Clone)]
pub struct GearPairProps {
    pub gear_teeth: u32,
    pub pinion_teeth: u32,
    pub size_type: SizeType,
    pub size: Real,
    /// Degrees.
    pub pressure_angle: Real,
    pub target_contact_ratio: Real,
    pub profile_shift_percent: Real,
    /// Share of the pitch given to the gear tooth; the pinion gets the rest.
    pub balance_percent: Real,
    pub clearance_mod_percent: Real,
    pub backlash_mod_percent: Real,
    pub is_internal_gear: bool,
    pub is_max_fillet: bool,
    pub face_tolerance_mod_percent: Real,
    pub fillet_tolerance_mod_percent: Real,
}

impl Default for GearPairProps {
    fn default() -> Self {
        GearPairProps {
            gear_teeth: 40,
            pinion_teeth: 12,
            size_type: SizeType::Module,
            size: 2.0,
            pressure_angle: 20.0,
            target_contact_ratio: 1.5,
            profile_shift_percent: 0.0,
            balance_percent: 50.0,
            clearance_mod_percent: 15.0,
            backlash_mod_percent: 0.0,
            is_internal_gear: false,
            is_max_fillet: false,
            face_tolerance_mod_percent: 0.05,
            fillet_tolerance_mod_percent: 0.5,
        }
    }
}

/// Result of a synthesis: one sketch per member plus reporting data.
pub struct GearPair {
    pub gear: Sketch,
    pub pinion: Sketch,
    pub gear_pitch_diameter: Real,
    pub pinion_pitch_diameter: Real,
    /// Arc segments in one gear tooth.
    pub gear_tooth_arcs: usize,
    /// Arc segments in one pinion tooth.
    pub pinion_tooth_arcs: usize,
}

/// Synthesizes both members of a gear pair.
pub fn create_gear_pair(props: &GearPairProps) -> Result<GearPair, GearError> {
    if props.gear_teeth < 4 {
        return Err(GearError::TooFewTeeth(props.gear_teeth));
    }
    if props.pinion_teeth < 4 {
        return Err(GearError::TooFewTeeth(props.pinion_teeth));
    }
    if props.is_internal_gear && props.gear_teeth <= props.pinion_teeth {
        return Err(GearError::InternalTeethOrder {
            gear: props.gear_teeth,
            pinion: props.pinion_teeth,
        });
    }
    let scale = output_scale(props)?;

    let pressure_angle = props.pressure_angle * (PI / 180.0);
    let balance = props.balance_percent / 100.0;
    let shift = props.profile_shift_percent / 100.0 * MODULE;
    let clearance = props.clearance_mod_percent / 100.0 * MODULE;
    // Half the backlash per member, half of that per flank.
    let absolute_balance = props.backlash_mod_percent / 100.0 * MODULE / 4.0;
    let face_tolerance = props.face_tolerance_mod_percent / 100.0 * MODULE;
    let fillet_tolerance = props.fillet_tolerance_mod_percent / 100.0 * MODULE;
    let fillet = props.is_max_fillet.then_some(fillet_tolerance);

    let gear_rack = RackProfile::new(
        props.target_contact_ratio,
        pressure_angle,
        shift,
        balance,
        absolute_balance,
        clearance,
        clearance,
    );
    let pinion_rack = RackProfile::new(
        props.target_contact_ratio,
        pressure_angle,
        -shift,
        1.0 - balance,
        absolute_balance,
        clearance,
        clearance,
    );

    let gear_side = if props.is_internal_gear {
        Side::Internal
    } else {
        Side::External
    };
    let gear_tooth = build_tooth(props.gear_teeth, gear_side, &gear_rack, fillet, face_tolerance)?;
    let pinion_tooth = build_tooth(
        props.pinion_teeth,
        Side::External,
        &pinion_rack,
        fillet,
        face_tolerance,
    )?;
    debug!(
        gear_arcs = gear_tooth.ops().len().saturating_sub(1),
        pinion_arcs = pinion_tooth.ops().len().saturating_sub(1),
        scale,
        "gear pair synthesized"
    );

    Ok(GearPair {
        gear_pitch_diameter: 2.0 * props.gear_teeth as Real * scale,
        pinion_pitch_diameter: 2.0 * props.pinion_teeth as Real * scale,
        gear_tooth_arcs: gear_tooth.ops().len().saturating_sub(1),
        pinion_tooth_arcs: pinion_tooth.ops().len().saturating_sub(1),
        gear: make_sketch(gear_tooth, props.gear_teeth, scale),
        pinion: make_sketch(pinion_tooth, props.pinion_teeth, scale),
    })
}

fn output_scale(props: &GearPairProps) -> Result<Real, GearError> {
    let size = props.size;
    if !size.is_finite() || size <= 0.0 {
        return Err(GearError::InvalidSize(size));
    }
    Ok(match props.size_type {
        SizeType::Module => size / TAU,
        SizeType::DiametralPitch => 1.0 / (TAU * size),
        SizeType::CenterDistance => {
            let teeth = if props.is_internal_gear {
                props.gear_teeth - props.pinion_teeth
            } else {
                props.gear_teeth + props.pinion_teeth
            };
            size / teeth as Real
        }
    })
}

/// Generates one full tooth (one pitch wide, space center to space center)
/// for a member, with fillets applied when requested.
fn build_tooth(
    teeth: u32,
    side: Side,
    rack: &RackProfile,
    fillet: Option<Real>,
    face_tolerance: Real,
) -> Result<RecordingPen, GearError> {
    let mut rack_rec = RecordingPen::new();
    let tip_extent = match side {
        Side::External => {
            rack.draw(&mut rack_rec);
            rack.shift() + rack.addendum()
        }
        Side::Internal => {
            // A ring is cut by the mirror image of the mating rack; its
            // blank is a bore just inside the working band.
            let t = Transform::new().scale_flip(1.0, true);
            let mut pen = t.apply(Box::new(&mut rack_rec));
            rack.draw(&mut *pen);
            -(rack.shift() + rack.addendum())
        }
    };
    let cutter = ToothCutter::new(&rack_rec, teeth, side, tip_extent, face_tolerance)?;
    let mut half = RecordingPen::new();
    cutter.draw_tooth_path(&mut half, true);
    let pitch_deg = 360.0 / teeth as Real;

    match side {
        Side::External => {
            // Mirror the half about the space-center ray, rotated one pitch,
            // to span the full tooth.
            let mut full = RecordingPen::new();
            half.replay(&mut full);
            {
                let t = Transform::new().scale_flip(1.0, true).rotate(pitch_deg);
                let mut pen = t.apply(Box::new(&mut full));
                half.replay_reversed(&mut *pen, false);
            }
            match fillet {
                None => Ok(full),
                Some(tolerance) => {
                    // Forward pass fillets the leading root corner; the
                    // trailing one is made leading by flip + reverse.
                    let first = fillet_pass(&full, tolerance)?;
                    let turned = flip_reverse(&first);
                    let second = fillet_pass(&turned, tolerance)?;
                    Ok(flip_reverse(&second))
                }
            }
        }
        Side::Internal => {
            // Reverse so the root land leads, clip to the tooth-center
            // half-plane, fillet once, and mirror the result so both root
            // corners come out symmetric.
            let beta = PI / teeth as Real;
            let mut rev = RecordingPen::new();
            {
                let t = Transform::new().clip(beta.sin(), -beta.cos(), 0.0);
                let mut pen = t.apply(Box::new(&mut rev));
                half.replay_reversed(&mut *pen, true);
            }
            let rev = match fillet {
                None => rev,
                Some(tolerance) => fillet_pass(&rev, tolerance)?,
            };
            let mut full = RecordingPen::new();
            rev.replay_reversed(&mut full, true);
            {
                let t = Transform::new().scale_flip(1.0, true).rotate(pitch_deg);
                let mut pen = t.apply(Box::new(&mut full));
                rev.replay_continue(&mut *pen);
            }
            Ok(full)
        }
    }
}

fn flip_reverse(path: &RecordingPen) -> RecordingPen {
    let mut out = RecordingPen::new();
    let t = Transform::new().scale_flip(1.0, true);
    let mut pen = t.apply(Box::new(&mut out));
    path.replay_reversed(&mut *pen, true);
    drop(pen);
    out
}

/// Wraps one tooth in a closure replicating it `teeth` times around the
/// axis. The opening point is seeded from where the last copy will end, so
/// the outline closes exactly.
fn make_sketch(tooth: RecordingPen, teeth: u32, scale: Real) -> Sketch {
    let step = 360.0 / teeth as Real;
    Box::new(move |pen: &mut dyn SketchPen| {
        let mut seed = LastPointPen::new();
        {
            let t = Transform::new()
                .rotate((teeth - 1) as Real * step)
                .scale(scale);
            let mut target = t.apply(Box::new(&mut seed));
            tooth.replay(&mut *target);
        }
        let mut adapter = SketchAdapter::new(pen);
        seed.transfer(&mut adapter);
        for i in 0..teeth {
            let t = Transform::new().rotate(i as Real * step).scale(scale);
            let mut target = t.apply(Box::new(&mut adapter));
            tooth.replay_continue(&mut *target);
        }
    })
}
