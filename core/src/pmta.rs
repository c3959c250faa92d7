//! PMTA (maximum allowable working pressure) calculation.
//!
//! Covers cylindrical vessels with torispherical heads as rated in NR-13
//! inspection reports. Pressures and stresses are in kgf/cm², lengths in cm.
//! Every function here is pure; invalid or partial input degrades to a
//! placeholder result and never to an error.

use serde::{Deserialize, Serialize};

use crate::fields::FieldId;
use crate::format::{display_or_dash, to_fixed, NO_VALUE};
use crate::number::coerce;

// ============================================================================
// Constants
// ============================================================================

/// Crown radius of the torispherical head as a fraction of D.
pub const CROWN_RADIUS_FACTOR: f64 = 0.9045;

/// Knuckle radius of the torispherical head as a fraction of D.
pub const KNUCKLE_RADIUS_FACTOR: f64 = 0.1727;

/// Hydrostatic test pressure over the adopted rating.
pub const HYDROSTATIC_TEST_FACTOR: f64 = 1.5;

/// kgf/cm² -> MPa.
pub const KGF_CM2_TO_MPA: f64 = 0.0980665;

/// kgf/cm² -> psi.
pub const KGF_CM2_TO_PSI: f64 = 14.2233;

// ============================================================================
// Inputs
// ============================================================================

/// Source of raw field text, exactly as typed.
pub trait FieldSource {
    fn raw(&self, field: FieldId) -> Option<&str>;
}

impl FieldSource for std::collections::BTreeMap<FieldId, String> {
    fn raw(&self, field: FieldId) -> Option<&str> {
        self.get(&field).map(String::as_str)
    }
}

/// Engineering inputs of the calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportParameters {
    /// D, internal diameter
    pub diameter: f64,
    /// Tc, shell thickness
    pub shell_thickness: f64,
    /// Ttl, left head thickness
    pub left_head_thickness: f64,
    /// Tts, right head thickness
    pub right_head_thickness: f64,
    /// Sc, shell allowable stress
    pub shell_stress: f64,
    /// St, head allowable stress
    pub head_stress: f64,
    /// El, longitudinal joint efficiency
    pub longitudinal_efficiency: f64,
    /// Ec, circumferential joint efficiency
    pub circumferential_efficiency: f64,
    /// Adopted (declared) rating
    pub adopted_pmta: f64,
}

impl ReportParameters {
    /// Read parameters from raw field text; absent or non-numeric fields are 0.
    pub fn from_source<S: FieldSource + ?Sized>(source: &S) -> Self {
        let value = |field: FieldId| source.raw(field).map(coerce).unwrap_or(0.0);
        Self {
            diameter: value(FieldId::Diameter),
            shell_thickness: value(FieldId::ShellThickness),
            left_head_thickness: value(FieldId::LeftHeadThickness),
            right_head_thickness: value(FieldId::RightHeadThickness),
            shell_stress: value(FieldId::ShellStress),
            head_stress: value(FieldId::HeadStress),
            longitudinal_efficiency: value(FieldId::LongitudinalEfficiency),
            circumferential_efficiency: value(FieldId::CircumferentialEfficiency),
            adopted_pmta: value(FieldId::AdoptedPmta),
        }
    }
}

// ============================================================================
// Outputs
// ============================================================================

/// Failure modes that can govern the calculated rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoverningMode {
    /// P2
    CircumferentialShell,
    /// P3
    LeftHead,
    /// P4
    RightHead,
}

/// Quantities derived from a set of [`ReportParameters`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedQuantities {
    pub l: f64,
    pub r: f64,
    /// Head shape factor.
    pub m: f64,
    /// Longitudinal shell stress rating. Informational only.
    pub p1: f64,
    /// Circumferential shell stress rating.
    pub p2: f64,
    /// Left head rating.
    pub p3: f64,
    /// Right head rating.
    pub p4: f64,
    /// min(P2, P3, P4)
    pub pmta_calc: f64,
    pub pmta_calc_mpa: f64,
    pub pmta_calc_psi: f64,
    /// Hydrostatic test pressure, from the adopted rating.
    pub pth: f64,
}

impl DerivedQuantities {
    /// Which failure mode yields the calculated rating.
    pub fn governing_mode(&self) -> GoverningMode {
        if self.pmta_calc == self.p2 {
            GoverningMode::CircumferentialShell
        } else if self.pmta_calc == self.p3 {
            GoverningMode::LeftHead
        } else {
            GoverningMode::RightHead
        }
    }
}

/// Run the calculation.
///
/// Returns `None` (the empty result) when D or Tc is 0. A formula whose
/// denominator is exactly 0 yields 0 without affecting the others.
pub fn compute(params: &ReportParameters) -> Option<DerivedQuantities> {
    let ReportParameters {
        diameter: d,
        shell_thickness: tc,
        left_head_thickness: ttl,
        right_head_thickness: tts,
        shell_stress: sc,
        head_stress: st,
        longitudinal_efficiency: el,
        circumferential_efficiency: ec,
        adopted_pmta,
    } = *params;

    if d == 0.0 || tc == 0.0 {
        return None;
    }

    let l = CROWN_RADIUS_FACTOR * d;
    let r = KNUCKLE_RADIUS_FACTOR * d;
    // L/r is a constant ratio, but L and r are displayed so both are kept.
    let m = 0.25 * (3.0 + (l / r).sqrt());

    let p1 = ratio(2.0 * sc * tc * el, (d / 2.0) - 0.4 * tc);
    let p2 = ratio(sc * tc * ec, (d / 2.0) + 0.6 * tc);
    let p3 = ratio(2.0 * st * ttl * ec, m * l + 0.2 * tc);
    let p4 = ratio(2.0 * st * tts * ec, m * l + 0.2 * tc);

    let pmta_calc = p2.min(p3).min(p4);

    Some(DerivedQuantities {
        l,
        r,
        m,
        p1,
        p2,
        p3,
        p4,
        pmta_calc,
        pmta_calc_mpa: pmta_calc * KGF_CM2_TO_MPA,
        pmta_calc_psi: pmta_calc * KGF_CM2_TO_PSI,
        pth: adopted_pmta * HYDROSTATIC_TEST_FACTOR,
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Displayed form of the derived quantities.
///
/// Values that are not strictly positive show as `"-"`; M has 4 decimals,
/// everything else 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PmtaDisplay {
    pub l: String,
    pub r: String,
    pub m: String,
    pub p1: String,
    pub p2: String,
    pub p3: String,
    pub p4: String,
    pub pmta_calc: String,
    pub pmta_calc_mpa: String,
    pub pmta_calc_psi: String,
    pub pth: String,
}

impl Default for PmtaDisplay {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl PmtaDisplay {
    pub fn placeholder() -> Self {
        let dash = || NO_VALUE.to_string();
        Self {
            l: dash(),
            r: dash(),
            m: dash(),
            p1: dash(),
            p2: dash(),
            p3: dash(),
            p4: dash(),
            pmta_calc: dash(),
            pmta_calc_mpa: dash(),
            pmta_calc_psi: dash(),
            pth: dash(),
        }
    }

    pub fn from_outcome(outcome: Option<&DerivedQuantities>) -> Self {
        match outcome {
            None => Self::placeholder(),
            Some(q) => Self {
                l: display_or_dash(q.l, 2),
                r: display_or_dash(q.r, 2),
                m: display_or_dash(q.m, 4),
                p1: display_or_dash(q.p1, 2),
                p2: display_or_dash(q.p2, 2),
                p3: display_or_dash(q.p3, 2),
                p4: display_or_dash(q.p4, 2),
                pmta_calc: display_or_dash(q.pmta_calc, 2),
                pmta_calc_mpa: display_or_dash(q.pmta_calc_mpa, 2),
                pmta_calc_psi: display_or_dash(q.pmta_calc_psi, 2),
                pth: display_or_dash(q.pth, 2),
            },
        }
    }
}

/// Text of the final PMTA field, present only when a rating was adopted.
pub fn final_result_label(adopted_pmta: f64) -> Option<String> {
    (adopted_pmta > 0.0).then(|| format!("{} Kgf/cm²", to_fixed(adopted_pmta, 2)))
}
