//! Two-beam interference at detectors.
//!
//! Only the first two rays that end on a detector are combined; further
//! converging rays do not contribute.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::analysis::RayReport;
use crate::components::Component;
use crate::config::AnalysisConfig;
use crate::geometry::within_box;
use crate::raytracing::Ray;
use crate::units::Millimeters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterferenceType {
    None,
    Constructive,
    Destructive,
}

impl InterferenceType {
    /// Classify by the fractional part of the interference order: within a
    /// quarter of an integer order is constructive, anything else destructive.
    pub fn from_order(order: f64) -> Self {
        let frac = order.rem_euclid(1.0);
        if frac < 0.25 || frac > 0.75 {
            InterferenceType::Constructive
        } else {
            InterferenceType::Destructive
        }
    }
}

impl fmt::Display for InterferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterferenceType::None => "none",
            InterferenceType::Constructive => "constructive",
            InterferenceType::Destructive => "destructive",
        };
        f.write_str(name)
    }
}

/// Interference at one detector. Detectors reached by fewer than two rays
/// carry no path difference or order and are reported as
/// `{"detectorId", "interferencePattern": "none", "visibility": 0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PatternRecord", into = "PatternRecord")]
pub struct InterferencePattern {
    pub detector_id: String,
    pub path_difference: Option<Millimeters>,
    pub order_of_interference: Option<f64>,
    pub visibility: f64,
    pub interference_type: InterferenceType,
}

impl InterferencePattern {
    fn none(detector_id: &str) -> Self {
        Self {
            detector_id: detector_id.to_string(),
            path_difference: None,
            order_of_interference: None,
            visibility: 0.0,
            interference_type: InterferenceType::None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FringeRecord {
    detector_id: String,
    path_difference: Millimeters,
    order_of_interference: f64,
    visibility: f64,
    interference_type: InterferenceType,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnresolvedRecord {
    detector_id: String,
    interference_pattern: InterferenceType,
    visibility: f64,
}

/// Wire shape of a pattern; the two cases use different keys.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PatternRecord {
    Fringes(FringeRecord),
    Unresolved(UnresolvedRecord),
}

impl From<InterferencePattern> for PatternRecord {
    fn from(pattern: InterferencePattern) -> Self {
        match (pattern.path_difference, pattern.order_of_interference) {
            (Some(path_difference), Some(order_of_interference)) => PatternRecord::Fringes(FringeRecord {
                detector_id: pattern.detector_id,
                path_difference,
                order_of_interference,
                visibility: pattern.visibility,
                interference_type: pattern.interference_type,
            }),
            _ => PatternRecord::Unresolved(UnresolvedRecord {
                detector_id: pattern.detector_id,
                interference_pattern: InterferenceType::None,
                visibility: pattern.visibility,
            }),
        }
    }
}

impl From<PatternRecord> for InterferencePattern {
    fn from(record: PatternRecord) -> Self {
        match record {
            PatternRecord::Fringes(r) => Self {
                detector_id: r.detector_id,
                path_difference: Some(r.path_difference),
                order_of_interference: Some(r.order_of_interference),
                visibility: r.visibility,
                interference_type: r.interference_type,
            },
            PatternRecord::Unresolved(r) => Self {
                visibility: r.visibility,
                ..Self::none(&r.detector_id)
            },
        }
    }
}

/// Fringe visibility of two beams of power `i1` and `i2`, in [0, 1].
pub fn visibility(i1: f64, i2: f64) -> f64 {
    let sum = i1 + i2;
    if sum <= 0.0 {
        return 0.0;
    }
    let v = 2.0 * (i1 * i2).sqrt() / sum;
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Interference at `detector` from the rays (paired with their reports) that end on it.
pub fn detector_pattern(
    detector: &Component,
    rays: &[Ray],
    reports: &[RayReport],
    config: &AnalysisConfig,
) -> InterferencePattern {
    let mut converging = rays.iter().zip(reports).filter(|(ray, _)| {
        ray.end()
            .map_or(false, |end| within_box(end, detector.position, config.convergence_tolerance))
    });

    let (Some((_, first)), Some((_, second))) = (converging.next(), converging.next()) else {
        return InterferencePattern::none(&detector.id);
    };

    let path_difference = first.total_path_length.abs_diff(second.total_path_length);
    let order = first.wavelength.cycles_in(path_difference);

    InterferencePattern {
        detector_id: detector.id.clone(),
        path_difference: Some(path_difference),
        order_of_interference: Some(order),
        visibility: visibility(first.final_power, second.final_power),
        interference_type: InterferenceType::from_order(order),
    }
}
