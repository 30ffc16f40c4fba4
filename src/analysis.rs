//! Per-ray power budget reconstructed from traced paths.

use serde::{Deserialize, Serialize};
use crate::components::{ComponentKind, ComponentType};
use crate::config::AnalysisConfig;
use crate::raytracing::Ray;
use crate::setup::Setup;
use crate::units::{Millimeters, Wavelength};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub component_id: String,
    pub component_type: ComponentType,
    /// Path length from the start of the ray up to this component.
    pub cumulative_distance: Millimeters,
    pub power_before: f64,
    pub power_after: f64,
    pub loss_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayReport {
    pub ray_id: String,
    pub wavelength: Wavelength,
    pub total_path_length: Millimeters,
    pub final_power: f64,
    pub power_loss_percent: f64,
    pub interactions: Vec<InteractionRecord>,
}

/// Fraction of incoming power a component removes from a ray passing it.
///
/// Beamsplitters are charged with what they reflect away regardless of which
/// output the ray took.
pub fn loss_fraction(kind: &ComponentKind, config: &AnalysisConfig) -> f64 {
    match *kind {
        ComponentKind::Mirror { reflectivity, .. } => 1.0 - reflectivity,
        ComponentKind::Beamsplitter { reflectivity, .. } => 1.0 - reflectivity,
        ComponentKind::Lens { .. } => config.lens_loss,
        ComponentKind::Laser { .. } | ComponentKind::Detector { .. } => 0.0,
    }
}

/// Walk `ray`'s path and attribute losses to the components found at each point.
pub fn analyze_ray(ray: &Ray, setup: &Setup, config: &AnalysisConfig) -> RayReport {
    let mut total = Millimeters::ZERO;
    let mut power = ray.intensity;
    let mut interactions = Vec::new();

    for segment in ray.path.windows(2) {
        let (from, to) = (segment[0], segment[1]);
        total += Millimeters::from_grid(from.distance(to), setup.cell_size);

        let Some(component) = setup.component_near(to, config.match_tolerance) else {
            continue;
        };
        let loss = loss_fraction(&component.kind, config);
        let before = power;
        power *= 1.0 - loss;
        interactions.push(InteractionRecord {
            component_id: component.id.clone(),
            component_type: component.component_type(),
            cumulative_distance: total,
            power_before: before,
            power_after: power,
            loss_percent: loss * 100.0,
        });
    }

    let power_loss_percent = if ray.intensity != 0.0 {
        (1.0 - power / ray.intensity) * 100.0
    } else {
        0.0
    };

    RayReport {
        ray_id: ray.id.clone(),
        wavelength: ray.wavelength,
        total_path_length: total,
        final_power: power,
        power_loss_percent,
        interactions,
    }
}
