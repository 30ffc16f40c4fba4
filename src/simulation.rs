use log::info;
use serde::{Deserialize, Serialize};
use crate::analysis::{analyze_ray, RayReport};
use crate::config::{AnalysisConfig, EngineConfig};
use crate::error::{EngineError, Result};
use crate::interference::{detector_pattern, InterferencePattern};
use crate::raytracing::trace_with;
use crate::setup::Setup;
use crate::units::Millimeters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_components: usize,
    pub total_rays: usize,
    pub average_path_length: Millimeters,
    /// Mean of the per-ray loss percentages.
    pub average_power_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub ray_trace_results: Vec<RayReport>,
    pub interference_patterns: Vec<InterferencePattern>,
    pub summary: Summary,
}

/// Analyze the rays already stored on `setup`.
pub fn simulate(setup: &Setup) -> Result<SimulationResult> {
    simulate_with(setup, &AnalysisConfig::default())
}

pub fn simulate_with(setup: &Setup, config: &AnalysisConfig) -> Result<SimulationResult> {
    if setup.rays.is_empty() {
        return Err(EngineError::NoRays);
    }

    let reports: Vec<RayReport> = setup
        .rays
        .iter()
        .map(|ray| analyze_ray(ray, setup, config))
        .collect();

    let patterns: Vec<InterferencePattern> = setup
        .detectors()
        .map(|detector| detector_pattern(detector, &setup.rays, &reports, config))
        .collect();

    let n = reports.len() as f64;
    let summary = Summary {
        total_components: setup.components.len(),
        total_rays: setup.rays.len(),
        average_path_length: Millimeters(
            reports.iter().map(|r| r.total_path_length.value()).sum::<f64>() / n,
        ),
        average_power_loss: reports.iter().map(|r| r.power_loss_percent).sum::<f64>() / n,
    };
    info!(
        "simulated {} rays over {} components: mean path {}, mean loss {:.2}%",
        summary.total_rays, summary.total_components, summary.average_path_length, summary.average_power_loss
    );

    Ok(SimulationResult {
        ray_trace_results: reports,
        interference_patterns: patterns,
        summary,
    })
}

/// Trace `setup`, store the rays on it, then simulate.
pub fn trace_and_simulate(setup: &mut Setup, config: &EngineConfig) -> Result<SimulationResult> {
    let rays = trace_with(setup, &config.trace);
    setup.rays = rays;
    simulate_with(setup, &config.analysis)
}
