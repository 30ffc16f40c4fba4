//! Ray propagation and interference analysis for a 2D optical bench.
//!
//! Architecture:
//! - A `Setup` snapshot (components on a grid) is the only input
//! - `trace` turns it into branching `Ray` paths, one tree per laser, lasers in parallel
//! - `simulate` turns traced rays into power-loss reports and detector interference
//! - No state survives between calls; both stages are pure functions of their input

pub mod units;
pub mod geometry;
pub mod components;
pub mod setup;
pub mod config;
pub mod error;
pub mod intersection;
pub mod interactions;
pub mod raytracing;
pub mod analysis;
pub mod interference;
pub mod simulation;
pub mod generator;
pub mod profiler;

pub use components::{Component, ComponentKind, ComponentType, Properties};
pub use config::{AnalysisConfig, EngineConfig, TraceConfig};
pub use error::{EngineError, Result};
pub use raytracing::{trace, trace_with, Ray};
pub use setup::{GridSize, Setup};
pub use simulation::{simulate, simulate_with, trace_and_simulate, SimulationResult};
