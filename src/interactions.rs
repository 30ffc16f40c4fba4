//! What each component type does to a beam that reaches it.

use glam::DVec2;
use crate::components::{Component, ComponentKind};
use crate::config::TraceConfig;
use crate::geometry::reflect;

/// Direction and power of a beam leaving a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub direction: DVec2,
    pub intensity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// The beam carries on, possibly redirected and attenuated.
    Continue(Beam),
    /// A beamsplitter produced a reflected and a transmitted beam.
    Split { reflected: Beam, transmitted: Beam },
    /// The beam ends here.
    Absorbed,
}

/// Apply `component` to a beam arriving with `direction` and `intensity`.
pub fn resolve(component: &Component, direction: DVec2, intensity: f64, config: &TraceConfig) -> Interaction {
    match component.kind {
        ComponentKind::Mirror { reflectivity, .. } => Interaction::Continue(Beam {
            direction: reflect(direction, component.normal()),
            intensity: intensity * reflectivity,
        }),
        ComponentKind::Lens { .. } => Interaction::Continue(Beam {
            direction,
            intensity: intensity * config.lens_transmission,
        }),
        ComponentKind::Beamsplitter { reflectivity, transmitivity } => Interaction::Split {
            reflected: Beam {
                direction: reflect(direction, component.normal()),
                intensity: intensity * reflectivity,
            },
            transmitted: Beam {
                direction,
                intensity: intensity * transmitivity,
            },
        },
        ComponentKind::Detector { .. } => Interaction::Absorbed,
        // Not reachable from the tracer, which never targets sources.
        ComponentKind::Laser { .. } => Interaction::Continue(Beam { direction, intensity }),
    }
}
