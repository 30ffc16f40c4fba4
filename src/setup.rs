use std::collections::HashSet;
use std::path::Path;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use crate::components::Component;
use crate::error::{EngineError, Result};
use crate::raytracing::Ray;
use crate::units::Millimeters;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: f64,
    pub height: f64,
}

impl GridSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Distance an unobstructed ray travels before it is cut off.
    pub fn ray_length(&self) -> f64 {
        self.width.max(self.height)
    }

    /// Clamp a point into the visible cell range `[0, width-1] x [0, height-1]`.
    pub fn clamp(&self, point: DVec2) -> DVec2 {
        DVec2::new(
            point.x.min(self.width - 1.0).max(0.0),
            point.y.min(self.height - 1.0).max(0.0),
        )
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(40.0, 25.0)
    }
}

/// Snapshot of a bench: the input to a trace, and with `rays` filled in, to a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    pub components: Vec<Component>,
    #[serde(default)]
    pub rays: Vec<Ray>,
    #[serde(default)]
    pub grid_size: GridSize,
    #[serde(default = "default_cell_size")]
    pub cell_size: Millimeters,
}

fn default_cell_size() -> Millimeters {
    Millimeters(30.0)
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            rays: Vec::new(),
            grid_size: GridSize::default(),
            cell_size: default_cell_size(),
        }
    }
}

impl Setup {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            ..Self::default()
        }
    }

    pub fn with_grid(mut self, width: f64, height: f64) -> Self {
        self.grid_size = GridSize::new(width, height);
        self
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn lasers(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_laser())
    }

    pub fn detectors(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_detector())
    }

    /// First component (in list order) within `tolerance` of `point` on both axes.
    pub fn component_near(&self, point: DVec2, tolerance: f64) -> Option<&Component> {
        self.components
            .iter()
            .find(|c| crate::geometry::within_box(c.position, point, tolerance))
    }

    /// Structural checks for setups arriving from outside the engine.
    pub fn validate(&self) -> Result<()> {
        let grid = self.grid_size;
        if !(grid.width.is_finite() && grid.height.is_finite()) || grid.width < 1.0 || grid.height < 1.0 {
            return Err(EngineError::InvalidSetup(format!(
                "grid must be at least 1x1, got {}x{}",
                grid.width, grid.height
            )));
        }
        if !self.cell_size.value().is_finite() || self.cell_size.value() <= 0.0 {
            return Err(EngineError::InvalidSetup(format!(
                "cell size must be positive, got {}",
                self.cell_size.value()
            )));
        }

        let mut seen = HashSet::new();
        for component in &self.components {
            if component.id.is_empty() {
                return Err(EngineError::InvalidSetup("component with empty id".into()));
            }
            if !seen.insert(component.id.as_str()) {
                return Err(EngineError::InvalidComponent {
                    id: component.id.clone(),
                    reason: "duplicate id".into(),
                });
            }
            if !component.position.is_finite() || !component.rotation.is_finite() {
                return Err(EngineError::InvalidComponent {
                    id: component.id.clone(),
                    reason: "position and rotation must be finite".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{ComponentKind, ComponentType};

    #[test]
    fn test_clamp_to_grid() {
        let grid = GridSize::new(40.0, 25.0);
        assert_eq!(grid.clamp(DVec2::new(60.0, -3.0)), DVec2::new(39.0, 0.0));
        assert_eq!(grid.clamp(DVec2::new(5.5, 7.5)), DVec2::new(5.5, 7.5));
        assert_eq!(grid.ray_length(), 40.0);
    }

    #[test]
    fn test_deserialize_minimal_setup() {
        let json = r#"{
            "components": [
                {"id": "laser-1", "type": "laser", "x": 2, "y": 3, "rotation": 0, "properties": {}}
            ]
        }"#;
        let setup = Setup::from_json(json).unwrap();
        assert_eq!(setup.grid_size, GridSize::default());
        assert_eq!(setup.cell_size, Millimeters(30.0));
        assert!(setup.rays.is_empty());
        assert_eq!(setup.lasers().count(), 1);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mirror = ComponentKind::defaults(ComponentType::Mirror);
        let setup = Setup::new(vec![
            Component::new("m", mirror, 1.0, 1.0, 0.0),
            Component::new("m", mirror, 2.0, 1.0, 0.0),
        ]);
        assert!(matches!(
            setup.validate(),
            Err(EngineError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_degenerate_grid() {
        let setup = Setup::default().with_grid(0.0, 10.0);
        assert!(matches!(setup.validate(), Err(EngineError::InvalidSetup(_))));

        let mut setup = Setup::default();
        setup.cell_size = Millimeters(0.0);
        assert!(setup.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_position() {
        let lens = ComponentKind::defaults(ComponentType::Lens);
        let setup = Setup::new(vec![Component::new("l", lens, f64::NAN, 1.0, 0.0)]);
        assert!(setup.validate().is_err());
    }

    #[test]
    fn test_component_near_is_first_in_order() {
        let lens = ComponentKind::defaults(ComponentType::Lens);
        let setup = Setup::new(vec![
            Component::new("a", lens, 5.0, 5.0, 0.0),
            Component::new("b", lens, 5.2, 5.0, 0.0),
        ]);
        let found = setup.component_near(DVec2::new(5.1, 5.0), 0.5).unwrap();
        assert_eq!(found.id, "a");
        assert!(setup.component_near(DVec2::new(9.0, 9.0), 0.5).is_none());
    }
}
