//! Boundary to the setup-generation service.
//!
//! A language model turns a free-text description into a list of component
//! seeds. Its answer is untrusted: it may be wrapped in Markdown fences, use
//! unknown types, or place parts off the bench. Seeds are validated and
//! normalised here before they reach the tracer.

use glam::DVec2;
use log::warn;
use serde::Deserialize;
use crate::components::{Component, ComponentKind, ComponentType, Properties};
use crate::error::{EngineError, Result};
use crate::setup::{GridSize, Setup};

/// Anything that can turn a description into component seeds.
pub trait SetupGenerator {
    fn generate(&self, description: &str) -> Result<Vec<ComponentSeed>>;
}

/// A component as proposed by the generator, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComponentSeed {
    #[serde(rename = "type")]
    pub component_type: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Deserialize)]
struct GeneratedSetup {
    components: Vec<ComponentSeed>,
}

/// Parse a raw model response, tolerating a surrounding Markdown code fence.
pub fn parse_response(content: &str) -> Result<Vec<ComponentSeed>> {
    let body = strip_code_fence(content);
    let parsed: GeneratedSetup = serde_json::from_str(body)
        .map_err(|e| EngineError::Generator(format!("response is not a component list: {}", e)))?;
    Ok(parsed.components)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Turn seeds into components: reject unknown types and non-finite
/// coordinates, clamp positions onto the grid, fill in default properties and
/// assign ids of the form `<type>-<n>`.
pub fn into_components(seeds: Vec<ComponentSeed>, grid: &GridSize) -> Result<Vec<Component>> {
    let mut components = Vec::with_capacity(seeds.len());
    for (n, seed) in seeds.into_iter().enumerate() {
        let component_type: ComponentType = seed
            .component_type
            .parse()
            .map_err(|e| EngineError::Generator(format!("seed {}: {}", n, e)))?;
        if !(seed.x.is_finite() && seed.y.is_finite() && seed.rotation.is_finite()) {
            return Err(EngineError::Generator(format!(
                "seed {} ({}) has non-finite placement",
                n, component_type
            )));
        }

        let requested = DVec2::new(seed.x, seed.y);
        let position = grid.clamp(requested);
        if position != requested {
            warn!("seed {} ({}) placed off the bench, moved to {:?}", n, component_type, position);
        }
        let props = seed.properties.or(component_type.default_properties());
        let id = format!("{}-{}", component_type.as_str(), n + 1);

        components.push(Component::new(
            id,
            ComponentKind::from_properties(component_type, &props),
            position.x,
            position.y,
            seed.rotation.rem_euclid(360.0),
        ));
    }
    Ok(components)
}

/// Ask `generator` for a setup and validate the result.
pub fn generate_setup(generator: &dyn SetupGenerator, description: &str, grid: GridSize) -> Result<Setup> {
    let seeds = generator.generate(description)?;
    let components = into_components(seeds, &grid)?;
    let setup = Setup {
        components,
        grid_size: grid,
        ..Setup::default()
    };
    setup.validate()?;
    Ok(setup)
}

/// Generator backed by a response captured earlier, e.g. saved from the service.
pub struct RecordedResponse(pub String);

impl SetupGenerator for RecordedResponse {
    fn generate(&self, _description: &str) -> Result<Vec<ComponentSeed>> {
        parse_response(&self.0)
    }
}
