use glam::DVec2;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::geometry::direction_from_rotation;
use crate::units::Wavelength;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Laser,
    Mirror,
    Lens,
    Beamsplitter,
    Detector,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Laser,
        ComponentType::Mirror,
        ComponentType::Lens,
        ComponentType::Beamsplitter,
        ComponentType::Detector,
    ];

    /// Wire name, as used in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Laser => "laser",
            ComponentType::Mirror => "mirror",
            ComponentType::Lens => "lens",
            ComponentType::Beamsplitter => "beamsplitter",
            ComponentType::Detector => "detector",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentType::Laser => "Laser",
            ComponentType::Mirror => "Mirror",
            ComponentType::Lens => "Lens",
            ComponentType::Beamsplitter => "Beam Splitter",
            ComponentType::Detector => "Photodetector",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComponentType::Laser => "Light source with configurable power and wavelength",
            ComponentType::Mirror => "Reflective surface",
            ComponentType::Lens => "Focusing element with adjustable focal length",
            ComponentType::Beamsplitter => "Splits a beam into reflected and transmitted parts",
            ComponentType::Detector => "Measures light intensity",
        }
    }

    /// Properties a freshly placed component starts with.
    pub fn default_properties(&self) -> Properties {
        match self {
            ComponentType::Mirror => Properties {
                reflectivity: Some(0.99),
                roc: Some(1000.0),
                ..Properties::default()
            },
            ComponentType::Lens => Properties {
                focal_length: Some(100.0),
                ..Properties::default()
            },
            ComponentType::Beamsplitter => Properties {
                reflectivity: Some(0.5),
                transmitivity: Some(0.5),
                ..Properties::default()
            },
            ComponentType::Laser => Properties {
                power: Some(1.0),
                wavelength: Some(Wavelength::HENE.as_nanometers()),
                ..Properties::default()
            },
            ComponentType::Detector => Properties {
                sensitivity: Some(1.0),
                ..Properties::default()
            },
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown component type {:?}", s))
    }
}

/// Loosely typed numeric fields as they arrive from the editor or a generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "transmissivity")]
    pub transmitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
}

impl Properties {
    /// Fill every absent field from `defaults`.
    pub fn or(self, defaults: Properties) -> Properties {
        Properties {
            power: self.power.or(defaults.power),
            wavelength: self.wavelength.or(defaults.wavelength),
            reflectivity: self.reflectivity.or(defaults.reflectivity),
            transmitivity: self.transmitivity.or(defaults.transmitivity),
            focal_length: self.focal_length.or(defaults.focal_length),
            roc: self.roc.or(defaults.roc),
            sensitivity: self.sensitivity.or(defaults.sensitivity),
        }
    }
}

/// Resolved physical parameters. Fractions are always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKind {
    Laser { power: f64, wavelength: Wavelength },
    Mirror { reflectivity: f64, roc: Option<f64> },
    Lens { focal_length: Option<f64> },
    Beamsplitter { reflectivity: f64, transmitivity: f64 },
    Detector { sensitivity: f64 },
}

impl ComponentKind {
    pub const DEFAULT_POWER: f64 = 1.0;
    pub const DEFAULT_MIRROR_REFLECTIVITY: f64 = 1.0;
    pub const DEFAULT_SPLIT: f64 = 0.5;
    pub const DEFAULT_SENSITIVITY: f64 = 1.0;

    /// Resolve raw properties, defaulting what is missing and clamping fractions.
    pub fn from_properties(component_type: ComponentType, props: &Properties) -> Self {
        match component_type {
            ComponentType::Laser => ComponentKind::Laser {
                power: props.power.unwrap_or(Self::DEFAULT_POWER),
                wavelength: props
                    .wavelength
                    .map(Wavelength::from_nanometers)
                    .unwrap_or_default(),
            },
            ComponentType::Mirror => ComponentKind::Mirror {
                reflectivity: fraction(
                    "reflectivity",
                    props.reflectivity.unwrap_or(Self::DEFAULT_MIRROR_REFLECTIVITY),
                ),
                roc: props.roc,
            },
            ComponentType::Lens => ComponentKind::Lens {
                focal_length: props.focal_length,
            },
            ComponentType::Beamsplitter => ComponentKind::Beamsplitter {
                reflectivity: fraction(
                    "reflectivity",
                    props.reflectivity.unwrap_or(Self::DEFAULT_SPLIT),
                ),
                transmitivity: fraction(
                    "transmitivity",
                    props.transmitivity.unwrap_or(Self::DEFAULT_SPLIT),
                ),
            },
            ComponentType::Detector => ComponentKind::Detector {
                sensitivity: fraction(
                    "sensitivity",
                    props.sensitivity.unwrap_or(Self::DEFAULT_SENSITIVITY),
                ),
            },
        }
    }

    pub fn defaults(component_type: ComponentType) -> Self {
        Self::from_properties(component_type, &Properties::default())
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::Laser { .. } => ComponentType::Laser,
            ComponentKind::Mirror { .. } => ComponentType::Mirror,
            ComponentKind::Lens { .. } => ComponentType::Lens,
            ComponentKind::Beamsplitter { .. } => ComponentType::Beamsplitter,
            ComponentKind::Detector { .. } => ComponentType::Detector,
        }
    }

    pub fn to_properties(&self) -> Properties {
        match *self {
            ComponentKind::Laser { power, wavelength } => Properties {
                power: Some(power),
                wavelength: Some(wavelength.as_nanometers()),
                ..Properties::default()
            },
            ComponentKind::Mirror { reflectivity, roc } => Properties {
                reflectivity: Some(reflectivity),
                roc,
                ..Properties::default()
            },
            ComponentKind::Lens { focal_length } => Properties {
                focal_length,
                ..Properties::default()
            },
            ComponentKind::Beamsplitter { reflectivity, transmitivity } => Properties {
                reflectivity: Some(reflectivity),
                transmitivity: Some(transmitivity),
                ..Properties::default()
            },
            ComponentKind::Detector { sensitivity } => Properties {
                sensitivity: Some(sensitivity),
                ..Properties::default()
            },
        }
    }
}

fn fraction(name: &str, value: f64) -> f64 {
    if value.is_nan() {
        warn!("{} is NaN, treating as 0", name);
        return 0.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        warn!("{} {} outside [0, 1], clamped to {}", name, value, clamped);
    }
    clamped
}

/// One element placed on the bench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ComponentRecord", into = "ComponentRecord")]
pub struct Component {
    pub id: String,
    pub position: DVec2,
    /// Degrees; 0° is +x.
    pub rotation: f64,
    pub kind: ComponentKind,
    pub label: Option<String>,
}

impl Component {
    pub fn new(id: impl Into<String>, kind: ComponentKind, x: f64, y: f64, rotation: f64) -> Self {
        Self {
            id: id.into(),
            position: DVec2::new(x, y),
            rotation,
            kind,
            label: None,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    /// Surface normal for mirrors and beamsplitters, emission direction for lasers.
    pub fn normal(&self) -> DVec2 {
        direction_from_rotation(self.rotation)
    }

    pub fn is_laser(&self) -> bool {
        matches!(self.kind, ComponentKind::Laser { .. })
    }

    pub fn is_detector(&self) -> bool {
        matches!(self.kind, ComponentKind::Detector { .. })
    }
}

/// Wire shape of a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    id: String,
    #[serde(rename = "type")]
    component_type: ComponentType,
    x: f64,
    y: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl From<ComponentRecord> for Component {
    fn from(record: ComponentRecord) -> Self {
        Self {
            kind: ComponentKind::from_properties(record.component_type, &record.properties),
            id: record.id,
            position: DVec2::new(record.x, record.y),
            rotation: record.rotation,
            label: record.label,
        }
    }
}

impl From<Component> for ComponentRecord {
    fn from(component: Component) -> Self {
        Self {
            component_type: component.component_type(),
            properties: component.kind.to_properties(),
            id: component.id,
            x: component.position.x,
            y: component.position.y,
            rotation: component.rotation,
            label: component.label,
        }
    }
}
