// src/fluid.rs - Working fluid catalog with thermal properties

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluidKind {
    Water,
    Glycol,
}

impl FluidKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FluidKind::Water => "water",
            FluidKind::Glycol => "glycol",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "water" => Some(FluidKind::Water),
            "glycol" => Some(FluidKind::Glycol),
            _ => None,
        }
    }
}

/// Immutable thermal properties of a working fluid.
/// Runtime state (temperature, flow rate) lives on the loop entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    pub name: String,
    pub density_kg_m3: f64,
    pub specific_heat_j_per_kg_k: f64,
}

static FLUIDS: Lazy<HashMap<FluidKind, FluidProperties>> = Lazy::new(|| {
    let mut fluids = HashMap::new();

    fluids.insert(
        FluidKind::Water,
        FluidProperties {
            name: "water".to_string(),
            density_kg_m3: 1000.0,
            specific_heat_j_per_kg_k: 4186.0,
        },
    );

    fluids.insert(
        FluidKind::Glycol,
        FluidProperties {
            name: "glycol".to_string(),
            density_kg_m3: 1040.0,
            specific_heat_j_per_kg_k: 3300.0,
        },
    );

    fluids
});

/// Look up the properties for a fluid in the preset catalog.
pub fn get_fluid(kind: FluidKind) -> FluidProperties {
    FLUIDS
        .get(&kind)
        .cloned()
        .unwrap_or_else(|| FLUIDS[&FluidKind::Water].clone())
}
