//! Shared state and lifecycle for every physical component in the loop.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::fluid::FluidProperties;

/// Environment shared by every entity update.
///
/// Owned and mutated by the orchestrator between ticks; entities only ever
/// see it as a read-only value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub ambient_temperature_c: f64,
    pub daylight: bool,
    /// Minute of day, 0.0-1439.x, wraps at midnight.
    pub time_of_day_minutes: f64,
    pub working_fluid: FluidProperties,
}

/// Common flow-loop state embedded in each entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub id: String,
    /// Bulk/wall temperature of the entity itself (°C).
    pub temperature_c: f64,
    /// Fluid temperature arriving from the upstream entity (°C).
    pub inlet_temperature_c: f64,
    /// Fluid temperature leaving toward the downstream entity (°C).
    pub outlet_temperature_c: f64,
    /// Volumetric flow through the entity (m³/s, >= 0).
    pub flow_rate_m3_s: f64,
}

impl FlowState {
    pub fn new(id: &str, initial_temp_c: f64) -> Self {
        FlowState {
            id: id.to_string(),
            temperature_c: initial_temp_c,
            inlet_temperature_c: initial_temp_c,
            outlet_temperature_c: initial_temp_c,
            flow_rate_m3_s: 0.0,
        }
    }

    pub fn set_inlet_conditions(&mut self, temperature_c: f64, flow_rate_m3_s: f64) {
        self.inlet_temperature_c = temperature_c;
        self.flow_rate_m3_s = flow_rate_m3_s;
    }

    /// Mass flow rate (kg/s) for the given fluid.
    pub fn mass_flow_rate_kg_s(&self, fluid: &FluidProperties) -> f64 {
        self.flow_rate_m3_s * fluid.density_kg_m3
    }
}

/// Lifecycle shared by every component in the circulation loop.
///
/// Entities are created once at system construction and mutated every tick
/// by `update`; `set_inlet_conditions` wires them to their upstream neighbor
/// during the flow-sequence walk.
pub trait ThermalEntity {
    fn id(&self) -> &str;

    /// Bulk temperature of the entity (°C).
    fn temperature(&self) -> f64;

    fn set_inlet_conditions(&mut self, temperature_c: f64, flow_rate_m3_s: f64);

    /// Fluid temperature handed to the downstream entity (°C).
    fn outlet_temperature(&self) -> f64;

    /// Advance the entity by `delta_time_ms` of simulated time.
    ///
    /// Returns `SimError::IntegrityViolation` if a temperature field is
    /// non-finite after clamping; that state is never recoverable.
    fn update(&mut self, delta_time_ms: f64, config: &SimulationConfig) -> Result<(), SimError>;
}
