use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{
    DEFAULT_MAX_FLOW_RATE_M3_S, DEFAULT_PUMP_START_THRESHOLD_C, DEFAULT_PUMP_STOP_THRESHOLD_C,
    MAX_PUMP_TEMP_C, PUMP_ABSOLUTE_MIN_C, PUMP_IDLE_COOLING_RATE_PER_MS,
};
use crate::entity::{FlowState, SimulationConfig, ThermalEntity};
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpMode {
    Auto,
    Manual,
    Off,
}

impl PumpMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PumpMode::Auto => "auto",
            PumpMode::Manual => "manual",
            PumpMode::Off => "off",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(PumpMode::Auto),
            "manual" => Some(PumpMode::Manual),
            "off" => Some(PumpMode::Off),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CirculationPumpConfig {
    pub max_flow_rate_m3_s: f64,
    /// Panel-tank difference (°C) that switches the pump on in auto mode.
    pub start_threshold_c: f64,
    /// Panel-tank difference (°C) that switches it back off.
    pub stop_threshold_c: f64,
    pub mode: PumpMode,
}

impl Default for CirculationPumpConfig {
    fn default() -> Self {
        CirculationPumpConfig {
            max_flow_rate_m3_s: DEFAULT_MAX_FLOW_RATE_M3_S,
            start_threshold_c: DEFAULT_PUMP_START_THRESHOLD_C,
            stop_threshold_c: DEFAULT_PUMP_STOP_THRESHOLD_C,
            mode: PumpMode::Auto,
        }
    }
}

/// Flow actuator with an auto/manual/off control state machine.
///
/// Flow is binary: `max_flow_rate_m3_s` when running, zero otherwise.
/// The start/stop threshold gap is the hysteresis band that keeps the pump
/// from chattering near the crossover point.
pub struct CirculationPump {
    state: FlowState,
    pub max_flow_rate_m3_s: f64,
    pub mode: PumpMode,
    pub is_running: bool,
    flow_rate_m3_s: f64,
    start_threshold_c: f64,
    stop_threshold_c: f64,
    // Last control inputs, kept for the snapshot
    panel_temperature_c: f64,
    tank_temperature_c: f64,
}

impl CirculationPump {
    pub fn new(config: CirculationPumpConfig) -> Self {
        CirculationPump {
            state: FlowState::new("circulation_pump", 20.0),
            max_flow_rate_m3_s: config.max_flow_rate_m3_s,
            mode: config.mode,
            is_running: false,
            flow_rate_m3_s: 0.0,
            start_threshold_c: config.start_threshold_c,
            stop_threshold_c: config.stop_threshold_c,
            panel_temperature_c: 20.0,
            tank_temperature_c: 20.0,
        }
    }

    /// Run the control loop on the panel and tank-bottom temperatures.
    ///
    /// In auto mode this applies the hysteresis band; manual mode ignores
    /// the inputs entirely; off forces the pump idle.
    pub fn update_control(&mut self, panel_temp_c: f64, tank_temp_c: f64) {
        self.panel_temperature_c = panel_temp_c;
        self.tank_temperature_c = tank_temp_c;

        let temp_difference = panel_temp_c - tank_temp_c;

        match self.mode {
            PumpMode::Auto => {
                if !self.is_running && temp_difference > self.start_threshold_c {
                    info!("pump on: differential {:.2}°C", temp_difference);
                    self.is_running = true;
                } else if self.is_running && temp_difference < self.stop_threshold_c {
                    info!("pump off: differential {:.2}°C", temp_difference);
                    self.is_running = false;
                }
            }
            PumpMode::Manual => {}
            PumpMode::Off => {
                self.is_running = false;
            }
        }

        self.flow_rate_m3_s = if self.is_running {
            self.max_flow_rate_m3_s
        } else {
            0.0
        };
    }

    pub fn flow_rate(&self) -> f64 {
        self.flow_rate_m3_s
    }

    /// Manual override; no-op outside manual mode.
    pub fn start(&mut self) {
        if self.mode == PumpMode::Manual {
            self.is_running = true;
            self.flow_rate_m3_s = self.max_flow_rate_m3_s;
        }
    }

    /// Manual override; no-op outside manual mode.
    pub fn stop(&mut self) {
        if self.mode == PumpMode::Manual {
            self.is_running = false;
            self.flow_rate_m3_s = 0.0;
        }
    }

    pub fn set_mode(&mut self, mode: PumpMode) {
        self.mode = mode;
        if mode == PumpMode::Off {
            self.is_running = false;
            self.flow_rate_m3_s = 0.0;
        }
    }

    /// Panel minus tank differential from the last control pass.
    pub fn temperature_difference(&self) -> f64 {
        self.panel_temperature_c - self.tank_temperature_c
    }

    /// Whether auto control would call for flow right now (UI advisory).
    pub fn should_be_running(&self) -> bool {
        self.mode == PumpMode::Auto && self.temperature_difference() > self.start_threshold_c
    }

    fn diagnostics(&self, config: &SimulationConfig) -> serde_json::Value {
        json!({
            "temperature": self.state.temperature_c,
            "inletTemperature": self.state.inlet_temperature_c,
            "outletTemperature": self.state.outlet_temperature_c,
            "flowRate": self.flow_rate_m3_s,
            "mode": self.mode.as_str(),
            "isRunning": self.is_running,
            "ambientTemp": config.ambient_temperature_c,
        })
    }
}

impl ThermalEntity for CirculationPump {
    fn id(&self) -> &str {
        &self.state.id
    }

    fn temperature(&self) -> f64 {
        self.state.temperature_c
    }

    fn set_inlet_conditions(&mut self, temperature_c: f64, flow_rate_m3_s: f64) {
        self.state.set_inlet_conditions(temperature_c, flow_rate_m3_s);
    }

    fn outlet_temperature(&self) -> f64 {
        self.state.outlet_temperature_c
    }

    fn update(&mut self, delta_time_ms: f64, config: &SimulationConfig) -> Result<(), SimError> {
        if self.is_running && self.state.flow_rate_m3_s > 0.0 {
            // Near-zero thermal mass: body tracks the stream
            self.state.temperature_c = self.state.inlet_temperature_c;
        } else {
            let cooling_factor = (PUMP_IDLE_COOLING_RATE_PER_MS * delta_time_ms).min(1.0);
            self.state.temperature_c +=
                (config.ambient_temperature_c - self.state.temperature_c) * cooling_factor;
        }

        // The pump moves fluid without changing its temperature
        self.state.outlet_temperature_c = self.state.inlet_temperature_c;

        self.state.temperature_c = self
            .state
            .temperature_c
            .clamp(PUMP_ABSOLUTE_MIN_C, MAX_PUMP_TEMP_C);

        if self.state.temperature_c.is_nan() {
            return Err(SimError::integrity(
                "CirculationPump",
                "temperature",
                self.diagnostics(config),
            ));
        }

        Ok(())
    }
}
