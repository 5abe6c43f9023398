use serde_json::json;

use crate::constants::{
    DEFAULT_PIPE_DIAMETER_M, DEFAULT_PIPE_LENGTH_M, DEFAULT_PIPE_U_VALUE, MAX_PIPE_TEMP_C,
    PIPE_IDLE_COOLING_RATE_PER_MS,
};
use crate::entity::{FlowState, SimulationConfig, ThermalEntity};
use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeKind {
    Inlet,
    Outlet,
}

impl PipeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeKind::Inlet => "inlet_pipe",
            PipeKind::Outlet => "outlet_pipe",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThermalPipeConfig {
    pub length_m: f64,
    pub diameter_m: f64,
    /// Insulation quality, W/(m²·K).
    pub u_value: f64,
    pub kind: PipeKind,
}

impl Default for ThermalPipeConfig {
    fn default() -> Self {
        ThermalPipeConfig {
            length_m: DEFAULT_PIPE_LENGTH_M,
            diameter_m: DEFAULT_PIPE_DIAMETER_M,
            u_value: DEFAULT_PIPE_U_VALUE,
            kind: PipeKind::Inlet,
        }
    }
}

/// Connecting pipe: loses heat to ambient along the fluid's transit.
pub struct ThermalPipe {
    state: FlowState,
    pub length_m: f64,
    pub diameter_m: f64,
    pub u_value: f64,
    pub kind: PipeKind,
    /// Heat currently escaping through the pipe wall (W).
    heat_loss_w: f64,
}

impl ThermalPipe {
    pub fn new(config: ThermalPipeConfig) -> Self {
        ThermalPipe {
            state: FlowState::new(config.kind.as_str(), 20.0),
            length_m: config.length_m,
            diameter_m: config.diameter_m,
            u_value: config.u_value,
            kind: config.kind,
            heat_loss_w: 0.0,
        }
    }

    pub fn heat_loss_rate(&self) -> f64 {
        self.heat_loss_w
    }

    fn diagnostics(&self, config: &SimulationConfig) -> serde_json::Value {
        json!({
            "temperature": self.state.temperature_c,
            "inletTemperature": self.state.inlet_temperature_c,
            "outletTemperature": self.state.outlet_temperature_c,
            "flowRate": self.state.flow_rate_m3_s,
            "heatLoss": self.heat_loss_w,
            "ambientTemp": config.ambient_temperature_c,
        })
    }
}

impl ThermalEntity for ThermalPipe {
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
        let fluid = &config.working_fluid;

        if self.state.flow_rate_m3_s > 0.0 {
            let surface_area = std::f64::consts::PI * self.diameter_m * self.length_m;
            let avg_temp =
                (self.state.inlet_temperature_c + self.state.outlet_temperature_c) / 2.0;

            self.heat_loss_w =
                self.u_value * surface_area * (avg_temp - config.ambient_temperature_c);

            let mass_flow_rate = self.state.mass_flow_rate_kg_s(fluid);
            let temp_drop = self.heat_loss_w / (mass_flow_rate * fluid.specific_heat_j_per_kg_k);

            self.state.outlet_temperature_c = config
                .ambient_temperature_c
                .max(self.state.inlet_temperature_c - temp_drop);

            // Pipe wall temperature is average of inlet and outlet
            self.state.temperature_c =
                (self.state.inlet_temperature_c + self.state.outlet_temperature_c) / 2.0;
        } else {
            // No flow: pipe body relaxes toward ambient
            self.heat_loss_w = 0.0;
            let cooling_factor = (PIPE_IDLE_COOLING_RATE_PER_MS * delta_time_ms).min(1.0);

            self.state.temperature_c +=
                (config.ambient_temperature_c - self.state.temperature_c) * cooling_factor;
            self.state.outlet_temperature_c = self.state.temperature_c;
        }

        // max-then-min instead of clamp: ambient is caller-settable and may
        // legitimately sit above the pipe limit
        self.state.temperature_c = self
            .state
            .temperature_c
            .max(config.ambient_temperature_c)
            .min(MAX_PIPE_TEMP_C);
        self.state.outlet_temperature_c = self
            .state
            .outlet_temperature_c
            .max(config.ambient_temperature_c)
            .min(MAX_PIPE_TEMP_C);

        for (field, value) in [
            ("temperature", self.state.temperature_c),
            ("outletTemperature", self.state.outlet_temperature_c),
        ] {
            if value.is_nan() {
                return Err(SimError::integrity(
                    "ThermalPipe",
                    field,
                    self.diagnostics(config),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::{FluidKind, get_fluid};
    use approx::assert_abs_diff_eq;
    use more_asserts::{assert_ge, assert_gt, assert_le, assert_lt};

    fn ambient_config() -> SimulationConfig {
        SimulationConfig {
            ambient_temperature_c: 20.0,
            daylight: true,
            time_of_day_minutes: 720.0,
            working_fluid: get_fluid(FluidKind::Water),
        }
    }

    #[test]
    fn hot_flow_drops_toward_ambient_but_not_below() {
        let mut pipe = ThermalPipe::new(ThermalPipeConfig::default());
        let config = ambient_config();

        pipe.set_inlet_conditions(60.0, 0.0005);
        pipe.update(1000.0, &config).unwrap();

        assert_lt!(pipe.outlet_temperature(), 60.0);
        assert_ge!(pipe.outlet_temperature(), config.ambient_temperature_c);
        assert_gt!(pipe.heat_loss_rate(), 0.0);
        assert_abs_diff_eq!(
            pipe.temperature(),
            (60.0 + pipe.outlet_temperature()) / 2.0
        );
    }

    #[test]
    fn idle_pipe_relaxes_to_ambient() {
        let mut pipe = ThermalPipe::new(ThermalPipeConfig::default());
        let config = ambient_config();

        // Warm the pipe up with a hot stream first
        pipe.set_inlet_conditions(80.0, 0.0005);
        pipe.update(1000.0, &config).unwrap();
        let warm = pipe.temperature();
        assert_gt!(warm, config.ambient_temperature_c);

        pipe.set_inlet_conditions(80.0, 0.0);
        for _ in 0..200 {
            pipe.update(1000.0, &config).unwrap();
        }
        assert_abs_diff_eq!(pipe.temperature(), config.ambient_temperature_c, epsilon = 0.01);
        assert_abs_diff_eq!(pipe.heat_loss_rate(), 0.0);
    }

    #[test]
    fn huge_delta_time_stays_stable() {
        let mut pipe = ThermalPipe::new(ThermalPipeConfig::default());
        let config = ambient_config();

        pipe.set_inlet_conditions(150.0, 0.0);
        // 10,000x multiplier on a 1s tick: relaxation factor must cap at 1
        pipe.update(10_000_000.0, &config).unwrap();
        assert_ge!(pipe.temperature(), config.ambient_temperature_c);
        assert_le!(pipe.temperature(), MAX_PIPE_TEMP_C);
    }

    #[test]
    fn outlet_is_clamped_to_pipe_limit() {
        let mut pipe = ThermalPipe::new(ThermalPipeConfig {
            kind: PipeKind::Outlet,
            ..ThermalPipeConfig::default()
        });
        let config = ambient_config();

        pipe.set_inlet_conditions(500.0, 0.0005);
        pipe.update(1000.0, &config).unwrap();
        assert_le!(pipe.outlet_temperature(), MAX_PIPE_TEMP_C);
        assert_le!(pipe.temperature(), MAX_PIPE_TEMP_C);
        assert_eq!(pipe.id(), "outlet_pipe");
    }
}
