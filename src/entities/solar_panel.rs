use log::debug;
use serde_json::json;

use crate::constants::{
    DEFAULT_PANEL_AREA_M2, DEFAULT_PANEL_EFFICIENCY, DEFAULT_PANEL_THERMAL_MASS_KG,
    MAX_STAGNATION_TEMP_C, PANEL_ABSOLUTE_MIN_C, PANEL_STAGNATION_COOLING_RATE_PER_MS,
};
use crate::entity::{FlowState, SimulationConfig, ThermalEntity};
use crate::error::SimError;
use crate::temp_utils::energy_transfer_rate;

#[derive(Debug, Clone)]
pub struct SolarPanelConfig {
    /// Fraction of incident radiation converted to heat (0.0-1.0).
    pub efficiency: f64,
    pub surface_area_m2: f64,
    /// Effective panel mass for stagnation heating (kg).
    pub thermal_mass_kg: f64,
    pub max_stagnation_temp_c: f64,
}

impl Default for SolarPanelConfig {
    fn default() -> Self {
        SolarPanelConfig {
            efficiency: DEFAULT_PANEL_EFFICIENCY,
            surface_area_m2: DEFAULT_PANEL_AREA_M2,
            thermal_mass_kg: DEFAULT_PANEL_THERMAL_MASS_KG,
            max_stagnation_temp_c: MAX_STAGNATION_TEMP_C,
        }
    }
}

/// Flat-plate collector: converts captured radiation into fluid temperature
/// rise when flowing, or stagnation heating of the panel body when not.
pub struct SolarPanel {
    state: FlowState,
    pub efficiency: f64,
    pub surface_area_m2: f64,
    pub thermal_mass_kg: f64,
    max_stagnation_temp_c: f64,
    /// Total radiation arriving this tick (W/m²), pushed by the orchestrator
    /// from its heat sources before the flow walk.
    solar_radiation_w_m2: f64,
    /// Radiant power captured this tick (W).
    pub energy_captured_w: f64,
    /// Power handed to the working fluid this tick (W).
    pub energy_transferred_w: f64,
}

impl SolarPanel {
    pub fn new(config: SolarPanelConfig) -> Self {
        SolarPanel {
            state: FlowState::new("solar_panel", 25.0),
            efficiency: config.efficiency,
            surface_area_m2: config.surface_area_m2,
            thermal_mass_kg: config.thermal_mass_kg,
            max_stagnation_temp_c: config.max_stagnation_temp_c,
            solar_radiation_w_m2: 0.0,
            energy_captured_w: 0.0,
            energy_transferred_w: 0.0,
        }
    }

    /// Set the summed radiant input for the coming tick (W/m²).
    pub fn set_solar_radiation(&mut self, radiation_w_m2: f64) {
        self.solar_radiation_w_m2 = radiation_w_m2;
    }

    fn diagnostics(&self, config: &SimulationConfig) -> serde_json::Value {
        json!({
            "temperature": self.state.temperature_c,
            "inletTemperature": self.state.inlet_temperature_c,
            "outletTemperature": self.state.outlet_temperature_c,
            "flowRate": self.state.flow_rate_m3_s,
            "energyCaptured": self.energy_captured_w,
            "energyTransferred": self.energy_transferred_w,
            "ambientTemp": config.ambient_temperature_c,
        })
    }
}

impl ThermalEntity for SolarPanel {
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
        self.energy_captured_w = self.solar_radiation_w_m2 * self.efficiency * self.surface_area_m2;

        let fluid = &config.working_fluid;

        // Self-heal a corrupted prior state before using it
        if !self.state.temperature_c.is_finite() {
            self.state.temperature_c = config.ambient_temperature_c;
        }
        self.state.temperature_c = self
            .state
            .temperature_c
            .clamp(PANEL_ABSOLUTE_MIN_C, self.max_stagnation_temp_c);

        if self.state.flow_rate_m3_s > 0.0 {
            // Fluid flowing: captured energy heats the stream
            let mass_flow_rate = self.state.mass_flow_rate_kg_s(fluid);
            let temp_rise =
                self.energy_captured_w / (mass_flow_rate * fluid.specific_heat_j_per_kg_k);

            self.state.outlet_temperature_c = self.state.inlet_temperature_c + temp_rise;

            self.energy_transferred_w = energy_transfer_rate(
                mass_flow_rate,
                fluid.specific_heat_j_per_kg_k,
                self.state.outlet_temperature_c - self.state.inlet_temperature_c,
            );

            // Panel body sits between inlet and outlet
            self.state.temperature_c =
                (self.state.inlet_temperature_c + self.state.outlet_temperature_c) / 2.0;
        } else {
            // Stagnation: panel body heats from captured energy, cools toward ambient
            self.energy_transferred_w = 0.0;
            self.state.outlet_temperature_c = self.state.temperature_c;

            let heating_rate =
                self.energy_captured_w / (self.thermal_mass_kg * fluid.specific_heat_j_per_kg_k);
            let cooling_factor = (PANEL_STAGNATION_COOLING_RATE_PER_MS * delta_time_ms).min(1.0);

            self.state.temperature_c = self.state.temperature_c
                + heating_rate * delta_time_ms
                + (config.ambient_temperature_c - self.state.temperature_c) * cooling_factor;

            self.state.temperature_c = self.state.temperature_c.min(self.max_stagnation_temp_c);
            debug!(
                "solar_panel stagnating at {:.2}°C (captured {:.1} W)",
                self.state.temperature_c, self.energy_captured_w
            );
        }

        self.state.temperature_c = self
            .state
            .temperature_c
            .clamp(PANEL_ABSOLUTE_MIN_C, self.max_stagnation_temp_c);
        self.state.outlet_temperature_c = self
            .state
            .outlet_temperature_c
            .clamp(PANEL_ABSOLUTE_MIN_C, self.max_stagnation_temp_c);

        for (field, value) in [
            ("temperature", self.state.temperature_c),
            ("outletTemperature", self.state.outlet_temperature_c),
        ] {
            if value.is_nan() {
                return Err(SimError::integrity(
                    "SolarPanel",
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
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use more_asserts::{assert_ge, assert_gt, assert_le};

    fn ambient_config() -> SimulationConfig {
        SimulationConfig {
            ambient_temperature_c: 20.0,
            daylight: true,
            time_of_day_minutes: 720.0,
            working_fluid: get_fluid(FluidKind::Water),
        }
    }

    #[test]
    fn flowing_fluid_picks_up_captured_energy() {
        let mut panel = SolarPanel::new(SolarPanelConfig::default());
        let config = ambient_config();

        panel.set_solar_radiation(1000.0);
        panel.set_inlet_conditions(20.0, 0.0005);
        panel.update(1000.0, &config).unwrap();

        // 1000 W/m² * 0.7 * 2 m² = 1400 W captured
        assert_abs_diff_eq!(panel.energy_captured_w, 1400.0);
        // mdot = 0.5 kg/s; rise = 1400 / (0.5 * 4186) ≈ 0.669°C
        assert_relative_eq!(
            panel.outlet_temperature(),
            20.0 + 1400.0 / (0.5 * 4186.0),
            epsilon = 1e-9
        );
        // All captured power reaches the fluid
        assert_relative_eq!(panel.energy_transferred_w, 1400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            panel.temperature(),
            (20.0 + panel.outlet_temperature()) / 2.0
        );
    }

    #[test]
    fn transferred_energy_is_non_negative_under_flow() {
        let mut panel = SolarPanel::new(SolarPanelConfig::default());
        let config = ambient_config();

        for radiation in [0.0, 100.0, 550.0, 1000.0] {
            panel.set_solar_radiation(radiation);
            panel.set_inlet_conditions(35.0, 0.0005);
            panel.update(1000.0, &config).unwrap();
            assert_ge!(panel.energy_transferred_w, 0.0);
        }
    }

    #[test]
    fn stagnation_heats_panel_and_caps_at_limit() {
        let mut panel = SolarPanel::new(SolarPanelConfig::default());
        let config = ambient_config();

        panel.set_solar_radiation(1000.0);
        panel.set_inlet_conditions(20.0, 0.0);

        panel.update(1000.0, &config).unwrap();
        let after_one = panel.temperature();
        assert_gt!(after_one, 25.0);
        assert_abs_diff_eq!(panel.energy_transferred_w, 0.0);

        // Long stagnation pins the body at the stagnation cap
        for _ in 0..10_000 {
            panel.update(1000.0, &config).unwrap();
        }
        assert_le!(panel.temperature(), MAX_STAGNATION_TEMP_C);
        assert_gt!(panel.temperature(), after_one);
    }

    #[test]
    fn temperatures_stay_inside_clamp_range() {
        let mut panel = SolarPanel::new(SolarPanelConfig::default());
        let mut config = ambient_config();
        config.ambient_temperature_c = -40.0;

        panel.set_solar_radiation(0.0);
        panel.set_inlet_conditions(-40.0, 0.0);
        for _ in 0..5_000 {
            panel.update(10_000.0, &config).unwrap();
            assert_ge!(panel.temperature(), PANEL_ABSOLUTE_MIN_C);
            assert_le!(panel.temperature(), MAX_STAGNATION_TEMP_C);
            assert_ge!(panel.outlet_temperature(), PANEL_ABSOLUTE_MIN_C);
            assert_le!(panel.outlet_temperature(), MAX_STAGNATION_TEMP_C);
        }
    }

    #[test]
    fn degenerate_fluid_is_a_fatal_integrity_error() {
        let mut panel = SolarPanel::new(SolarPanelConfig::default());
        let mut config = ambient_config();
        // Zero-density fluid with zero captured energy: 0/0 in the rise term
        config.working_fluid.density_kg_m3 = 0.0;

        panel.set_solar_radiation(0.0);
        panel.set_inlet_conditions(20.0, 0.0005);
        let err = panel.update(1000.0, &config).unwrap_err();
        assert!(matches!(err, SimError::IntegrityViolation { .. }));
    }
}
