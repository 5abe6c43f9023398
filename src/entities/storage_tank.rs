use serde_json::json;

use crate::constants::{
    DEFAULT_INITIAL_TANK_TEMP_C, DEFAULT_TANK_MAX_TEMP_C, DEFAULT_TANK_U_VALUE,
    DEFAULT_TANK_VOLUME_M3, TANK_ABSOLUTE_MIN_C, TANK_COOLING_RATE_PER_MS,
    TANK_IDLE_MIXING_FACTOR_CAP, TANK_IDLE_MIXING_RATE_PER_MS, TANK_MIXING_FACTOR_CAP,
    TANK_STRATIFICATION_DELTA_C, TANK_STRATIFICATION_RATE_PER_MS,
};
use crate::entity::{FlowState, SimulationConfig, ThermalEntity};
use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct StorageTankConfig {
    pub volume_m3: f64,
    /// Insulation quality, W/(m²·K).
    pub u_value: f64,
    pub max_temperature_c: f64,
    pub initial_temp_c: f64,
}

impl Default for StorageTankConfig {
    fn default() -> Self {
        StorageTankConfig {
            volume_m3: DEFAULT_TANK_VOLUME_M3,
            u_value: DEFAULT_TANK_U_VALUE,
            max_temperature_c: DEFAULT_TANK_MAX_TEMP_C,
            initial_temp_c: DEFAULT_INITIAL_TANK_TEMP_C,
        }
    }
}

/// Insulated reservoir with two lumped stratification zones.
///
/// `temperature` holds the mixed aggregate; the outlet always draws from
/// the bottom (coldest) zone, which is what feeds the pump and panel loop.
pub struct StorageTank {
    state: FlowState,
    pub volume_m3: f64,
    pub u_value: f64,
    pub max_temperature_c: f64,
    top_temperature_c: f64,
    bottom_temperature_c: f64,
    /// Thermal energy relative to ambient (J); negative below ambient.
    pub stored_energy_j: f64,
    /// Current loss to ambient (W).
    pub heat_loss_rate_w: f64,
}

impl StorageTank {
    pub fn new(config: StorageTankConfig) -> Self {
        StorageTank {
            state: FlowState::new("storage_tank", config.initial_temp_c),
            volume_m3: config.volume_m3,
            u_value: config.u_value,
            max_temperature_c: config.max_temperature_c,
            top_temperature_c: config.initial_temp_c,
            bottom_temperature_c: config.initial_temp_c,
            stored_energy_j: 0.0,
            heat_loss_rate_w: 0.0,
        }
    }

    pub fn top_temperature(&self) -> f64 {
        self.top_temperature_c
    }

    pub fn bottom_temperature(&self) -> f64 {
        self.bottom_temperature_c
    }

    pub fn stored_energy_kwh(&self) -> f64 {
        self.stored_energy_j / crate::constants::J_PER_KWH
    }

    fn clamp_zones(&mut self) {
        self.state.temperature_c = self
            .state
            .temperature_c
            .clamp(TANK_ABSOLUTE_MIN_C, self.max_temperature_c);
        self.top_temperature_c = self
            .top_temperature_c
            .clamp(TANK_ABSOLUTE_MIN_C, self.max_temperature_c);
        self.bottom_temperature_c = self
            .bottom_temperature_c
            .clamp(TANK_ABSOLUTE_MIN_C, self.max_temperature_c);
    }

    fn diagnostics(&self, config: &SimulationConfig) -> serde_json::Value {
        json!({
            "temperature": self.state.temperature_c,
            "topTemperature": self.top_temperature_c,
            "bottomTemperature": self.bottom_temperature_c,
            "inletTemperature": self.state.inlet_temperature_c,
            "outletTemperature": self.state.outlet_temperature_c,
            "flowRate": self.state.flow_rate_m3_s,
            "ambientTemp": config.ambient_temperature_c,
        })
    }
}

impl ThermalEntity for StorageTank {
    fn id(&self) -> &str {
        &self.state.id
    }

    fn temperature(&self) -> f64 {
        self.state.temperature_c
    }

    fn set_inlet_conditions(&mut self, temperature_c: f64, flow_rate_m3_s: f64) {
        self.state.set_inlet_conditions(temperature_c, flow_rate_m3_s);
    }

    /// Outlet draws from the bottom zone, not the aggregate temperature.
    fn outlet_temperature(&self) -> f64 {
        self.bottom_temperature_c
    }

    fn update(&mut self, delta_time_ms: f64, config: &SimulationConfig) -> Result<(), SimError> {
        let fluid = &config.working_fluid;
        let tank_mass_kg = self.volume_m3 * fluid.density_kg_m3;

        // Self-heal corrupted prior state before any arithmetic touches it
        if !self.state.temperature_c.is_finite() {
            self.state.temperature_c = config.ambient_temperature_c;
        }
        if !self.top_temperature_c.is_finite() {
            self.top_temperature_c = self.state.temperature_c;
        }
        if !self.bottom_temperature_c.is_finite() {
            self.bottom_temperature_c = self.state.temperature_c;
        }
        self.clamp_zones();

        if self.state.flow_rate_m3_s > 0.0 {
            // Incoming fluid mixes into the aggregate
            let mass_flow_rate = self.state.mass_flow_rate_kg_s(fluid);
            let mixing_rate = mass_flow_rate * delta_time_ms / tank_mass_kg;
            let mixing_factor = mixing_rate.min(TANK_MIXING_FACTOR_CAP);

            self.state.temperature_c = self.state.temperature_c * (1.0 - mixing_factor)
                + self.state.inlet_temperature_c * mixing_factor;

            // Pull the zones toward their stratified targets around the mix
            let target_top =
                (self.state.temperature_c + TANK_STRATIFICATION_DELTA_C).min(self.max_temperature_c);
            let target_bottom = (self.state.temperature_c - TANK_STRATIFICATION_DELTA_C)
                .max(config.ambient_temperature_c);

            let stratification_rate = (TANK_STRATIFICATION_RATE_PER_MS * delta_time_ms).min(1.0);
            self.top_temperature_c +=
                (target_top - self.top_temperature_c) * stratification_rate;
            self.bottom_temperature_c +=
                (target_bottom - self.bottom_temperature_c) * stratification_rate;
        } else {
            // No flow: zones slowly equalize toward the aggregate
            let mixing_factor =
                (TANK_IDLE_MIXING_RATE_PER_MS * delta_time_ms).min(TANK_IDLE_MIXING_FACTOR_CAP);
            self.top_temperature_c +=
                (self.state.temperature_c - self.top_temperature_c) * mixing_factor;
            self.bottom_temperature_c +=
                (self.state.temperature_c - self.bottom_temperature_c) * mixing_factor;
        }

        // Ambient loss, tiny rate for a well-insulated tank
        let cooling_factor = (TANK_COOLING_RATE_PER_MS * delta_time_ms).min(1.0);
        self.state.temperature_c +=
            (config.ambient_temperature_c - self.state.temperature_c) * cooling_factor;
        self.top_temperature_c +=
            (config.ambient_temperature_c - self.top_temperature_c) * cooling_factor;
        self.bottom_temperature_c +=
            (config.ambient_temperature_c - self.bottom_temperature_c) * cooling_factor;

        self.clamp_zones();
        self.state.outlet_temperature_c = self.bottom_temperature_c;

        self.heat_loss_rate_w = tank_mass_kg
            * fluid.specific_heat_j_per_kg_k
            * (self.state.temperature_c - config.ambient_temperature_c)
            * TANK_COOLING_RATE_PER_MS;

        self.stored_energy_j = tank_mass_kg
            * fluid.specific_heat_j_per_kg_k
            * (self.state.temperature_c - config.ambient_temperature_c);

        for (field, value) in [
            ("temperature", self.state.temperature_c),
            ("topTemperature", self.top_temperature_c),
            ("bottomTemperature", self.bottom_temperature_c),
            ("outletTemperature", self.state.outlet_temperature_c),
        ] {
            if value.is_nan() {
                return Err(SimError::integrity(
                    "StorageTank",
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
    fn hot_inflow_warms_the_aggregate() {
        let mut tank = StorageTank::new(StorageTankConfig::default());
        let config = ambient_config();

        tank.set_inlet_conditions(60.0, 0.0005);
        tank.update(1000.0, &config).unwrap();
        assert_gt!(tank.temperature(), 20.0);
        assert_gt!(tank.stored_energy_j, 0.0);
    }

    #[test]
    fn outlet_always_draws_from_the_bottom_zone() {
        let mut tank = StorageTank::new(StorageTankConfig::default());
        let config = ambient_config();

        for _ in 0..100 {
            tank.set_inlet_conditions(70.0, 0.0005);
            tank.update(1000.0, &config).unwrap();
            assert_abs_diff_eq!(tank.outlet_temperature(), tank.bottom_temperature());
        }
        // Stratification keeps the bottom cooler than the top
        assert_lt!(tank.bottom_temperature(), tank.top_temperature());
        // The aggregate stays distinct from the outlet zone
        assert_gt!(tank.temperature(), tank.bottom_temperature());
    }

    #[test]
    fn mixing_is_capped_per_tick() {
        let mut tank = StorageTank::new(StorageTankConfig::default());
        let config = ambient_config();

        // An absurdly long tick may move the aggregate at most 10% toward inlet
        tank.set_inlet_conditions(90.0, 0.0005);
        tank.update(100_000_000.0, &config).unwrap();
        assert_le!(tank.temperature(), 20.0 + (90.0 - 20.0) * TANK_MIXING_FACTOR_CAP + 1e-9);
    }

    #[test]
    fn idle_zones_equalize_toward_aggregate() {
        let mut tank = StorageTank::new(StorageTankConfig {
            initial_temp_c: 50.0,
            ..StorageTankConfig::default()
        });
        let config = ambient_config();

        // Stratify first
        for _ in 0..50 {
            tank.set_inlet_conditions(70.0, 0.0005);
            tank.update(1000.0, &config).unwrap();
        }
        let spread_flowing = tank.top_temperature() - tank.bottom_temperature();
        assert_gt!(spread_flowing, 1.0);

        tank.set_inlet_conditions(70.0, 0.0);
        for _ in 0..2_000 {
            tank.update(1000.0, &config).unwrap();
        }
        let spread_idle = tank.top_temperature() - tank.bottom_temperature();
        assert_lt!(spread_idle, 0.1);
    }

    #[test]
    fn below_ambient_tank_stores_negative_energy() {
        let mut tank = StorageTank::new(StorageTankConfig {
            initial_temp_c: 5.0,
            ..StorageTankConfig::default()
        });
        let config = ambient_config();

        tank.set_inlet_conditions(5.0, 0.0);
        tank.update(1000.0, &config).unwrap();
        assert_lt!(tank.stored_energy_j, 0.0);
    }

    #[test]
    fn corrupted_state_self_heals_to_ambient() {
        let mut tank = StorageTank::new(StorageTankConfig::default());
        let config = ambient_config();

        tank.state.temperature_c = f64::NAN;
        tank.top_temperature_c = f64::NAN;
        tank.bottom_temperature_c = f64::NAN;

        tank.set_inlet_conditions(20.0, 0.0);
        tank.update(1000.0, &config).unwrap();
        assert_abs_diff_eq!(tank.temperature(), 20.0, epsilon = 0.5);
        assert!(tank.top_temperature().is_finite());
        assert!(tank.bottom_temperature().is_finite());
    }

    #[test]
    fn zones_respect_clamp_bounds() {
        let mut tank = StorageTank::new(StorageTankConfig::default());
        let config = ambient_config();

        for _ in 0..10_000 {
            tank.set_inlet_conditions(300.0, 0.0005);
            tank.update(10_000.0, &config).unwrap();
            for value in [
                tank.temperature(),
                tank.top_temperature(),
                tank.bottom_temperature(),
            ] {
                assert_ge!(value, TANK_ABSOLUTE_MIN_C);
                assert_le!(value, tank.max_temperature_c);
            }
        }
    }
}
