//! Orchestrator for the closed-loop solar thermal system.
//!
//! Owns every component and the flow-sequence ring, advances simulated time,
//! runs the pump control loop, and publishes a flattened read-only snapshot.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::constants::{
    DAYLIGHT_END_MINUTE, DAYLIGHT_START_MINUTE, DEFAULT_AMBIENT_TEMP_C,
    DEFAULT_INITIAL_TANK_TEMP_C, DEFAULT_MAX_FLOW_RATE_M3_S, DEFAULT_PANEL_AREA_M2,
    DEFAULT_PANEL_EFFICIENCY, DEFAULT_PIPE_LENGTH_M, DEFAULT_PIPE_U_VALUE,
    DEFAULT_PUMP_START_THRESHOLD_C, DEFAULT_PUMP_STOP_THRESHOLD_C, DEFAULT_TANK_U_VALUE,
    DEFAULT_TANK_VOLUME_M3, MINUTES_PER_DAY, MS_PER_MINUTE, SOLAR_NOON_MINUTE,
};
use crate::entities::{
    CirculationPump, CirculationPumpConfig, HeatSource, HeatSourceConfig, PipeKind, PumpMode,
    SolarPanel, SolarPanelConfig, StorageTank, StorageTankConfig, ThermalPipe, ThermalPipeConfig,
};
use crate::entity::{SimulationConfig, ThermalEntity};
use crate::error::SimError;
use crate::fluid::{FluidKind, FluidProperties, get_fluid};

/// Construction-time configuration with documented defaults for every field.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub panel_area_m2: f64,
    /// Collector efficiency, 0.0-1.0.
    pub panel_efficiency: f64,
    pub tank_volume_m3: f64,
    /// Tank insulation U-value, W/(m²·K).
    pub tank_insulation: f64,
    pub pipe_length_m: f64,
    /// Pipe insulation U-value, W/(m²·K).
    pub pipe_insulation: f64,
    pub max_flow_rate_m3_s: f64,
    pub pump_start_threshold_c: f64,
    pub pump_stop_threshold_c: f64,
    pub initial_tank_temp_c: f64,
    pub ambient_temperature_c: f64,
    pub working_fluid: FluidProperties,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            panel_area_m2: DEFAULT_PANEL_AREA_M2,
            panel_efficiency: DEFAULT_PANEL_EFFICIENCY,
            tank_volume_m3: DEFAULT_TANK_VOLUME_M3,
            tank_insulation: DEFAULT_TANK_U_VALUE,
            pipe_length_m: DEFAULT_PIPE_LENGTH_M,
            pipe_insulation: DEFAULT_PIPE_U_VALUE,
            max_flow_rate_m3_s: DEFAULT_MAX_FLOW_RATE_M3_S,
            pump_start_threshold_c: DEFAULT_PUMP_START_THRESHOLD_C,
            pump_stop_threshold_c: DEFAULT_PUMP_STOP_THRESHOLD_C,
            initial_tank_temp_c: DEFAULT_INITIAL_TANK_TEMP_C,
            ambient_temperature_c: DEFAULT_AMBIENT_TEMP_C,
            working_fluid: get_fluid(FluidKind::Water),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Paused,
    Stopped,
}

/// Flattened read-only projection of the whole system, produced fresh on
/// each query. The UI contract; field names serialize in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    // Time
    pub simulation_time_ms: f64,
    pub status: RunStatus,
    pub is_paused: bool,
    pub time_of_day_minutes: f64,
    pub daylight: bool,

    // Environment
    pub solar_intensity: f64,
    pub solar_radiation: f64,
    pub ambient_temperature: f64,

    // Solar panel
    pub panel_temperature: f64,
    pub panel_outlet_temp: f64,
    pub energy_captured: f64,
    pub energy_transferred: f64,

    // Storage tank
    pub tank_temperature: f64,
    pub tank_top_temp: f64,
    pub tank_bottom_temp: f64,
    pub stored_energy: f64,
    pub tank_heat_loss: f64,

    // Circulation
    pub pump_running: bool,
    pub pump_mode: PumpMode,
    pub flow_rate: f64,
    pub temperature_difference: f64,

    // Pipes
    pub inlet_pipe_temp: f64,
    pub outlet_pipe_temp: f64,
    pub inlet_pipe_heat_loss: f64,
    pub outlet_pipe_heat_loss: f64,

    // Derived metrics
    pub system_efficiency: f64,
    pub total_heat_loss: f64,
}

/// Stations of the circulation ring, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopStation {
    InletPipe,
    Panel,
    OutletPipe,
    Tank,
    Pump,
}

/// Tank → inlet pipe → panel → outlet pipe → tank → pump → (around again).
const FLOW_SEQUENCE: [LoopStation; 5] = [
    LoopStation::InletPipe,
    LoopStation::Panel,
    LoopStation::OutletPipe,
    LoopStation::Tank,
    LoopStation::Pump,
];

pub struct SolarThermalSystem {
    heat_source: HeatSource,
    solar_panel: SolarPanel,
    storage_tank: StorageTank,
    circulation_pump: CirculationPump,
    inlet_pipe: ThermalPipe,
    outlet_pipe: ThermalPipe,

    simulation_time_ms: f64,
    is_running: bool,
    is_paused: bool,

    config: SimulationConfig,
    /// Construction-time configuration, retained so `reset` can rebuild
    /// every entity from scratch.
    system_config: SystemConfig,
}

impl SolarThermalSystem {
    pub fn new(system_config: SystemConfig) -> Self {
        let config = SimulationConfig {
            ambient_temperature_c: system_config.ambient_temperature_c,
            daylight: true,
            time_of_day_minutes: SOLAR_NOON_MINUTE,
            working_fluid: system_config.working_fluid.clone(),
        };

        let mut system = SolarThermalSystem {
            heat_source: HeatSource::new(HeatSourceConfig::default()),
            solar_panel: SolarPanel::new(SolarPanelConfig::default()),
            storage_tank: StorageTank::new(StorageTankConfig::default()),
            circulation_pump: CirculationPump::new(CirculationPumpConfig::default()),
            inlet_pipe: ThermalPipe::new(ThermalPipeConfig::default()),
            outlet_pipe: ThermalPipe::new(ThermalPipeConfig::default()),
            simulation_time_ms: 0.0,
            is_running: false,
            is_paused: false,
            config,
            system_config: system_config.clone(),
        };
        system.build_entities();
        system
    }

    /// (Re)construct every entity from the retained system config.
    fn build_entities(&mut self) {
        let cfg = &self.system_config;

        self.heat_source = HeatSource::new(HeatSourceConfig::default());

        self.solar_panel = SolarPanel::new(SolarPanelConfig {
            efficiency: cfg.panel_efficiency,
            surface_area_m2: cfg.panel_area_m2,
            ..SolarPanelConfig::default()
        });

        self.storage_tank = StorageTank::new(StorageTankConfig {
            volume_m3: cfg.tank_volume_m3,
            u_value: cfg.tank_insulation,
            initial_temp_c: cfg.initial_tank_temp_c,
            ..StorageTankConfig::default()
        });

        self.circulation_pump = CirculationPump::new(CirculationPumpConfig {
            max_flow_rate_m3_s: cfg.max_flow_rate_m3_s,
            start_threshold_c: cfg.pump_start_threshold_c,
            stop_threshold_c: cfg.pump_stop_threshold_c,
            mode: PumpMode::Auto,
        });

        self.inlet_pipe = ThermalPipe::new(ThermalPipeConfig {
            length_m: cfg.pipe_length_m,
            u_value: cfg.pipe_insulation,
            kind: PipeKind::Inlet,
            ..ThermalPipeConfig::default()
        });

        self.outlet_pipe = ThermalPipe::new(ThermalPipeConfig {
            length_m: cfg.pipe_length_m,
            u_value: cfg.pipe_insulation,
            kind: PipeKind::Outlet,
            ..ThermalPipeConfig::default()
        });
    }

    fn station(&self, station: LoopStation) -> &dyn ThermalEntity {
        match station {
            LoopStation::InletPipe => &self.inlet_pipe,
            LoopStation::Panel => &self.solar_panel,
            LoopStation::OutletPipe => &self.outlet_pipe,
            LoopStation::Tank => &self.storage_tank,
            LoopStation::Pump => &self.circulation_pump,
        }
    }

    fn station_mut(&mut self, station: LoopStation) -> &mut dyn ThermalEntity {
        match station {
            LoopStation::InletPipe => &mut self.inlet_pipe,
            LoopStation::Panel => &mut self.solar_panel,
            LoopStation::OutletPipe => &mut self.outlet_pipe,
            LoopStation::Tank => &mut self.storage_tank,
            LoopStation::Pump => &mut self.circulation_pump,
        }
    }

    fn is_daylight(&self) -> bool {
        self.config.time_of_day_minutes > DAYLIGHT_START_MINUTE
            && self.config.time_of_day_minutes < DAYLIGHT_END_MINUTE
    }

    /// Advance the simulation by `delta_time_ms` of simulated time.
    ///
    /// No-op while stopped or paused. Time-scaling is the caller's concern:
    /// the core only ever sees simulated milliseconds.
    pub fn update(&mut self, delta_time_ms: f64) -> Result<(), SimError> {
        if self.is_paused || !self.is_running {
            return Ok(());
        }
        self.simulation_time_ms += delta_time_ms;

        self.config.time_of_day_minutes =
            (self.config.time_of_day_minutes + delta_time_ms / MS_PER_MINUTE) % MINUTES_PER_DAY;
        self.config.daylight = self.is_daylight();

        let config = self.config.clone();

        // 1) Heat source sees the new time of day
        self.heat_source.update(delta_time_ms, &config)?;

        // 2) Pump control reads the pre-tick panel and tank-bottom
        //    temperatures; the control decision lags the flow by one tick
        self.circulation_pump.update_control(
            self.solar_panel.temperature(),
            self.storage_tank.bottom_temperature(),
        );
        let flow_rate = self.circulation_pump.flow_rate();

        // 3) Push radiant input into the panel for this tick
        self.solar_panel
            .set_solar_radiation(self.heat_source.solar_radiation());

        // 4) Walk the ring once; each station inherits its upstream outlet
        let len = FLOW_SEQUENCE.len();
        for i in 0..len {
            let upstream = FLOW_SEQUENCE[(i + len - 1) % len];
            let upstream_outlet = self.station(upstream).outlet_temperature();

            let station = self.station_mut(FLOW_SEQUENCE[i]);
            station.set_inlet_conditions(upstream_outlet, flow_rate);
            station.update(delta_time_ms, &config)?;
        }

        debug!(
            "tick {:.0}ms: t={:.1}min flow={:.4e} panel={:.2}°C tank={:.2}°C",
            delta_time_ms,
            self.config.time_of_day_minutes,
            flow_rate,
            self.solar_panel.temperature(),
            self.storage_tank.temperature(),
        );

        Ok(())
    }

    /// Perform exactly one update regardless of pause state.
    pub fn step(&mut self, delta_time_ms: f64) -> Result<(), SimError> {
        let was_paused = self.is_paused;
        let was_running = self.is_running;
        self.is_paused = false;
        self.is_running = true;

        let result = self.update(delta_time_ms);

        self.is_paused = was_paused;
        self.is_running = was_running;
        result
    }

    // System controls //

    pub fn start(&mut self) {
        info!("simulation started");
        self.is_running = true;
        self.is_paused = false;
    }

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    /// Stop and rewind the clock to the canonical start time (solar noon).
    pub fn stop(&mut self) {
        info!("simulation stopped");
        self.is_running = false;
        self.is_paused = false;
        self.simulation_time_ms = 0.0;
        self.config.time_of_day_minutes = SOLAR_NOON_MINUTE;
        self.config.daylight = self.is_daylight();
    }

    /// Rebuild every entity from the construction-time config, re-apply the
    /// initial environment snapshot, and enter Running.
    pub fn reset(&mut self) {
        info!("simulation reset");
        self.build_entities();
        self.config = SimulationConfig {
            ambient_temperature_c: self.system_config.ambient_temperature_c,
            daylight: true,
            time_of_day_minutes: SOLAR_NOON_MINUTE,
            working_fluid: self.system_config.working_fluid.clone(),
        };
        self.simulation_time_ms = 0.0;
        self.is_running = true;
        self.is_paused = false;
    }

    // Config mutators //

    pub fn set_ambient_temperature(&mut self, temp_c: f64) {
        self.config.ambient_temperature_c = temp_c;
    }

    /// Set the clock to the given hour of day (fractional hours allowed).
    pub fn set_time_of_day(&mut self, hour: f64) {
        self.config.time_of_day_minutes = hour.rem_euclid(24.0) * 60.0;
        self.config.daylight = self.is_daylight();
    }

    /// Swap the working fluid without reconstructing any entity.
    pub fn set_working_fluid(&mut self, fluid: FluidProperties) {
        self.config.working_fluid = fluid;
    }

    pub fn set_pump_mode(&mut self, mode: PumpMode) {
        self.circulation_pump.set_mode(mode);
    }

    pub fn start_pump(&mut self) {
        self.circulation_pump.start();
    }

    pub fn stop_pump(&mut self) {
        self.circulation_pump.stop();
    }

    // Queries //

    pub fn run_state(&self) -> RunStatus {
        if !self.is_running {
            RunStatus::Stopped
        } else if self.is_paused {
            RunStatus::Paused
        } else {
            RunStatus::Running
        }
    }

    pub fn simulation_time_ms(&self) -> f64 {
        self.simulation_time_ms
    }

    /// Aggregate the full snapshot and validate it.
    ///
    /// Any non-finite numeric field means an entity-level invariant broke
    /// without being caught; the simulation is stopped and the error carries
    /// every component's raw state. Clamping never happens at this layer.
    pub fn system_state(&mut self) -> Result<SystemState, SimError> {
        let state = self.assemble_state();

        let offending = Self::non_finite_fields(&state);
        if !offending.is_empty() {
            error!("system state corrupt, fields: {offending:?}");
            self.is_running = false;
            self.is_paused = false;
            return Err(SimError::CorruptSystemState {
                fields: offending,
                diagnostics: self.raw_diagnostics(),
            });
        }

        Ok(state)
    }

    fn assemble_state(&self) -> SystemState {
        let total_heat_loss = self.storage_tank.heat_loss_rate_w
            + self.inlet_pipe.heat_loss_rate()
            + self.outlet_pipe.heat_loss_rate();

        let system_efficiency = if self.solar_panel.energy_captured_w > 0.0 {
            self.solar_panel.energy_transferred_w / self.solar_panel.energy_captured_w * 100.0
        } else {
            0.0
        };

        SystemState {
            simulation_time_ms: self.simulation_time_ms,
            status: self.run_state(),
            is_paused: self.is_paused,
            time_of_day_minutes: self.config.time_of_day_minutes,
            daylight: self.config.daylight,

            solar_intensity: self.heat_source.intensity(),
            solar_radiation: self.heat_source.solar_radiation(),
            ambient_temperature: self.config.ambient_temperature_c,

            panel_temperature: self.solar_panel.temperature(),
            panel_outlet_temp: self.solar_panel.outlet_temperature(),
            energy_captured: self.solar_panel.energy_captured_w,
            energy_transferred: self.solar_panel.energy_transferred_w,

            tank_temperature: self.storage_tank.temperature(),
            tank_top_temp: self.storage_tank.top_temperature(),
            tank_bottom_temp: self.storage_tank.bottom_temperature(),
            stored_energy: self.storage_tank.stored_energy_j,
            tank_heat_loss: self.storage_tank.heat_loss_rate_w,

            pump_running: self.circulation_pump.is_running,
            pump_mode: self.circulation_pump.mode,
            flow_rate: self.circulation_pump.flow_rate(),
            temperature_difference: self.circulation_pump.temperature_difference(),

            inlet_pipe_temp: self.inlet_pipe.temperature(),
            outlet_pipe_temp: self.outlet_pipe.temperature(),
            inlet_pipe_heat_loss: self.inlet_pipe.heat_loss_rate(),
            outlet_pipe_heat_loss: self.outlet_pipe.heat_loss_rate(),

            system_efficiency,
            total_heat_loss,
        }
    }

    /// Names of snapshot fields holding non-finite numbers. serde_json maps
    /// NaN and infinities to `null`, so one scan of the serialized object
    /// covers every numeric field without a hand-maintained list.
    fn non_finite_fields(state: &SystemState) -> Vec<String> {
        match serde_json::to_value(state) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter(|(_, v)| v.is_null())
                .map(|(k, _)| k)
                .collect(),
            _ => vec!["<unserializable state>".to_string()],
        }
    }

    /// Raw per-entity state for the corruption diagnostics payload.
    fn raw_diagnostics(&self) -> serde_json::Value {
        let flow_entity = |e: &dyn ThermalEntity| {
            json!({
                "temperature": e.temperature(),
                "outletTemperature": e.outlet_temperature(),
            })
        };

        json!({
            "heatSource": {
                "intensity": self.heat_source.intensity(),
                "solarRadiation": self.heat_source.solar_radiation(),
            },
            "solarPanel": {
                "temperature": self.solar_panel.temperature(),
                "outletTemperature": self.solar_panel.outlet_temperature(),
                "energyCaptured": self.solar_panel.energy_captured_w,
                "energyTransferred": self.solar_panel.energy_transferred_w,
            },
            "storageTank": {
                "temperature": self.storage_tank.temperature(),
                "topTemperature": self.storage_tank.top_temperature(),
                "bottomTemperature": self.storage_tank.bottom_temperature(),
                "storedEnergy": self.storage_tank.stored_energy_j,
            },
            "circulationPump": {
                "temperature": self.circulation_pump.temperature(),
                "isRunning": self.circulation_pump.is_running,
                "mode": self.circulation_pump.mode.as_str(),
                "flowRate": self.circulation_pump.flow_rate(),
            },
            "inletPipe": flow_entity(&self.inlet_pipe),
            "outletPipe": flow_entity(&self.outlet_pipe),
        })
    }
}
