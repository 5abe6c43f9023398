use crate::constants::{
    DEFAULT_MAX_INTENSITY_W_M2, DEFAULT_NOISE_WEIGHT, MINUTES_PER_DAY, NOISE_AMPLITUDE,
    NOISE_OCTAVE_COUNT, NOISE_PERSISTENCE, NOISE_TABLE_SEED, SUN_SURFACE_TEMP_C,
};
use crate::entity::{FlowState, SimulationConfig, ThermalEntity};
use crate::error::SimError;
use crate::noise_curve::daily_noise;

#[derive(Debug, Clone)]
pub struct HeatSourceConfig {
    /// Peak solar radiation in W/m².
    pub max_intensity_w_m2: f64,
    /// Share of the intensity taken from the noise table instead of the
    /// deterministic daytime curve (0.0-1.0).
    pub noise_weight: f64,
    pub noise_seed: u32,
}

impl Default for HeatSourceConfig {
    fn default() -> Self {
        HeatSourceConfig {
            max_intensity_w_m2: DEFAULT_MAX_INTENSITY_W_M2,
            noise_weight: DEFAULT_NOISE_WEIGHT,
            noise_seed: NOISE_TABLE_SEED,
        }
    }
}

/// Instantaneous solar radiation from time-of-day plus precomputed noise.
pub struct HeatSource {
    state: FlowState,
    /// Dimensionless 0-1 share of `max_intensity_w_m2` currently delivered.
    intensity: f64,
    max_intensity_w_m2: f64,
    /// Curve-only intensity before noise blending, kept for inspection.
    base_intensity: f64,
    noise_weight: f64,
    daily_intensity_noise: Vec<f64>,
}

impl HeatSource {
    pub fn new(config: HeatSourceConfig) -> Self {
        HeatSource {
            state: FlowState::new("heat_source", SUN_SURFACE_TEMP_C),
            intensity: 0.0,
            max_intensity_w_m2: config.max_intensity_w_m2,
            base_intensity: 0.0,
            noise_weight: config.noise_weight,
            daily_intensity_noise: daily_noise(
                MINUTES_PER_DAY as usize,
                NOISE_OCTAVE_COUNT,
                NOISE_AMPLITUDE,
                NOISE_PERSISTENCE,
                config.noise_seed,
            ),
        }
    }

    /// Sine-shaped daytime curve blended with the noise sample for the
    /// current minute. The curve peaks at solar noon (minute 720).
    fn apply_daytime_curve(&mut self, noise_value: f64, minute_of_day: f64) -> f64 {
        let minute_normalized = minute_of_day / MINUTES_PER_DAY;
        let amplitude_scale = 0.5;
        let vertical_shift = 0.5;

        let sine_curve =
            (std::f64::consts::PI * minute_normalized).sin() * amplitude_scale + vertical_shift;
        self.base_intensity = sine_curve;

        let curve_weight = 1.0 - self.noise_weight;
        self.base_intensity * curve_weight + noise_value * self.noise_weight
    }

    /// Radiant power delivered right now (W/m²).
    pub fn solar_radiation(&self) -> f64 {
        self.intensity * self.max_intensity_w_m2
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }
}

impl ThermalEntity for HeatSource {
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

    fn update(&mut self, _delta_time_ms: f64, config: &SimulationConfig) -> Result<(), SimError> {
        let minute_of_day = config.time_of_day_minutes;

        if config.daylight {
            let index = (minute_of_day.floor() as usize) % self.daily_intensity_noise.len();
            let noise_value = self.daily_intensity_noise[index];

            let adjusted = self.apply_daytime_curve(noise_value, minute_of_day);
            self.intensity = adjusted.clamp(0.0, 1.0);
        } else {
            self.base_intensity = 0.0;
            self.intensity = 0.0;
        }

        Ok(())
    }
}
