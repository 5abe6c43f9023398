// Time
pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const MS_PER_MINUTE: f64 = 1000.0 * SECONDS_PER_MINUTE;
pub const HOURS_PER_DAY: f64 = 24.0;
pub const MINUTES_PER_DAY: f64 = HOURS_PER_DAY * MINUTES_PER_HOUR;
pub const TO_KELVIN: f64 = 273.15;
pub const J_PER_KWH: f64 = 3600.0 * 1000.0;

// Daylight window: 06:00-18:00, solar noon at minute 720
pub const DAYLIGHT_START_MINUTE: f64 = 6.0 * MINUTES_PER_HOUR;
pub const DAYLIGHT_END_MINUTE: f64 = 18.0 * MINUTES_PER_HOUR;
pub const SOLAR_NOON_MINUTE: f64 = 12.0 * MINUTES_PER_HOUR;

// Heat source
pub const DEFAULT_MAX_INTENSITY_W_M2: f64 = 1000.0;
pub const DEFAULT_NOISE_WEIGHT: f64 = 0.3;
pub const SUN_SURFACE_TEMP_C: f64 = 5500.0;

// Daily intensity noise table (one sample per minute of day)
pub const NOISE_TABLE_SEED: u32 = 1974;
pub const NOISE_OCTAVE_COUNT: u32 = 3;
pub const NOISE_AMPLITUDE: f64 = 0.6;
pub const NOISE_PERSISTENCE: f64 = 0.1;

// Solar panel
pub const DEFAULT_PANEL_EFFICIENCY: f64 = 0.7;
pub const DEFAULT_PANEL_AREA_M2: f64 = 2.0;
pub const DEFAULT_PANEL_THERMAL_MASS_KG: f64 = 10.0;
pub const MAX_STAGNATION_TEMP_C: f64 = 120.0;
pub const PANEL_ABSOLUTE_MIN_C: f64 = -10.0;
pub const PANEL_STAGNATION_COOLING_RATE_PER_MS: f64 = 0.00005;

// Thermal pipes
pub const DEFAULT_PIPE_LENGTH_M: f64 = 3.0;
pub const DEFAULT_PIPE_DIAMETER_M: f64 = 0.025; // 25mm
pub const DEFAULT_PIPE_U_VALUE: f64 = 0.5;
pub const MAX_PIPE_TEMP_C: f64 = 200.0;
pub const PIPE_IDLE_COOLING_RATE_PER_MS: f64 = 0.02;

// Storage tank
pub const DEFAULT_TANK_VOLUME_M3: f64 = 0.2; // 200 liters
pub const DEFAULT_TANK_U_VALUE: f64 = 0.3;
pub const DEFAULT_TANK_MAX_TEMP_C: f64 = 90.0;
pub const TANK_ABSOLUTE_MIN_C: f64 = -50.0;
pub const TANK_STRATIFICATION_DELTA_C: f64 = 10.0;
pub const TANK_STRATIFICATION_RATE_PER_MS: f64 = 0.05;
pub const TANK_MIXING_FACTOR_CAP: f64 = 0.1;
pub const TANK_IDLE_MIXING_RATE_PER_MS: f64 = 0.005;
pub const TANK_IDLE_MIXING_FACTOR_CAP: f64 = 0.05;
pub const TANK_COOLING_RATE_PER_MS: f64 = 0.0000001; // well insulated

// Circulation pump
pub const DEFAULT_MAX_FLOW_RATE_M3_S: f64 = 0.0005; // 0.5 L/s
pub const DEFAULT_PUMP_START_THRESHOLD_C: f64 = 8.0;
pub const DEFAULT_PUMP_STOP_THRESHOLD_C: f64 = 3.0;
pub const MAX_PUMP_TEMP_C: f64 = 120.0;
pub const PUMP_ABSOLUTE_MIN_C: f64 = -10.0;
pub const PUMP_IDLE_COOLING_RATE_PER_MS: f64 = 0.01;

// System-level defaults
pub const DEFAULT_AMBIENT_TEMP_C: f64 = 20.0;
pub const DEFAULT_INITIAL_TANK_TEMP_C: f64 = 20.0;
